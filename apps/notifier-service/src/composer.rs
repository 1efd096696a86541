//! # メッセージコンポーザー
//!
//! 受信者と作成されたアカウントから、通知メールの件名と本文を組み立てる。
//!
//! ## 組み立て順序
//!
//! 1. 登録されたフックを登録順に実行する
//! 2. 空でない結果を残したフックがあれば、その時点で打ち切ってそれを使う
//! 3. どのフックも結果を残さなければ、既定のテンプレートで生成する
//!
//! 既定の件名は `$1` = サイト名のみ、既定の本文は `$1`〜`$6` のみを埋める。
//! `$7` 以降を使うテンプレートは [`ExtendedParamsHook`] を登録した場合にだけ埋まる。

mod extended_params;

use std::sync::Arc;

pub use extended_params::ExtendedParamsHook;
use newusernotif_domain::{clock::Clock, notification::NotificationEvent, user::Account};

use crate::{
    catalog::{BODY_KEY, MessageSource, SUBJECT_KEY},
    content_language::ContentLanguage,
};

/// フックに渡す組み立て中の情報
pub struct ComposeContext<'a> {
    /// 呼び出し元のコンポーザー
    pub composer:  &'a MessageComposer,
    /// サイト名
    pub site_name: &'a str,
    /// 受信者の識別子（外部受信者はアドレス、内部受信者はユーザー名）
    pub recipient: &'a str,
    /// 通知イベント
    pub event:     &'a NotificationEvent,
}

impl ComposeContext<'_> {
    /// 作成されたアカウント
    pub fn user(&self) -> &Account {
        self.event.user()
    }
}

/// 件名の上書きフック
///
/// `subject` に空でない文字列を書き込むと、既定の件名は使われない。
pub trait SubjectHook: Send + Sync {
    fn on_subject(&self, ctx: &ComposeContext<'_>, subject: &mut String);
}

/// 本文の上書きフック
///
/// `body` に空でない文字列を書き込むと、既定の本文は使われない。
pub trait BodyHook: Send + Sync {
    fn on_body(&self, ctx: &ComposeContext<'_>, body: &mut String);
}

/// 組み立て結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub subject: String,
    pub body:    String,
}

/// メッセージコンポーザー
///
/// 構築後は変更しない。フックは `with_*_hook` で登録した順に実行される。
pub struct MessageComposer {
    site_name:     String,
    messages:      Arc<dyn MessageSource>,
    language:      Arc<dyn ContentLanguage>,
    clock:         Arc<dyn Clock>,
    subject_hooks: Vec<Arc<dyn SubjectHook>>,
    body_hooks:    Vec<Arc<dyn BodyHook>>,
}

impl MessageComposer {
    pub fn new(
        site_name: impl Into<String>,
        messages: Arc<dyn MessageSource>,
        language: Arc<dyn ContentLanguage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            site_name: site_name.into(),
            messages,
            language,
            clock,
            subject_hooks: Vec::new(),
            body_hooks: Vec::new(),
        }
    }

    /// 件名フックを登録する
    pub fn with_subject_hook(mut self, hook: Arc<dyn SubjectHook>) -> Self {
        self.subject_hooks.push(hook);
        self
    }

    /// 本文フックを登録する
    pub fn with_body_hook(mut self, hook: Arc<dyn BodyHook>) -> Self {
        self.body_hooks.push(hook);
        self
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// メッセージキーと位置パラメータからテキストを生成する
    pub fn message(&self, key: &str, args: &[String]) -> String {
        self.messages.message(key, args)
    }

    /// 既定の本文パラメータ `$1`〜`$6`
    ///
    /// 受信者、ユーザー名、サイト名、日時、日付、時刻の順。
    /// 日時はコンテンツ言語とそのタイムゾーンで整形する。
    pub fn default_body_params(&self, recipient: &str, user: &Account) -> Vec<String> {
        let now = self.clock.now();
        vec![
            recipient.to_string(),
            user.name().to_string(),
            self.site_name.clone(),
            self.language.time_and_date(now),
            self.language.date(now),
            self.language.time(now),
        ]
    }

    /// 既定の件名
    pub fn default_subject(&self) -> String {
        self.message(SUBJECT_KEY, std::slice::from_ref(&self.site_name))
    }

    /// 既定の本文
    pub fn default_body(&self, recipient: &str, user: &Account) -> String {
        self.message(BODY_KEY, &self.default_body_params(recipient, user))
    }

    /// 件名と本文を組み立てる
    pub fn compose(&self, recipient: &str, event: &NotificationEvent) -> ComposedMessage {
        let ctx = ComposeContext {
            composer: self,
            site_name: &self.site_name,
            recipient,
            event,
        };

        ComposedMessage {
            subject: self.make_subject(&ctx),
            body:    self.make_body(&ctx),
        }
    }

    fn make_subject(&self, ctx: &ComposeContext<'_>) -> String {
        let mut subject = String::new();
        for hook in &self.subject_hooks {
            hook.on_subject(ctx, &mut subject);
            if !subject.is_empty() {
                return subject;
            }
        }
        self.default_subject()
    }

    fn make_body(&self, ctx: &ComposeContext<'_>) -> String {
        let mut body = String::new();
        for hook in &self.body_hooks {
            hook.on_body(ctx, &mut body);
            if !body.is_empty() {
                return body;
            }
        }
        self.default_body(ctx.recipient, ctx.user())
    }
}
