//! # アカウント
//!
//! ホストプラットフォームに登録されたアカウントと、その値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`Account`] | アカウント | 作成されたユーザー、または内部受信者 |
//! | [`UserId`] | ユーザー ID | ホストが採番する数値 ID。0 は未登録を表す |
//! | [`UserName`] | ユーザー名 | ホストの規則で正規化されたアカウント名 |
//! | [`Email`] | メールアドレス | アカウントに登録された連絡先 |
//!
//! ## 設計方針
//!
//! - **正規化**: ユーザー名はホストと同じ規則で正規化し、表記揺れを吸収する
//! - **確認済みアドレス**: 内部受信者へは確認済みのアドレスにのみ送信する

use std::net::Ipv4Addr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{DomainError, notification::MailAddress};

/// ユーザー名に使用できない文字
const INVALID_NAME_CHARS: &[char] = &['#', '<', '>', '[', ']', '|', '{', '}', '@', ':'];

/// ユーザー名の最大バイト数
const MAX_NAME_BYTES: usize = 255;

/// ユーザー ID（ホスト採番の数値 ID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct UserId(u64);

impl UserId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// 登録済みアカウントの ID か（正の値か）
    pub fn is_registered(&self) -> bool {
        self.0 > 0
    }
}

/// ユーザー名（値オブジェクト）
///
/// 生成時にホストと同じ正規化を行う:
///
/// - 前後の空白を除去し、`_` と連続する空白を 1 つの空白にまとめる
/// - 先頭文字を大文字にする
///
/// 正規化後に以下のいずれかに該当する場合は不正とする:
///
/// - 空文字列
/// - `# < > [ ] | { } @ :` のいずれかを含む
/// - 255 バイトを超える
/// - IPv4 アドレスとして解釈できる（匿名利用者と区別できないため）
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let collapsed = value
            .as_ref()
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let mut chars = collapsed.chars();
        let Some(first) = chars.next() else {
            return Err(DomainError::Validation("ユーザー名は必須です".to_string()));
        };
        let name: String = first.to_uppercase().chain(chars).collect();

        if let Some(c) = name.chars().find(|c| INVALID_NAME_CHARS.contains(c)) {
            return Err(DomainError::Validation(format!(
                "ユーザー名に使用できない文字が含まれています: {c:?}"
            )));
        }

        if name.len() > MAX_NAME_BYTES {
            return Err(DomainError::Validation(format!(
                "ユーザー名は {MAX_NAME_BYTES} バイト以内である必要があります"
            )));
        }

        if name.parse::<Ipv4Addr>().is_ok() {
            return Err(DomainError::Validation(
                "IP アドレスはユーザー名として使用できません".to_string(),
            ));
        }

        Ok(Self(name))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UserName").field(&"[REDACTED]").finish()
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// メールアドレス（値オブジェクト）
///
/// 生成時にバリデーションを実行し、不正な値の作成を防ぐ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 前後の空白は除去する
    /// - `local@domain` の形式である
    /// - 空白や `<` `>` を含まない
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        let Some((local, domain)) = value.rsplit_once('@') else {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        };

        if local.is_empty()
            || domain.is_empty()
            || value
                .chars()
                .any(|c| c.is_whitespace() || c == '<' || c == '>')
        {
            return Err(DomainError::Validation(format!(
                "メールアドレスの形式が不正です: {value}"
            )));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 所有権を持つ文字列に変換する
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// アカウントエンティティ
///
/// ホストプラットフォームのアカウントを表現する。
/// 作成されたユーザー（通知の対象）と内部受信者の両方に使う。
///
/// # 不変条件
///
/// - `email_confirmed` が `true` でも `email` が `None` なら確認済みとは見なさない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id:              UserId,
    name:            UserName,
    email:           Option<Email>,
    email_confirmed: bool,
}

impl Account {
    pub fn new(id: UserId, name: UserName, email: Option<Email>, email_confirmed: bool) -> Self {
        Self {
            id,
            name,
            email,
            email_confirmed,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    /// 登録済みアカウントか（ID が正の値か）
    pub fn is_registered(&self) -> bool {
        self.id.is_registered()
    }

    /// 確認済みのメールアドレスを持つか
    pub fn is_email_confirmed(&self) -> bool {
        self.email_confirmed && self.email.is_some()
    }

    /// アカウント自身の配送先
    ///
    /// 確認済みアドレスを持つ場合のみ、表示名付きのアドレスを返す。
    pub fn mail_address(&self) -> Option<MailAddress> {
        if !self.email_confirmed {
            return None;
        }
        self.email
            .clone()
            .map(|email| MailAddress::new(email).with_name(self.name.as_str()))
    }
}
