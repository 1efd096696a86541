//! # メッセージカタログ
//!
//! メッセージキーと `$N` 位置パラメータ付きテンプレートの対応表。
//! 通知の件名・本文は常にコンテンツ言語で生成する（閲覧者の言語は使わない）。
//!
//! ## 置換規則
//!
//! - `$1` から `$N` を引数で置き換える。`$10` は 10 番目の引数を表す
//! - 引数が足りない `$N` はそのまま残す
//! - 未知のキーは `⧼key⧽` になる
//! - 未知の言語・キーは `en` にフォールバックする

use std::collections::HashMap;

/// 件名のメッセージキー
pub const SUBJECT_KEY: &str = "newusernotifsubj";

/// 本文のメッセージキー
pub const BODY_KEY: &str = "newusernotifbody";

/// フォールバック言語
const FALLBACK_LANGUAGE: &str = "en";

/// 組み込みテンプレート（言語, キー, テンプレート）
const BUILTIN_MESSAGES: &[(&str, &str, &str)] = &[
    ("en", SUBJECT_KEY, "New user notification for $1"),
    (
        "en",
        BODY_KEY,
        "Hello $1,\n\nA new user account, $2, has been created on $3 at $4.\n\nDate: $5\nTime: $6",
    ),
    ("ja", SUBJECT_KEY, "$1 の新規利用者通知"),
    (
        "ja",
        BODY_KEY,
        "$1 さん\n\n$3 で新しい利用者アカウント「$2」が $4 に作成されました。\n\n日付: $5\n時刻: $6",
    ),
    ("de", SUBJECT_KEY, "Benachrichtigung über neue Benutzer auf $1"),
    (
        "de",
        BODY_KEY,
        "Hallo $1,\n\nauf $3 wurde am $4 ein neues Benutzerkonto, $2, erstellt.\n\nDatum: $5\nUhrzeit: $6",
    ),
    ("fr", SUBJECT_KEY, "Notification de nouvel utilisateur sur $1"),
    (
        "fr",
        BODY_KEY,
        "Bonjour $1,\n\nUn nouveau compte utilisateur, $2, a été créé sur $3 le $4.\n\nDate : $5\nHeure : $6",
    ),
];

/// メッセージ解決サービス
///
/// キーと位置パラメータからコンテンツ言語のテキストを生成する。
pub trait MessageSource: Send + Sync {
    fn message(&self, key: &str, args: &[String]) -> String;
}

/// 組み込みテンプレートによるメッセージカタログ
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    language:  String,
    templates: HashMap<String, String>,
}

impl MessageCatalog {
    /// コンテンツ言語のカタログを作成する
    ///
    /// その言語にないキーは `en` のテンプレートで補う。
    pub fn new(language: impl Into<String>) -> Self {
        let language = primary_subtag(&language.into());

        let mut templates: HashMap<String, String> = HashMap::new();
        for lang in [FALLBACK_LANGUAGE, language.as_str()] {
            for (_, key, template) in BUILTIN_MESSAGES.iter().filter(|(l, ..)| *l == lang) {
                templates.insert((*key).to_string(), (*template).to_string());
            }
        }

        Self {
            language,
            templates,
        }
    }

    /// テンプレートを上書きする
    ///
    /// ホスト側でメッセージをカスタマイズした場合に使う。
    pub fn with_template(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }

    /// カタログの言語コード
    pub fn language(&self) -> &str {
        &self.language
    }

    /// 組み込みテンプレートを持つ言語か
    pub fn is_supported(language: &str) -> bool {
        let language = primary_subtag(language);
        BUILTIN_MESSAGES.iter().any(|(l, ..)| *l == language)
    }
}

impl MessageSource for MessageCatalog {
    fn message(&self, key: &str, args: &[String]) -> String {
        match self.templates.get(key) {
            Some(template) => substitute(template, args),
            None => format!("⧼{key}⧽"),
        }
    }
}

/// `ja-JP` や `de_AT` から主言語タグ（小文字）を取り出す
pub(crate) fn primary_subtag(language: &str) -> String {
    language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// `$N` を位置パラメータで置き換える
fn substitute(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();

        let arg = after[..digits]
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| args.get(i));

        match arg {
            Some(value) => out.push_str(value),
            None => {
                out.push('$');
                out.push_str(&after[..digits]);
            }
        }
        rest = &after[digits..];
    }
    out.push_str(rest);

    out
}
