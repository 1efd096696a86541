//! # Notifier Service 設定
//!
//! 環境変数から Notifier Service の設定を読み込む。
//! 起動時に一度だけ読み込み、以降は変更しない。

use std::env;

use newusernotif_domain::notification::RecipientSpec;
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値の形式が不正
    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Notifier Service サーバーの設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// バインドアドレス
    pub host:         String,
    /// ポート番号
    pub port:         u16,
    /// データベース接続 URL（未設定ならユーザーディレクトリは空）
    pub database_url: Option<String>,
    /// 新規ユーザー通知の設定
    pub newusernotif: NewUserNotifConfig,
    /// 通知バックエンドの設定
    pub notification: NotificationConfig,
}

/// 新規ユーザー通知の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserNotifConfig {
    /// テンプレートに埋め込むサイト名
    pub site_name:            String,
    /// 送信元アドレス
    pub sender:               String,
    /// 外部受信者（生のメールアドレス）
    pub email_targets:        Vec<String>,
    /// 内部受信者（数値 ID またはユーザー名）
    pub targets:              Vec<RecipientSpec>,
    /// 拡張パラメータフックを登録するか
    pub extended_params:      bool,
    /// コンテンツ言語
    pub content_language:     String,
    /// コンテンツのタイムゾーン（UTC からの分）
    pub timezone_offset_mins: i32,
    /// 件名テンプレートの上書き
    pub subject_template:     Option<String>,
    /// 本文テンプレートの上書き（`\n` は改行になる）
    pub body_template:        Option<String>,
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `smtp`: Mailpit（開発）/ SMTP リレー経由で送信
/// - `ses`: Amazon SES v2 経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// 送信バックエンド（"smtp" | "ses" | "noop"）
    pub backend:       String,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:     String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:     u16,
    /// SMTP ユーザー名（設定時は STARTTLS で接続）
    pub smtp_username: Option<String>,
    /// SMTP パスワード
    pub smtp_password: Option<String>,
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host:         env::var("NOTIFIER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port:         parse_number("NOTIFIER_PORT", env::var("NOTIFIER_PORT").ok(), 3100)?,
            database_url: non_empty_var("DATABASE_URL"),
            newusernotif: NewUserNotifConfig::from_env()?,
            notification: NotificationConfig::from_env()?,
        })
    }
}

impl NewUserNotifConfig {
    /// 環境変数から新規ユーザー通知の設定を読み込む
    ///
    /// 送信元は `NEWUSERNOTIF_SENDER`、未設定なら `PASSWORD_SENDER` を使う。
    fn from_env() -> Result<Self, ConfigError> {
        let site_name = non_empty_var("NEWUSERNOTIF_SITE_NAME")
            .ok_or(ConfigError::Missing("NEWUSERNOTIF_SITE_NAME"))?;
        let sender = non_empty_var("NEWUSERNOTIF_SENDER")
            .or_else(|| non_empty_var("PASSWORD_SENDER"))
            .ok_or(ConfigError::Missing("NEWUSERNOTIF_SENDER"))?;

        Ok(Self {
            site_name,
            sender,
            email_targets: parse_list(&env::var("NEWUSERNOTIF_EMAIL_TARGETS").unwrap_or_default()),
            targets: parse_targets(&env::var("NEWUSERNOTIF_TARGETS").unwrap_or_default())?,
            extended_params: parse_bool(
                "NEWUSERNOTIF_EXTENDED_PARAMS",
                env::var("NEWUSERNOTIF_EXTENDED_PARAMS").ok(),
            )?,
            content_language: non_empty_var("CONTENT_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            timezone_offset_mins: parse_number(
                "CONTENT_TIMEZONE_OFFSET_MINUTES",
                env::var("CONTENT_TIMEZONE_OFFSET_MINUTES").ok(),
                0,
            )?,
            subject_template: non_empty_var("NEWUSERNOTIF_SUBJECT_TEMPLATE").map(|t| unescape(&t)),
            body_template: non_empty_var("NEWUSERNOTIF_BODY_TEMPLATE").map(|t| unescape(&t)),
        })
    }
}

impl NotificationConfig {
    /// 環境変数から通知設定を読み込む
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend:       env::var("NOTIFICATION_BACKEND").unwrap_or_else(|_| "noop".to_string()),
            smtp_host:     env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port:     parse_number("SMTP_PORT", env::var("SMTP_PORT").ok(), 1025)?,
            smtp_username: non_empty_var("SMTP_USERNAME"),
            smtp_password: non_empty_var("SMTP_PASSWORD"),
        })
    }
}

/// 空文字列を未設定として扱う
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// 環境変数に書いた `\n` を改行に戻す
fn unescape(value: &str) -> String {
    value.replace("\\n", "\n")
}

/// カンマ区切りのリストを分解する
///
/// 前後の空白は除去し、空要素は捨てる。順序は保つ。
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// カンマ区切りの内部受信者指定を解釈する
pub fn parse_targets(value: &str) -> Result<Vec<RecipientSpec>, ConfigError> {
    parse_list(value)
        .into_iter()
        .map(|token| {
            token.parse().map_err(|_| ConfigError::Invalid {
                name:  "NEWUSERNOTIF_TARGETS",
                value: token,
            })
        })
        .collect()
}

fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}
