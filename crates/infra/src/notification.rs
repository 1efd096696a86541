//! # 通知送信
//!
//! メールの配送を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **3 つの実装**: SMTP（リレー / Mailpit）、SES（本番用）、Noop（送信無効化）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択（選択は notifier-service が行う）
//! - **送信元はメッセージ側**: 送信元アドレスは設定から `EmailMessage::from` に載せて渡す

mod noop;
mod ses;
mod smtp;

use async_trait::async_trait;
use newusernotif_domain::notification::{EmailMessage, NotificationError};
pub use noop::NoopNotificationSender;
pub use ses::SesNotificationSender;
pub use smtp::{SmtpCredentials, SmtpNotificationSender};

/// メール送信トレイト
///
/// 1 通のメールを 1 人の受信者へ送る。失敗はそのまま呼び出し元へ返す。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}
