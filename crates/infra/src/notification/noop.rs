//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 開発環境や通知を一時的に止めたい場合に使用する。

use async_trait::async_trait;
use newusernotif_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
#[derive(Debug, Clone, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            to = %email.to,
            from = %email.from,
            subject = %email.subject,
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }
}
