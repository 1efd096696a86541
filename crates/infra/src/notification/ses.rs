//! SES 通知送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。本番環境で使用する。

use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    types::{Body, Content, Destination, EmailContent, Message},
};
use newusernotif_domain::notification::{EmailMessage, NotificationError};

use super::NotificationSender;

/// SES 通知送信
///
/// 送信元アドレス（`EmailMessage::from`）は SES で検証済みである必要がある。
pub struct SesNotificationSender {
    client: Client,
}

impl SesNotificationSender {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// SDK のデフォルト認証チェーンでクライアントを作成する
    ///
    /// - ローカル: 環境変数 `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_REGION`
    /// - 本番: IAM ロール
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

/// UTF-8 のテキストコンテンツを構築する
fn utf8_content(data: &str, label: &str) -> Result<Content, NotificationError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| NotificationError::SendFailed(format!("{label}構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SesNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        // SES は非 ASCII の表示名に MIME エンコードを要求するため、アドレスのみ渡す
        let destination = Destination::builder()
            .to_addresses(email.to.address().as_str())
            .build();

        let content = EmailContent::builder()
            .simple(
                Message::builder()
                    .subject(utf8_content(&email.subject, "件名")?)
                    .body(
                        Body::builder()
                            .text(utf8_content(&email.body, "本文")?)
                            .build(),
                    )
                    .build(),
            )
            .build();

        self.client
            .send_email()
            .from_email_address(email.from.address().as_str())
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SES 送信失敗: {e}")))?;

        Ok(())
    }
}
