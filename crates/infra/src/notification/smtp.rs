//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//!
//! - 認証情報なし: TLS なしで接続する（Mailpit などローカル SMTP 向け）
//! - 認証情報あり: STARTTLS で接続し、PLAIN / LOGIN 認証する（SMTP リレー向け）

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use newusernotif_domain::notification::{EmailMessage, MailAddress, NotificationError};

use super::NotificationSender;

/// SMTP 認証情報
#[derive(Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `host`: SMTP サーバーのホスト名（例: "localhost"）
    /// - `port`: SMTP サーバーのポート番号（例: 1025 for Mailpit）
    /// - `credentials`: 認証情報。`Some` の場合は STARTTLS で接続する
    pub fn new(
        host: &str,
        port: u16,
        credentials: Option<SmtpCredentials>,
    ) -> Result<Self, NotificationError> {
        let transport = match credentials {
            Some(SmtpCredentials { username, password }) => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| {
                        NotificationError::SendFailed(format!("SMTP リレー設定失敗: {e}"))
                    })?
                    .port(port)
                    .credentials(Credentials::new(username, password))
                    .build()
            }
            // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
            None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                .port(port)
                .build(),
        };

        Ok(Self { transport })
    }
}

/// ドメインのアドレスを lettre の `Mailbox` に変換する
fn to_mailbox(address: &MailAddress) -> Result<Mailbox, NotificationError> {
    let email = address
        .address()
        .as_str()
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("{}: {e}", address.address())))?;
    Ok(Mailbox::new(address.name().map(str::to_string), email))
}

/// `EmailMessage` からプレーンテキストのメールを組み立てる
fn build_message(email: &EmailMessage) -> Result<Message, NotificationError> {
    Message::builder()
        .from(to_mailbox(&email.from)?)
        .to(to_mailbox(&email.to)?)
        .subject(&email.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let message = build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        Ok(())
    }
}
