//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリのモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! newusernotif-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use newusernotif_domain::{
    notification::{EmailMessage, NotificationError},
    user::{Account, UserId, UserName},
};

use crate::{directory::UserDirectory, error::InfraError, notification::NotificationSender};

// ===== MockNotificationSender =====

/// 送信したメールを記録するモック
///
/// `failing_for` で指定したアドレス宛ての送信は `SendFailed` を返す。
/// 失敗した送信も送信試行として `attempted_emails` に記録する。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:         Arc<Mutex<Vec<EmailMessage>>>,
    attempted:    Arc<Mutex<Vec<EmailMessage>>>,
    failing_addr: Option<String>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定アドレス宛ての送信を失敗させる
    pub fn failing_for(address: impl Into<String>) -> Self {
        Self {
            failing_addr: Some(address.into()),
            ..Self::default()
        }
    }

    /// 送信に成功したメール（送信順）
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// 送信を試みたメール（失敗を含む、送信順）
    pub fn attempted_emails(&self) -> Vec<EmailMessage> {
        self.attempted.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        self.attempted.lock().unwrap().push(email.clone());

        if self.failing_addr.as_deref() == Some(email.to.address().as_str()) {
            return Err(NotificationError::SendFailed(format!(
                "mock failure for {}",
                email.to.address()
            )));
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ===== FailingUserDirectory =====

/// 常にエラーを返すユーザーディレクトリ
#[derive(Clone, Default)]
pub struct FailingUserDirectory;

#[async_trait]
impl UserDirectory for FailingUserDirectory {
    async fn find_name_by_id(&self, _id: UserId) -> Result<Option<UserName>, InfraError> {
        Err(InfraError::unexpected("directory unavailable"))
    }

    async fn find_by_name(&self, _name: &UserName) -> Result<Option<Account>, InfraError> {
        Err(InfraError::unexpected("directory unavailable"))
    }
}
