//! インメモリのユーザーディレクトリ
//!
//! `DATABASE_URL` を設定しない場合のディレクトリとして使うほか、テストでも使う。

use async_trait::async_trait;
use newusernotif_domain::user::{Account, UserId, UserName};

use super::UserDirectory;
use crate::error::InfraError;

/// 起動時に与えたアカウント一覧だけを返すディレクトリ
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    accounts: Vec<Account>,
}

impl InMemoryUserDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    /// アカウントを追加する
    pub fn with_account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_name_by_id(&self, id: UserId) -> Result<Option<UserName>, InfraError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.id() == id)
            .map(|a| a.name().clone()))
    }

    async fn find_by_name(&self, name: &UserName) -> Result<Option<Account>, InfraError> {
        Ok(self.accounts.iter().find(|a| a.name() == name).cloned())
    }
}
