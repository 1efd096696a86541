//! # 受信者リゾルバー
//!
//! 設定された内部受信者指定（数値 ID またはユーザー名）を、
//! ユーザーディレクトリ上の既存アカウントに解決する。
//!
//! 見つからない受信者はエラーではなく `None` になる。
//! ディレクトリへのアクセス自体が失敗した場合のみエラーを返す。

use std::sync::Arc;

use newusernotif_domain::{
    notification::RecipientSpec,
    user::{Account, UserName},
};
use newusernotif_infra::{InfraError, directory::UserDirectory};

/// 受信者リゾルバー
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn UserDirectory>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// 受信者指定をアカウントに解決する
    ///
    /// - 数値 ID はまずユーザー名に引き直す。引けなければ `None`
    /// - ユーザー名が不正、アカウントが存在しない、ID が正でない場合は `None`
    #[tracing::instrument(skip(self), fields(recipient = %spec), level = "debug")]
    pub async fn resolve(&self, spec: &RecipientSpec) -> Result<Option<Account>, InfraError> {
        let name = match spec {
            RecipientSpec::Id(id) => match self.directory.find_name_by_id(*id).await? {
                Some(name) => name,
                None => {
                    tracing::debug!("ID に対応するアカウントがありません");
                    return Ok(None);
                }
            },
            RecipientSpec::Name(raw) => match UserName::new(raw) {
                Ok(name) => name,
                Err(e) => {
                    tracing::debug!(error = %e, "ユーザー名として不正な受信者指定");
                    return Ok(None);
                }
            },
        };

        let account = self
            .directory
            .find_by_name(&name)
            .await?
            .filter(Account::is_registered);

        if account.is_none() {
            tracing::debug!("アカウントが存在しません");
        }

        Ok(account)
    }
}
