//! PostgreSQL のユーザーディレクトリ
//!
//! ホストプラットフォームの `mwuser` テーブルを読み取る。
//!
//! | カラム | 用途 |
//! |--------|------|
//! | `user_id` | 数値 ID |
//! | `user_name` | 正規化済みユーザー名 |
//! | `user_email` | メールアドレス（未登録は空文字列） |
//! | `user_email_authenticated` | アドレス確認日時（未確認は NULL） |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newusernotif_domain::user::{Account, Email, UserId, UserName};
use sqlx::PgPool;

use super::UserDirectory;
use crate::error::InfraError;

/// `mwuser` の 1 行
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    user_name: String,
    user_email: Option<String>,
    user_email_authenticated: Option<DateTime<Utc>>,
}

impl UserRow {
    /// 行をアカウントに変換する
    ///
    /// 負の ID やホストの規則に合わない名前は、存在しないものとして扱う。
    fn into_account(self) -> Option<Account> {
        let id = u64::try_from(self.user_id).ok().map(UserId::new)?;
        let name = match UserName::new(&self.user_name) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(user_id = self.user_id, error = %e, "不正なユーザー名の行を無視");
                return None;
            }
        };
        let email = self
            .user_email
            .filter(|e| !e.trim().is_empty())
            .and_then(|e| Email::new(e).ok());

        Some(Account::new(
            id,
            name,
            email,
            self.user_email_authenticated.is_some(),
        ))
    }
}

/// PostgreSQL 実装
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn find_name_by_id(&self, id: UserId) -> Result<Option<UserName>, InfraError> {
        let Ok(user_id) = i64::try_from(id.as_u64()) else {
            return Ok(None);
        };

        let name: Option<String> =
            sqlx::query_scalar("SELECT user_name FROM mwuser WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(name.and_then(|n| UserName::new(n).ok()))
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn find_by_name(&self, name: &UserName) -> Result<Option<Account>, InfraError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT
                user_id::BIGINT AS user_id,
                user_name,
                user_email,
                user_email_authenticated
            FROM mwuser
            WHERE user_name = $1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(UserRow::into_account))
    }
}
