//! # ユーザーディレクトリ
//!
//! ホストプラットフォームに登録されたアカウントを参照する。
//!
//! ## 設計方針
//!
//! - **読み取り専用**: アカウントの作成・更新は行わない
//! - **存在しないことは正常系**: 見つからない場合は `Ok(None)` を返す
//! - **2 つの実装**: PostgreSQL（ホストの `mwuser` テーブル）、インメモリ（DB 未設定時・テスト）

mod memory;
mod postgres;

use async_trait::async_trait;
pub use memory::InMemoryUserDirectory;
use newusernotif_domain::user::{Account, UserId, UserName};
pub use postgres::PostgresUserDirectory;

use crate::error::InfraError;

/// ユーザーディレクトリトレイト
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 数値 ID からユーザー名を引く
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(name))`: ID に対応するアカウントが存在する場合
    /// - `Ok(None)`: 存在しない場合
    /// - `Err(_)`: ディレクトリへのアクセスに失敗した場合
    async fn find_name_by_id(&self, id: UserId) -> Result<Option<UserName>, InfraError>;

    /// ユーザー名でアカウントを取得する
    ///
    /// `name` は正規化済みであること。
    async fn find_by_name(&self, name: &UserName) -> Result<Option<Account>, InfraError>;
}
