//! # NewUserNotif インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **ユーザーディレクトリ**: ホストプラットフォームのアカウント参照
//! - **メール配送**: SMTP / Amazon SES / Noop の送信実装
//! - **データベース接続**: PostgreSQL への接続プール管理
//!
//! ## 依存関係
//!
//! ```text
//! notifier-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層に依存しない。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`directory`] - ユーザーディレクトリ
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use newusernotif_infra::{
//!     db,
//!     directory::{PostgresUserDirectory, UserDirectory},
//!     notification::{NoopNotificationSender, NotificationSender},
//! };
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/wiki").await?;
//!     let directory: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool));
//!     let sender: Arc<dyn NotificationSender> = Arc::new(NoopNotificationSender);
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod directory;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;

pub use error::InfraError;
