//! # NewUserNotif ドメイン層
//!
//! 新規ユーザー作成通知のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **ホスト非依存**: アカウント情報はホストプラットフォームから受け取る値として扱う
//! - **値オブジェクト**: ユーザー名・メールアドレスは生成時に正規化と検証を行う
//! - **インフラ非依存**: メール送信やユーザー検索の具体的な方法は `infra` が提供する
//!
//! ## 依存関係の方向
//!
//! ```text
//! notifier-service → infra → domain
//!          ↘                   ↑
//!            ──────────────────┘
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`user`] - アカウントとその値オブジェクト
//! - [`notification`] - 通知イベント、受信者指定、メールメッセージ
//! - [`clock`] - 現在時刻の提供
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use newusernotif_domain::{
//!     notification::{NotificationEvent, RecipientSpec},
//!     user::{Account, Email, UserId, UserName},
//! };
//!
//! let account = Account::new(
//!     UserId::new(42),
//!     UserName::new("alice")?,
//!     Some(Email::new("alice@example.com")?),
//!     true,
//! );
//! let event = NotificationEvent::new(account, false);
//! assert_eq!(event.user().name().as_str(), "Alice");
//!
//! let spec: RecipientSpec = "7".parse()?;
//! assert_eq!(spec, RecipientSpec::Id(UserId::new(7)));
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod error;
pub mod notification;
pub mod user;

pub use error::DomainError;
