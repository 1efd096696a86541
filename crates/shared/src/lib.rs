//! # NewUserNotif 共有ユーティリティ
//!
//! 通知サービスとインフラ層で共通に使うユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum などの Web フレームワークには依存しない（変換は各サービスの責務）
//! - tracing 関連の依存は `observability` feature で有効化する

pub mod api_response;
pub mod error_response;
pub mod event_log;
pub mod health;
pub mod observability;

pub use api_response::ApiResponse;
pub use error_response::ErrorResponse;
pub use health::HealthResponse;
