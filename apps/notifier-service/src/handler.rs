//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、ルーターを組み立てる
//! - ハンドラは薄く保ち、配送ロジックは [`NewUserNotifier`] に委譲

pub mod event;
pub mod health;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
pub use event::{CreatedUserDto, UserCreatedRequest, user_created};
pub use health::health_check;

use crate::dispatcher::NewUserNotifier;

/// ルーターを組み立てる
///
/// - `GET /health`
/// - `POST /internal/events/user-created`
pub fn router(notifier: Arc<NewUserNotifier>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/internal/events/user-created", post(user_created))
        .with_state(notifier)
}
