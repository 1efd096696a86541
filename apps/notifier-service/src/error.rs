//! # Notifier Service エラー定義
//!
//! HTTP レスポンスへの変換を定義する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use newusernotif_shared::ErrorResponse;
use thiserror::Error;

use crate::dispatcher::DispatchError;

/// Notifier Service で発生するエラー
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 配送パスの失敗
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = match &self {
            ServiceError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            ServiceError::Dispatch(DispatchError::Delivery(e)) => {
                tracing::error!("通知メールの送信に失敗: {}", e);
                ErrorResponse::delivery_failed(e.to_string())
            }
            ServiceError::Dispatch(DispatchError::Directory(e)) => {
                tracing::error!(
                    span_trace = %e.span_trace(),
                    "ユーザーディレクトリエラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use newusernotif_domain::notification::NotificationError;
    use newusernotif_infra::InfraError;

    use super::*;

    #[test]
    fn test_bad_requestは400() {
        let response = ServiceError::BadRequest("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_送信失敗は502() {
        let err: ServiceError =
            DispatchError::from(NotificationError::SendFailed("timeout".to_string())).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_ディレクトリ障害は500() {
        let err: ServiceError = DispatchError::from(InfraError::unexpected("down")).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
