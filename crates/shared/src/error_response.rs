//! # エラーレスポンス（RFC 9457 Problem Details）
//!
//! axum の `IntoResponse` 変換は各サービスの責務とし、ここでは純粋なデータ構造のみ提供する。

use serde::{Deserialize, Serialize};

/// error_type URI のベースパス
const ERROR_TYPE_BASE: &str = "https://newusernotif.example.com/errors";

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

impl ErrorResponse {
    /// 汎用コンストラクタ
    ///
    /// `error_type_suffix` はベース URI に付加される（例: `"delivery-failed"`）。
    pub fn new(
        error_type_suffix: &str,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            error_type: format!("{ERROR_TYPE_BASE}/{error_type_suffix}"),
            title: title.into(),
            status,
            detail: detail.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new("bad-request", "Bad Request", 400, detail)
    }

    /// 502 Bad Gateway（メール送信基盤の失敗）
    pub fn delivery_failed(detail: impl Into<String>) -> Self {
        Self::new("delivery-failed", "Delivery Failed", 502, detail)
    }

    /// 500 Internal Server Error
    ///
    /// 内部の詳細はログにのみ出力し、レスポンスには固定文言を返す。
    pub fn internal_error() -> Self {
        Self::new(
            "internal-error",
            "Internal Server Error",
            500,
            "内部エラーが発生しました",
        )
    }
}
