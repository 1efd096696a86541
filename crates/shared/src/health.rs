//! # ヘルスチェック共通型

use serde::{Deserialize, Serialize};

/// ヘルスチェックレスポンス
///
/// `status` は稼働状態、`version` は Cargo.toml のバージョン。
///
/// ```
/// use newusernotif_shared::HealthResponse;
///
/// let response = HealthResponse::healthy("0.1.0");
/// assert_eq!(response.status, "healthy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status:  String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>) -> Self {
        Self {
            status:  "healthy".to_string(),
            version: version.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_responseのjson形状() {
        let json = serde_json::to_value(HealthResponse::healthy("0.1.0")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "status": "healthy", "version": "0.1.0" })
        );
    }
}
