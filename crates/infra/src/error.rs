//! # インフラ層エラー定義
//!
//! ユーザーディレクトリなど外部システムとの通信で発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別
//!
//! `From` 実装や convenience constructor でエラーを生成した時点のスパン情報が
//! 自動的にキャプチャされる。メール送信の失敗はドメインの `NotificationError` で表す。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// データベースエラー
    ///
    /// ユーザーディレクトリへの接続失敗、クエリ実行エラーなど。
    #[error("データベースエラー: {0}")]
    Database(#[source] sqlx::Error),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Unexpected(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Database(source),
            span_trace: SpanTrace::capture(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt as _;

    use super::*;

    /// テスト用に ErrorLayer 付き subscriber を設定する
    fn with_error_layer(f: impl FnOnce()) {
        let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
        let _guard = tracing::subscriber::set_default(subscriber);
        f();
    }

    #[test]
    fn test_from_sqlx_errorでユーザー検索のスパンが記録される() {
        with_error_layer(|| {
            let span = tracing::info_span!("find_by_name", user_name = "Alice");
            let _enter = span.enter();

            let err: InfraError = sqlx::Error::PoolTimedOut.into();

            assert!(matches!(err.kind(), InfraErrorKind::Database(_)));
            let trace_str = format!("{}", err.span_trace());
            assert!(
                trace_str.contains("find_by_name"),
                "SpanTrace がスパン名を含むこと: {trace_str}",
            );
        });
    }

    #[test]
    fn test_unexpectedのメッセージ() {
        let err = InfraError::unexpected("不正な行");
        assert_eq!(err.to_string(), "予期しないエラー: 不正な行");
    }

    #[test]
    fn test_sourceがdatabaseエラーに委譲する() {
        use std::error::Error as _;

        let err: InfraError = sqlx::Error::RowNotFound.into();
        assert!(err.source().is_some());

        let err = InfraError::unexpected("x");
        assert!(err.source().is_none());
    }
}
