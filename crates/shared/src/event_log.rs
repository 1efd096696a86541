//! # ビジネスイベントログ
//!
//! 通知の送信結果を `jq` で追跡できるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! [`log_business_event!`] で出力したログには `event.kind = "business_event"` が付き、
//! `jq 'select(.["event.kind"] == "business_event")'` で抽出できる。
//!
//! フィールド名はドット記法（`event.category`、`notification.recipient_kind`）を使う。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: [`event::category`] の定数
/// - `event.action`: [`event::action`] の定数
/// - `event.result`: [`event::result`] の定数
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
        pub const RECIPIENT_SKIPPED: &str = "notification.recipient_skipped";
        pub const DISPATCH_COMPLETED: &str = "notification.dispatch_completed";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
        pub const SKIPPED: &str = "skipped";
    }
}

/// エラーコンテキストフィールドの定数
///
/// `tracing::error!` に `error.category` と `error.kind` を直接付ける。
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// インフラストラクチャ（ユーザーディレクトリ）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 外部サービス呼び出し（SMTP、SES）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const USER_LOOKUP: &str = "user_lookup";
        pub const MAIL_DELIVERY: &str = "mail_delivery";
    }
}
