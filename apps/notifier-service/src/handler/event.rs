//! # アカウント作成イベントハンドラ
//!
//! ホストプラットフォームからアカウント作成の通知を受け取り、配送パスを 1 回実行する。
//!
//! ## エンドポイント
//!
//! - `POST /internal/events/user-created`
//!
//! ## リクエスト例
//!
//! ```json
//! {
//!   "user": { "id": 42, "name": "Alice", "email": "alice@example.com", "email_confirmed": false },
//!   "autocreated": false,
//!   "client_ip": "203.0.113.5"
//! }
//! ```

use std::{net::IpAddr, sync::Arc};

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use newusernotif_domain::{
    notification::NotificationEvent,
    user::{Account, Email, UserId, UserName},
};
use newusernotif_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::{
    dispatcher::{DispatchSummary, NewUserNotifier},
    error::ServiceError,
};

/// 作成されたアカウント
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedUserDto {
    pub id:              u64,
    pub name:            String,
    #[serde(default)]
    pub email:           Option<String>,
    #[serde(default)]
    pub email_confirmed: bool,
}

/// アカウント作成イベント
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedRequest {
    pub user:        CreatedUserDto,
    #[serde(default)]
    pub autocreated: bool,
    #[serde(default)]
    pub client_ip:   Option<IpAddr>,
}

impl TryFrom<UserCreatedRequest> for NotificationEvent {
    type Error = ServiceError;

    fn try_from(req: UserCreatedRequest) -> Result<Self, Self::Error> {
        let name =
            UserName::new(&req.user.name).map_err(|e| ServiceError::BadRequest(e.to_string()))?;
        let email = req
            .user
            .email
            .filter(|e| !e.trim().is_empty())
            .map(Email::new)
            .transpose()
            .map_err(|e| ServiceError::BadRequest(e.to_string()))?;

        let account = Account::new(
            UserId::new(req.user.id),
            name,
            email,
            req.user.email_confirmed,
        );
        let event = NotificationEvent::new(account, req.autocreated);

        Ok(match req.client_ip {
            Some(ip) => event.with_client_ip(ip),
            None => event,
        })
    }
}

/// POST /internal/events/user-created
///
/// 配送パスの結果を `{ "data": DispatchSummary }` で返す。
#[tracing::instrument(skip_all)]
pub async fn user_created(
    State(notifier): State<Arc<NewUserNotifier>>,
    payload: Result<Json<UserCreatedRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<DispatchSummary>>, ServiceError> {
    let Json(req) = payload.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let event = NotificationEvent::try_from(req)?;

    let summary = notifier.execute(&event).await?;

    Ok(Json(ApiResponse::new(summary)))
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use chrono::FixedOffset;
    use newusernotif_domain::{clock::FixedClock, notification::MailAddress};
    use newusernotif_infra::{directory::InMemoryUserDirectory, mock::MockNotificationSender};
    use newusernotif_shared::{ErrorResponse, HealthResponse};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        catalog::MessageCatalog,
        composer::MessageComposer,
        content_language::LocaleContentLanguage,
        dispatcher::DispatchTargets,
        handler::router,
        resolver::RecipientResolver,
    };

    fn create_test_app(sender: MockNotificationSender) -> Router {
        let directory = InMemoryUserDirectory::default().with_account(Account::new(
            UserId::new(1),
            UserName::new("Admin").unwrap(),
            Some(Email::new("admin@example.com").unwrap()),
            true,
        ));
        let composer = MessageComposer::new(
            "TestWiki",
            Arc::new(MessageCatalog::new("en")),
            Arc::new(LocaleContentLanguage::new(
                "en",
                FixedOffset::east_opt(0).unwrap(),
            )),
            Arc::new(FixedClock::from_timestamp(1_700_000_000)),
        );
        let notifier = NewUserNotifier::new(
            DispatchTargets {
                sender:        MailAddress::parse("wiki@example.com").unwrap(),
                email_targets: vec!["ext@example.com".to_string()],
                targets:       vec!["Admin".parse().unwrap(), "404".parse().unwrap()],
            },
            RecipientResolver::new(Arc::new(directory)),
            composer,
            Arc::new(sender),
        );
        router(Arc::new(notifier))
    }

    fn post_event(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/internal/events/user-created")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_body<T: serde::de::DeserializeOwned>(
        response: axum::response::Response,
    ) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_イベントを受けると配送結果を返す() {
        // Given
        let sender = MockNotificationSender::new();
        let sut = create_test_app(sender.clone());

        // When
        let response = sut
            .oneshot(post_event(serde_json::json!({
                "user": { "id": 42, "name": "alice", "email": "alice@example.com" },
                "autocreated": false,
                "client_ip": "203.0.113.5"
            })))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
        let body: ApiResponse<DispatchSummary> = response_body(response).await;
        assert_eq!(
            body.data,
            DispatchSummary {
                external_sent: 1,
                internal_sent: 1,
                skipped:       1,
            }
        );
        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].body.contains("Alice"));
    }

    #[tokio::test]
    async fn test_post_不正なユーザー名は400() {
        let sut = create_test_app(MockNotificationSender::new());

        let response = sut
            .oneshot(post_event(serde_json::json!({
                "user": { "id": 42, "name": "[[bad]]" }
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response_body(response).await;
        assert_eq!(body.status, 400);
    }

    #[tokio::test]
    async fn test_post_jsonとして不正なボディは400() {
        let sut = create_test_app(MockNotificationSender::new());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/internal/events/user-created")
            .header("content-type", "application/json")
            .body(Body::from("{\"user\":"))
            .unwrap();

        let response = sut.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_必須フィールドがなければ400() {
        let sut = create_test_app(MockNotificationSender::new());

        let response = sut
            .oneshot(post_event(serde_json::json!({ "autocreated": true })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_送信失敗は502() {
        let sut = create_test_app(MockNotificationSender::failing_for("ext@example.com"));

        let response = sut
            .oneshot(post_event(serde_json::json!({
                "user": { "id": 42, "name": "Alice" }
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: ErrorResponse = response_body(response).await;
        assert!(body.error_type.ends_with("/delivery-failed"));
    }

    #[tokio::test]
    async fn test_get_ヘルスチェック() {
        let sut = create_test_app(MockNotificationSender::new());
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = sut.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: HealthResponse = response_body(response).await;
        assert_eq!(body.status, "healthy");
    }

    #[test]
    fn test_空のメールアドレスは未登録として扱う() {
        let req: UserCreatedRequest = serde_json::from_value(serde_json::json!({
            "user": { "id": 5, "name": "Bob", "email": "", "email_confirmed": true }
        }))
        .unwrap();

        let event = NotificationEvent::try_from(req).unwrap();

        assert!(event.user().email().is_none());
        assert!(!event.user().is_email_confirmed());
        assert!(event.client_ip().is_none());
    }
}
