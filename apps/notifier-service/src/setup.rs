//! # 依存コンポーネントの組み立て
//!
//! 設定から [`NewUserNotifier`] を組み立てる。
//! 送信バックエンドとユーザーディレクトリは呼び出し側で選んで渡す。

use std::sync::Arc;

use newusernotif_domain::{clock::Clock, notification::MailAddress};
use newusernotif_infra::{directory::UserDirectory, notification::NotificationSender};
use thiserror::Error;

use crate::{
    catalog::{BODY_KEY, MessageCatalog, SUBJECT_KEY},
    composer::{ExtendedParamsHook, MessageComposer},
    config::NewUserNotifConfig,
    content_language::LocaleContentLanguage,
    dispatcher::{DispatchTargets, NewUserNotifier},
    resolver::RecipientResolver,
};

/// 組み立てエラー
#[derive(Debug, Error)]
pub enum SetupError {
    /// 送信元アドレスが不正
    #[error("送信元アドレスが不正です: {0}")]
    InvalidSender(String),

    /// タイムゾーンのオフセットが範囲外
    #[error("タイムゾーンのオフセットが範囲外です: {0} 分")]
    InvalidTimezoneOffset(i32),
}

/// 設定からメッセージコンポーザーを組み立てる
///
/// 拡張パラメータが有効なら、件名・本文の両方に [`ExtendedParamsHook`] を登録する。
pub fn build_composer(
    config: &NewUserNotifConfig,
    clock: Arc<dyn Clock>,
) -> Result<MessageComposer, SetupError> {
    if !MessageCatalog::is_supported(&config.content_language) {
        tracing::warn!(
            content_language = %config.content_language,
            "組み込みテンプレートのない言語です。英語で送信します"
        );
    }

    let mut catalog = MessageCatalog::new(&config.content_language);
    if let Some(template) = &config.subject_template {
        catalog = catalog.with_template(SUBJECT_KEY, template);
    }
    if let Some(template) = &config.body_template {
        catalog = catalog.with_template(BODY_KEY, template);
    }

    let language = LocaleContentLanguage::with_offset_minutes(
        &config.content_language,
        config.timezone_offset_mins,
    )
    .ok_or(SetupError::InvalidTimezoneOffset(config.timezone_offset_mins))?;

    let composer = MessageComposer::new(
        &config.site_name,
        Arc::new(catalog),
        Arc::new(language),
        clock,
    );

    Ok(if config.extended_params {
        composer
            .with_subject_hook(Arc::new(ExtendedParamsHook))
            .with_body_hook(Arc::new(ExtendedParamsHook))
    } else {
        composer
    })
}

/// 設定から通知ディスパッチャーを組み立てる
pub fn build_notifier(
    config: &NewUserNotifConfig,
    clock: Arc<dyn Clock>,
    directory: Arc<dyn UserDirectory>,
    sender: Arc<dyn NotificationSender>,
) -> Result<NewUserNotifier, SetupError> {
    let from = MailAddress::parse(&config.sender)
        .map_err(|_| SetupError::InvalidSender(config.sender.clone()))?;

    Ok(NewUserNotifier::new(
        DispatchTargets {
            sender:        from,
            email_targets: config.email_targets.clone(),
            targets:       config.targets.clone(),
        },
        RecipientResolver::new(directory),
        build_composer(config, clock)?,
        sender,
    ))
}

#[cfg(test)]
mod tests {
    use newusernotif_domain::{
        clock::FixedClock,
        notification::NotificationEvent,
        user::{Account, Email, UserId, UserName},
    };
    use newusernotif_infra::{directory::InMemoryUserDirectory, mock::MockNotificationSender};
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_config() -> NewUserNotifConfig {
        NewUserNotifConfig {
            site_name:            "TestWiki".to_string(),
            sender:               "wiki@example.com".to_string(),
            email_targets:        vec!["ext@example.com".to_string()],
            targets:              vec![],
            extended_params:      false,
            content_language:     "en".to_string(),
            timezone_offset_mins: 0,
            subject_template:     None,
            body_template:        None,
        }
    }

    fn make_event() -> NotificationEvent {
        NotificationEvent::new(
            Account::new(
                UserId::new(10),
                UserName::new("Alice").unwrap(),
                Some(Email::new("alice@example.com").unwrap()),
                false,
            ),
            false,
        )
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::from_timestamp(1_700_000_000))
    }

    #[test]
    fn test_拡張パラメータが無効なら既定の6パラメータで本文を作る() {
        let config = NewUserNotifConfig {
            body_template: Some("$2|$7|$10".to_string()),
            ..make_config()
        };

        let composer = build_composer(&config, clock()).unwrap();
        let message = composer.compose("ext@example.com", &make_event());

        assert_eq!(message.body, "Alice|$7|$10");
    }

    #[test]
    fn test_拡張パラメータが有効ならフックが登録される() {
        let config = NewUserNotifConfig {
            extended_params: true,
            subject_template: Some("$1: $2".to_string()),
            body_template: Some("$2|$7|$10".to_string()),
            ..make_config()
        };

        let composer = build_composer(&config, clock()).unwrap();
        let message = composer.compose("ext@example.com", &make_event());

        assert_eq!(message.subject, "TestWiki: Alice");
        assert_eq!(message.body, "Alice|alice@example.com|Alice");
    }

    #[test]
    fn test_範囲外のタイムゾーンはエラー() {
        let config = NewUserNotifConfig {
            timezone_offset_mins: 24 * 60,
            ..make_config()
        };

        assert!(matches!(
            build_composer(&config, clock()),
            Err(SetupError::InvalidTimezoneOffset(1440))
        ));
    }

    #[test]
    fn test_不正な送信元アドレスはエラー() {
        let config = NewUserNotifConfig {
            sender: "wiki".to_string(),
            ..make_config()
        };

        let result = build_notifier(
            &config,
            clock(),
            Arc::new(InMemoryUserDirectory::default()),
            Arc::new(MockNotificationSender::new()),
        );

        assert!(matches!(result, Err(SetupError::InvalidSender(_))));
    }

    #[tokio::test]
    async fn test_組み立てたディスパッチャーで外部受信者に送信できる() {
        let sender = MockNotificationSender::new();
        let notifier = build_notifier(
            &make_config(),
            clock(),
            Arc::new(InMemoryUserDirectory::default()),
            Arc::new(sender.clone()),
        )
        .unwrap();

        let summary = notifier.execute(&make_event()).await.unwrap();

        assert_eq!(summary.external_sent, 1);
        assert_eq!(sender.sent_emails()[0].from.to_string(), "wiki@example.com");
    }
}
