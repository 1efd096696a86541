//! # 新規ユーザー通知ディスパッチャー
//!
//! アカウント作成イベント 1 件につき 1 回の配送パスを実行する。
//!
//! ## 配送順序
//!
//! 1. 外部受信者（生のメールアドレス）を設定順に
//! 2. 内部受信者（アカウント）を設定順に
//!
//! 送信は 1 通ずつ完了を待ってから次に進む。並列化はしない。
//!
//! ## 失敗時の挙動
//!
//! - 受信者が見つからない、アドレスが未確認: 黙ってスキップ
//! - 送信失敗: その時点で呼び出し元へ返す（再送・集約はしない）

use std::sync::Arc;

use newusernotif_domain::notification::{
    EmailMessage,
    MailAddress,
    NotificationError,
    NotificationEvent,
    RecipientKind,
    RecipientSpec,
};
use newusernotif_infra::{InfraError, notification::NotificationSender};
use newusernotif_shared::{event_log::event, log_business_event};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{composer::MessageComposer, resolver::RecipientResolver};

/// 配送パスのエラー
#[derive(Debug, Error)]
pub enum DispatchError {
    /// メール送信の失敗
    #[error("通知メールの送信に失敗しました: {0}")]
    Delivery(#[from] NotificationError),

    /// ユーザーディレクトリの障害
    #[error("ユーザーディレクトリの参照に失敗しました: {0}")]
    Directory(#[from] InfraError),
}

/// 配送パスの結果
///
/// ログ出力と HTTP レスポンスにのみ使う。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// 外部受信者への送信数
    pub external_sent: usize,
    /// 内部受信者への送信数
    pub internal_sent: usize,
    /// スキップした内部受信者数
    pub skipped:       usize,
}

/// 配送先の設定
#[derive(Debug, Clone)]
pub struct DispatchTargets {
    /// 送信元
    pub sender:        MailAddress,
    /// 外部受信者
    pub email_targets: Vec<String>,
    /// 内部受信者
    pub targets:       Vec<RecipientSpec>,
}

/// 新規ユーザー通知
///
/// 構築後は変更しない。HTTP 層からは `Arc` で共有する。
pub struct NewUserNotifier {
    targets:  DispatchTargets,
    resolver: RecipientResolver,
    composer: MessageComposer,
    sender:   Arc<dyn NotificationSender>,
}

impl NewUserNotifier {
    pub fn new(
        targets: DispatchTargets,
        resolver: RecipientResolver,
        composer: MessageComposer,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            targets,
            resolver,
            composer,
            sender,
        }
    }

    /// 全受信者へ通知を送る
    ///
    /// 外部受信者、内部受信者の順に送信し、最初の送信失敗を返す。
    #[tracing::instrument(
        skip_all,
        fields(user_id = %event.user().id(), autocreated = event.is_autocreated())
    )]
    pub async fn execute(&self, event: &NotificationEvent) -> Result<DispatchSummary, DispatchError> {
        let mut summary = DispatchSummary::default();

        self.send_external_mails(event, &mut summary).await?;
        self.send_internal_mails(event, &mut summary).await?;

        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::DISPATCH_COMPLETED,
            event.result = event::result::SUCCESS,
            notification.external_sent = summary.external_sent,
            notification.internal_sent = summary.internal_sent,
            notification.skipped = summary.skipped,
            "新規ユーザー通知の配送完了"
        );

        Ok(summary)
    }

    /// 外部受信者へ送信する
    ///
    /// 受信者の識別子には生のアドレスを使う。
    async fn send_external_mails(
        &self,
        event: &NotificationEvent,
        summary: &mut DispatchSummary,
    ) -> Result<(), DispatchError> {
        for target in &self.targets.email_targets {
            let to = match MailAddress::parse(target) {
                Ok(to) => to,
                Err(e) => {
                    let e = NotificationError::from(e);
                    Self::log_failure(RecipientKind::External, target, &e);
                    return Err(e.into());
                }
            };

            self.deliver(RecipientKind::External, target, to, event).await?;
            summary.external_sent += 1;
        }
        Ok(())
    }

    /// 内部受信者へ送信する
    ///
    /// 解決できない、または確認済みアドレスを持たない受信者はスキップする。
    /// 受信者の識別子にはアカウントのユーザー名を使う。
    async fn send_internal_mails(
        &self,
        event: &NotificationEvent,
        summary: &mut DispatchSummary,
    ) -> Result<(), DispatchError> {
        for spec in &self.targets.targets {
            let account = self.resolver.resolve(spec).await.inspect_err(|e| {
                tracing::error!(
                    error.category = newusernotif_shared::event_log::error::category::INFRASTRUCTURE,
                    error.kind = newusernotif_shared::event_log::error::kind::USER_LOOKUP,
                    recipient = %spec,
                    "受信者の解決に失敗: {e}"
                );
            })?;

            let Some((account, to)) =
                account.and_then(|a| a.mail_address().map(|to| (a, to)))
            else {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::RECIPIENT_SKIPPED,
                    event.result = event::result::SKIPPED,
                    notification.recipient_kind = %RecipientKind::Internal,
                    notification.recipient = %spec,
                    "解決できない、またはアドレス未確認の受信者をスキップ"
                );
                summary.skipped += 1;
                continue;
            };

            self.deliver(RecipientKind::Internal, account.name().as_str(), to, event)
                .await?;
            summary.internal_sent += 1;
        }
        Ok(())
    }

    /// 1 人の受信者へ組み立て・送信する
    async fn deliver(
        &self,
        kind: RecipientKind,
        recipient: &str,
        to: MailAddress,
        event: &NotificationEvent,
    ) -> Result<(), NotificationError> {
        let composed = self.composer.compose(recipient, event);
        let email = EmailMessage {
            to,
            from: self.targets.sender.clone(),
            subject: composed.subject,
            body: composed.body,
        };

        match self.sender.send_email(&email).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.result = event::result::SUCCESS,
                    notification.recipient_kind = %kind,
                    notification.recipient = %recipient,
                    "通知メール送信成功"
                );
                Ok(())
            }
            Err(e) => {
                Self::log_failure(kind, recipient, &e);
                Err(e)
            }
        }
    }

    fn log_failure(kind: RecipientKind, recipient: &str, error: &NotificationError) {
        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::NOTIFICATION_FAILED,
            event.result = event::result::FAILURE,
            notification.recipient_kind = %kind,
            notification.recipient = %recipient,
            error.category = newusernotif_shared::event_log::error::category::EXTERNAL_SERVICE,
            error.kind = newusernotif_shared::event_log::error::kind::MAIL_DELIVERY,
            error = %error,
            "通知メール送信失敗"
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use newusernotif_domain::{
        clock::FixedClock,
        user::{Account, Email, UserId, UserName},
    };
    use newusernotif_infra::{
        directory::InMemoryUserDirectory,
        mock::{FailingUserDirectory, MockNotificationSender},
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        catalog::MessageCatalog,
        composer::{ComposeContext, SubjectHook},
        content_language::LocaleContentLanguage,
    };

    const SITE_NAME: &str = "TestWiki";

    fn make_directory() -> InMemoryUserDirectory {
        InMemoryUserDirectory::default()
            .with_account(Account::new(
                UserId::new(1),
                UserName::new("Admin").unwrap(),
                Some(Email::new("admin@example.com").unwrap()),
                true,
            ))
            .with_account(Account::new(
                UserId::new(2),
                UserName::new("Moderator").unwrap(),
                Some(Email::new("mod@example.com").unwrap()),
                true,
            ))
            .with_account(Account::new(
                UserId::new(3),
                UserName::new("Unconfirmed").unwrap(),
                Some(Email::new("unconfirmed@example.com").unwrap()),
                false,
            ))
    }

    fn make_composer() -> MessageComposer {
        MessageComposer::new(
            SITE_NAME,
            Arc::new(MessageCatalog::new("en")),
            Arc::new(LocaleContentLanguage::new(
                "en",
                FixedOffset::east_opt(0).unwrap(),
            )),
            Arc::new(FixedClock::from_timestamp(1_700_000_000)),
        )
    }

    fn make_notifier(
        email_targets: &[&str],
        targets: Vec<RecipientSpec>,
        directory: Arc<dyn newusernotif_infra::directory::UserDirectory>,
        composer: MessageComposer,
        sender: MockNotificationSender,
    ) -> NewUserNotifier {
        NewUserNotifier::new(
            DispatchTargets {
                sender: MailAddress::parse("wiki@example.com").unwrap(),
                email_targets: email_targets.iter().map(|t| (*t).to_string()).collect(),
                targets,
            },
            RecipientResolver::new(directory),
            composer,
            Arc::new(sender),
        )
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

    #[tokio::test]
    async fn test_受信者がいなければ送信しない() {
        let sender = MockNotificationSender::new();
        let sut = make_notifier(
            &[],
            vec![],
            Arc::new(make_directory()),
            make_composer(),
            sender.clone(),
        );

        let summary = sut.execute(&make_event()).await.unwrap();

        assert_eq!(summary, DispatchSummary::default());
        assert!(sender.attempted_emails().is_empty());
    }

    #[tokio::test]
    async fn test_外部受信者1件に1通送信する() {
        let sender = MockNotificationSender::new();
        let sut = make_notifier(
            &["ext@example.com"],
            vec![],
            Arc::new(make_directory()),
            make_composer(),
            sender.clone(),
        );

        let summary = sut.execute(&make_event()).await.unwrap();

        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.to_string(), "ext@example.com");
        assert_eq!(sent[0].from.to_string(), "wiki@example.com");
        assert!(sent[0].subject.contains(SITE_NAME));
        assert!(sent[0].body.contains("Alice"));
        assert!(sent[0].body.starts_with("Hello ext@example.com,"));
        assert_eq!(summary.external_sent, 1);
    }

    #[tokio::test]
    async fn test_外部受信者を内部受信者より先に送信する() {
        let sender = MockNotificationSender::new();
        let sut = make_notifier(
            &["ext1@example.com", "ext2@example.com"],
            vec![
                RecipientSpec::Name("Moderator".to_string()),
                RecipientSpec::Id(UserId::new(1)),
            ],
            Arc::new(make_directory()),
            make_composer(),
            sender.clone(),
        );

        let summary = sut.execute(&make_event()).await.unwrap();

        let recipients: Vec<String> = sender
            .sent_emails()
            .iter()
            .map(|e| e.to.address().to_string())
            .collect();
        assert_eq!(
            recipients,
            vec![
                "ext1@example.com",
                "ext2@example.com",
                "mod@example.com",
                "admin@example.com",
            ]
        );
        assert_eq!(
            summary,
            DispatchSummary {
                external_sent: 2,
                internal_sent: 2,
                skipped:       0,
            }
        );
    }

    #[tokio::test]
    async fn test_内部受信者にはアカウント名を宛名にして送信する() {
        let sender = MockNotificationSender::new();
        let sut = make_notifier(
            &[],
            vec![RecipientSpec::Id(UserId::new(1))],
            Arc::new(make_directory()),
            make_composer(),
            sender.clone(),
        );

        sut.execute(&make_event()).await.unwrap();

        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.to_string(), "Admin <admin@example.com>");
        assert!(sent[0].body.starts_with("Hello Admin,"));
    }

    #[tokio::test]
    async fn test_未確認または存在しない受信者はスキップする() {
        let sender = MockNotificationSender::new();
        let sut = make_notifier(
            &[],
            vec![
                RecipientSpec::Name("Unconfirmed".to_string()),
                RecipientSpec::Id(UserId::new(404)),
                RecipientSpec::Name("Nobody".to_string()),
                RecipientSpec::Name("Admin".to_string()),
            ],
            Arc::new(make_directory()),
            make_composer(),
            sender.clone(),
        );

        let summary = sut.execute(&make_event()).await.unwrap();

        let sent = sender.attempted_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.address().as_str(), "admin@example.com");
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.internal_sent, 1);
    }

    #[tokio::test]
    async fn test_送信失敗で配送を打ち切りエラーを返す() {
        let sender = MockNotificationSender::failing_for("ext2@example.com");
        let sut = make_notifier(
            &["ext1@example.com", "ext2@example.com", "ext3@example.com"],
            vec![RecipientSpec::Name("Admin".to_string())],
            Arc::new(make_directory()),
            make_composer(),
            sender.clone(),
        );

        let result = sut.execute(&make_event()).await;

        assert!(matches!(
            result,
            Err(DispatchError::Delivery(NotificationError::SendFailed(_)))
        ));
        let attempted: Vec<String> = sender
            .attempted_emails()
            .iter()
            .map(|e| e.to.address().to_string())
            .collect();
        assert_eq!(attempted, vec!["ext1@example.com", "ext2@example.com"]);
    }

    #[tokio::test]
    async fn test_不正な外部アドレスは送信失敗として返す() {
        let sender = MockNotificationSender::new();
        let sut = make_notifier(
            &["not-an-address"],
            vec![],
            Arc::new(make_directory()),
            make_composer(),
            sender.clone(),
        );

        let result = sut.execute(&make_event()).await;

        assert!(matches!(
            result,
            Err(DispatchError::Delivery(NotificationError::InvalidAddress(_)))
        ));
        assert!(sender.attempted_emails().is_empty());
    }

    #[tokio::test]
    async fn test_ディレクトリ障害は外部受信者の送信後に返す() {
        let sender = MockNotificationSender::new();
        let sut = make_notifier(
            &["ext@example.com"],
            vec![RecipientSpec::Name("Admin".to_string())],
            Arc::new(FailingUserDirectory),
            make_composer(),
            sender.clone(),
        );

        let result = sut.execute(&make_event()).await;

        assert!(matches!(result, Err(DispatchError::Directory(_))));
        assert_eq!(sender.sent_emails().len(), 1);
    }

    #[tokio::test]
    async fn test_件名フックの結果がすべての受信者に使われる() {
        struct PrefixHook;

        impl SubjectHook for PrefixHook {
            fn on_subject(&self, ctx: &ComposeContext<'_>, subject: &mut String) {
                *subject = format!("[{}] {} joined", ctx.site_name, ctx.user().name());
            }
        }

        let sender = MockNotificationSender::new();
        let sut = make_notifier(
            &["ext@example.com"],
            vec![RecipientSpec::Name("Admin".to_string())],
            Arc::new(make_directory()),
            make_composer().with_subject_hook(Arc::new(PrefixHook)),
            sender.clone(),
        );

        sut.execute(&make_event()).await.unwrap();

        let subjects: Vec<String> = sender
            .sent_emails()
            .into_iter()
            .map(|e| e.subject)
            .collect();
        assert_eq!(subjects, vec!["[TestWiki] Alice joined"; 2]);
    }

    #[tokio::test]
    async fn test_自動作成されたアカウントも通知する() {
        let sender = MockNotificationSender::new();
        let sut = make_notifier(
            &["ext@example.com"],
            vec![],
            Arc::new(make_directory()),
            make_composer(),
            sender.clone(),
        );
        let event = NotificationEvent::new(make_event().user().clone(), true);

        sut.execute(&event).await.unwrap();

        assert_eq!(sender.sent_emails().len(), 1);
    }
}
