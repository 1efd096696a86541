//! # Notifier Service サーバー
//!
//! ホストプラットフォームでアカウントが作成されたときに、
//! 設定された受信者へ通知メールを送る内部サービス。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `NOTIFIER_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `NOTIFIER_PORT` | No | ポート番号（デフォルト: `3100`） |
//! | `NEWUSERNOTIF_SITE_NAME` | **Yes** | テンプレートに埋め込むサイト名 |
//! | `NEWUSERNOTIF_SENDER` | **Yes** | 送信元アドレス（未設定なら `PASSWORD_SENDER`） |
//! | `NEWUSERNOTIF_EMAIL_TARGETS` | No | 外部受信者（カンマ区切り） |
//! | `NEWUSERNOTIF_TARGETS` | No | 内部受信者の ID またはユーザー名（カンマ区切り） |
//! | `NEWUSERNOTIF_EXTENDED_PARAMS` | No | 拡張パラメータフックを登録する |
//! | `CONTENT_LANGUAGE` | No | コンテンツ言語（デフォルト: `en`） |
//! | `CONTENT_TIMEZONE_OFFSET_MINUTES` | No | タイムゾーン（デフォルト: `0`） |
//! | `NOTIFICATION_BACKEND` | No | `smtp` / `ses` / `noop`（デフォルト: `noop`） |
//! | `DATABASE_URL` | No | ユーザーディレクトリ（未設定なら内部受信者は常にスキップ） |
//!
//! ## 起動方法
//!
//! ```bash
//! NEWUSERNOTIF_SITE_NAME=MyWiki NEWUSERNOTIF_SENDER=wiki@example.com \
//!     cargo run -p newusernotif-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use newusernotif_domain::clock::SystemClock;
use newusernotif_infra::{
    db,
    directory::{InMemoryUserDirectory, PostgresUserDirectory, UserDirectory},
    notification::{
        NoopNotificationSender,
        NotificationSender,
        SesNotificationSender,
        SmtpCredentials,
        SmtpNotificationSender,
    },
};
use newusernotif_service::{
    config::{NotificationConfig, NotifierConfig},
    handler,
    setup,
};
use newusernotif_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Notifier Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(&TracingConfig::from_env("notifier-service"));

    let config = NotifierConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "Notifier Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let sender = create_sender(&config.notification).await?;
    let directory = create_directory(config.database_url.as_deref()).await?;

    let notifier = setup::build_notifier(
        &config.newusernotif,
        Arc::new(SystemClock),
        directory,
        sender,
    )
    .context("通知ディスパッチャーの組み立てに失敗しました")?;

    tracing::info!(
        external_targets = config.newusernotif.email_targets.len(),
        internal_targets = config.newusernotif.targets.len(),
        extended_params = config.newusernotif.extended_params,
        "受信者設定を読み込みました"
    );

    let app = handler::router(Arc::new(notifier)).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Notifier Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// `NOTIFICATION_BACKEND` に応じた送信実装を作成する
async fn create_sender(
    config: &NotificationConfig,
) -> anyhow::Result<Arc<dyn NotificationSender>> {
    let sender: Arc<dyn NotificationSender> = match config.backend.as_str() {
        "smtp" => {
            let credentials = match (&config.smtp_username, &config.smtp_password) {
                (Some(username), Some(password)) => Some(SmtpCredentials {
                    username: username.clone(),
                    password: password.clone(),
                }),
                _ => None,
            };
            tracing::info!(
                host = %config.smtp_host,
                port = config.smtp_port,
                authenticated = credentials.is_some(),
                "SMTP で通知を送信します"
            );
            Arc::new(SmtpNotificationSender::new(
                &config.smtp_host,
                config.smtp_port,
                credentials,
            )?)
        }
        "ses" => {
            tracing::info!("Amazon SES で通知を送信します");
            Arc::new(SesNotificationSender::from_env().await)
        }
        "noop" => {
            tracing::info!("通知は送信せずログにのみ出力します");
            Arc::new(NoopNotificationSender)
        }
        other => anyhow::bail!("NOTIFICATION_BACKEND の値が不正です: {other}"),
    };
    Ok(sender)
}

/// ユーザーディレクトリを作成する
///
/// `DATABASE_URL` が未設定なら空のインメモリディレクトリを使う。
async fn create_directory(database_url: Option<&str>) -> anyhow::Result<Arc<dyn UserDirectory>> {
    match database_url {
        Some(url) => {
            let pool = db::create_pool(url)
                .await
                .context("データベース接続に失敗しました")?;
            tracing::info!("データベースに接続しました");
            Ok(Arc::new(PostgresUserDirectory::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL が未設定のため、内部受信者はすべてスキップされます");
            Ok(Arc::new(InMemoryUserDirectory::default()))
        }
    }
}
