//! Branch back-office API server.
//!
//! Main entry point for the HTTP service.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use backoffice_api::{AppState, ChannelNotifier, create_router};
use backoffice_db::{ChartCache, connect_with};
use backoffice_shared::{AppConfig, EmailService, JwtConfig, JwtService, SmsClient};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "backoffice=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Human output on a terminal, JSON lines everywhere else.
    if std::io::stdout().is_terminal() {
        registry.with(fmt::layer()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)
            .unwrap_or(i64::MAX),
    });

    let email = EmailService::new(config.email.clone());
    let sms = SmsClient::new(config.sms.clone());
    info!(
        email_enabled = email.is_enabled(),
        sms_enabled = sms.is_enabled(),
        "Notification channels configured"
    );

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        notifier: ChannelNotifier::new(Arc::new(email), Arc::new(sms)),
        chart: ChartCache::new(),
    };

    let app = create_router(state).layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
