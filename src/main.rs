//! Wiring & DI. Entry point: bootstrap adapters, inject into the service, serve HTTP.
//! No business logic here.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use todo_api::adapters::http::{AppState, router};
use todo_api::adapters::notification::{HttpNotificationClient, MockNotificationClient};
use todo_api::adapters::persistence::SqliteTodoRepo;
use todo_api::ports::{NotificationPort, TodoRepoPort, TodoUseCase};
use todo_api::shared::config::AppConfig;
use todo_api::usecases::TodoService;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load()?;

    // --- Storage ---
    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let repo: Arc<dyn TodoRepoPort> = Arc::new(
        SqliteTodoRepo::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );

    // --- Notifications (best-effort; mock when no service is configured) ---
    let notifier: Arc<dyn NotificationPort> = match cfg.notification_api_url.as_deref() {
        Some(url) if cfg.is_notification_configured() => {
            info!(url, timeout = ?cfg.notification_timeout(), "notification service enabled");
            Arc::new(
                HttpNotificationClient::new(
                    url,
                    cfg.notification_api_key.clone().unwrap_or_default(),
                    cfg.notification_timeout(),
                )
                .map_err(|e| anyhow::anyhow!("{}", e))?,
            )
        }
        _ => {
            warn!("TODO_API_NOTIFICATION_API_URL not set, using mock notification client");
            Arc::new(MockNotificationClient::new())
        }
    };

    // --- Service ---
    let todos: Arc<dyn TodoUseCase> = Arc::new(TodoService::new(repo, notifier));
    let app = router(AppState { todos });

    // --- Serve ---
    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind {} failed: {}", addr, e))?;
    info!(addr = %addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
