use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::info;

use crate::api::{self, ApiState};
use crate::config::AppConfig;
use crate::notifier::{ConfigPermissions, DesktopPresenter, NotificationDispatcher};
use crate::scheduler::{CheckScheduler, SchedulerTelemetry};
use crate::store::JsonFileStore;
use crate::traits::{DataStore, PermissionProvider};

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    // 1. Data store
    let store: Arc<dyn DataStore> =
        Arc::new(JsonFileStore::open(&config.store.data_path).await?);
    info!("Data store ready ({})", config.store.data_path);

    // 2. Notification plumbing
    let permissions: Arc<dyn PermissionProvider> =
        Arc::new(ConfigPermissions::new(config.notifications.enabled));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        permissions.clone(),
        Arc::new(DesktopPresenter),
    ));

    // 3. Check scheduler
    let telemetry = Arc::new(SchedulerTelemetry::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let data = store.load_all().await?;
    let scheduler_task = if config.notifications.enabled
        && !data.settings.notification_times.is_empty()
    {
        let scheduler = Arc::new(CheckScheduler::new(
            store.clone(),
            dispatcher.clone(),
            Duration::from_secs(config.notifications.tick_interval_secs),
            config.notifications.suppression_window_mins,
            telemetry.clone(),
        ));
        Some(scheduler.start(shutdown_rx))
    } else {
        info!("Check scheduler idle (notifications disabled or no times configured)");
        None
    };

    // 4. HTTP API
    let state = ApiState {
        store,
        dispatcher,
        permissions,
        telemetry,
        started_at: Utc::now(),
    };
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API listening on http://{}", addr);
    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    // 5. Stop the scheduler
    let _ = shutdown_tx.send(true);
    if let Some(task) = scheduler_task {
        let _ = task.await;
    }
    info!("Shutdown complete");
    Ok(())
}
