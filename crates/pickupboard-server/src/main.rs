mod api;
mod cache;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    cache::{MemorySnapshotStore, PgSnapshotStore, SnapshotCoordinator, SnapshotStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pickupboard_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store: Arc<dyn SnapshotStore> = if config.database_url.is_some() {
        let pool = pickupboard_db::connect_pool_from_config(&config).await?;
        let applied = pickupboard_db::run_migrations(&pool).await?;
        tracing::info!(applied, "database migrations applied");
        Arc::new(PgSnapshotStore::new(pool))
    } else {
        tracing::warn!("DATABASE_URL not set; durable snapshots are kept in memory only");
        Arc::new(MemorySnapshotStore::default())
    };

    let builder = Arc::new(pickupboard_scraper::UpstreamSnapshotBuilder::new(
        config.upstream.clone(),
    )?);
    let coordinator = SnapshotCoordinator::new(builder, store, config.snapshot_ttl_secs);

    let _scheduler = scheduler::build_scheduler(coordinator.clone(), &config.refresh_cron).await?;

    let app = build_app(AppState { coordinator });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "pickupboard server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
