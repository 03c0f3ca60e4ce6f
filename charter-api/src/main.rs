use std::sync::Arc;
use std::net::SocketAddr;
use anyhow::Context;
use charter_api::{app, worker, AppState};
use charter_core::{BookingRepository, Clock, InMemoryBookingRepository, SystemClock};
use charter_store::{app_config::Config, DbClient, PostgresBookingRepository};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "charter_api=debug,charter_core=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting charter booking service on port {}", config.server.port);

    // Store: Postgres when configured, in-memory otherwise
    let (store, db): (Arc<dyn BookingRepository>, Option<DbClient>) = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url, &config.database)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            let store: Arc<dyn BookingRepository> =
                Arc::new(PostgresBookingRepository::new(db.pool.clone()));
            (store, Some(db))
        }
        None => {
            tracing::warn!("No database.url configured, bookings are kept in memory");
            let store: Arc<dyn BookingRepository> = Arc::new(InMemoryBookingRepository::new());
            (store, None)
        }
    };

    if config.cron.configured_secret().is_none() {
        tracing::warn!("cron.secret is not set; the expiry endpoint will answer 500");
    }

    let pending_hold = config.business_rules.pending_hold().context("Invalid business rules")?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let app_state = AppState::new(store, clock, config.cron.clone(), pending_hold);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = tokio::spawn(worker::start_expiry_worker(
        app_state.sweep.clone(),
        config.business_rules.sweep_interval(),
        shutdown_rx,
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    sweeper.await?;
    if let Some(db) = db {
        db.close().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
