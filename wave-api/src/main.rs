use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wave_api::{app, state::AppState, worker};
use wave_booking::InMemoryLedger;
use wave_catalog::{seed_demo, AvailabilityStore, EventCatalog};
use wave_core::BookingLedger;
use wave_store::{app_config::Config, DbClient, PgBookingLedger, PgEventRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wave_api=debug,wave_booking=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting EventWave API on port {}", config.server.port);

    let hold_ttl = config.business_rules.seat_hold_ttl().context("Invalid business rules")?;
    let mut catalog = EventCatalog::new(Arc::new(AvailabilityStore::new())).with_max_seats(config.catalog.max_seats);

    // Booking ledger and published events: Postgres when configured
    let ledger: Arc<dyn BookingLedger> = match DbClient::from_config(&config.database)
        .await
        .context("Failed to connect to Postgres")?
    {
        Some(db) => {
            db.migrate().await.context("Failed to run migrations")?;
            catalog = catalog.with_repository(Arc::new(PgEventRepository::new(db.pool.clone())));
            Arc::new(PgBookingLedger::new(db.pool.clone()))
        }
        None => {
            tracing::warn!("No database.url configured, events and bookings are kept in memory");
            Arc::new(InMemoryLedger::new())
        }
    };

    let catalog = Arc::new(catalog);
    if config.catalog.seed_demo {
        let seeded = seed_demo(&catalog).context("Failed to seed demo events")?;
        tracing::info!("Seeded {} demo events", seeded);
    }
    catalog.restore().await.context("Failed to restore events")?;

    let app_state = AppState::new(catalog, ledger, hold_ttl);
    // Seats and slot capacity taken by bookings made before this start
    app_state
        .coordinator
        .restore()
        .await
        .context("Failed to restore bookings")?;

    tokio::spawn(worker::start_hold_sweeper(
        app_state.clone(),
        std::time::Duration::from_secs(config.business_rules.hold_sweep_seconds),
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.context("Failed to bind")?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
