//! Meridian consolidation worker.
//!
//! Polls the run queue and drives claimed runs through the pipeline.
//! Multiple workers may run side by side: queue claims use
//! `FOR UPDATE SKIP LOCKED` and each (group, period) key is guarded by a
//! Postgres advisory lock.

use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meridian_db::{connect, ConsolidationRunner};
use meridian_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meridian=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database.url, config.database.max_connections).await?;
    info!("Consolidation worker connected to database");

    let runner = ConsolidationRunner::new(
        db,
        Duration::from_secs(config.consolidation.step_timeout_secs),
    );
    runner
        .poll_loop(Duration::from_secs(config.consolidation.poll_interval_secs))
        .await;

    Ok(())
}
