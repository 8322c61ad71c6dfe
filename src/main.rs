mod checkpoint;
mod migration;
mod search;
mod source;
mod utils;


use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use migration::{listen_for_signals, MigrationDriver, MigrationSettings, RunOutcome, ShutdownFlag};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let cli = utils::Cli::parse();
    let config = utils::Config::load(&cli)?;

    tracing::info!(
        job_id = %config.job_id,
        batch_size = config.batch_size,
        page_size = config.typesense_page_size,
        "Starting inventory backfill"
    );

    // All three stores must be reachable before any batch work begins.
    let source = Arc::new(source::PostgresSource::connect(&config).await?);
    let index = Arc::new(search::TypesenseIndex::new(&config)?);
    index.ensure_schema_fields().await?;
    let checkpoints = Arc::new(checkpoint::MongoCheckpointStore::connect(&config).await?);

    let shutdown = ShutdownFlag::new();
    listen_for_signals(shutdown.clone());

    let settings = MigrationSettings {
        job_id: config.job_id.clone(),
        batch_size: config.batch_size,
        page_size: config.typesense_page_size,
        batch_delay: Duration::from_secs_f64(config.sleep_between_batches),
    };

    let driver = MigrationDriver::new(source, index, checkpoints, settings, shutdown);

    match driver.run().await? {
        RunOutcome::Completed => tracing::info!("Backfill finished"),
        RunOutcome::Interrupted => {
            tracing::info!("Backfill interrupted - checkpoint saved, rerun to resume")
        }
    }

    Ok(())
}
