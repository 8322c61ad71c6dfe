use anyhow::{Context, Result};
use clap::Parser;

/// CLI surface: run-scoped overrides on top of the environment.
#[derive(Debug, Parser)]
#[command(
    name = "inventory-backfill",
    about = "Resumable backfill of deleted_at/created_at across PostgreSQL and Typesense"
)]
pub struct Cli {
    /// Checkpoint job id (one checkpoint document per job)
    #[arg(long, default_value = "backfill_inventory_fields")]
    pub job_id: String,

    /// Rows per source batch
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Documents per index page during reconciliation
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Seconds to sleep between batches
    #[arg(long)]
    pub sleep: Option<f64>,
}

/// Full configuration, read once at startup. Nothing reconfigures mid-run.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_database: String,
    pub db_user: String,
    pub db_password: String,
    pub db_connection_timeout: u64,

    pub mongo_uri: String,
    pub mongo_db_name: String,
    pub mongo_checkpoint_collection: String,

    pub typesense_host: String,
    pub typesense_port: u16,
    pub typesense_protocol: String,
    pub typesense_api_key: String,
    pub typesense_collection: String,
    pub typesense_connection_timeout: u64,

    pub batch_size: u32,
    pub typesense_page_size: u32,
    pub sleep_between_batches: f64,

    pub job_id: String,
}

impl Config {
    /// Load config from environment variables, then apply CLI overrides.
    /// Missing required variables are a startup error.
    pub fn load(cli: &Cli) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self {
            db_host: required("DB_HOST")?,
            db_port: required("DB_PORT")?
                .parse()
                .context("DB_PORT must be a number")?,
            db_database: required("DB_DATABASE")?,
            db_user: required("DB_USER")?,
            db_password: required("DB_PASSWORD")?,
            db_connection_timeout: optional_parsed("DB_CONNECTION_TIMEOUT", 10)?,

            mongo_uri: required("MONGO_URI")?,
            mongo_db_name: optional("MONGO_DB_NAME", "checkpoint_db"),
            mongo_checkpoint_collection: optional(
                "MONGO_CHECKPOINT_COLLECTION",
                "inventory_backfill_checkpoint",
            ),

            typesense_host: optional("TYPESENSE_HOST", "localhost"),
            typesense_port: optional_parsed("TYPESENSE_PORT", 8108)?,
            typesense_protocol: optional("TYPESENSE_PROTOCOL", "http"),
            typesense_api_key: required("TYPESENSE_API_KEY")?,
            typesense_collection: optional("TYPESENSE_COLLECTION", "products_search"),
            typesense_connection_timeout: optional_parsed("TYPESENSE_CONNECTION_TIMEOUT", 10)?,

            batch_size: optional_parsed("BATCH_SIZE", 1000)?,
            typesense_page_size: optional_parsed("TYPESENSE_PAGE_SIZE", 250)?,
            sleep_between_batches: optional_parsed("SLEEP_BETWEEN_BATCHES", 1.0)?,

            job_id: cli.job_id.clone(),
        };
        config.apply_overrides(cli);

        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(batch_size) = cli.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(page_size) = cli.page_size {
            self.typesense_page_size = page_size;
        }
        if let Some(sleep) = cli.sleep {
            self.sleep_between_batches = sleep;
        }
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{} not set", key))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_parsed<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} must be a number", key)),
        Err(_) => Ok(default),
    }
}
