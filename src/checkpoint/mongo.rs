use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::ReplaceOptions;
use mongodb::{Client, Collection};

use crate::checkpoint::{CheckpointRecord, CheckpointStore};
use crate::utils::Config;

/// MongoDB-backed checkpoint store. One document per job id in a dedicated
/// collection; saves are whole-document replaces with upsert.
pub struct MongoCheckpointStore {
    collection: Collection<Document>,
}

impl MongoCheckpointStore {
    /// Connect and ping. Startup fails fast if the checkpoint store is
    /// unreachable.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Client::with_uri_str(&config.mongo_uri)
            .await
            .context("failed to connect to MongoDB")?;
        let db = client.database(&config.mongo_db_name);
        db.run_command(doc! { "ping": 1 }, None)
            .await
            .context("MongoDB ping failed")?;

        Ok(Self {
            collection: db.collection(&config.mongo_checkpoint_collection),
        })
    }
}

#[async_trait]
impl CheckpointStore for MongoCheckpointStore {
    async fn load(&self, job_id: &str) -> Result<CheckpointRecord> {
        let found = self
            .collection
            .find_one(doc! { "_id": job_id }, None)
            .await
            .context("failed to load checkpoint")?;

        match found {
            Some(document) => {
                let record: CheckpointRecord = mongodb::bson::from_document(document)
                    .context("malformed checkpoint document")?;
                Ok(record)
            }
            None => {
                let record = CheckpointRecord::default();
                self.save(job_id, &record).await?;
                Ok(record)
            }
        }
    }

    async fn save(&self, job_id: &str, record: &CheckpointRecord) -> Result<()> {
        let mut document =
            mongodb::bson::to_document(record).context("failed to serialize checkpoint")?;
        document.insert("_id", job_id);
        document.insert("last_updated", chrono::Utc::now().to_rfc3339());

        self.collection
            .replace_one(
                doc! { "_id": job_id },
                document,
                ReplaceOptions::builder().upsert(true).build(),
            )
            .await
            .context("failed to save checkpoint")?;

        Ok(())
    }
}
