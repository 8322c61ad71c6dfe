pub mod models;
pub mod mongo;

pub use models::{CheckpointRecord, MigrationPhase};
pub use mongo::MongoCheckpointStore;

use anyhow::Result;
use async_trait::async_trait;

/// Durable store for migration progress, addressed by job id.
///
/// `load` on a missing job returns (and persists) the default record. `save`
/// replaces the whole record in one write, so a reader never observes a
/// partially written checkpoint; saving the same record twice is a no-op in
/// effect.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, job_id: &str) -> Result<CheckpointRecord>;
    async fn save(&self, job_id: &str, record: &CheckpointRecord) -> Result<()>;
}
