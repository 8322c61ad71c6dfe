pub mod applier;
pub mod driver;
pub mod shutdown;

pub use applier::{BatchApplier, BatchOutcome};
pub use driver::{MigrationDriver, MigrationSettings, RunOutcome};
pub use shutdown::{listen_for_signals, ShutdownFlag};

use thiserror::Error;

/// Fatal driver errors. Per-row store failures are counted, not raised;
/// these are the conditions under which the run must stop without advancing
/// the checkpoint, so a restart re-reads the last good position.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to load checkpoint for job {job_id}: {cause:#}")]
    CheckpointLoad { job_id: String, cause: anyhow::Error },

    #[error("failed to save checkpoint after batch {batch_no}: {cause:#}")]
    CheckpointSave { batch_no: u64, cause: anyhow::Error },

    #[error("failed to fetch source batch after id {after_id}: {cause:#}")]
    SourceFetch { after_id: i64, cause: anyhow::Error },

    #[error("failed to fetch index page {page}: {cause:#}")]
    IndexFetch { page: u32, cause: anyhow::Error },

    #[error("failed to check source existence for index page {page}: {cause:#}")]
    ExistenceCheck { page: u32, cause: anyhow::Error },
}
