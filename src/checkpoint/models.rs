use serde::{Deserialize, Serialize};

/// Sequential stages of the backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPhase {
    /// Cursor over the source of record; dual-write to both stores.
    Sync,
    /// Page over the search index; default out documents with no source row.
    Reconcile,
}

impl MigrationPhase {
    pub fn as_str(&self) -> &str {
        match self {
            MigrationPhase::Sync => "sync",
            MigrationPhase::Reconcile => "reconcile",
        }
    }
}

impl std::fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable progress record, one document per job id. The only state that
/// survives a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointRecord {
    pub phase: MigrationPhase,
    /// Last source id whose batch was fully applied; 0 = before the first row.
    pub last_id: i64,
    /// Next index page to fetch during reconciliation (zero-indexed).
    pub last_page: u32,
    pub batch_no: u64,
    pub total_processed: u64,
    pub updated_source_count: u64,
    pub updated_index_count: u64,
    pub default_set_count: u64,
}

impl Default for CheckpointRecord {
    fn default() -> Self {
        Self {
            phase: MigrationPhase::Sync,
            last_id: 0,
            last_page: 0,
            batch_no: 0,
            total_processed: 0,
            updated_source_count: 0,
            updated_index_count: 0,
            default_set_count: 0,
        }
    }
}

impl CheckpointRecord {
    /// Flip to the reconciliation phase, restarting index pagination. Saved
    /// as one write so the phase and page position never diverge.
    pub fn enter_reconcile(&mut self) {
        self.phase = MigrationPhase::Reconcile;
        self.last_page = 0;
    }
}
