use std::sync::Arc;

use crate::search::{DocumentPatch, SearchIndex};
use crate::source::{ProductRow, SourceStore};

/// Per-store success counts for one applied batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub updated_source: u64,
    pub updated_index: u64,
}

/// Applies the normalization to both stores for one batch of source rows.
///
/// Row updates are independent: a failure in one store for one row never
/// blocks the rest of the batch. Every write sets fixed values, so
/// re-applying a batch converges on the same state.
pub struct BatchApplier {
    source: Arc<dyn SourceStore>,
    index: Arc<dyn SearchIndex>,
}

impl BatchApplier {
    pub fn new(source: Arc<dyn SourceStore>, index: Arc<dyn SearchIndex>) -> Self {
        Self { source, index }
    }

    /// Attempt every row in both stores. Failures are counted and logged,
    /// never retried within the run.
    pub async fn apply(&self, rows: &[ProductRow]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        let null_deleted: Vec<i64> = rows
            .iter()
            .filter(|row| row.deleted_at.is_none())
            .map(|row| row.id)
            .collect();

        if !null_deleted.is_empty() {
            match self
                .source
                .update_deleted_at_where_null(&null_deleted, 0)
                .await
            {
                Ok(count) => outcome.updated_source = count,
                Err(err) => {
                    tracing::warn!("Source batch update failed: {}", err);
                }
            }
        }

        for row in rows {
            let patch = DocumentPatch {
                created_at: row.created_at_timestamp(),
                deleted_at: 0,
            };
            match self.index.update_document_fields(row.id, patch).await {
                Ok(true) => outcome.updated_index += 1,
                Ok(false) => {
                    tracing::debug!("No index document for product {}", row.id);
                }
                Err(err) => {
                    tracing::warn!("Index update failed for product {}: {}", row.id, err);
                }
            }
        }

        outcome
    }
}
