use std::sync::Arc;
use std::time::Duration;

use crate::checkpoint::{CheckpointRecord, CheckpointStore, MigrationPhase};
use crate::migration::applier::BatchApplier;
use crate::migration::shutdown::ShutdownFlag;
use crate::migration::MigrationError;
use crate::search::{DocumentPatch, IndexDocument, SearchIndex};
use crate::source::SourceStore;

/// Run-scoped knobs, read once at startup.
#[derive(Debug, Clone)]
pub struct MigrationSettings {
    pub job_id: String,
    pub batch_size: u32,
    pub page_size: u32,
    /// Throttle between batches to bound load on downstream systems.
    pub batch_delay: Duration,
}

/// How a run ended. Both variants are clean exits; fatal conditions surface
/// as `MigrationError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Both phases exhausted; the dataset is fully migrated.
    Completed,
    /// A termination signal stopped the run after the in-flight batch. The
    /// checkpoint was saved; a later run resumes from it.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseOutcome {
    Completed,
    Interrupted,
}

/// Orchestrates the two migration phases over the three store capabilities.
///
/// One batch or page is in flight at a time, and the next one never starts
/// before the previous checkpoint is durably saved. A crash between applying
/// a batch and saving its checkpoint reprocesses that one batch, which is
/// safe because every write is idempotent.
pub struct MigrationDriver {
    source: Arc<dyn SourceStore>,
    index: Arc<dyn SearchIndex>,
    checkpoints: Arc<dyn CheckpointStore>,
    applier: BatchApplier,
    settings: MigrationSettings,
    shutdown: ShutdownFlag,
}

impl MigrationDriver {
    pub fn new(
        source: Arc<dyn SourceStore>,
        index: Arc<dyn SearchIndex>,
        checkpoints: Arc<dyn CheckpointStore>,
        settings: MigrationSettings,
        shutdown: ShutdownFlag,
    ) -> Self {
        let applier = BatchApplier::new(source.clone(), index.clone());
        Self {
            source,
            index,
            checkpoints,
            applier,
            settings,
            shutdown,
        }
    }

    /// Run the migration to completion or clean interruption. The checkpoint
    /// is the single source of truth for the resume position: it advances
    /// only after a batch has been fully attempted in both stores, and the
    /// in-memory cursor never outlives an unpersisted checkpoint.
    pub async fn run(&self) -> Result<RunOutcome, MigrationError> {
        let mut state = self.checkpoints.load(&self.settings.job_id).await.map_err(
            |cause| MigrationError::CheckpointLoad {
                job_id: self.settings.job_id.clone(),
                cause,
            },
        )?;

        if state.batch_no > 0 {
            tracing::info!(
                phase = %state.phase,
                last_id = state.last_id,
                last_page = state.last_page,
                batch_no = state.batch_no,
                total_processed = state.total_processed,
                "Resumed from checkpoint"
            );
        }

        if state.phase == MigrationPhase::Sync {
            if self.run_sync(&mut state).await? == PhaseOutcome::Interrupted {
                return Ok(RunOutcome::Interrupted);
            }
        }

        if self.run_reconcile(&mut state).await? == PhaseOutcome::Interrupted {
            return Ok(RunOutcome::Interrupted);
        }

        tracing::info!(
            total_processed = state.total_processed,
            updated_source_count = state.updated_source_count,
            updated_index_count = state.updated_index_count,
            default_set_count = state.default_set_count,
            "Migration complete"
        );

        Ok(RunOutcome::Completed)
    }

    /// Phase 1: cursor over the source of record, dual-writing each batch.
    async fn run_sync(&self, state: &mut CheckpointRecord) -> Result<PhaseOutcome, MigrationError> {
        loop {
            if self.shutdown.is_triggered() {
                self.save(state).await?;
                return Ok(PhaseOutcome::Interrupted);
            }

            let rows = self
                .source
                .fetch_rows_after(state.last_id, self.settings.batch_size)
                .await
                .map_err(|cause| MigrationError::SourceFetch {
                    after_id: state.last_id,
                    cause,
                })?;

            if rows.is_empty() {
                // Phase flip and page reset are persisted in one write.
                state.enter_reconcile();
                self.save(state).await?;
                tracing::info!("Source cursor exhausted - entering reconciliation");
                return Ok(PhaseOutcome::Completed);
            }

            let last_id = rows.last().map(|row| row.id).unwrap_or(state.last_id);
            let outcome = self.applier.apply(&rows).await;

            state.last_id = last_id;
            state.batch_no += 1;
            state.total_processed += rows.len() as u64;
            state.updated_source_count += outcome.updated_source;
            state.updated_index_count += outcome.updated_index;
            self.save(state).await?;

            tracing::info!(
                batch_no = state.batch_no,
                rows = rows.len(),
                updated_source = outcome.updated_source,
                updated_index = outcome.updated_index,
                total_processed = state.total_processed,
                last_id = state.last_id,
                "Sync batch applied"
            );

            tokio::time::sleep(self.settings.batch_delay).await;
        }
    }

    /// Phase 2: page over the search index, defaulting out documents that
    /// have no row in the source of record.
    async fn run_reconcile(
        &self,
        state: &mut CheckpointRecord,
    ) -> Result<PhaseOutcome, MigrationError> {
        loop {
            if self.shutdown.is_triggered() {
                self.save(state).await?;
                return Ok(PhaseOutcome::Interrupted);
            }

            let documents = self
                .index
                .list_documents(state.last_page, self.settings.page_size)
                .await
                .map_err(|cause| MigrationError::IndexFetch {
                    page: state.last_page,
                    cause,
                })?;

            if documents.is_empty() {
                tracing::info!("Index paginator exhausted - reconciliation complete");
                return Ok(PhaseOutcome::Completed);
            }

            let page = state.last_page;
            let defaulted = self.reconcile_page(page, &documents).await?;

            state.last_page += 1;
            state.batch_no += 1;
            state.default_set_count += defaulted;
            self.save(state).await?;

            tracing::info!(
                batch_no = state.batch_no,
                page = page,
                documents = documents.len(),
                default_set_count = state.default_set_count,
                "Reconcile page applied"
            );

            tokio::time::sleep(self.settings.batch_delay).await;
        }
    }

    /// Apply synthetic defaults to every document on the page that has no
    /// source row. Returns the number of documents defaulted.
    async fn reconcile_page(
        &self,
        page: u32,
        documents: &[IndexDocument],
    ) -> Result<u64, MigrationError> {
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            match document.id.parse::<i64>() {
                Ok(id) => ids.push(id),
                // Non-numeric ids are outside the source id domain; skip.
                Err(_) => tracing::warn!("Index document id {:?} is not numeric", document.id),
            }
        }

        let existing = self
            .source
            .filter_existing(&ids)
            .await
            .map_err(|cause| MigrationError::ExistenceCheck { page, cause })?;

        let mut defaulted = 0;
        for id in ids {
            if existing.contains(&id) {
                continue;
            }
            match self
                .index
                .update_document_fields(id, DocumentPatch::DEFAULTS)
                .await
            {
                Ok(true) => defaulted += 1,
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!("Default set failed for document {}: {}", id, err);
                }
            }
        }

        Ok(defaulted)
    }

    async fn save(&self, state: &CheckpointRecord) -> Result<(), MigrationError> {
        self.checkpoints
            .save(&self.settings.job_id, state)
            .await
            .map_err(|cause| MigrationError::CheckpointSave {
                batch_no: state.batch_no,
                cause,
            })
    }
}
