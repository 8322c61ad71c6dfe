pub mod models;
pub mod typesense;

pub use models::{DocumentPatch, IndexDocument};
pub use typesense::TypesenseIndex;

use anyhow::Result;
use async_trait::async_trait;

/// Search index capability: per-document field updates plus resumable
/// pagination over the full document set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Apply `patch` to the document with the given id. Ok(false) means the
    /// document does not exist, which is not an error.
    async fn update_document_fields(&self, id: i64, patch: DocumentPatch) -> Result<bool>;

    /// Fetch one zero-indexed page of the full document set. Empty means the
    /// paginator is exhausted.
    async fn list_documents(&self, page: u32, page_size: u32) -> Result<Vec<IndexDocument>>;
}
