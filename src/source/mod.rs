pub mod models;
pub mod postgres;

pub use models::ProductRow;
pub use postgres::PostgresSource;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

/// Relational system-of-record capability. Ids are append-only and never
/// reused; pagination is cursor-based, "strictly greater than last seen id".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Fetch up to `limit` rows with id > `after_id`, ascending by id.
    /// Empty means the cursor is exhausted.
    async fn fetch_rows_after(&self, after_id: i64, limit: u32) -> Result<Vec<ProductRow>>;

    /// Set deleted_at = `value` for the given ids where it is still NULL.
    /// Returns the number of rows changed.
    async fn update_deleted_at_where_null(&self, ids: &[i64], value: i64) -> Result<u64>;

    /// Subset of `ids` that exist in the source of record.
    async fn filter_existing(&self, ids: &[i64]) -> Result<HashSet<i64>>;
}
