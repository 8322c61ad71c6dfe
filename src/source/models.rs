use chrono::{DateTime, Utc};

/// A row of `public.products`, narrowed to the backfill columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub created_at: Option<DateTime<Utc>>,
    /// 0 = active, >= 1 = deleted-at epoch seconds. NULL only before backfill.
    pub deleted_at: Option<i64>,
}

impl ProductRow {
    /// created_at as epoch seconds. Rows without one get the explicit 0
    /// sentinel, matching the deleted_at convention.
    pub fn created_at_timestamp(&self) -> i64 {
        self.created_at.map(|ts| ts.timestamp()).unwrap_or(0)
    }
}
