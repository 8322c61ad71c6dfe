use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::source::{ProductRow, SourceStore};
use crate::utils::Config;

/// PostgreSQL products store (system of record).
pub struct PostgresSource {
    pool: PgPool,
}

impl PostgresSource {
    /// Connect and ping. Startup fails fast if the source is unreachable.
    pub async fn connect(config: &Config) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.db_host)
            .port(config.db_port)
            .database(&config.db_database)
            .username(&config.db_user)
            .password(&config.db_password);

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
            .connect_with(options)
            .await
            .context("failed to connect to PostgreSQL")?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .context("PostgreSQL ping failed")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SourceStore for PostgresSource {
    async fn fetch_rows_after(&self, after_id: i64, limit: u32) -> Result<Vec<ProductRow>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, created_at, deleted_at
            FROM public.products
            WHERE id > $1
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(after_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch products batch")?;

        Ok(rows)
    }

    async fn update_deleted_at_where_null(&self, ids: &[i64], value: i64) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE public.products
            SET deleted_at = $1
            WHERE id = ANY($2) AND deleted_at IS NULL
            "#,
        )
        .bind(value)
        .bind(ids)
        .execute(&self.pool)
        .await
        .context("failed to update products.deleted_at")?;

        Ok(result.rows_affected())
    }

    async fn filter_existing(&self, ids: &[i64]) -> Result<HashSet<i64>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM public.products WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .context("failed to check product existence")?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
