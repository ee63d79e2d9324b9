//! Postgres-backed batch counters.
//!
//! ```sql
//! batch_sequences(key TEXT PRIMARY KEY, last INT NOT NULL)
//! ```
//!
//! The upsert is a single statement, so concurrent callers never observe the
//! same value.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use super::BatchSequence;
use crate::error::{StoreError, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct PostgresBatchSequence {
    pool: PgPool,
}

impl PostgresBatchSequence {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BatchSequence for PostgresBatchSequence {
    #[instrument(skip(self), err)]
    async fn next(&self, key: &str) -> Result<u32, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO batch_sequences (key, last)
            VALUES ($1, 1)
            ON CONFLICT (key)
            DO UPDATE SET last = batch_sequences.last + 1
            RETURNING last
            "#,
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("next_batch_sequence", e))?;

        let last: i32 = row
            .try_get("last")
            .map_err(|e| map_sqlx_error("next_batch_sequence", e))?;
        u32::try_from(last).map_err(|_| StoreError::Corrupt(format!("batch sequence {key} at {last}")))
    }
}
