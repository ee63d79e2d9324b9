//! Postgres-backed print-job recorder.
//!
//! Appends to the externally managed `print_jobs` table:
//!
//! ```sql
//! print_jobs(id BIGSERIAL PRIMARY KEY, product_id BIGINT, user_id BIGINT,
//!            quantity INT, batch_number TEXT,
//!            created_at TIMESTAMPTZ DEFAULT now(),
//!            UNIQUE (product_id, batch_number))
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use labelforge_core::{PrintJobId, ProductId, UserId};
use labelforge_labels::{BatchNumber, NewPrintJob, PrintJob, Quantity};

use super::PrintJobRecorder;
use crate::error::{StoreError, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct PostgresPrintJobRecorder {
    pool: PgPool,
}

impl PostgresPrintJobRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

struct PrintJobRow {
    id: i64,
    product_id: i64,
    user_id: i64,
    quantity: i32,
    batch_number: String,
    created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for PrintJobRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(PrintJobRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            user_id: row.try_get("user_id")?,
            quantity: row.try_get("quantity")?,
            batch_number: row.try_get("batch_number")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<PrintJobRow> for PrintJob {
    type Error = StoreError;

    fn try_from(row: PrintJobRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity)
            .ok()
            .and_then(|q| Quantity::new(q).ok())
            .ok_or_else(|| StoreError::Corrupt(format!("print job {} has quantity {}", row.id, row.quantity)))?;

        Ok(PrintJob {
            id: PrintJobId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            quantity,
            batch_number: BatchNumber::from_stored(row.batch_number),
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl PrintJobRecorder for PostgresPrintJobRecorder {
    #[instrument(skip(self, jobs), fields(jobs = jobs.len(), committed_jobs = tracing::field::Empty), err)]
    async fn record_batch(&self, jobs: Vec<NewPrintJob>) -> Result<Vec<PrintJob>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // An early return drops `tx`, which rolls the transaction back.
        let mut committed = Vec::with_capacity(jobs.len());
        for job in jobs {
            let row = sqlx::query(
                r#"
                INSERT INTO print_jobs (product_id, user_id, quantity, batch_number)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at
                "#,
            )
            .bind(job.product_id.get())
            .bind(job.user_id.get())
            .bind(job.quantity.get() as i32)
            .bind(job.batch_number.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_print_job", e))?;

            let id: i64 = row.try_get("id").map_err(|e| map_sqlx_error("insert_print_job", e))?;
            let created_at: DateTime<Utc> = row
                .try_get("created_at")
                .map_err(|e| map_sqlx_error("insert_print_job", e))?;
            committed.push(PrintJob::committed(PrintJobId::new(id), job, created_at));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("committed_jobs", committed.len());
        Ok(committed)
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<PrintJob>, StoreError> {
        let rows: Vec<PrintJobRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, user_id, quantity, batch_number, created_at
            FROM print_jobs
            WHERE product_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(product_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_print_jobs", e))?;

        rows.into_iter().map(PrintJob::try_from).collect()
    }
}
