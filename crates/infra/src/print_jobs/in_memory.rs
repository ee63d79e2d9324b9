use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use labelforge_core::{PrintJobId, ProductId};
use labelforge_labels::{NewPrintJob, PrintJob};

use super::PrintJobRecorder;
use crate::error::StoreError;

/// In-memory recorder for tests/dev.
///
/// Mirrors the `UNIQUE (product_id, batch_number)` constraint of the real table.
#[derive(Debug, Default)]
pub struct InMemoryPrintJobRecorder {
    jobs: RwLock<Vec<PrintJob>>,
}

impl InMemoryPrintJobRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<PrintJob> {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl PrintJobRecorder for InMemoryPrintJobRecorder {
    async fn record_batch(&self, jobs: Vec<NewPrintJob>) -> Result<Vec<PrintJob>, StoreError> {
        let mut stored = self.jobs.write().unwrap_or_else(|e| e.into_inner());

        let mut seen: HashSet<(ProductId, String)> = stored
            .iter()
            .map(|j| (j.product_id, j.batch_number.as_str().to_string()))
            .collect();

        // Stage everything first; nothing is appended unless the whole batch passes.
        let now = Utc::now();
        let mut next_id = stored.last().map(|j| j.id.get()).unwrap_or(0) + 1;
        let mut staged = Vec::with_capacity(jobs.len());
        for job in jobs {
            if !seen.insert((job.product_id, job.batch_number.as_str().to_string())) {
                return Err(StoreError::Conflict(format!(
                    "batch {} already recorded for product {}",
                    job.batch_number, job.product_id
                )));
            }
            staged.push(PrintJob::committed(PrintJobId::new(next_id), job, now));
            next_id += 1;
        }

        stored.extend(staged.iter().cloned());
        Ok(staged)
    }

    async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<PrintJob>, StoreError> {
        let stored = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        Ok(stored.iter().filter(|j| j.product_id == product_id).cloned().collect())
    }
}
