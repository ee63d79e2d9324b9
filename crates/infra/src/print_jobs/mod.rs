//! Append-only print-job audit records.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;

use labelforge_core::ProductId;
use labelforge_labels::{NewPrintJob, PrintJob};

use crate::error::StoreError;

pub use in_memory::InMemoryPrintJobRecorder;
pub use postgres::PostgresPrintJobRecorder;

#[async_trait]
pub trait PrintJobRecorder: Send + Sync {
    /// Commit every job of one request atomically.
    ///
    /// On error none of `jobs` is visible.
    async fn record_batch(&self, jobs: Vec<NewPrintJob>) -> Result<Vec<PrintJob>, StoreError>;

    /// Recorded jobs for one product, oldest first.
    async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<PrintJob>, StoreError>;
}
