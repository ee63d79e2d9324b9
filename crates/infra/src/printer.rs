//! Sticker print pipeline.
//!
//! ```text
//! PrintLine[]
//!   ↓
//! 1. Cap the sticker total, look up every product, resolve dates
//!    (fail fast, nothing consumed yet)
//!   ↓
//! 2. Draw one batch number per line, assemble stickers in input order
//!   ↓
//! 3. Render one PDF for all stickers (blocking pool)
//!   ↓
//! 4. Store the PDF as a new artifact
//!   ↓
//! 5. Record one print job per line in a single transaction
//!    (on failure the artifact is discarded)
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use labelforge_core::{DomainError, ProductId, UserId};
use labelforge_labels::{
    BatchNumber, PrintJob, PrintLine, Product, ProductionDates, Quantity, Sticker, StickerBatch,
    total_stickers,
};
use labelforge_render::{RenderError, SheetLayout, render_stickers};

use crate::artifacts::{ArtifactError, ArtifactStore, StickerArtifact};
use crate::batch::{BatchError, BatchNumberGenerator};
use crate::catalog::ProductCatalog;
use crate::error::StoreError;
use crate::print_jobs::PrintJobRecorder;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("no products selected for printing")]
    NothingSelected,
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("render task failed: {0}")]
    RenderTask(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BatchError> for PrintError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Domain(e) => Self::Domain(e),
            BatchError::Store(e) => Self::Store(e),
        }
    }
}

/// What was printed for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub product_id: ProductId,
    pub product_name: String,
    pub batch_number: BatchNumber,
    pub quantity: Quantity,
    pub mfg_date: NaiveDate,
    pub exp_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct PrintOutcome {
    pub artifact: StickerArtifact,
    pub batches: Vec<BatchSummary>,
    pub jobs: Vec<PrintJob>,
}

impl PrintOutcome {
    pub fn sticker_count(&self) -> usize {
        self.artifact.sticker_count
    }
}

pub struct StickerPrinter {
    catalog: Arc<dyn ProductCatalog>,
    batches: BatchNumberGenerator,
    recorder: Arc<dyn PrintJobRecorder>,
    artifacts: Arc<ArtifactStore>,
    layout: SheetLayout,
}

impl StickerPrinter {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        batches: BatchNumberGenerator,
        recorder: Arc<dyn PrintJobRecorder>,
        artifacts: Arc<ArtifactStore>,
        layout: SheetLayout,
    ) -> Self {
        Self {
            catalog,
            batches,
            recorder,
            artifacts,
            layout,
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub async fn product(&self, id: ProductId) -> Result<Product, PrintError> {
        self.catalog
            .get(id)
            .await?
            .ok_or(PrintError::ProductNotFound(id))
    }

    pub async fn products(&self) -> Result<Vec<Product>, PrintError> {
        Ok(self.catalog.list().await?)
    }

    /// Print every line into one PDF and record one job per line.
    pub async fn print(
        &self,
        user_id: UserId,
        lines: &[PrintLine],
        today: NaiveDate,
    ) -> Result<PrintOutcome, PrintError> {
        if lines.is_empty() {
            return Err(PrintError::NothingSelected);
        }
        total_stickers(lines)?;

        let mut resolved = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self.product(line.product_id).await?;
            let dates = ProductionDates::resolve(&product, line.mfg_date, line.exp_date, today)?;
            resolved.push((product, dates, line.quantity));
        }

        let mut batches = Vec::with_capacity(resolved.len());
        let mut summaries = Vec::with_capacity(resolved.len());
        for (product, dates, quantity) in &resolved {
            let batch_number = self.batches.next(&product.name, dates.mfg_date).await?;
            summaries.push(BatchSummary {
                product_id: product.id,
                product_name: product.name.clone(),
                batch_number: batch_number.clone(),
                quantity: *quantity,
                mfg_date: dates.mfg_date,
                exp_date: dates.exp_date,
            });
            batches.push(StickerBatch::assemble(product, *dates, batch_number, *quantity));
        }

        let stickers: Vec<Sticker> = batches.iter().flat_map(|b| b.stickers.iter().cloned()).collect();
        let sticker_count = stickers.len();

        let layout = self.layout.clone();
        let pdf = tokio::task::spawn_blocking(move || render_stickers(&stickers, &layout))
            .await
            .map_err(|e| PrintError::RenderTask(e.to_string()))??;

        let artifact = self.artifacts.store(user_id, sticker_count, pdf).await?;

        let new_jobs = batches.iter().map(|b| b.print_job(user_id)).collect();
        let jobs = match self.recorder.record_batch(new_jobs).await {
            Ok(jobs) => jobs,
            Err(e) => {
                if let Err(discard_err) = self.artifacts.discard(artifact.id).await {
                    tracing::warn!(artifact_id = %artifact.id, "failed to discard artifact: {discard_err}");
                }
                return Err(e.into());
            }
        };

        for batch in &summaries {
            tracing::info!(
                user_id = %user_id,
                artifact_id = %artifact.id,
                product_id = %batch.product_id,
                batch_number = %batch.batch_number,
                stickers = batch.quantity.get(),
                "printed stickers"
            );
        }

        Ok(PrintOutcome {
            artifact,
            batches: summaries,
            jobs,
        })
    }
}
