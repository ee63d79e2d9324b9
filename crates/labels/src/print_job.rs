use chrono::{DateTime, Utc};
use serde::Serialize;

use labelforge_core::{PrintJobId, ProductId, UserId};

use crate::batch::BatchNumber;
use crate::sticker::Quantity;

/// A print job not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrintJob {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub quantity: Quantity,
    pub batch_number: BatchNumber,
}

/// Append-only audit record of one product printed in one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintJob {
    pub id: PrintJobId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub quantity: Quantity,
    pub batch_number: BatchNumber,
    pub created_at: DateTime<Utc>,
}

impl PrintJob {
    pub fn committed(id: PrintJobId, job: NewPrintJob, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            product_id: job.product_id,
            user_id: job.user_id,
            quantity: job.quantity,
            batch_number: job.batch_number,
            created_at,
        }
    }
}
