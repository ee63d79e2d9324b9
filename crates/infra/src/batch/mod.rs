//! Batch number generation backed by a per-day counter.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use labelforge_core::DomainError;
use labelforge_labels::{BatchNumber, batch_prefix, sequence_key};

use crate::error::StoreError;

pub use in_memory::InMemoryBatchSequence;
pub use postgres::PostgresBatchSequence;

/// Monotonic counter per key; the first call for a key returns 1.
#[async_trait]
pub trait BatchSequence: Send + Sync {
    async fn next(&self, key: &str) -> Result<u32, StoreError>;
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct BatchNumberGenerator {
    sequence: Arc<dyn BatchSequence>,
}

impl BatchNumberGenerator {
    pub fn new(sequence: Arc<dyn BatchSequence>) -> Self {
        Self { sequence }
    }

    /// Fresh batch number for `product_name` produced on `day`.
    pub async fn next(&self, product_name: &str, day: NaiveDate) -> Result<BatchNumber, BatchError> {
        let prefix = batch_prefix(product_name)?;
        let seq = self.sequence.next(&sequence_key(&prefix, day)).await?;
        Ok(BatchNumber::compose(&prefix, day, seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn same_product_twice_gets_distinct_numbers() {
        let generator = BatchNumberGenerator::new(Arc::new(InMemoryBatchSequence::new()));

        let first = generator.next("Coconut Cookies", day()).await.unwrap();
        let second = generator.next("Coconut Cookies", day()).await.unwrap();

        assert_eq!(first.as_str(), "COC-20261019-001");
        assert_eq!(second.as_str(), "COC-20261019-002");
    }

    #[tokio::test]
    async fn products_sharing_a_prefix_share_the_counter() {
        let generator = BatchNumberGenerator::new(Arc::new(InMemoryBatchSequence::new()));

        let a = generator.next("Cocoa Bar", day()).await.unwrap();
        let b = generator.next("Coconut Cookies", day()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn counter_restarts_each_day() {
        let generator = BatchNumberGenerator::new(Arc::new(InMemoryBatchSequence::new()));
        let next_day = day().succ_opt().unwrap();

        generator.next("Rusk", day()).await.unwrap();
        let b = generator.next("Rusk", next_day).await.unwrap();
        assert_eq!(b.as_str(), "RUS-20261020-001");
    }

    #[tokio::test]
    async fn empty_name_is_a_domain_error() {
        let generator = BatchNumberGenerator::new(Arc::new(InMemoryBatchSequence::new()));
        let err = generator.next("  ", day()).await.unwrap_err();
        assert!(matches!(err, BatchError::Domain(DomainError::Validation(_))));
    }
}
