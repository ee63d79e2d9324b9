use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::BatchSequence;
use crate::error::StoreError;

/// In-memory counters for tests/dev. Reset on restart.
#[derive(Debug, Default)]
pub struct InMemoryBatchSequence {
    counters: RwLock<HashMap<String, u32>>,
}

impl InMemoryBatchSequence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BatchSequence for InMemoryBatchSequence {
    async fn next(&self, key: &str) -> Result<u32, StoreError> {
        let mut counters = self.counters.write().unwrap_or_else(|e| e.into_inner());
        let counter = counters.entry(key.to_string()).or_insert(0);
        *counter = counter
            .checked_add(1)
            .ok_or_else(|| StoreError::Storage(format!("batch sequence {key} exhausted")))?;
        Ok(*counter)
    }
}
