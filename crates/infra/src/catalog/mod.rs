//! Read-only access to the external product catalog.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;

use labelforge_core::ProductId;
use labelforge_labels::Product;

use crate::error::StoreError;

pub use in_memory::InMemoryProductCatalog;
pub use postgres::PostgresProductCatalog;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up one product; `Ok(None)` when the id is unknown.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All products, ordered by id.
    async fn list(&self) -> Result<Vec<Product>, StoreError>;
}
