use std::collections::BTreeMap;

use async_trait::async_trait;

use labelforge_core::ProductId;
use labelforge_labels::Product;

use super::ProductCatalog;
use crate::error::StoreError;

/// Fixed in-memory catalog for tests/dev, optionally seeded from a JSON file.
#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    products: BTreeMap<ProductId, Product>,
}

impl InMemoryProductCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            rate: Decimal::new(100, 0),
            shelf_life_days: 5,
            net_weight: "1 kg".to_string(),
            ingredients: String::new(),
            nutritional_facts: String::new(),
            allergen_information: String::new(),
        }
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let catalog = InMemoryProductCatalog::new([product(1, "Rusk")]);
        assert!(catalog.get(ProductId::new(2)).await.unwrap().is_none());
        assert_eq!(catalog.get(ProductId::new(1)).await.unwrap().unwrap().name, "Rusk");
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let catalog = InMemoryProductCatalog::new([product(3, "C"), product(1, "A"), product(2, "B")]);

        let names: Vec<_> = catalog.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
