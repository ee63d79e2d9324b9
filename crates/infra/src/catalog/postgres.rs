//! Postgres-backed product catalog.
//!
//! Reads the externally managed `products` table:
//!
//! ```sql
//! products(id BIGINT PRIMARY KEY, name TEXT, rate NUMERIC, shelf_life INT,
//!          net_weight TEXT, ingredients TEXT, nutritional_facts TEXT,
//!          allergen_information TEXT)
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::instrument;

use labelforge_core::ProductId;
use labelforge_labels::Product;

use super::ProductCatalog;
use crate::error::{StoreError, map_sqlx_error};

const SELECT_PRODUCT: &str = r#"
    SELECT
        id,
        name,
        rate,
        shelf_life,
        net_weight,
        ingredients,
        nutritional_facts,
        allergen_information
    FROM products
"#;

#[derive(Debug, Clone)]
pub struct PostgresProductCatalog {
    pool: PgPool,
}

impl PostgresProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

struct ProductRow {
    id: i64,
    name: String,
    rate: Decimal,
    shelf_life: i32,
    net_weight: Option<String>,
    ingredients: Option<String>,
    nutritional_facts: Option<String>,
    allergen_information: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            rate: row.try_get("rate")?,
            shelf_life: row.try_get("shelf_life")?,
            net_weight: row.try_get("net_weight")?,
            ingredients: row.try_get("ingredients")?,
            nutritional_facts: row.try_get("nutritional_facts")?,
            allergen_information: row.try_get("allergen_information")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let shelf_life_days = u32::try_from(row.shelf_life).map_err(|_| {
            StoreError::Corrupt(format!("product {} has negative shelf life {}", row.id, row.shelf_life))
        })?;

        Ok(Product {
            id: ProductId::new(row.id),
            name: row.name,
            rate: row.rate,
            shelf_life_days,
            net_weight: row.net_weight.unwrap_or_default(),
            ingredients: row.ingredients.unwrap_or_default(),
            nutritional_facts: row.nutritional_facts.unwrap_or_default(),
            allergen_information: row.allergen_information.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ProductCatalog for PostgresProductCatalog {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;

        row.map(Product::try_from).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCT} ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.into_iter().map(Product::try_from).collect()
    }
}
