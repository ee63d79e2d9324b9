use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use labelforge_core::ProductId;

/// Catalog product as read from the external product table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub rate: Decimal,
    /// Days from manufacture until expiry.
    pub shelf_life_days: u32,
    pub net_weight: String,
    pub ingredients: String,
    pub nutritional_facts: String,
    pub allergen_information: String,
}

impl Product {
    /// Expiry date for units manufactured on `mfg_date`, if representable.
    pub fn expiry_for(&self, mfg_date: NaiveDate) -> Option<NaiveDate> {
        mfg_date.checked_add_days(chrono::Days::new(u64::from(self.shelf_life_days)))
    }
}
