//! Sticker assembly: one [`Sticker`] per printed unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use labelforge_core::{DomainError, DomainResult, ProductId, UserId};

use crate::batch::BatchNumber;
use crate::dates::ProductionDates;
use crate::print_job::NewPrintJob;
use crate::product::Product;

/// Upper bound on stickers per product per request.
pub const MAX_QUANTITY: u32 = 10_000;

/// Upper bound on stickers rendered into one PDF, across all lines.
pub const MAX_STICKERS_PER_REQUEST: u32 = 20_000;

/// Number of stickers requested for one product (`1..=MAX_QUANTITY`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Self = Self(1);

    pub fn new(value: u32) -> DomainResult<Self> {
        if value == 0 || value > MAX_QUANTITY {
            return Err(DomainError::validation(format!(
                "quantity must be between 1 and {MAX_QUANTITY}, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

/// One requested product line: which product, how many, optional date overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub mfg_date: Option<NaiveDate>,
    pub exp_date: Option<NaiveDate>,
}

/// Total stickers requested by `lines`, rejected above [`MAX_STICKERS_PER_REQUEST`].
pub fn total_stickers(lines: &[PrintLine]) -> DomainResult<u32> {
    let total: u64 = lines.iter().map(|l| u64::from(l.quantity.get())).sum();
    if total > u64::from(MAX_STICKERS_PER_REQUEST) {
        return Err(DomainError::validation(format!(
            "at most {MAX_STICKERS_PER_REQUEST} stickers can be printed per request, got {total}"
        )));
    }
    Ok(total as u32)
}

/// A single printable label. Transient: rendered once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sticker {
    pub product_name: String,
    pub rate: String,
    pub mfg_date: NaiveDate,
    pub exp_date: NaiveDate,
    pub net_weight: String,
    pub ingredients: String,
    pub nutritional_facts: String,
    pub batch_number: BatchNumber,
    pub allergen_information: String,
}

impl Sticker {
    pub fn for_product(product: &Product, dates: ProductionDates, batch_number: BatchNumber) -> Self {
        Self {
            product_name: product.name.clone(),
            rate: product.rate.to_string(),
            mfg_date: dates.mfg_date,
            exp_date: dates.exp_date,
            net_weight: product.net_weight.clone(),
            ingredients: product.ingredients.clone(),
            nutritional_facts: product.nutritional_facts.clone(),
            batch_number,
            allergen_information: product.allergen_information.clone(),
        }
    }
}

/// All stickers of one product in one print event.
///
/// Every sticker shares the batch number and dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerBatch {
    pub product_id: ProductId,
    pub batch_number: BatchNumber,
    pub dates: ProductionDates,
    pub quantity: Quantity,
    pub stickers: Vec<Sticker>,
}

impl StickerBatch {
    pub fn assemble(
        product: &Product,
        dates: ProductionDates,
        batch_number: BatchNumber,
        quantity: Quantity,
    ) -> Self {
        let sticker = Sticker::for_product(product, dates, batch_number.clone());
        Self {
            product_id: product.id,
            batch_number,
            dates,
            quantity,
            stickers: vec![sticker; quantity.get() as usize],
        }
    }

    /// The audit row recorded for this batch.
    pub fn print_job(&self, user_id: UserId) -> NewPrintJob {
        NewPrintJob {
            product_id: self.product_id,
            user_id,
            quantity: self.quantity,
            batch_number: self.batch_number.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product() -> Product {
        Product {
            id: ProductId::new(5),
            name: "Mango Pickle".to_string(),
            rate: Decimal::new(9900, 2),
            shelf_life_days: 180,
            net_weight: "500 g".to_string(),
            ingredients: "Mango, mustard oil, salt, spices".to_string(),
            nutritional_facts: "Energy 210 kcal".to_string(),
            allergen_information: "Contains mustard".to_string(),
        }
    }

    fn dates() -> ProductionDates {
        ProductionDates::defaults(&product(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()).unwrap()
    }

    #[test]
    fn quantity_bounds_are_enforced() {
        assert!(Quantity::new(0).is_err());
        assert!(Quantity::new(MAX_QUANTITY + 1).is_err());
        assert_eq!(Quantity::new(3).unwrap().get(), 3);
    }

    #[test]
    fn quantity_deserializes_with_validation() {
        use serde::de::{IntoDeserializer, value::{Error as ValueError, U32Deserializer}};

        let zero: U32Deserializer<ValueError> = 0u32.into_deserializer();
        assert!(Quantity::deserialize(zero).is_err());

        let two: U32Deserializer<ValueError> = 2u32.into_deserializer();
        assert_eq!(Quantity::deserialize(two).unwrap().get(), 2);
    }

    fn lines(quantities: &[u32]) -> Vec<PrintLine> {
        quantities
            .iter()
            .map(|&q| PrintLine {
                product_id: ProductId::new(5),
                quantity: Quantity::new(q).unwrap(),
                mfg_date: None,
                exp_date: None,
            })
            .collect()
    }

    #[test]
    fn request_total_is_capped() {
        assert_eq!(total_stickers(&[]).unwrap(), 0);
        assert_eq!(total_stickers(&lines(&[MAX_QUANTITY, MAX_QUANTITY])).unwrap(), MAX_STICKERS_PER_REQUEST);

        let err = total_stickers(&lines(&[MAX_QUANTITY, MAX_QUANTITY, 1])).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn assemble_builds_one_sticker_per_unit_sharing_batch() {
        let batch = BatchNumber::from_stored("MAN-20261019-001".to_string());
        let b = StickerBatch::assemble(&product(), dates(), batch.clone(), Quantity::new(4).unwrap());

        assert_eq!(b.stickers.len(), 4);
        assert!(b.stickers.iter().all(|s| s.batch_number == batch));
        assert!(b.stickers.iter().all(|s| s == &b.stickers[0]));
    }

    #[test]
    fn sticker_carries_rate_as_text() {
        let s = Sticker::for_product(
            &product(),
            dates(),
            BatchNumber::from_stored("MAN-20261019-001".to_string()),
        );
        assert_eq!(s.rate, "99.00");
        assert_eq!(s.product_name, "Mango Pickle");
    }

    #[test]
    fn print_job_mirrors_batch() {
        let batch = BatchNumber::from_stored("MAN-20261019-002".to_string());
        let b = StickerBatch::assemble(&product(), dates(), batch.clone(), Quantity::new(2).unwrap());
        let job = b.print_job(UserId::new(11));

        assert_eq!(job.product_id, ProductId::new(5));
        assert_eq!(job.user_id, UserId::new(11));
        assert_eq!(job.quantity.get(), 2);
        assert_eq!(job.batch_number, batch);
    }
}
