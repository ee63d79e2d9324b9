//! Manufacture/expiry date derivation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use labelforge_core::{DomainError, DomainResult};

use crate::product::Product;

/// The pair of dates printed on every sticker of one batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionDates {
    pub mfg_date: NaiveDate,
    pub exp_date: NaiveDate,
}

impl ProductionDates {
    /// Resolve requested overrides against the product's shelf life.
    ///
    /// A missing `mfg_date` falls back to `today`; a missing `exp_date` is
    /// `mfg_date + shelf_life_days`. Explicit dates must not put expiry
    /// before manufacture.
    pub fn resolve(
        product: &Product,
        mfg_date: Option<NaiveDate>,
        exp_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> DomainResult<Self> {
        let mfg_date = mfg_date.unwrap_or(today);
        let exp_date = match exp_date {
            Some(d) => d,
            None => product.expiry_for(mfg_date).ok_or_else(|| {
                DomainError::validation(format!(
                    "expiry date out of range for shelf life of {} days",
                    product.shelf_life_days
                ))
            })?,
        };

        if exp_date < mfg_date {
            return Err(DomainError::validation(format!(
                "exp_date {exp_date} is before mfg_date {mfg_date}"
            )));
        }

        Ok(Self { mfg_date, exp_date })
    }

    /// Defaults shown on an empty print form.
    pub fn defaults(product: &Product, today: NaiveDate) -> DomainResult<Self> {
        Self::resolve(product, None, None, today)
    }
}
