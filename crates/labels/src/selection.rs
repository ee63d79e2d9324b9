//! Interactive multi-product selection.
//!
//! A selection is built across several requests and later forwarded, item by
//! item, to the bulk print endpoint. It is owned by one user and expires after
//! a period of inactivity.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use labelforge_core::{ProductId, SelectionId, UserId};

use crate::dates::ProductionDates;
use crate::product::Product;
use crate::sticker::Quantity;

/// One chosen product, in the shape the bulk print endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionItem {
    pub id: ProductId,
    pub name: String,
    pub quantity: Quantity,
    pub mfg_date: NaiveDate,
    pub exp_date: NaiveDate,
}

impl SelectionItem {
    pub fn new(product: &Product, quantity: Quantity, dates: ProductionDates) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            quantity,
            mfg_date: dates.mfg_date,
            exp_date: dates.exp_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    id: SelectionId,
    user_id: UserId,
    items: Vec<SelectionItem>,
    expires_at: DateTime<Utc>,
}

impl Selection {
    pub fn new(user_id: UserId, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: SelectionId::new(),
            user_id,
            items: Vec::new(),
            expires_at: now + ttl,
        }
    }

    pub fn id(&self) -> SelectionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Append an item and push the expiry out by `ttl`.
    pub fn add(&mut self, item: SelectionItem, ttl: Duration, now: DateTime<Utc>) {
        self.items.push(item);
        self.expires_at = now + ttl;
    }
}
