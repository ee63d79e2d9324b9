use std::fmt::Display;
use std::str::FromStr;

use axum::async_trait;
use axum::extract::{Form, FromRequest, Json, Request};
use axum::http::{StatusCode, header::CONTENT_TYPE};
use axum::response::Response;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use labelforge_core::{ArtifactId, ProductId, SelectionId};
use labelforge_infra::printer::{BatchSummary, PrintOutcome};
use labelforge_labels::{PrintJob, PrintLine, Product, Quantity, Selection};

use crate::app::errors;

pub const GENERATED_MESSAGE: &str = "Stickers has been generated successfully!";
pub const NOTHING_SELECTED_MESSAGE: &str =
    "No products selected for printing. Please select at least one product.";

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub selection_id: Option<SelectionId>,
}

/// One product added to an interactive selection.
#[derive(Debug, Deserialize)]
pub struct AddToSelectionRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub selection_id: Option<SelectionId>,
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub mfg_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub exp_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PrintProductRequest {
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub mfg_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub exp_date: Option<NaiveDate>,
}

impl PrintProductRequest {
    pub fn into_line(self, product_id: ProductId) -> PrintLine {
        PrintLine {
            product_id,
            quantity: self.quantity.unwrap_or_else(default_quantity),
            mfg_date: self.mfg_date,
            exp_date: self.exp_date,
        }
    }
}

/// Bulk submit entry. Selection items (which also carry `name`) are accepted as-is.
#[derive(Debug, Deserialize)]
pub struct BulkPrintEntry {
    pub id: ProductId,
    pub quantity: Quantity,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub mfg_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub exp_date: Option<NaiveDate>,
}

impl From<BulkPrintEntry> for PrintLine {
    fn from(entry: BulkPrintEntry) -> Self {
        PrintLine {
            product_id: entry.id,
            quantity: entry.quantity,
            mfg_date: entry.mfg_date,
            exp_date: entry.exp_date,
        }
    }
}

pub fn default_quantity() -> Quantity {
    Quantity::ONE
}

/// Form fields arrive as strings and unset ones as `""`.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// -------------------------
// Extractors
// -------------------------

/// Accepts `application/json` or `application/x-www-form-urlencoded` bodies.
pub struct JsonOrForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"));

        if is_json {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(v)| Self(v))
                .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()))
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(v)| Self(v))
                .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.body_text()))
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selection: Selection,
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
}

impl From<&Product> for ProductSummary {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PrintFormResponse {
    pub product: Product,
    pub quantity: Quantity,
    pub mfg_date: NaiveDate,
    pub exp_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SingleProductPrinted {
    pub message: &'static str,
    pub pdf_url: String,
    pub artifact_id: ArtifactId,
    pub batch_number: String,
    pub sticker_count: usize,
}

#[derive(Debug, Serialize)]
pub struct BulkPrinted {
    pub message: &'static str,
    pub pdf_url: String,
    pub artifact_id: ArtifactId,
    pub sticker_count: usize,
    pub batches: Vec<BatchSummary>,
    /// Audit records committed for this request, one per batch.
    pub jobs: Vec<PrintJob>,
}

pub fn preview_url(id: ArtifactId) -> String {
    format!("/sticker_preview/{id}")
}

impl BulkPrinted {
    pub fn from_outcome(outcome: PrintOutcome) -> Self {
        Self {
            message: GENERATED_MESSAGE,
            pdf_url: preview_url(outcome.artifact.id),
            artifact_id: outcome.artifact.id,
            sticker_count: outcome.sticker_count(),
            batches: outcome.batches,
            jobs: outcome.jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_form_dates_are_treated_as_absent() {
        let req: PrintProductRequest =
            serde_urlencoded_like("quantity=4&mfg_date=&exp_date=2026-12-01");
        assert_eq!(req.quantity.map(|q| q.get()), Some(4));
        assert_eq!(req.mfg_date, None);
        assert_eq!(req.exp_date, NaiveDate::from_ymd_opt(2026, 12, 1));
    }

    #[test]
    fn bulk_entries_accept_selection_items_verbatim() {
        let entries: Vec<BulkPrintEntry> = serde_json::from_str(
            r#"[{"id": 3, "name": "Murukku", "quantity": 2, "mfg_date": "2026-10-19", "exp_date": "2026-12-18"}]"#,
        )
        .unwrap();
        let line = PrintLine::from(entries.into_iter().next().unwrap());
        assert_eq!(line.product_id, ProductId::new(3));
        assert_eq!(line.quantity.get(), 2);
        assert_eq!(line.mfg_date, NaiveDate::from_ymd_opt(2026, 10, 19));
    }

    #[test]
    fn bulk_entry_rejects_zero_quantity_and_bad_dates() {
        assert!(serde_json::from_str::<BulkPrintEntry>(r#"{"id": 1, "quantity": 0}"#).is_err());
        assert!(
            serde_json::from_str::<BulkPrintEntry>(r#"{"id": 1, "quantity": 1, "mfg_date": "19/10/2026"}"#)
                .is_err()
        );
    }

    #[test]
    fn omitted_quantity_defaults_to_one() {
        let req: PrintProductRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.into_line(ProductId::new(1)).quantity.get(), 1);
    }

    fn serde_urlencoded_like<T: DeserializeOwned>(query: &str) -> T {
        let uri: axum::http::Uri = format!("/?{query}").parse().unwrap();
        axum::extract::Query::<T>::try_from_uri(&uri).unwrap().0
    }
}
