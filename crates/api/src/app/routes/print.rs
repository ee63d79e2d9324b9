use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Json, Path, Query,
    },
    response::{IntoResponse, Response},
};
use chrono::Utc;

use labelforge_core::ProductId;
use labelforge_labels::{PrintLine, ProductionDates, Selection, SelectionItem};

use crate::app::dto::{self, JsonOrForm};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// `GET /print`: the caller's selection (a fresh one when absent or expired) and the product list.
pub async fn selection_view(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<dto::SelectionQuery>, QueryRejection>,
) -> Result<Json<dto::SelectionResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let now = Utc::now();
    services.selections.purge_expired(now);

    let selection = match query
        .selection_id
        .and_then(|id| services.selections.get(principal.user_id(), id, now))
    {
        Some(selection) => selection,
        None => {
            let selection = Selection::new(principal.user_id(), services.selection_ttl, now);
            services.selections.save(selection.clone());
            selection
        }
    };

    selection_response(&services, selection).await
}

/// `POST /print`: append one product to a selection, creating the selection if none is named.
pub async fn add_to_selection(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JsonOrForm(body): JsonOrForm<dto::AddToSelectionRequest>,
) -> Result<Json<dto::SelectionResponse>, ApiError> {
    let now = Utc::now();
    services.selections.purge_expired(now);

    let mut selection = match body.selection_id {
        Some(id) => services
            .selections
            .get(principal.user_id(), id, now)
            .ok_or(ApiError::SelectionNotFound)?,
        None => Selection::new(principal.user_id(), services.selection_ttl, now),
    };

    let product = services.printer.product(body.product_id).await?;
    let dates = ProductionDates::resolve(&product, body.mfg_date, body.exp_date, now.date_naive())?;
    let quantity = body.quantity.unwrap_or_else(dto::default_quantity);

    selection.add(
        SelectionItem::new(&product, quantity, dates),
        services.selection_ttl,
        now,
    );
    services.selections.save(selection.clone());

    tracing::debug!(
        selection_id = %selection.id(),
        product_id = %product.id,
        items = selection.items().len(),
        expires_at = %selection.expires_at(),
        "added product to selection"
    );

    selection_response(&services, selection).await
}

async fn selection_response(
    services: &AppServices,
    selection: Selection,
) -> Result<Json<dto::SelectionResponse>, ApiError> {
    let products = services
        .printer
        .products()
        .await?
        .iter()
        .map(dto::ProductSummary::from)
        .collect();
    Ok(Json(dto::SelectionResponse { selection, products }))
}

/// `GET /print/{product_id}`: product details with the default quantity and dates.
pub async fn print_form(
    Extension(services): Extension<Arc<AppServices>>,
    product_id: Result<Path<ProductId>, PathRejection>,
) -> Result<Json<dto::PrintFormResponse>, ApiError> {
    let Path(product_id) = product_id.map_err(|e| ApiError::Validation(e.body_text()))?;
    let product = services.printer.product(product_id).await?;
    let dates = ProductionDates::defaults(&product, Utc::now().date_naive())?;

    Ok(Json(dto::PrintFormResponse {
        product,
        quantity: dto::default_quantity(),
        mfg_date: dates.mfg_date,
        exp_date: dates.exp_date,
    }))
}

/// `POST /print/{product_id}`: print one product.
pub async fn print_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    product_id: Result<Path<ProductId>, PathRejection>,
    JsonOrForm(body): JsonOrForm<dto::PrintProductRequest>,
) -> Result<Json<dto::SingleProductPrinted>, ApiError> {
    let Path(product_id) = product_id.map_err(|e| ApiError::Validation(e.body_text()))?;
    let line = body.into_line(product_id);

    let outcome = services
        .printer
        .print(principal.user_id(), &[line], Utc::now().date_naive())
        .await?;

    let batch_number = outcome
        .batches
        .first()
        .map(|b| b.batch_number.to_string())
        .unwrap_or_default();

    Ok(Json(dto::SingleProductPrinted {
        message: dto::GENERATED_MESSAGE,
        pdf_url: dto::preview_url(outcome.artifact.id),
        artifact_id: outcome.artifact.id,
        batch_number,
        sticker_count: outcome.sticker_count(),
    }))
}

/// `POST /print_stickers`: print every entry into one PDF.
pub async fn print_stickers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<Option<Vec<dto::BulkPrintEntry>>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(entries) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let lines: Vec<PrintLine> = entries.unwrap_or_default().into_iter().map(PrintLine::from).collect();

    if lines.is_empty() {
        return Ok(Json(serde_json::json!({ "message": dto::NOTHING_SELECTED_MESSAGE })).into_response());
    }

    let outcome = services
        .printer
        .print(principal.user_id(), &lines, Utc::now().date_naive())
        .await?;

    Ok(Json(dto::BulkPrinted::from_outcome(outcome)).into_response())
}
