use axum::{routing::get, Router};

pub mod preview;
pub mod print;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/print", get(print::selection_view).post(print::add_to_selection))
        .route(
            "/print/:product_id",
            get(print::print_form).post(print::print_product),
        )
        .route("/print_stickers", axum::routing::post(print::print_stickers))
        .route("/sticker_preview", get(preview::latest))
        .route("/sticker_preview/:artifact_id", get(preview::by_id))
}
