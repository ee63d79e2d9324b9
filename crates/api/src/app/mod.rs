//! Axum router and service wiring.
//!
//! - `services.rs`: store selection (in-memory or Postgres) and the print pipeline
//! - `routes/`: HTTP handlers
//! - `dto.rs`: request/response bodies and the JSON-or-form extractor
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from configuration (used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, services::ServicesError> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(build_app_with(services, &config.jwt_secret))
}

/// Build the router around already-wired services.
pub fn build_app_with(services: Arc<services::AppServices>, jwt_secret: &str) -> Router {
    let jwt = Arc::new(labelforge_auth::Hs256JwtValidator::new(
        jwt_secret.as_bytes().to_vec(),
    ));
    let auth_state = middleware::AuthState { jwt };

    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
