//! HTTP API application wiring (Axum router + middleware stack).
//!
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and input parsing helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, routing::get, Extension, Router};
use tower::ServiceBuilder;

use txroutine_service::TransactionService;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(service: TransactionService, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route("/healthz", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(Arc::new(service)));

    with_middleware(api, request_timeout)
}

/// Wrap a router in the standard middleware stack.
///
/// Outermost first: request logging, timeout-to-408 translation, the
/// timeout itself, panic recovery.
pub fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::log_requests))
            .layer(HandleErrorLayer::new(errors::handle_middleware_error))
            .timeout(request_timeout)
            .layer(axum::middleware::from_fn(middleware::recover_panics)),
    )
}
