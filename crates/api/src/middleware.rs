use std::time::Instant;

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};

use crate::app::errors::json_error;

/// One structured log line per request.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let res = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = res.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "http request"
    );
    res
}

/// Turn a panicking handler into a `500` instead of a dropped connection.
pub async fn recover_panics(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();

    match tokio::spawn(next.run(req)).await {
        Ok(res) => res,
        Err(err) => {
            if err.is_panic() {
                tracing::error!(path = %path, "handler panicked");
            } else {
                tracing::error!(path = %path, error = %err, "handler task cancelled");
            }
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}
