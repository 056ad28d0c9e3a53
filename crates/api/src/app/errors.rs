use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::extract::rejection::JsonRejection;
use axum::BoxError;
use serde_json::json;

use txroutine_core::DomainError;
use txroutine_service::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::AccountNotFound => {
            json_error(StatusCode::NOT_FOUND, "account_not_found", "account not found")
        }
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Repository(e) => {
            // Backend detail stays in the logs.
            tracing::error!(error = %e, "storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}

fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let code = match &err {
        DomainError::InvalidDocument => "invalid_document",
        DomainError::InvalidOperationType(_) => "invalid_operation_type",
        DomainError::InvalidAmount => "invalid_amount",
        DomainError::InvalidId(_) => "invalid_id",
    };
    json_error(StatusCode::BAD_REQUEST, code, err.to_string())
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "invalid_json",
        format!("invalid JSON: {}", rejection.body_text()),
    )
}

/// Errors raised by the tower layers between the logger and the handlers.
pub async fn handle_middleware_error(err: BoxError) -> axum::response::Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        json_error(
            StatusCode::REQUEST_TIMEOUT,
            "request_timeout",
            "request took too long",
        )
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "internal server error",
        )
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
