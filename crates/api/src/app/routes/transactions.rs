use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use txroutine_service::TransactionService;

use crate::app::{dto, errors};

pub async fn create_transaction(
    Extension(service): Extension<Arc<TransactionService>>,
    payload: Result<Json<dto::CreateTransactionRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let event_time = match dto::parse_event_date(body.event_date.as_deref()) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    match service
        .create_transaction(
            body.account_id(),
            body.operation_type_id(),
            body.amount,
            event_time,
        )
        .await
    {
        Ok(tx) => (StatusCode::CREATED, Json(tx)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
