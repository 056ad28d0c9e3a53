use axum::http::StatusCode;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use txroutine_core::{AccountId, OperationTypeId};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Missing fields take zero values, so an absent `document_number` is
/// reported as an invalid document rather than malformed JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateAccountRequest {
    pub document_number: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateTransactionRequest {
    pub account_id: i64,
    pub operation_type_id: i32,
    pub amount: f64,
    /// RFC 3339; absent, null or empty means "now".
    pub event_date: Option<String>,
}

impl CreateTransactionRequest {
    pub fn account_id(&self) -> AccountId {
        AccountId::new(self.account_id)
    }

    pub fn operation_type_id(&self) -> OperationTypeId {
        OperationTypeId::new(self.operation_type_id)
    }
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn parse_account_id(raw: &str) -> Result<AccountId, axum::response::Response> {
    match raw.parse::<AccountId>() {
        Ok(id) if id.is_positive() => Ok(id),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_account_id",
            "invalid account id",
        )),
    }
}

pub fn parse_event_date(
    raw: Option<&str>,
) -> Result<Option<DateTime<FixedOffset>>, axum::response::Response> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s).map(Some).map_err(|_| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_event_date",
                "invalid event_date; must be RFC3339",
            )
        }),
    }
}
