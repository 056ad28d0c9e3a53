use axum::{
    routing::{get, post},
    Router,
};

pub mod accounts;
pub mod system;
pub mod transactions;

/// Router for the ledger endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/:id", get(accounts::get_account))
        .route("/transactions", post(transactions::create_transaction))
}
