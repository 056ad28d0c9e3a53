//! `txroutine-service`: the business rules of the ledger.
//!
//! Everything that decides *what* gets persisted lives here; the storage
//! backends in `txroutine-infra` decide *how*.

pub mod error;
pub mod service;

pub use error::{ServiceError, ServiceResult};
pub use service::TransactionService;
