//! `txroutine-core`: ledger domain model.
//!
//! This crate contains **pure domain** types and rules (no infrastructure concerns):
//! accounts, signed transactions, and the closed table of operation types that
//! decides whether an amount is stored as a debit or a credit.

pub mod account;
pub mod entity;
pub mod error;
pub mod id;
pub mod operation;
pub mod transaction;

pub use account::{normalize_document, Account};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, OperationTypeId, TransactionId};
pub use operation::{
    classify, is_credit_operation, is_debit_operation, KnownOperation, OperationKind, OperationType,
};
pub use transaction::{normalize_event_time, signed_amount, NewTransaction, Transaction};
