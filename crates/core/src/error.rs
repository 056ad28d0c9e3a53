//! Domain error model.

use thiserror::Error;

use crate::id::OperationTypeId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only caller-input problems live here. They are detected before any storage
/// mutation and are never retried. Reference-integrity and infrastructure
/// failures belong to the storage layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The document number was empty after trimming.
    #[error("invalid document_number")]
    InvalidDocument,

    /// The operation type is unknown or cannot be classified as debit/credit.
    #[error("invalid operation_type_id: {0}")]
    InvalidOperationType(OperationTypeId),

    /// The amount magnitude was zero or not a finite number.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
