use thiserror::Error;

use txroutine_core::{DomainError, OperationTypeId};
use txroutine_infra::RepositoryError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by [`crate::TransactionService`].
///
/// The storage-level `OperationTypeNotFound` never surfaces here: it is folded
/// into `Domain(InvalidOperationType)` so callers see one kind for "unknown
/// operation type" whichever check caught it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Caller input was rejected before storage was touched.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("account not found")]
    AccountNotFound,

    /// Backend failure, passed through opaquely.
    #[error(transparent)]
    Repository(RepositoryError),
}

/// Translation used for `create_transaction`.
///
/// `OperationTypeNotFound` has no operation id attached at the storage level,
/// so the caller supplies it.
pub(crate) fn from_repository(
    err: RepositoryError,
    operation_type_id: OperationTypeId,
) -> ServiceError {
    match err {
        RepositoryError::AccountNotFound => ServiceError::AccountNotFound,
        RepositoryError::OperationTypeNotFound => {
            ServiceError::Domain(DomainError::InvalidOperationType(operation_type_id))
        }
        other => ServiceError::Repository(other),
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::AccountNotFound => ServiceError::AccountNotFound,
            other => ServiceError::Repository(other),
        }
    }
}
