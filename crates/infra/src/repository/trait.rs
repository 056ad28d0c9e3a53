use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use txroutine_core::{Account, AccountId, NewTransaction, OperationTypeId, Transaction};

/// Storage operation error.
///
/// The two not-found kinds are reference-integrity failures and must stay
/// distinguishable from `Backend`, which covers everything infrastructural
/// (connectivity, I/O, poisoned locks, unexpected constraint failures).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("account not found")]
    AccountNotFound,

    #[error("operation type not found")]
    OperationTypeNotFound,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Storage contract for accounts and transactions.
///
/// Every backend must behave identically:
///
/// - `create_account` stores the document as given (validation is the
///   service's job) and assigns a fresh id.
/// - `get_account` fails with `AccountNotFound` for unknown ids; any other
///   failure is `Backend`.
/// - `has_operation_type` never fails. Internal faults report `false`, so an
///   infrastructure problem can never let an unknown type through.
/// - `create_transaction` checks the account first, then the operation type,
///   before writing anything, then assigns an id and fills a missing
///   `event_date` with the current UTC time.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create_account(&self, document_number: &str) -> Result<Account, RepositoryError>;

    async fn get_account(&self, id: AccountId) -> Result<Account, RepositoryError>;

    async fn has_operation_type(&self, id: OperationTypeId) -> bool;

    async fn create_transaction(
        &self,
        candidate: NewTransaction,
    ) -> Result<Transaction, RepositoryError>;
}

#[async_trait]
impl<R> Repository for Arc<R>
where
    R: Repository + ?Sized,
{
    async fn create_account(&self, document_number: &str) -> Result<Account, RepositoryError> {
        (**self).create_account(document_number).await
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, RepositoryError> {
        (**self).get_account(id).await
    }

    async fn has_operation_type(&self, id: OperationTypeId) -> bool {
        (**self).has_operation_type(id).await
    }

    async fn create_transaction(
        &self,
        candidate: NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        (**self).create_transaction(candidate).await
    }
}
