use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::instrument;

use txroutine_core::{
    normalize_document, normalize_event_time, signed_amount, Account, AccountId, DomainError,
    NewTransaction, OperationTypeId, Transaction,
};
use txroutine_infra::Repository;

use crate::error::{from_repository, ServiceResult};

/// Ledger operations: validation and sign normalisation in front of
/// whichever storage backend was configured.
///
/// The service only knows the [`Repository`] contract, never a concrete
/// backend.
#[derive(Clone)]
pub struct TransactionService {
    repo: Arc<dyn Repository>,
}

impl TransactionService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Create an account after trimming the document number.
    #[instrument(skip(self, document_number))]
    pub async fn create_account(&self, document_number: &str) -> ServiceResult<Account> {
        let document = normalize_document(document_number)?;
        let account = self.repo.create_account(&document).await?;

        tracing::info!(account_id = %account.id, "account created");
        Ok(account)
    }

    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn get_account(&self, id: AccountId) -> ServiceResult<Account> {
        Ok(self.repo.get_account(id).await?)
    }

    /// Record a transaction.
    ///
    /// The stored amount is `-|amount|` for debit operation types and
    /// `+|amount|` for credit ones. Without `event_time`, or with the zero
    /// instant `0001-01-01T00:00:00Z`, the backend stamps the current UTC time.
    #[instrument(
        skip(self, event_time),
        fields(account_id = %account_id, operation_type_id = %operation_type_id)
    )]
    pub async fn create_transaction(
        &self,
        account_id: AccountId,
        operation_type_id: OperationTypeId,
        amount: f64,
        event_time: Option<DateTime<FixedOffset>>,
    ) -> ServiceResult<Transaction> {
        if !self.repo.has_operation_type(operation_type_id).await {
            return Err(DomainError::InvalidOperationType(operation_type_id).into());
        }

        let amount = signed_amount(operation_type_id, amount)?;

        let candidate = NewTransaction {
            account_id,
            operation_type_id,
            amount,
            event_date: normalize_event_time(event_time),
        };

        let created = self
            .repo
            .create_transaction(candidate)
            .await
            .map_err(|e| from_repository(e, operation_type_id))?;

        tracing::info!(
            transaction_id = %created.id,
            amount = created.amount,
            "transaction created"
        );
        Ok(created)
    }
}

impl core::fmt::Debug for TransactionService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransactionService").finish_non_exhaustive()
    }
}
