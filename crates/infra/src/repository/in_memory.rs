use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use txroutine_core::{
    Account, AccountId, Entity, NewTransaction, OperationType, OperationTypeId, Transaction,
    TransactionId,
};

use super::r#trait::{Repository, RepositoryError};

/// Everything the in-memory backend stores, guarded as one unit so id
/// assignment and insert are atomic.
#[derive(Debug)]
struct State {
    accounts: HashMap<AccountId, Account>,
    transactions: HashMap<TransactionId, Transaction>,
    operation_types: HashMap<OperationTypeId, OperationType>,
    next_account_id: i64,
    next_transaction_id: i64,
}

impl State {
    fn seeded() -> Self {
        Self {
            accounts: HashMap::new(),
            transactions: HashMap::new(),
            operation_types: OperationType::canonical().map(|t| (t.key(), t)).collect(),
            next_account_id: 1,
            next_transaction_id: 1,
        }
    }
}

/// In-memory storage backend.
///
/// Used by tests and as a standalone deployment mode. Writers take the
/// exclusive lock, readers the shared one; no I/O happens under the lock.
#[derive(Debug)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::seeded()),
        }
    }

    pub fn account_count(&self) -> usize {
        self.state.read().map(|s| s.accounts.len()).unwrap_or(0)
    }

    pub fn transaction_count(&self) -> usize {
        self.state.read().map(|s| s.transactions.len()).unwrap_or(0)
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::backend("lock poisoned")
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_account(&self, document_number: &str) -> Result<Account, RepositoryError> {
        let mut state = self.state.write().map_err(poisoned)?;

        let account = Account {
            id: AccountId::new(state.next_account_id),
            document_number: document_number.to_string(),
        };
        state.accounts.insert(account.key(), account.clone());
        state.next_account_id += 1;

        Ok(account)
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, RepositoryError> {
        let state = self.state.read().map_err(poisoned)?;
        state
            .accounts
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::AccountNotFound)
    }

    async fn has_operation_type(&self, id: OperationTypeId) -> bool {
        // A poisoned lock counts as "not recognised".
        self.state
            .read()
            .map(|s| s.operation_types.contains_key(&id))
            .unwrap_or(false)
    }

    async fn create_transaction(
        &self,
        candidate: NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        let mut state = self.state.write().map_err(poisoned)?;

        if !state.accounts.contains_key(&candidate.account_id) {
            return Err(RepositoryError::AccountNotFound);
        }
        if !state.operation_types.contains_key(&candidate.operation_type_id) {
            return Err(RepositoryError::OperationTypeNotFound);
        }

        let id = TransactionId::new(state.next_transaction_id);
        let transaction = candidate.into_stored(id, Utc::now());
        state.transactions.insert(id, transaction.clone());
        state.next_transaction_id += 1;

        Ok(transaction)
    }
}
