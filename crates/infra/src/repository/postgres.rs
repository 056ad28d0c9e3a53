//! Postgres-backed storage implementation.
//!
//! Same contract as the in-memory backend, expressed as SQL round trips.
//!
//! ## Error Mapping
//!
//! | Situation | RepositoryError |
//! |-----------|-----------------|
//! | `get_account` finds no row | `AccountNotFound` |
//! | `create_transaction` account existence check is false | `AccountNotFound` |
//! | `create_transaction` operation type existence check is false | `OperationTypeNotFound` |
//! | Insert hits FK violation (`23503`) on `fk_account` | `AccountNotFound` |
//! | Insert hits FK violation (`23503`) on `fk_operation_type` | `OperationTypeNotFound` |
//! | Any other SQLx error | `Backend` |
//! | `has_operation_type` fails for any reason | logged, reported as `false` |
//!
//! ## Amounts
//!
//! `amount` is `DOUBLE PRECISION`, so a stored amount reads back bit for bit
//! as the `f64` the service computed. No rounding, no range limit below `f64`.
//!
//! ## Consistency
//!
//! `create_transaction` runs both existence checks and the insert in one
//! database transaction. The checks still decide which not-found kind is
//! reported; the FK mapping covers a reference that disappears in between.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow, PgSslMode};
use sqlx::{PgPool, Row};
use tracing::instrument;

use txroutine_core::{
    Account, AccountId, NewTransaction, OperationType, OperationTypeId, Transaction, TransactionId,
};

use super::r#trait::{Repository, RepositoryError};
use crate::config::DatabaseConfig;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id BIGSERIAL PRIMARY KEY,
        document_number TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS operation_types (
        id INT PRIMARY KEY,
        description TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id BIGSERIAL PRIMARY KEY,
        account_id BIGINT NOT NULL,
        operation_type_id INT NOT NULL,
        amount DOUBLE PRECISION NOT NULL,
        event_date TIMESTAMPTZ NOT NULL,
        CONSTRAINT fk_account FOREIGN KEY (account_id) REFERENCES accounts(id),
        CONSTRAINT fk_operation_type FOREIGN KEY (operation_type_id) REFERENCES operation_types(id)
    )
    "#,
];

const FK_ACCOUNT: &str = "fk_account";
const FK_OPERATION_TYPE: &str = "fk_operation_type";

/// Postgres-backed repository.
///
/// `Send + Sync`; the SQLx pool handles connection sharing, and no
/// application-level lock is held across round trips.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: Arc<PgPool>,
}

impl PostgresRepository {
    /// Connect using the database section of the app config, then initialise
    /// the schema and seed the operation types.
    #[instrument(skip(config), fields(host = %config.host, port = config.port, dbname = %config.dbname))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, RepositoryError> {
        let ssl_mode: PgSslMode = config
            .sslmode
            .parse()
            .map_err(|e| RepositoryError::backend(format!("invalid sslmode '{}': {e}", config.sslmode)))?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.dbname)
            .ssl_mode(ssl_mode);

        // connect_with opens a first connection, which doubles as the ping.
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        Self::with_pool(pool).await
    }

    /// Wrap an existing pool. Schema initialisation and seeding are idempotent,
    /// so this is safe against an already-initialised database.
    pub async fn with_pool(pool: PgPool) -> Result<Self, RepositoryError> {
        let repo = Self {
            pool: Arc::new(pool),
        };
        repo.init_schema().await?;
        repo.seed_operation_types().await?;
        tracing::info!("postgres repository ready");
        Ok(repo)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn init_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("init_schema", e))?;
        }
        Ok(())
    }

    async fn seed_operation_types(&self) -> Result<(), RepositoryError> {
        for op in OperationType::canonical() {
            sqlx::query(
                "INSERT INTO operation_types (id, description) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
            )
            .bind(op.id.get())
            .bind(&op.description)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("seed_operation_types", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    #[instrument(skip(self, document_number), level = "debug")]
    async fn create_account(&self, document_number: &str) -> Result<Account, RepositoryError> {
        let row: AccountRow = sqlx::query_as(
            "INSERT INTO accounts (document_number) VALUES ($1) RETURNING id, document_number",
        )
        .bind(document_number)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_account", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(account_id = %id), level = "debug")]
    async fn get_account(&self, id: AccountId) -> Result<Account, RepositoryError> {
        let row: Option<AccountRow> =
            sqlx::query_as("SELECT id, document_number FROM accounts WHERE id = $1")
                .bind(id.get())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("get_account", e))?;

        row.map(Account::from).ok_or(RepositoryError::AccountNotFound)
    }

    #[instrument(skip(self), fields(operation_type_id = %id), level = "debug")]
    async fn has_operation_type(&self, id: OperationTypeId) -> bool {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM operation_types WHERE id = $1)",
        )
        .bind(id.get())
        .fetch_one(&*self.pool)
        .await;

        match exists {
            Ok(exists) => exists,
            Err(err) => {
                tracing::error!(operation_type_id = %id, error = %err, "failed to check operation type");
                false
            }
        }
    }

    #[instrument(
        skip(self, candidate),
        fields(
            account_id = %candidate.account_id,
            operation_type_id = %candidate.operation_type_id
        ),
        level = "debug"
    )]
    async fn create_transaction(
        &self,
        candidate: NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // Returning early drops `tx`, which rolls it back.
        let account_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
                .bind(candidate.account_id.get())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("check_account", e))?;
        if !account_exists {
            return Err(RepositoryError::AccountNotFound);
        }

        let operation_type_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM operation_types WHERE id = $1)")
                .bind(candidate.operation_type_id.get())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("check_operation_type", e))?;
        if !operation_type_exists {
            return Err(RepositoryError::OperationTypeNotFound);
        }

        let event_date = candidate.event_date.unwrap_or_else(Utc::now);

        let row: TransactionRow = sqlx::query_as(
            r#"
            INSERT INTO transactions (account_id, operation_type_id, amount, event_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, account_id, operation_type_id, amount, event_date
            "#,
        )
        .bind(candidate.account_id.get())
        .bind(candidate.operation_type_id.get())
        .bind(candidate.amount)
        .bind(event_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_transaction_error)?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(row.into())
    }
}

/// Map SQLx errors to `RepositoryError::Backend`, keeping the operation name.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            RepositoryError::backend(format!(
                "database error in {operation} (code {code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            RepositoryError::backend(format!("connection pool timed out in {operation}"))
        }
        sqlx::Error::RowNotFound => {
            RepositoryError::backend(format!("unexpected row not found in {operation}"))
        }
        other => RepositoryError::backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn map_insert_transaction_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23503") {
            if let Some(mapped) = foreign_key_violation(db_err.constraint()) {
                return mapped;
            }
        }
    }
    map_sqlx_error("insert_transaction", err)
}

/// Translate a violated FK constraint name into the matching not-found kind.
fn foreign_key_violation(constraint: Option<&str>) -> Option<RepositoryError> {
    match constraint {
        Some(FK_ACCOUNT) => Some(RepositoryError::AccountNotFound),
        Some(FK_OPERATION_TYPE) => Some(RepositoryError::OperationTypeNotFound),
        _ => None,
    }
}

// SQLx row types

#[derive(Debug)]
struct AccountRow {
    id: i64,
    document_number: String,
}

impl<'r> sqlx::FromRow<'r, PgRow> for AccountRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AccountRow {
            id: row.try_get("id")?,
            document_number: row.try_get("document_number")?,
        })
    }
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::new(row.id),
            document_number: row.document_number,
        }
    }
}

#[derive(Debug)]
struct TransactionRow {
    id: i64,
    account_id: i64,
    operation_type_id: i32,
    amount: f64,
    event_date: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for TransactionRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(TransactionRow {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            operation_type_id: row.try_get("operation_type_id")?,
            amount: row.try_get("amount")?,
            event_date: row.try_get("event_date")?,
        })
    }
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: TransactionId::new(row.id),
            account_id: AccountId::new(row.account_id),
            operation_type_id: OperationTypeId::new(row.operation_type_id),
            amount: row.amount,
            event_date: row.event_date,
        }
    }
}
