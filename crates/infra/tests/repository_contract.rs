//! Behaviour every `Repository` backend must share.
//!
//! The in-memory backend always runs. The Postgres backend runs when
//! `TXROUTINE_TEST_DATABASE_URL` points at a database the tests may write to.

use chrono::{TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;

use txroutine_core::{AccountId, NewTransaction, OperationTypeId};
use txroutine_infra::{InMemoryRepository, PostgresRepository, Repository, RepositoryError};

fn candidate(account_id: AccountId, op: i32, amount: f64) -> NewTransaction {
    NewTransaction {
        account_id,
        operation_type_id: OperationTypeId::new(op),
        amount,
        event_date: None,
    }
}

async fn created_accounts_can_be_fetched(repo: &dyn Repository) {
    let created = repo.create_account("12345").await.unwrap();
    assert!(created.id.is_positive());
    assert_eq!(created.document_number, "12345");

    let fetched = repo.get_account(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

async fn account_ids_are_unique(repo: &dyn Repository) {
    let a = repo.create_account("a").await.unwrap();
    let b = repo.create_account("b").await.unwrap();
    assert_ne!(a.id, b.id);
}

async fn unknown_account_is_not_found(repo: &dyn Repository) {
    let err = repo.get_account(AccountId::new(i64::MAX)).await.unwrap_err();
    assert_eq!(err, RepositoryError::AccountNotFound);
}

async fn operation_types_are_seeded(repo: &dyn Repository) {
    for id in 1..=4 {
        assert!(repo.has_operation_type(OperationTypeId::new(id)).await, "type {id}");
    }
    assert!(!repo.has_operation_type(OperationTypeId::new(5)).await);
    assert!(!repo.has_operation_type(OperationTypeId::new(0)).await);
}

async fn transaction_against_unknown_account_fails(repo: &dyn Repository) {
    let err = repo
        .create_transaction(candidate(AccountId::new(i64::MAX), 1, -10.0))
        .await
        .unwrap_err();
    assert_eq!(err, RepositoryError::AccountNotFound);

    // the account check wins even when the type is also unknown
    let err = repo
        .create_transaction(candidate(AccountId::new(i64::MAX), 42, -10.0))
        .await
        .unwrap_err();
    assert_eq!(err, RepositoryError::AccountNotFound);
}

async fn transaction_with_unknown_type_fails(repo: &dyn Repository) {
    let account = repo.create_account("doc").await.unwrap();
    let err = repo
        .create_transaction(candidate(account.id, 42, -10.0))
        .await
        .unwrap_err();
    assert_eq!(err, RepositoryError::OperationTypeNotFound);
}

async fn transaction_is_stored_as_given(repo: &dyn Repository) {
    let account = repo.create_account("doc").await.unwrap();
    let before = Utc::now();

    let stored = repo
        .create_transaction(candidate(account.id, 1, -100.0))
        .await
        .unwrap();
    assert!(stored.id.is_positive());
    assert_eq!(stored.account_id, account.id);
    assert_eq!(stored.operation_type_id, OperationTypeId::new(1));
    assert_eq!(stored.amount, -100.0);
    assert!(stored.event_date >= before - chrono::Duration::seconds(1));

    let when = Utc.with_ymd_and_hms(2023, 6, 15, 8, 30, 0).unwrap();
    let mut with_date = candidate(account.id, 4, 50.0);
    with_date.event_date = Some(when);
    let stored = repo.create_transaction(with_date).await.unwrap();
    assert_eq!(stored.amount, 50.0);
    assert_eq!(stored.event_date, when);
}

async fn amounts_are_stored_without_rounding(repo: &dyn Repository) {
    let account = repo.create_account("doc").await.unwrap();

    for amount in [-0.004, 0.004, -1.0e13, 1.0e15, -123.456789] {
        let op = if amount < 0.0 { 1 } else { 4 };
        let stored = repo
            .create_transaction(candidate(account.id, op, amount))
            .await
            .unwrap();
        assert_eq!(stored.amount, amount);
    }
}

async fn run_contract(repo: &dyn Repository) {
    created_accounts_can_be_fetched(repo).await;
    account_ids_are_unique(repo).await;
    unknown_account_is_not_found(repo).await;
    operation_types_are_seeded(repo).await;
    transaction_against_unknown_account_fails(repo).await;
    transaction_with_unknown_type_fails(repo).await;
    transaction_is_stored_as_given(repo).await;
    amounts_are_stored_without_rounding(repo).await;
}

#[tokio::test]
async fn in_memory_backend_satisfies_contract() {
    let repo = InMemoryRepository::new();
    run_contract(&repo).await;
}

#[tokio::test]
async fn postgres_backend_satisfies_contract() {
    let Ok(url) = std::env::var("TXROUTINE_TEST_DATABASE_URL") else {
        eprintln!("TXROUTINE_TEST_DATABASE_URL not set; skipping postgres contract test");
        return;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("failed to connect to test database");

    let repo = PostgresRepository::with_pool(pool).await.unwrap();
    // seeding twice must be harmless
    let pool_again = PgPoolOptions::new().max_connections(1).connect(&url).await.unwrap();
    let again = PostgresRepository::with_pool(pool_again).await.unwrap();
    again.close().await;

    run_contract(&repo).await;
    repo.close().await;
}
