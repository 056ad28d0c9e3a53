//! Storage boundary for accounts and transactions.
//!
//! This module defines the contract every backend implements and the two
//! backends the service can be wired to at startup.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryRepository;
pub use postgres::PostgresRepository;
pub use r#trait::{Repository, RepositoryError};
