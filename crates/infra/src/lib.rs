//! Infrastructure layer: storage backends and configuration.

pub mod config;
pub mod repository;

pub use config::{AppConfig, ConfigError, DatabaseConfig, DatabaseKind, ServerConfig};
pub use repository::{InMemoryRepository, PostgresRepository, Repository, RepositoryError};
