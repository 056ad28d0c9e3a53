//! Configuration loading and representation.
//!
//! Configuration is an explicit value built once at startup and passed to the
//! pieces that need it. Two sources are supported: `APP_*` environment
//! variables (with defaults) and a YAML file. JSON files load too, being
//! valid YAML.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use txroutine_observability::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported database type '{0}' (expected memory or postgres)")]
    UnsupportedDatabase(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Upper bound on handling a single request.
    #[serde(with = "duration_str")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Which storage backend to run against.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    Memory,
    Postgres,
}

impl core::str::FromStr for DatabaseKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(DatabaseKind::Memory),
            "postgres" => Ok(DatabaseKind::Postgres),
            other => Err(ConfigError::UnsupportedDatabase(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub kind: DatabaseKind,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::Memory,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            dbname: "transaction_routine".to_string(),
            sslmode: "disable".to_string(),
            max_connections: 10,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the environment, or a map in tests).
    ///
    /// Values that fail to parse fall back to their defaults; only an unknown
    /// database type is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let kind = match lookup("APP_DATABASE_TYPE") {
            Some(raw) => raw.parse()?,
            None => defaults.database.kind,
        };

        Ok(AppConfig {
            server: ServerConfig {
                port: parse_or(lookup("APP_SERVER_PORT"), defaults.server.port),
                request_timeout: lookup("APP_SERVER_REQUEST_TIMEOUT")
                    .and_then(|v| parse_duration(&v))
                    .unwrap_or(defaults.server.request_timeout),
            },
            logging: LoggingConfig {
                level: lookup("APP_LOGGING_LEVEL").unwrap_or(defaults.logging.level),
                format: parse_or(lookup("APP_LOGGING_FORMAT"), defaults.logging.format),
            },
            database: DatabaseConfig {
                kind,
                host: lookup("APP_DATABASE_HOST").unwrap_or(defaults.database.host),
                port: parse_or(lookup("APP_DATABASE_PORT"), defaults.database.port),
                user: lookup("APP_DATABASE_USER").unwrap_or(defaults.database.user),
                password: lookup("APP_DATABASE_PASSWORD").unwrap_or(defaults.database.password),
                dbname: lookup("APP_DATABASE_DBNAME").unwrap_or(defaults.database.dbname),
                sslmode: lookup("APP_DATABASE_SSLMODE").unwrap_or(defaults.database.sslmode),
                max_connections: parse_or(
                    lookup("APP_DATABASE_MAX_CONNECTIONS"),
                    defaults.database.max_connections,
                ),
            },
        })
    }

    /// Load from a YAML file. Missing sections and fields take their
    /// defaults; keys this config does not know are ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

fn parse_or<T: core::str::FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse `500ms`, `5s`, `2m`, `1h` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits.parse().ok()?;

    match unit.trim() {
        "" | "s" => Some(Duration::from_secs(value)),
        "ms" => Some(Duration::from_millis(value)),
        "m" => Some(Duration::from_secs(value.checked_mul(60)?)),
        "h" => Some(Duration::from_secs(value.checked_mul(3600)?)),
        _ => None,
    }
}

mod duration_str {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}ms", value.as_millis()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
            Raw::Text(text) => super::parse_duration(&text)
                .ok_or_else(|| de::Error::custom(format!("invalid duration '{text}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.kind, DatabaseKind::Memory);
        assert_eq!(cfg.database.dbname, "transaction_routine");
    }

    #[test]
    fn environment_overrides_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("APP_SERVER_PORT", "9090"),
            ("APP_SERVER_REQUEST_TIMEOUT", "250ms"),
            ("APP_LOGGING_LEVEL", "debug"),
            ("APP_LOGGING_FORMAT", "pretty"),
            ("APP_DATABASE_TYPE", "postgres"),
            ("APP_DATABASE_HOST", "db"),
            ("APP_DATABASE_MAX_CONNECTIONS", "3"),
        ]))
        .unwrap();

        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.request_timeout, Duration::from_millis(250));
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
        assert_eq!(cfg.database.kind, DatabaseKind::Postgres);
        assert_eq!(cfg.database.host, "db");
        assert_eq!(cfg.database.max_connections, 3);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("APP_SERVER_PORT", "not-a-port"),
            ("APP_SERVER_REQUEST_TIMEOUT", "soon"),
        ]))
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn unknown_database_type_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("APP_DATABASE_TYPE", "mysql")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedDatabase(t) if t == "mysql"));
    }

    #[test]
    fn yaml_file_contents_fill_missing_fields_with_defaults() {
        let cfg = AppConfig::from_yaml(
            r#"
server:
  port: 3000
  request_timeout: 2s
  readtimeout: 5s
database:
  type: postgres
  host: pg
  dbname: ledger
"#,
        )
        .unwrap();

        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.request_timeout, Duration::from_secs(2));
        assert_eq!(cfg.database.kind, DatabaseKind::Postgres);
        assert_eq!(cfg.database.host, "pg");
        assert_eq!(cfg.database.dbname, "ledger");
        assert_eq!(cfg.database.port, 5432);
        assert_eq!(cfg.logging, LoggingConfig::default());
    }

    #[test]
    fn json_contents_still_load() {
        let cfg = AppConfig::from_yaml(
            r#"{"server": {"request_timeout": 7}, "logging": {"level": "debug"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.server.request_timeout, Duration::from_secs(7));
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn config_file_is_read_from_disk() {
        let path = std::env::temp_dir().join(format!("txroutine-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "server:\n  port: 4000\nlogging:\n  format: pretty\n").unwrap();

        let cfg = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = AppConfig::from_yaml("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = AppConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { path, .. } if path.contains("not/here.json")));
    }

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("1500ms"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("5d"), None);
        assert_eq!(parse_duration("ms"), None);
    }
}
