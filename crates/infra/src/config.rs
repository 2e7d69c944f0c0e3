//! Environment-driven configuration.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `USE_PERSISTENT_STORES` | `false` | `true` selects Postgres, anything else in-memory |
//! | `DATABASE_URL` | none | required when persistent |
//! | `DATABASE_MAX_CONNECTIONS` | `10` | pool size, `1..=100` |

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    MissingRequired(&'static str),

    #[error("DATABASE_URL must start with postgres:// or postgresql://")]
    InvalidDatabaseUrl,

    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("DATABASE_MAX_CONNECTIONS must be between 1 and 100, got {0}")]
    InvalidPoolSize(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingRequired("DATABASE_URL"));
        }
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ConfigError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(ConfigError::InvalidPoolSize(self.max_connections));
        }
        Ok(())
    }
}

/// Which backend the services are wired against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    Postgres(DatabaseConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub storage: StorageBackend,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::InMemory,
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

impl CatalogConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_persistent = lookup("USE_PERSISTENT_STORES")
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(false);

        if !use_persistent {
            return Ok(Self::default());
        }

        let url = lookup("DATABASE_URL")
            .ok_or(ConfigError::MissingRequired("DATABASE_URL"))?
            .trim()
            .to_string();

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "DATABASE_MAX_CONNECTIONS",
                    value: raw.clone(),
                })?,
            None => default_max_connections(),
        };

        let database = DatabaseConfig {
            url,
            max_connections,
        };
        database.validate()?;

        Ok(Self {
            storage: StorageBackend::Postgres(database),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_in_memory() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.storage, StorageBackend::InMemory);

        let config =
            CatalogConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "nope")])).unwrap();
        assert_eq!(config.storage, StorageBackend::InMemory);
    }

    #[test]
    fn persistent_requires_database_url() {
        let err = CatalogConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "true")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingRequired("DATABASE_URL"));
    }

    #[test]
    fn persistent_config_is_parsed() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://catalog@localhost/catalog"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
        ]))
        .unwrap();

        match config.storage {
            StorageBackend::Postgres(db) => {
                assert_eq!(db.url, "postgres://catalog@localhost/catalog");
                assert_eq!(db.max_connections, 25);
            }
            other => panic!("expected postgres, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_values() {
        let err = CatalogConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "mysql://localhost"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidDatabaseUrl);

        let err = CatalogConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("DATABASE_MAX_CONNECTIONS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));

        let err = CatalogConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidPoolSize(0));
    }
}
