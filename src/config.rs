//! Configuration for the order service.
//!
//! Loaded from a TOML file; every section has defaults so an empty file (or
//! no file at all) yields a runnable in-memory setup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::order::DEFAULT_SHIPPING_EDITABLE_STATUS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.message().to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub statuses: StatusConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 5,
        }
    }
}

/// Seed data for the two status tables. The first entry of each list is
/// the status assigned to new orders.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    pub fulfillment: Vec<String>,
    pub customer_service: Vec<String>,
    /// Fulfillment status in which shipping details may be edited on their own
    pub shipping_editable: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            fulfillment: vec![
                "order received".to_string(),
                DEFAULT_SHIPPING_EDITABLE_STATUS.to_string(),
                "shipped".to_string(),
                "delivered".to_string(),
            ],
            customer_service: vec![
                "none".to_string(),
                "inquiry open".to_string(),
                "resolved".to_string(),
            ],
            shipping_editable: DEFAULT_SHIPPING_EDITABLE_STATUS.to_string(),
        }
    }
}

/// Products known to the in-memory catalog
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub products: Vec<Uuid>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        contents.parse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".to_string()));
        }

        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return Err(ConfigError::Validation(
                "storage.database_url is required for the postgres backend".to_string(),
            ));
        }

        validate_status_list("statuses.fulfillment", &self.statuses.fulfillment)?;
        validate_status_list("statuses.customer_service", &self.statuses.customer_service)?;

        if !self.statuses.fulfillment.contains(&self.statuses.shipping_editable) {
            return Err(ConfigError::Validation(format!(
                "statuses.shipping_editable {:?} is not a fulfillment status",
                self.statuses.shipping_editable
            )));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

impl std::str::FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

fn validate_status_list(section: &str, names: &[String]) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::Validation(format!("{section} must not be empty")));
    }

    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{section} contains an empty name")));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Validation(format!("{section} lists {name:?} twice")));
        }
    }

    Ok(())
}
