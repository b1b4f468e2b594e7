use thiserror::Error;

use keyaudit_core::Error as CoreError;

use crate::config::ConfigError;
use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
