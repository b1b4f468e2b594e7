use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "keyaudit.toml";
pub const DEFAULT_MODELS_ROOT: &str = "app/Models";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("toml decode error in {path}: {source}")]
    TomlDecode {
        path: String,
        source: toml::de::Error,
    },
}

/// Settings read from `keyaudit.toml`. Command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub models_root: Option<PathBuf>,
    pub schemas: Vec<String>,
    pub suppress: SuppressConfig,
}

/// Relationships whose missing constraint or index is acknowledged, as
/// `member: table.column` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressConfig {
    pub entries: Vec<String>,
}

/// Load the config file. An explicit path must exist; the default path is
/// optional.
pub fn load_config(explicit: Option<&Path>) -> Result<AuditConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(AuditConfig::default());
            }
            default
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&path, &content)
}

fn parse_config(path: &Path, content: &str) -> Result<AuditConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::TomlDecode {
        path: path.display().to_string(),
        source,
    })
}
