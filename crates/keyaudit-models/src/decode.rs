use std::path::Path;

use thiserror::Error;

use crate::manifest::ModelManifest;

/// Why a file could not be decoded into a model manifest.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml decode error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported file type: {0}")]
    UnsupportedExtension(String),
}

/// Turns a file into the manifest of the model named `name`.
pub trait ModelDecoder {
    fn decode(&self, name: &str, path: &Path) -> Result<ModelManifest, DecodeError>;
}

impl<F> ModelDecoder for F
where
    F: Fn(&str, &Path) -> Result<ModelManifest, DecodeError>,
{
    fn decode(&self, name: &str, path: &Path) -> Result<ModelManifest, DecodeError> {
        self(name, path)
    }
}

/// Decodes `.toml` and `.json` manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestDecoder;

impl ModelDecoder for ManifestDecoder {
    fn decode(&self, _name: &str, path: &Path) -> Result<ModelManifest, DecodeError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "toml" => {
                let content = std::fs::read_to_string(path)?;
                Ok(toml::from_str(&content)?)
            }
            "json" => {
                let content = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&content)?)
            }
            _ => Err(DecodeError::UnsupportedExtension(
                path.display().to_string(),
            )),
        }
    }
}
