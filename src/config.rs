use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode inference settings: {0}")]
    Decode(String),
}

/// Switches for dependency inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferSettings {
    /// Infer dependencies from `entry_point` / `entry_points` fields.
    pub entry_points: bool,
}

impl Default for InferSettings {
    fn default() -> Self {
        Self { entry_points: true }
    }
}

impl InferSettings {
    /// Decode settings from a TOON document, e.g. `entry_points: false`.
    pub fn from_toon(input: &str) -> Result<Self, ConfigError> {
        toon_format::decode_default(input).map_err(|e| ConfigError::Decode(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toon(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_is_enabled_by_default() {
        assert!(InferSettings::default().entry_points);
    }

    #[test]
    fn decodes_switch_from_toon() {
        let settings = InferSettings::from_toon("entry_points: false").unwrap();
        assert_eq!(settings, InferSettings { entry_points: false });
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = InferSettings::load("/nonexistent/infer.toon").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
