//! Helm chart values and binary artifact encoding
//!
//! Profiles carry chart values as YAML text. Users may pass either plain
//! YAML or the base64 encoding of it (as exported by the catalog), so
//! [`ChartValues::parse`] accepts both and always yields plain YAML.

use crate::error::{OrchError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;
use tracing::debug;

/// Validated chart values, stored as YAML text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartValues {
    yaml: String,
}

impl ChartValues {
    /// Validate chart values given as YAML or base64-encoded YAML.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        if let Some(decoded) = decode_base64_text(trimmed) {
            if is_yaml_mapping(&decoded).is_ok() {
                debug!("Chart values were base64 encoded");
                return Ok(Self { yaml: decoded });
            }
        }

        is_yaml_mapping(raw)?;
        Ok(Self {
            yaml: raw.to_string(),
        })
    }

    /// Read and validate chart values from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn as_str(&self) -> &str {
        &self.yaml
    }

    pub fn is_empty(&self) -> bool {
        self.yaml.is_empty()
    }

    pub fn into_string(self) -> String {
        self.yaml
    }
}

fn decode_base64_text(text: &str) -> Option<String> {
    // Encoded values may be wrapped across lines.
    let joined: String = text.split_whitespace().collect();
    let bytes = STANDARD.decode(joined).ok()?;
    String::from_utf8(bytes).ok()
}

fn is_yaml_mapping(text: &str) -> Result<()> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| OrchError::InvalidChartValues(e.to_string()))?;
    match value {
        serde_yaml::Value::Mapping(_) => Ok(()),
        serde_yaml::Value::Null => Ok(()),
        _ => Err(OrchError::InvalidChartValues(
            "expected a YAML mapping at the top level".to_string(),
        )),
    }
}

/// Base64-encode a binary artifact for upload
pub fn encode_artifact(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Read a file and base64-encode its contents
pub fn encode_artifact_file(path: impl AsRef<Path>) -> Result<String> {
    let bytes = std::fs::read(path.as_ref())?;
    if bytes.is_empty() {
        return Err(OrchError::InvalidArgument(format!(
            "{} is empty",
            path.as_ref().display()
        )));
    }
    Ok(encode_artifact(&bytes))
}
