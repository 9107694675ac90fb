//! Renderer configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration for [`PipelineRenderer`](crate::PipelineRenderer).
///
/// ```toml
/// trace_documents = true
/// max_stages = 64
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Log every rendered stage document at trace level
    pub trace_documents: bool,

    /// Reject pipelines with more stages than this
    pub max_stages: Option<usize>,
}

impl RenderConfig {
    /// Parse from a TOML string; missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = RenderConfig::default();
        assert!(!config.trace_documents);
        assert_eq!(config.max_stages, None);
    }

    #[test]
    fn test_from_toml() {
        let config = RenderConfig::from_toml_str(
            r#"
trace_documents = true
max_stages = 16
"#,
        )
        .unwrap();

        assert!(config.trace_documents);
        assert_eq!(config.max_stages, Some(16));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = RenderConfig::from_toml_str("max_stages = 3").unwrap();
        assert_eq!(
            config,
            RenderConfig {
                trace_documents: false,
                max_stages: Some(3),
            }
        );
        assert_eq!(RenderConfig::from_toml_str("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = RenderConfig::from_toml_str("max_stages = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
