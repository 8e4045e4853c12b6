use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ExtractError;

/// File name looked up in the working directory when no config is given.
pub const DEFAULT_CONFIG_FILE: &str = "jstrans.json";

/// Configuration for the extractor.
///
/// Built once and handed to [`crate::JsExtractor::new`]; the extractor never
/// mutates it afterwards.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorConfig {
    /// Object names holding the translator (e.g., ["Translator"])
    #[serde(default = "default_translator_objects")]
    pub translator_objects: Vec<String>,

    /// Method names called on the translator (e.g., ["trans", "transChoice"])
    #[serde(default = "default_translator_methods")]
    pub translator_methods: Vec<String>,

    /// Domain used when a call site does not name one
    #[serde(default = "default_domain")]
    pub default_domain: String,

    /// Prepended to the message to build its default translation
    #[serde(default)]
    pub prefix: String,

    /// File extensions to scan, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns for files to skip (e.g., ["**/vendor/**"])
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_translator_objects() -> Vec<String> {
    vec!["Translator".to_string()]
}

fn default_translator_methods() -> Vec<String> {
    vec!["trans".to_string(), "transChoice".to_string()]
}

fn default_domain() -> String {
    "messages".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["js".to_string(), "jsx".to_string()]
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            translator_objects: default_translator_objects(),
            translator_methods: default_translator_methods(),
            default_domain: default_domain(),
            prefix: String::new(),
            extensions: default_extensions(),
            exclude: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ExtractorConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_string(json_str: &str) -> Result<Self> {
        let config: ExtractorConfig = serde_json::from_str(json_str)
            .with_context(|| "Failed to parse config JSON string")?;
        Ok(config)
    }

    /// Try to load from the default config file, or return the default config
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject configurations the extractor cannot work with.
    ///
    /// An empty name list would compile to a fallback pattern matching the
    /// empty string, so both lists must hold at least one non-empty name.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.translator_objects.iter().all(|name| name.is_empty()) {
            return Err(ExtractError::InvalidConfig(
                "translatorObjects must contain at least one name".to_string(),
            ));
        }
        if self.translator_methods.iter().all(|name| name.is_empty()) {
            return Err(ExtractError::InvalidConfig(
                "translatorMethods must contain at least one name".to_string(),
            ));
        }
        if self.default_domain.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "defaultDomain must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn is_translator_object(&self, name: &str) -> bool {
        self.translator_objects.iter().any(|candidate| candidate == name)
    }

    pub(crate) fn is_translator_method(&self, name: &str) -> bool {
        self.translator_methods.iter().any(|candidate| candidate == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.translator_objects, vec!["Translator"]);
        assert_eq!(config.translator_methods, vec!["trans", "transChoice"]);
        assert_eq!(config.default_domain, "messages");
        assert_eq!(config.prefix, "");
        assert_eq!(config.extensions, vec!["js", "jsx"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ExtractorConfig::from_json_string(
            r#"{ "translatorObjects": ["I18n"], "prefix": "__" }"#,
        )
        .unwrap();
        assert_eq!(config.translator_objects, vec!["I18n"]);
        assert_eq!(config.translator_methods, vec!["trans", "transChoice"]);
        assert_eq!(config.prefix, "__");
        assert_eq!(config.default_domain, "messages");
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let config = ExtractorConfig {
            translator_methods: vec![],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ExtractError::InvalidConfig(_))
        ));

        let config = ExtractorConfig {
            default_domain: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
