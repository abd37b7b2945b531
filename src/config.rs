//! Parser configuration.
//!
//! Token capacities are fixed per connection at startup; they bound how
//! large a single message (attribute block included) may get before the
//! parser rejects it. Loadable from a TOML file or set directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::request::REQ_NTOKEN;
use crate::response::RSP_NTOKEN;

/// Wire-parser configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Token capacity preallocated per request.
    #[serde(default = "default_req_ntoken")]
    pub req_ntoken: usize,
    /// Token capacity preallocated per response.
    #[serde(default = "default_rsp_ntoken")]
    pub rsp_ntoken: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            req_ntoken: default_req_ntoken(),
            rsp_ntoken: default_rsp_ntoken(),
        }
    }
}

fn default_req_ntoken() -> usize {
    REQ_NTOKEN
}

fn default_rsp_ntoken() -> usize {
    RSP_NTOKEN
}

impl ParserConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(ConfigError::TomlParse)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents)
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(e) => {
                write!(f, "Failed to parse config file: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.req_ntoken, REQ_NTOKEN);
        assert_eq!(config.rsp_ntoken, RSP_NTOKEN);
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            req_ntoken = 32
            rsp_ntoken = 128
        "#;

        let config = ParserConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.req_ntoken, 32);
        assert_eq!(config.rsp_ntoken, 128);
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = ParserConfig::from_toml_str("req_ntoken = 16").unwrap();
        assert_eq!(config.req_ntoken, 16);
        assert_eq!(config.rsp_ntoken, RSP_NTOKEN);
    }
}
