//! Toolkit Configuration

use intention_loader::NamingConvention;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Toolkit configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prepended to bare module names when fetching
    pub prefix: String,
    
    /// Appended to bare module names when fetching
    pub suffix: String,
    
    /// Directory module files are read from
    pub asset_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let naming = NamingConvention::default();
        Self {
            prefix: naming.prefix,
            suffix: naming.suffix,
            asset_root: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
    
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
    
    pub fn naming(&self) -> NamingConvention {
        NamingConvention::new(self.prefix.clone(), self.suffix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prefix, "/js/");
        assert_eq!(config.suffix, ".js");
        assert!(config.asset_root.is_none());
    }
    
    #[test]
    fn test_partial_json() {
        let config = Config::from_json(r#"{"prefix": "/static/"}"#).unwrap();
        
        assert_eq!(config.prefix, "/static/");
        assert_eq!(config.suffix, ".js");
        assert_eq!(config.naming().locate("left", false), "/static/left.js");
    }
    
    #[test]
    fn test_invalid_json() {
        assert!(matches!(Config::from_json("{prefix"), Err(ConfigError::Parse(_))));
        assert!(matches!(Config::from_file("/nonexistent/intention.json"), Err(ConfigError::Io(_))));
    }
}
