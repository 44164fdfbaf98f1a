//! Naming Convention
//!
//! Maps bare dependency names to fetchable locators.

use std::sync::LazyLock;
use regex::{Regex, RegexBuilder};

/// Names shaped like a URL (optional scheme, host or IPv4, port, path, query, fragment)
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(concat!(
        r"^(https?://)?",
        r"((([a-z0-9]([a-z0-9-]*[a-z0-9])*)\.)+[a-z]{2,}|((\d{1,3}\.){3}\d{1,3}))",
        r"(:\d+)?(/[-a-z0-9%_.~+]*)*",
        r"(\?[;&a-z0-9%_.~+=-]*)?",
        r"(#[-a-z0-9_]*)?$",
    ))
    .case_insensitive(true)
    .build()
    .expect("URL pattern is valid")
});

/// Check whether a dependency name is already a full external locator
pub fn is_url(name: &str) -> bool {
    URL_PATTERN.is_match(name)
}

/// Prefix/suffix pair wrapped around bare module names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    pub prefix: String,
    pub suffix: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            prefix: "/js/".to_string(),
            suffix: ".js".to_string(),
        }
    }
}

impl NamingConvention {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
    
    /// Get the locator to fetch for `name`
    ///
    /// URL-shaped names are returned untouched whatever `bypass` says.
    pub fn locate(&self, name: &str, bypass: bool) -> String {
        if bypass || is_url(name) {
            return name.to_string();
        }
        
        format!("{}{}{}", self.prefix, name, self.suffix)
    }
}
