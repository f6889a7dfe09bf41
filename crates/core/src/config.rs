//! Sectioned TOML configuration
//!
//! ```toml
//! [debounce]
//! wait_ms = 200
//! max_wait_ms = 1000
//!
//! [throttle]
//! interval_ms = 100
//!
//! [search]
//! debounce_ms = 300
//! cache_size = 50
//! ```
//!
//! Every section and field is optional and falls back to its default.

use crate::debounce::DebounceOptions;
use crate::error::{Error, Result};
use crate::throttle::ThrottleOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacerConfig {
    pub debounce: DebounceConfig,
    pub throttle: ThrottleConfig,
    pub search: SearchConfig,
}

/// `[debounce]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Quiet period in milliseconds (default: 300)
    pub wait_ms: u64,
    /// Optional ceiling between invocations
    pub max_wait_ms: Option<u64>,
    pub immediate: bool,
    pub trailing: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            wait_ms: 300,
            max_wait_ms: None,
            immediate: false,
            trailing: true,
        }
    }
}

impl DebounceConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    pub fn options(&self) -> DebounceOptions {
        DebounceOptions {
            immediate: self.immediate,
            max_wait: self.max_wait_ms.map(Duration::from_millis),
            trailing: self.trailing,
        }
    }
}

/// `[throttle]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Window length in milliseconds (default: 16, one frame at 60fps)
    pub interval_ms: u64,
    pub leading: bool,
    pub trailing: bool,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            interval_ms: 16,
            leading: true,
            trailing: true,
        }
    }
}

impl ThrottleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn options(&self) -> ThrottleOptions {
        ThrottleOptions {
            leading: self.leading,
            trailing: self.trailing,
        }
    }
}

/// `[search]` section, consumed by the search handler and session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    /// Queries shorter than this (in chars) never reach the lookup
    pub min_length: usize,
    /// Longer queries are truncated to this many chars
    pub max_length: usize,
    pub cache: bool,
    pub cache_size: usize,
    /// Results kept per outcome by a search session
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_length: 2,
            max_length: 100,
            cache: true,
            cache_size: 50,
            max_results: 10,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<()> {
        validate_search_bounds(self.min_length, self.max_length, self.cache, self.cache_size)
    }
}

/// Shared bounds check for search settings, from a file or built in code
pub fn validate_search_bounds(
    min_length: usize,
    max_length: usize,
    cache: bool,
    cache_size: usize,
) -> Result<()> {
    if max_length == 0 {
        return Err(Error::InvalidConfig("search.max_length must be at least 1".into()));
    }
    if min_length > max_length {
        return Err(Error::InvalidConfig(format!(
            "search.min_length ({}) exceeds search.max_length ({})",
            min_length, max_length
        )));
    }
    if cache && cache_size == 0 {
        return Err(Error::InvalidConfig(
            "search.cache_size must be at least 1 when caching is enabled".into(),
        ));
    }
    Ok(())
}

impl PacerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        let debounce = &self.debounce;
        if !debounce.immediate && !debounce.trailing && debounce.max_wait_ms.is_none() {
            return Err(Error::InvalidConfig(
                "debounce: at least one of immediate, trailing or max_wait_ms must be set".into(),
            ));
        }
        if self.throttle.interval_ms == 0 {
            return Err(Error::InvalidConfig("throttle.interval_ms must be at least 1".into()));
        }
        self.search.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = PacerConfig::from_toml_str("").unwrap();
        assert_eq!(config, PacerConfig::default());
        assert_eq!(config.search.debounce(), Duration::from_millis(300));
        assert_eq!(config.search.min_length, 2);
        assert_eq!(config.search.max_length, 100);
        assert!(config.search.cache);
        assert_eq!(config.search.cache_size, 50);
    }

    #[test]
    fn test_partial_sections() {
        let config = PacerConfig::from_toml_str(
            "[debounce]\nwait_ms = 200\nmax_wait_ms = 1000\n\n[throttle]\ninterval_ms = 100\ntrailing = false\n",
        )
        .unwrap();

        assert_eq!(config.debounce.wait(), Duration::from_millis(200));
        assert_eq!(config.debounce.options().max_wait, Some(Duration::from_millis(1000)));
        assert!(config.debounce.options().trailing);
        assert_eq!(config.throttle.interval(), Duration::from_millis(100));
        assert!(config.throttle.options().leading);
        assert!(!config.throttle.options().trailing);
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn test_negative_wait_is_rejected() {
        let result = PacerConfig::from_toml_str("[debounce]\nwait_ms = -5\n");
        assert!(matches!(result, Err(Error::ParseConfig(_))));
    }

    #[test]
    fn test_semantic_validation() {
        let never = PacerConfig::from_toml_str("[debounce]\nimmediate = false\ntrailing = false\n");
        assert!(matches!(never, Err(Error::InvalidConfig(_))));

        let lengths = PacerConfig::from_toml_str("[search]\nmin_length = 10\nmax_length = 5\n");
        assert!(matches!(lengths, Err(Error::InvalidConfig(_))));

        let cache = PacerConfig::from_toml_str("[search]\ncache_size = 0\n");
        assert!(matches!(cache, Err(Error::InvalidConfig(_))));

        // Size is irrelevant with caching off
        assert!(PacerConfig::from_toml_str("[search]\ncache = false\ncache_size = 0\n").is_ok());
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("pacer.toml");
        fs::write(&path, "[search]\ndebounce_ms = 150\nmax_results = 5\n")?;

        let config = PacerConfig::load(&path)?;
        assert_eq!(config.search.debounce(), Duration::from_millis(150));
        assert_eq!(config.search.max_results, 5);

        let missing = PacerConfig::load(&temp_dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(Error::ReadConfig { .. })));
        Ok(())
    }
}
