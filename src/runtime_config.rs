//! # Runtime Configuration Module
//!
//! Environment-driven settings read once at startup.
//!
//! ## Environment Variables
//!
//! ### `JSONAPI_BASE_URL`
//!
//! Absolute URL that canonical paths are joined onto when building links
//! (see [`JsonPath::self_link`](crate::path::JsonPath::self_link)). Any path on
//! the base is kept as a prefix.
//!
//! Default: `http://localhost:8080`
//!
//! ### `JSONAPI_REGISTRY`
//!
//! Optional path to a YAML, TOML or JSON resource registry file. The CLI uses
//! it when no `--registry` argument is given.
//!
//! ## Usage
//!
//! ```rust
//! use jsonapi_router::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env()?;
//! println!("Links are built under {}", config.base_url);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use url::Url;

/// Base URL used when `JSONAPI_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Base for absolute links
    pub base_url: Url,
    /// Registry file to load at startup
    pub registry_path: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Fails when `JSONAPI_BASE_URL` is set but is not an absolute URL.
    pub fn from_env() -> Result<Self> {
        Self::from_values(
            env::var("JSONAPI_BASE_URL").ok().as_deref(),
            env::var_os("JSONAPI_REGISTRY").map(PathBuf::from),
        )
    }

    /// Build from explicit values, applying the same defaults as [`Self::from_env`].
    ///
    /// # Errors
    ///
    /// Fails when `base_url` is not an absolute URL.
    pub fn from_values(base_url: Option<&str>, registry_path: Option<PathBuf>) -> Result<Self> {
        let raw = base_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw).with_context(|| format!("Invalid JSONAPI_BASE_URL '{raw}'"))?;
        Ok(Self {
            base_url,
            registry_path: registry_path.filter(|p| !p.as_os_str().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_values(None, None).expect("defaults");
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert!(config.registry_path.is_none());
    }

    #[test]
    fn test_explicit_values() {
        let config = RuntimeConfig::from_values(
            Some("https://api.example.com/v1/"),
            Some(PathBuf::from("registry.yaml")),
        )
        .expect("explicit");
        assert_eq!(config.base_url.path(), "/v1/");
        assert_eq!(config.registry_path, Some(PathBuf::from("registry.yaml")));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = RuntimeConfig::from_values(Some("  "), Some(PathBuf::new())).expect("blank");
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert!(config.registry_path.is_none());
    }

    #[test]
    fn test_relative_base_url_rejected() {
        assert!(RuntimeConfig::from_values(Some("/api"), None).is_err());
    }
}
