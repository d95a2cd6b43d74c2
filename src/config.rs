//! Server configuration from the environment

use crate::http_generator::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CACHE_FILE: &str = "prompt-cache.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Trimmed; `None` when unset or blank
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub cache_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
        }
    }
}

impl ServerConfig {
    /// Load `.env` files, then read the process environment
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("PORT is not a valid port: {}", v))?,
            None => defaults.port,
        };

        let request_timeout = match get("OPENAI_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse::<u64>()
                    .with_context(|| format!("OPENAI_TIMEOUT_SECS is not a number: {}", v))?,
            ),
            None => defaults.request_timeout,
        };

        Ok(Self {
            port,
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or(defaults.model),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout,
            cache_file: get("GUIDE_CACHE_FILE").map(PathBuf::from).unwrap_or(defaults.cache_file),
        })
    }
}

/// `server/.env.local`, else `.env.local`, else `.env`
fn load_dotenv() {
    for candidate in ["server/.env.local", ".env.local"] {
        if Path::new(candidate).exists() {
            if let Err(e) = dotenv::from_path(candidate) {
                tracing::warn!("Failed to load {}: {}", candidate, e);
            }
            return;
        }
    }
    dotenv::dotenv().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ServerConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("OPENAI_API_KEY", "  sk-test \n"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_TIMEOUT_SECS", "5"),
            ("GUIDE_CACHE_FILE", "/tmp/guides.json"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        assert_eq!(cfg.cache_file, PathBuf::from("/tmp/guides.json"));
    }

    #[test]
    fn test_blank_key_means_no_credential() {
        let cfg = config(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
