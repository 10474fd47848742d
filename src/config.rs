// Runtime configuration, read from the environment like the rest of the
// tool's settings. Every variable is optional.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const BASE_URL_ENV: &str = "PAKET_API_BASE_URL";
pub const API_KEY_ENV: &str = "PAKET_API_KEY";
pub const DATA_DIR_ENV: &str = "PAKET_DATA_DIR";
pub const TIMEOUT_ENV: &str = "PAKET_HTTP_TIMEOUT_SECS";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub data_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.into(),
            api_key: None,
            data_dir: default_data_dir(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Config::default();
        if let Some(url) = get(BASE_URL_ENV) {
            config.api_base_url = url;
        }
        config.api_key = get(API_KEY_ENV);
        if let Some(dir) = get(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(TIMEOUT_ENV) {
            let secs: u64 = raw.parse().with_context(|| {
                format!("{} must be a whole number of seconds, got {:?}", TIMEOUT_ENV, raw)
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".paket")
}
