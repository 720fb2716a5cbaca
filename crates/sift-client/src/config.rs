//! Client configuration.
//!
//! [`ClientConfig`] is built with `with_*` setters or read from the
//! environment. Environment access goes through [`EnvReader`] so tests can
//! supply a [`MockEnv`] instead of touching process state.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ClientError, Result};

pub const ENV_BASE_URL: &str = "SIFT_BASE_URL";
pub const ENV_CATALOG_PATH: &str = "SIFT_CATALOG_PATH";
pub const ENV_SEARCH_PATH: &str = "SIFT_SEARCH_PATH";
pub const ENV_TIMEOUT_SECS: &str = "SIFT_TIMEOUT_SECS";
pub const ENV_DEBOUNCE_MS: &str = "SIFT_DEBOUNCE_MS";
pub const ENV_PAGE_SIZE: &str = "SIFT_PAGE_SIZE";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CATALOG_PATH: &str = "/api/fields";
pub const DEFAULT_SEARCH_PATH: &str = "/api/search";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Abstraction over environment variables.
pub trait EnvReader: Send + Sync {
    /// Get an environment variable value.
    fn var(&self, name: &str) -> Option<String>;
}

/// Real environment variable reader.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealEnv;

impl EnvReader for RealEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Mock environment variable reader for testing.
#[derive(Debug, Clone, Default)]
pub struct MockEnv {
    vars: HashMap<String, String>,
}

impl MockEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvReader for MockEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Where the backend lives and how the client paces its calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub catalog_path: String,
    pub search_path: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Quiet period after the last edit before a search is sent.
    pub debounce: Duration,
    /// Rows per page when the caller does not say.
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            debounce: DEFAULT_DEBOUNCE,
            page_size: sift_query::DEFAULT_LIMIT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_reader(&RealEnv)
    }

    /// Reads overrides from `env`; unset variables keep their defaults.
    pub fn from_env_reader(env: &dyn EnvReader) -> Result<Self> {
        let mut config = ClientConfig::default();
        if let Some(url) = env.var(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(path) = env.var(ENV_CATALOG_PATH) {
            config.catalog_path = path;
        }
        if let Some(path) = env.var(ENV_SEARCH_PATH) {
            config.search_path = path;
        }
        if let Some(secs) = parse_var::<u64>(env, ENV_TIMEOUT_SECS)? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64>(env, ENV_DEBOUNCE_MS)? {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(size) = parse_var::<u32>(env, ENV_PAGE_SIZE)? {
            config.page_size = size;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_catalog_path(mut self, path: impl Into<String>) -> Self {
        self.catalog_path = path.into();
        self
    }

    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    pub fn catalog_url(&self) -> String {
        join_url(&self.base_url, &self.catalog_path)
    }

    pub fn search_url(&self) -> String {
        join_url(&self.base_url, &self.search_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn parse_var<T>(env: &dyn EnvReader, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = env.var(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ClientError::InvalidConfig {
            name: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
}
