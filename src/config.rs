//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};

/// Connection pool budget and timeouts for the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Connections the Mongo driver keeps open; must not exceed `max_size`
    pub min_size: usize,
    /// Upper bound on concurrently checked-out connections
    pub max_size: usize,
    /// Budget for the start-up ping
    pub connect_timeout: Duration,
    /// Budget for a single store operation
    pub socket_timeout: Duration,
    /// Budget for checking a connection out of the pool
    pub server_selection_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_size: 10,
            max_size: 50,
            connect_timeout: Duration::from_millis(30_000),
            socket_timeout: Duration::from_millis(30_000),
            server_selection_timeout: Duration::from_millis(30_000),
        }
    }
}

/// Server configuration parameters.
///
/// Loaded once at start-up. Everything except the API key has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document store connection URL
    pub database_url: String,
    /// Database name within the store
    pub database_name: String,
    /// Connect to the store over TLS
    pub store_tls: bool,
    /// Accept store certificates that fail validation
    pub store_tls_allow_invalid_certificates: bool,
    /// Shared secret expected in the `x-api-key` header
    pub api_key: String,
    /// HTTP server port
    pub server_port: u16,
    /// Store connection pool settings
    pub pool: PoolConfig,
    /// Whether an empty result for the per-user query is reported as 404
    pub empty_user_lists_not_found: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// A `.env` file in the working directory is loaded first, without
    /// overriding variables already set.
    ///
    /// - `MONGODB_URL` - Store connection URL, `mongodb://`, `mongodb+srv://`
    ///   or `memory://` (default: mongodb://localhost:27017)
    /// - `DATABASE_NAME` - Database name (default: todo_lists)
    /// - `STORE_TLS` - Use TLS for the store connection (default: true)
    /// - `STORE_TLS_ALLOW_INVALID_CERTIFICATES` - (default: false)
    /// - `API_KEY` - Shared secret (required)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `MIN_POOL_SIZE` / `MAX_POOL_SIZE` - Pool budget (default: 10 / 50)
    /// - `CONNECT_TIMEOUT_MS`, `SOCKET_TIMEOUT_MS`, `SERVER_SELECTION_TIMEOUT_MS`
    ///   (default: 30000 each)
    /// - `EMPTY_USER_LISTS_NOT_FOUND` - 404 on empty per-user query (default: true)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`Config::from_env`], loading the given env file instead of `.env`.
    pub fn from_env_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        dotenvy::from_path(path)
            .with_context(|| format!("failed to load env file {}", path.display()))?;
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let pool_defaults = PoolConfig::default();

        let api_key = lookup("API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            bail!("API_KEY must be set to a non-empty value");
        }

        let pool = PoolConfig {
            min_size: parse_or(&lookup, "MIN_POOL_SIZE", pool_defaults.min_size)?,
            max_size: parse_or(&lookup, "MAX_POOL_SIZE", pool_defaults.max_size)?,
            connect_timeout: millis_or(&lookup, "CONNECT_TIMEOUT_MS", pool_defaults.connect_timeout)?,
            socket_timeout: millis_or(&lookup, "SOCKET_TIMEOUT_MS", pool_defaults.socket_timeout)?,
            server_selection_timeout: millis_or(
                &lookup,
                "SERVER_SELECTION_TIMEOUT_MS",
                pool_defaults.server_selection_timeout,
            )?,
        };

        Ok(Self {
            database_url: lookup("MONGODB_URL").unwrap_or(defaults.database_url),
            database_name: lookup("DATABASE_NAME").unwrap_or(defaults.database_name),
            store_tls: parse_or(&lookup, "STORE_TLS", defaults.store_tls)?,
            store_tls_allow_invalid_certificates: parse_or(
                &lookup,
                "STORE_TLS_ALLOW_INVALID_CERTIFICATES",
                defaults.store_tls_allow_invalid_certificates,
            )?,
            api_key,
            server_port: parse_or(&lookup, "SERVER_PORT", defaults.server_port)?,
            pool,
            empty_user_lists_not_found: parse_or(
                &lookup,
                "EMPTY_USER_LISTS_NOT_FOUND",
                defaults.empty_user_lists_not_found,
            )?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "mongodb://localhost:27017".to_string(),
            database_name: "todo_lists".to_string(),
            store_tls: true,
            store_tls_allow_invalid_certificates: false,
            api_key: String::new(),
            server_port: 8000,
            pool: PoolConfig::default(),
            empty_user_lists_not_found: true,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {raw:?}")),
        None => Ok(default),
    }
}

fn millis_or<F>(lookup: &F, name: &str, default: Duration) -> anyhow::Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    parse_or(lookup, name, default_ms).map(Duration::from_millis)
}
