//! # Configuration Module
//!
//! Configuration for the places proxy: server binding, the cache backend, the
//! upstream places provider and observability.
//!
//! ## Key Features
//! - YAML configuration parsing with serde
//! - Environment variable overrides (`PLACES_<SECTION>_<FIELD>`)
//! - Validation that reports every problem at once

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::caching::fingerprint::DEFAULT_KEY_PREFIX;
use crate::core::error::{ProxyError, ProxyResult};

/// Environment variable naming the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "PLACES_CONFIG_PATH";

/// Main proxy configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Response cache configuration
    pub cache: CacheConfig,

    /// Upstream places provider configuration
    pub upstream: UpstreamConfig,

    /// Logging and metrics
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Load configuration from `PLACES_CONFIG_PATH` if set, otherwise from
    /// defaults. Environment overrides apply in both cases.
    pub async fn load() -> ProxyResult<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from_file(path).await,
            Err(_) => {
                let mut config = Self::default();
                config.apply_env_overrides()?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Load configuration from a YAML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> ProxyResult<Self> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| ProxyError::config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text without overrides or validation
    pub fn from_yaml(content: &str) -> ProxyResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ProxyError::config(format!("Failed to parse config: {}", e)))
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> ProxyResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Variables follow the pattern `PLACES_<SECTION>_<FIELD>`, for example
    /// `PLACES_SERVER_PORT=8080` or `PLACES_CACHE_TTL=30m`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ProxyResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(addr) = lookup("PLACES_SERVER_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(port) = lookup("PLACES_SERVER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| ProxyError::config(format!("Invalid PLACES_SERVER_PORT: {}", e)))?;
        }
        if let Some(timeout) = lookup("PLACES_SERVER_REQUEST_TIMEOUT") {
            self.server.request_timeout = parse_duration("PLACES_SERVER_REQUEST_TIMEOUT", &timeout)?;
        }

        // Cache
        if let Some(backend) = lookup("PLACES_CACHE_BACKEND") {
            self.cache.backend = match backend.to_lowercase().as_str() {
                "redis" | "valkey" => CacheBackend::Redis,
                "memory" => CacheBackend::Memory,
                other => {
                    return Err(ProxyError::config(format!(
                        "Invalid PLACES_CACHE_BACKEND: {}",
                        other
                    )))
                }
            };
        }
        if let Some(prefix) = lookup("PLACES_CACHE_KEY_PREFIX") {
            self.cache.key_prefix = prefix;
        }
        if let Some(ttl) = lookup("PLACES_CACHE_TTL") {
            let ttl = parse_duration("PLACES_CACHE_TTL", &ttl)?;
            self.cache.ttl = (!ttl.is_zero()).then_some(ttl);
        }
        if let Some(url) = lookup("PLACES_REDIS_URL") {
            self.cache.redis.url = url;
        }
        if let Some(username) = lookup("PLACES_REDIS_USERNAME") {
            self.cache.redis.username = Some(username);
        }
        if let Some(password) = lookup("PLACES_REDIS_PASSWORD") {
            self.cache.redis.password = Some(password);
        }
        if let Some(interval) = lookup("PLACES_REDIS_RECONNECT_INTERVAL") {
            self.cache.redis.reconnect_interval =
                parse_duration("PLACES_REDIS_RECONNECT_INTERVAL", &interval)?;
        }

        // Upstream
        if let Some(base_url) = lookup("PLACES_UPSTREAM_BASE_URL") {
            self.upstream.base_url = base_url;
        }
        if let Some(api_key) = lookup("PLACES_API_KEY") {
            self.upstream.api_key = api_key;
        }
        if let Some(timeout) = lookup("PLACES_UPSTREAM_TIMEOUT") {
            self.upstream.timeout = parse_duration("PLACES_UPSTREAM_TIMEOUT", &timeout)?;
        }

        // Observability
        if let Some(level) = lookup("PLACES_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("PLACES_LOG_FORMAT") {
            self.observability.log_format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                other => {
                    return Err(ProxyError::config(format!(
                        "Invalid PLACES_LOG_FORMAT: {}",
                        other
                    )))
                }
            };
        }
        if let Some(enabled) = lookup("PLACES_METRICS_ENABLED") {
            self.observability.metrics_enabled = enabled
                .parse()
                .map_err(|e| ProxyError::config(format!("Invalid PLACES_METRICS_ENABLED: {}", e)))?;
        }
        if let Some(addr) = lookup("PLACES_METRICS_ADDRESS") {
            self.observability.metrics_address = addr;
        }

        Ok(())
    }

    /// Configuration validation with detailed error messages
    pub fn validate(&self) -> ProxyResult<()> {
        let mut errors = Vec::new();

        if self.server.bind_address.is_empty() {
            errors.push("server.bind_address cannot be empty".to_string());
        }
        if self.server.request_timeout.is_zero() {
            errors.push("server.request_timeout must be greater than 0".to_string());
        }

        if self.cache.key_prefix.is_empty() {
            errors.push("cache.key_prefix cannot be empty".to_string());
        }
        if self.cache.backend == CacheBackend::Redis {
            if self.cache.redis.url.is_empty() {
                errors.push("cache.redis.url cannot be empty".to_string());
            }
            if self.cache.redis.operation_timeout.is_zero() {
                errors.push("cache.redis.operation_timeout must be greater than 0".to_string());
            }
            if self.cache.redis.reconnect_interval.is_zero() {
                errors.push("cache.redis.reconnect_interval must be greater than 0".to_string());
            }
        }

        if let Err(e) = Url::parse(&self.upstream.base_url) {
            errors.push(format!("upstream.base_url is not a valid URL: {}", e));
        }
        if self.upstream.api_key.is_empty() {
            errors.push("upstream.api_key must be set (PLACES_API_KEY)".to_string());
        }
        if self.upstream.timeout.is_zero() {
            errors.push("upstream.timeout must be greater than 0".to_string());
        }

        if self.observability.metrics_enabled
            && self.observability.metrics_address.parse::<SocketAddr>().is_err()
        {
            errors.push(format!(
                "observability.metrics_address is not a socket address: {}",
                self.observability.metrics_address
            ));
        }

        if !errors.is_empty() {
            return Err(ProxyError::config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )));
        }

        Ok(())
    }
}

fn parse_duration(name: &str, value: &str) -> ProxyResult<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| ProxyError::config(format!("Invalid {}: {}", name, e)))
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: String,

    /// HTTP port
    pub port: u16,

    /// Per-request deadline applied to every incoming call
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl ServerConfig {
    /// Resolve the listen address
    pub fn socket_addr(&self) -> ProxyResult<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| ProxyError::config(format!("Invalid bind address: {}", e)))
    }
}

/// Which key-value backend holds cached responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Shared Redis/Valkey instance
    Redis,
    /// Process-local store, for development and tests
    Memory,
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Namespace prefix prepended to every cache key
    pub key_prefix: String,

    /// Entry lifetime; `None` keeps entries until evicted externally
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,

    /// Interval for purging expired entries from the memory backend
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,

    pub redis: RedisConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: Some(Duration::from_secs(24 * 60 * 60)),
            cleanup_interval: Duration::from_secs(60),
            redis: RedisConfig::default(),
        }
    }
}

/// Redis/Valkey connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    pub username: Option<String>,

    pub password: Option<String>,

    /// Timeout for establishing the connection
    #[serde(with = "humantime_serde")]
    pub connection_timeout: Duration,

    /// Timeout for a single GET/SET round trip
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,

    /// Minimum wait between connection attempts while Redis is unreachable
    #[serde(with = "humantime_serde")]
    pub reconnect_interval: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            username: None,
            password: None,
            connection_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_millis(500),
            reconnect_interval: Duration::from_secs(5),
        }
    }
}

/// Upstream places provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the Places API
    pub base_url: String,

    /// API key sent as `X-Goog-Api-Key`
    pub api_key: String,

    /// HTTP timeout for a single upstream call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://places.googleapis.com".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Logging and metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,

    pub log_format: LogFormat,

    /// Install the Prometheus exporter
    pub metrics_enabled: bool,

    /// Listen address of the Prometheus exporter
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "places_proxy=info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
