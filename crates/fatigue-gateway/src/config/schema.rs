use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use fatigue_core::error::{FatigueError, Result};

/// Fully resolved gateway configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub gateway: GatewaySection,
    pub write: WriteSection,
    pub influx: InfluxSection,
    pub cors: CorsSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        self.gateway.validate()?;
        self.write.validate()?;
        self.influx.validate()?;
        Ok(())
    }
}

/// Tuning file layout (`fatigue.yaml`). Credentials never live here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub write: WriteSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            FatigueError::Configuration(format!(
                "gateway.listen must be a valid socket address ({}): {e}",
                self.listen
            ))
        })
    }
}

/// Write buffer knobs. Defaults follow the usual InfluxDB client batching.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WriteSection {
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub queue_capacity: usize,
    pub request_timeout_ms: u64,
    pub max_retries: u32,
    pub retry_interval_ms: u64,
    pub max_retry_delay_ms: u64,
    pub shutdown_flush_timeout_ms: u64,
}

impl Default for WriteSection {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            flush_interval_ms: 1000,
            queue_capacity: 10000,
            request_timeout_ms: 10000,
            max_retries: 5,
            retry_interval_ms: 5000,
            max_retry_delay_ms: 125000,
            shutdown_flush_timeout_ms: 10000,
        }
    }
}

impl WriteSection {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(FatigueError::Configuration(
                "write.batch_size must be at least 1".into(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(FatigueError::Configuration(
                "write.queue_capacity must be at least 1".into(),
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(FatigueError::Configuration(
                "write.flush_interval_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_millis(self.max_retry_delay_ms)
    }

    pub fn shutdown_flush_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_flush_timeout_ms)
    }
}

/// Time-series backend coordinates, sourced from the environment.
#[derive(Clone)]
pub struct InfluxSection {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

impl InfluxSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(FatigueError::Configuration(format!(
                "INFLUX_URL must start with http:// or https:// (got {})",
                self.url
            )));
        }
        if self.bucket.is_empty() {
            return Err(FatigueError::Configuration("INFLUX_BUCKET must not be empty".into()));
        }
        Ok(())
    }
}

// The token must never reach the logs.
impl std::fmt::Debug for InfluxSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxSection")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Allowed cross-origin callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsSection {
    Any,
    Origins(Vec<String>),
}

impl CorsSection {
    /// Parse a comma separated origin list; empty or `*` means any origin.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsSection::Any
        } else {
            CorsSection::Origins(origins)
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
