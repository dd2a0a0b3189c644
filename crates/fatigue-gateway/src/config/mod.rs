//! Gateway config loader.
//!
//! Sources, lowest precedence first:
//! - optional YAML tuning file (strict parsing, `deny_unknown_fields`)
//! - environment variables (backend credentials, CORS origins, listen override)
//!
//! Missing backend credentials are a startup error, never a runtime one.
//! `.env` is loaded by the binary before logging starts, so it counts as
//! environment here.

pub mod schema;

use std::fs;
use std::path::Path;

use fatigue_core::error::{FatigueError, Result};

pub use schema::{CorsSection, FileConfig, GatewayConfig, GatewaySection, InfluxSection, WriteSection};

/// Default tuning file, read from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "fatigue.yaml";
/// Bucket used when `INFLUX_BUCKET` is unset.
pub const DEFAULT_BUCKET: &str = "public-data";

/// Load the tuning file and the process environment.
pub fn load_from_env() -> Result<GatewayConfig> {
    let lookup = |key: &str| std::env::var(key).ok();
    let path = lookup("FATIGUE_CONFIG").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let file = if Path::new(&path).exists() {
        let s = fs::read_to_string(&path)
            .map_err(|e| FatigueError::Configuration(format!("read {path} failed: {e}")))?;
        parse_file(&s)?
    } else {
        FileConfig::default()
    };

    resolve(file, lookup)
}

/// Parse the YAML tuning file.
pub fn parse_file(s: &str) -> Result<FileConfig> {
    serde_yaml::from_str(s)
        .map_err(|e| FatigueError::Configuration(format!("invalid yaml: {e}")))
}

/// Combine a parsed tuning file with environment lookups and validate.
pub fn resolve<F>(file: FileConfig, lookup: F) -> Result<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let missing: Vec<&str> = ["INFLUX_URL", "INFLUX_TOKEN", "INFLUX_ORG"]
        .into_iter()
        .filter(|k| non_empty(*k).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(FatigueError::Configuration(format!(
            "{} must be set in env",
            missing.join(", ")
        )));
    }

    let influx = InfluxSection {
        url: non_empty("INFLUX_URL").unwrap_or_default().trim_end_matches('/').to_string(),
        token: non_empty("INFLUX_TOKEN").unwrap_or_default(),
        org: non_empty("INFLUX_ORG").unwrap_or_default(),
        bucket: non_empty("INFLUX_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
    };

    let mut gateway = file.gateway;
    if let Some(listen) = non_empty("FATIGUE_LISTEN") {
        gateway.listen = listen;
    }

    let cors = CorsSection::parse(&lookup("FRONTEND_ORIGINS").unwrap_or_default());

    let cfg = GatewayConfig {
        gateway,
        write: file.write,
        influx,
        cors,
    };
    cfg.validate()?;
    Ok(cfg)
}
