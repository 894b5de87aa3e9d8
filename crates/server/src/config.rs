//! Environment-driven server configuration.

use std::time::Duration;

/// Default port for the server.
const DEFAULT_PORT: u16 = 8081;
/// Default base URL of the detection model service.
const DEFAULT_DETECTOR_URL: &str = "http://127.0.0.1:8000";
/// Default deadline for the single model-service call per job.
const DEFAULT_DETECTION_TIMEOUT_SECS: u64 = 120;
/// Default retention window for terminal jobs.
const DEFAULT_RETENTION_SECS: u64 = 3600;
/// Default interval between retention sweeps.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
/// Default cap on uploaded transaction files.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub detector_url: String,
    pub detection_timeout: Duration,
    pub retention: Duration,
    pub sweep_interval: Duration,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            detector_url: DEFAULT_DETECTOR_URL.to_string(),
            detection_timeout: Duration::from_secs(DEFAULT_DETECTION_TIMEOUT_SECS),
            retention: Duration::from_secs(DEFAULT_RETENTION_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back to
    /// the default with a warning rather than refusing to start.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("RINGSIGHT_PORT")
                .or_else(|| lookup("PORT"))
                .and_then(|v| parse_or_warn("RINGSIGHT_PORT", &v))
                .unwrap_or(defaults.port),
            detector_url: lookup("RINGSIGHT_DETECTOR_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.detector_url),
            detection_timeout: lookup("RINGSIGHT_DETECTION_TIMEOUT_SECS")
                .and_then(|v| parse_or_warn("RINGSIGHT_DETECTION_TIMEOUT_SECS", &v))
                .map(Duration::from_secs)
                .unwrap_or(defaults.detection_timeout),
            retention: lookup("RINGSIGHT_RETENTION_SECS")
                .and_then(|v| parse_or_warn("RINGSIGHT_RETENTION_SECS", &v))
                .map(Duration::from_secs)
                .unwrap_or(defaults.retention),
            sweep_interval: lookup("RINGSIGHT_SWEEP_INTERVAL_SECS")
                .and_then(|v| parse_or_warn("RINGSIGHT_SWEEP_INTERVAL_SECS", &v))
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            max_upload_bytes: lookup("RINGSIGHT_MAX_UPLOAD_BYTES")
                .and_then(|v| parse_or_warn("RINGSIGHT_MAX_UPLOAD_BYTES", &v))
                .unwrap_or(defaults.max_upload_bytes),
        }
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value, "Ignoring unparseable configuration value");
            None
        }
    }
}
