//! Configuration module

use std::env;
use std::path::PathBuf;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Base URL of the IP geolocation API (`{geo_api_url}/{ip}`)
    pub geo_api_url: String,

    /// Upper bound for a single geolocation lookup, in seconds
    pub geo_timeout_secs: u64,

    /// Disable to skip geolocation entirely (offline runs)
    pub geo_lookup_enabled: bool,

    /// Directory with the dashboard page, served as the router fallback
    pub static_dir: Option<PathBuf>,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            geo_api_url: env::var("GEO_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://ip-api.com/json".to_string()),

            geo_timeout_secs: env::var("GEO_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),

            geo_lookup_enabled: env::var("GEO_LOOKUP_ENABLED")
                .map(|s| s.to_lowercase() != "false" && s != "0")
                .unwrap_or(true),

            static_dir: env::var("STATIC_DIR")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),

            log_format: match env::var("LOG_FORMAT") {
                Ok(s) if s.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
