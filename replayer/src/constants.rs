//! Central Configuration Constants
//!
//! Defaults for the replay CLI. Each can be overridden by a flag or by the
//! environment variable named on the flag.

/// Default dataset path
pub const DEFAULT_DATASET: &str = "ip_addresses.csv";

/// Default ingest endpoint
pub const DEFAULT_INGEST_URL: &str = "http://localhost:5000/api/packages";

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// App name
pub const APP_NAME: &str = "Packtrace Replay";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
