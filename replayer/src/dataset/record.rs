use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// One CSV row, untyped. Parsing happens in [`decode`] so a bad cell skips
/// only its own row.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    #[serde(rename = "ip address")]
    pub ip: String,
    #[serde(rename = "Latitude")]
    pub latitude: String,
    #[serde(rename = "Longitude")]
    pub longitude: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    pub suspicious: String,
}

/// Package as POSTed to the ingest server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WirePackage {
    pub ip: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Unix epoch seconds
    pub timestamp: i64,
    /// 0 or 1
    pub suspicious: u8,
    /// `%Y-%m-%d %H:%M:%S`, local time
    pub human_readable_time: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid timestamp format: {0:?}")]
    Timestamp(String),

    #[error("timestamp out of range: {0}")]
    TimestampRange(i64),

    #[error("invalid {field}: {value:?}")]
    Number { field: &'static str, value: String },

    #[error("unreadable row: {0}")]
    Row(#[from] csv::Error),
}

pub const HUMAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decode one dataset row. Pure; no I/O.
pub fn decode(row: &RawRow) -> Result<WirePackage, DecodeError> {
    let timestamp: i64 = row.timestamp
        .parse()
        .map_err(|_| DecodeError::Timestamp(row.timestamp.clone()))?;

    let human_readable_time = Local
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or(DecodeError::TimestampRange(timestamp))?
        .format(HUMAN_TIME_FORMAT)
        .to_string();

    // labels come as "1", "0" or "1.0"; anything non-zero after truncation is set
    let label = parse_number("suspicious", &row.suspicious)?;

    Ok(WirePackage {
        ip: row.ip.clone(),
        latitude: parse_number("latitude", &row.latitude)?,
        longitude: parse_number("longitude", &row.longitude)?,
        timestamp,
        suspicious: u8::from(label.trunc() != 0.0),
        human_readable_time,
    })
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, DecodeError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DecodeError::Number { field, value: value.to_string() })
}
