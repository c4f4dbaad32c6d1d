//! Package models
//!
//! `IngestPackage` is what a producer POSTs, `StoredPackage` is what the
//! store keeps and the dashboard reads back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use validator::Validate;

/// Scalar as it may arrive on the wire: producers send timestamps as numeric
/// strings and flags as 0/1, booleans or strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseScalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Unix epoch seconds, integer-valued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "LooseScalar")]
pub struct EpochSeconds(pub i64);

impl TryFrom<LooseScalar> for EpochSeconds {
    type Error = String;

    fn try_from(value: LooseScalar) -> Result<Self, Self::Error> {
        match value {
            LooseScalar::Int(v) => Ok(Self(v)),
            // i64::MAX as f64 rounds up to 2^63, which is itself out of range
            LooseScalar::Float(v)
                if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 =>
            {
                Ok(Self(v as i64))
            }
            LooseScalar::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Self)
                .map_err(|_| format!("timestamp is not an integer: {:?}", s)),
            other => Err(format!("timestamp is not an integer: {:?}", other)),
        }
    }
}

/// Dataset-provided suspicious label. Serialized as 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "LooseScalar")]
pub struct SuspiciousFlag(pub bool);

impl SuspiciousFlag {
    pub fn is_set(self) -> bool {
        self.0
    }
}

impl TryFrom<LooseScalar> for SuspiciousFlag {
    type Error = String;

    fn try_from(value: LooseScalar) -> Result<Self, Self::Error> {
        match value {
            LooseScalar::Bool(b) => Ok(Self(b)),
            LooseScalar::Int(v) => Ok(Self(v != 0)),
            LooseScalar::Float(v) => Ok(Self(v != 0.0)),
            LooseScalar::Text(s) => {
                let s = s.trim().to_ascii_lowercase();
                match s.as_str() {
                    "true" | "yes" => Ok(Self(true)),
                    "false" | "no" | "" => Ok(Self(false)),
                    _ => s
                        .parse::<f64>()
                        .map(|v| Self(v != 0.0))
                        .map_err(|_| format!("suspicious flag is not boolean-coercible: {:?}", s)),
                }
            }
        }
    }
}

impl Serialize for SuspiciousFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(self.0))
    }
}

/// Wire record as submitted to `POST /api/packages`.
///
/// Keys outside this struct (`lat`, `lon`, `human_readable_time`, ...) are
/// dropped during deserialization.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IngestPackage {
    #[validate(length(min = 1, message = "ip must not be empty"))]
    pub ip: String,

    /// Advisory only; never stored
    pub latitude: f64,

    /// Advisory only; never stored
    pub longitude: f64,

    pub timestamp: EpochSeconds,

    pub suspicious: SuspiciousFlag,
}

/// Geographic attributes resolved from an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Normalized, enriched record held by the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPackage {
    pub ip: String,
    pub timestamp: i64,
    pub suspicious: SuspiciousFlag,
    pub server_received_at: DateTime<Utc>,
    /// Absent when enrichment failed
    #[serde(flatten)]
    pub location: Option<GeoLocation>,
}

impl StoredPackage {
    /// Build the stored form of a submission. Client coordinates are not
    /// carried over; only `location` from the resolver is kept.
    pub fn from_submission(
        package: IngestPackage,
        received_at: DateTime<Utc>,
        location: Option<GeoLocation>,
    ) -> Self {
        Self {
            ip: package.ip,
            timestamp: package.timestamp.0,
            suspicious: package.suspicious,
            server_received_at: received_at,
            location,
        }
    }

    pub fn is_suspicious(&self) -> bool {
        self.suspicious.is_set()
    }

    /// Country name, if enrichment produced a non-empty one
    pub fn country(&self) -> Option<&str> {
        self.location
            .as_ref()
            .and_then(|l| l.country.as_deref())
            .filter(|c| !c.is_empty())
    }
}
