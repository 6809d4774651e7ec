use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of software an environment is cloned from.
///
/// Closed set: adding a kind means adding a template and a service port.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    Nginx,
}

impl EnvironmentKind {
    /// All supported kinds, in display order.
    pub const ALL: [EnvironmentKind; 1] = [EnvironmentKind::Nginx];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nginx => "nginx",
        }
    }

    /// Port the service listens on inside the instance.
    #[must_use]
    pub fn service_port(self) -> u16 {
        match self {
            Self::Nginx => 80,
        }
    }
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an environment kind string names no supported kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported environment kind: {0}")]
pub struct UnsupportedKind(pub String);

impl FromStr for EnvironmentKind {
    type Err = UnsupportedKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnsupportedKind(s.to_string()))
    }
}

/// Fields extracted from a completed checkout that describe the environment to build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub customer_email: String,
    #[serde(rename = "oss_type")]
    pub environment_kind: EnvironmentKind,
    #[serde(rename = "subdomain")]
    pub requested_name: String,
    pub duration_days: u32,
}

/// Final state reported back to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionStatus {
    Active,
    Failed,
}

/// What the caller persists against its billing record after a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvisioningResult {
    pub vmid: u32,
    pub tunnel_id: String,
    pub url: String,
    pub status: ProvisionStatus,
}

/// Identifiers needed to decommission an environment, recovered from the
/// caller's billing record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanupRequest {
    pub vmid: u32,
    pub tunnel_id: String,
    pub subdomain: String,
}

/// Descriptor the instance fetches on first boot to learn who it is.
///
/// Published once per instance id and never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnvironmentMetadata {
    pub vmid: u32,
    pub hostname: String,
    pub subdomain: String,
    pub customer_email: String,
    pub oss_type: EnvironmentKind,
    pub url: String,
    pub tunnel_token: String,
    #[serde(with = "utc_z")]
    pub created_at: DateTime<Utc>,
}

/// `2024-05-01T09:30:00.000000Z` form for timestamps.
mod utc_z {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
