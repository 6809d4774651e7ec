//! Typed provisioning configuration.
//!
//! Pure types only, no I/O, no env lookup. `infra::config` reads the raw
//! environment once and builds a `ProvisionerConfig`, which is then handed
//! to every service constructor.

use std::ops::Range;
use std::time::Duration;

use demoenv_common::EnvironmentKind;

use crate::domain::error::ConfigError;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_ID_RANGE: Range<u32> = 9000..10_000;
pub const DEFAULT_NGINX_TEMPLATE: u32 = 8011;
pub const DEFAULT_STORAGE_POOL: &str = "vm-storage";
pub const DEFAULT_CLONE_SETTLE: Duration = Duration::from_secs(5);
pub const DEFAULT_START_SETTLE: Duration = Duration::from_secs(3);
pub const DEFAULT_STOP_SETTLE: Duration = Duration::from_secs(3);
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_READINESS_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

// ── Config schema ────────────────────────────────────────────────────────────

/// Everything the sagas need to know about the platforms they drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionerConfig {
    /// Zone the public names live under, e.g. `example.com`.
    pub domain: String,
    pub compute: ComputeSettings,
    pub readiness: ReadinessPolicy,
}

/// Where and how instances are cloned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeSettings {
    /// Reserved identifier range, end exclusive.
    pub id_range: Range<u32>,
    pub storage_pool: String,
    pub nginx_template: u32,
    pub clone_settle: Duration,
    pub start_settle: Duration,
    pub stop_settle: Duration,
}

impl ComputeSettings {
    /// Template instance a kind is cloned from.
    #[must_use]
    pub fn template_for(&self, kind: EnvironmentKind) -> u32 {
        match kind {
            EnvironmentKind::Nginx => self.nginx_template,
        }
    }
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            id_range: DEFAULT_ID_RANGE,
            storage_pool: DEFAULT_STORAGE_POOL.to_string(),
            nginx_template: DEFAULT_NGINX_TEMPLATE,
            clone_settle: DEFAULT_CLONE_SETTLE,
            start_settle: DEFAULT_START_SETTLE,
            stop_settle: DEFAULT_STOP_SETTLE,
        }
    }
}

/// Polling contract for the public URL of a fresh environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Overall deadline measured from the first probe.
    pub timeout: Duration,
    /// Sleep between probes.
    pub interval: Duration,
    /// Per-request timeout.
    pub attempt_timeout: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_READINESS_TIMEOUT,
            interval: DEFAULT_READINESS_INTERVAL,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }
}

impl ProvisionerConfig {
    /// Config for `domain` with every other setting at its default.
    #[must_use]
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            compute: ComputeSettings::default(),
            readiness: ReadinessPolicy::default(),
        }
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first constraint violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.trim().is_empty() {
            return Err(ConfigError::Missing("domain"));
        }
        if self.compute.storage_pool.trim().is_empty() {
            return Err(ConfigError::Missing("storage pool"));
        }
        let (start, end) = (self.compute.id_range.start, self.compute.id_range.end);
        if start >= end {
            return Err(ConfigError::EmptyIdRange { start, end });
        }
        if self.readiness.interval.is_zero() {
            return Err(ConfigError::Zero("readiness interval"));
        }
        if self.readiness.attempt_timeout.is_zero() {
            return Err(ConfigError::Zero("readiness attempt timeout"));
        }
        Ok(())
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
