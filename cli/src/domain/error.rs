//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, or `std::net`. Ports and adapters speak
//! `anyhow`; the services convert at the boundary into these types so callers
//! can tell a bad request from a platform outage.

use std::time::Duration;

use demoenv_common::{SubdomainError, UnsupportedKind};
use thiserror::Error;

// ── Validation errors ─────────────────────────────────────────────────────────

/// A request was rejected before any external call was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid subdomain: {0}")]
    Subdomain(#[from] SubdomainError),

    #[error(transparent)]
    UnsupportedKind(#[from] UnsupportedKind),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while turning raw settings into a `ProvisionerConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("instance id range {start}..{end} is empty")]
    EmptyIdRange { start: u32, end: u32 },

    #[error("{0} must not be empty")]
    Missing(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Everything a provisioning run can fail with.
///
/// `Remote`, `Upload` and `Timeout` are raised mid-saga and always reach the
/// caller after rollback has run; rollback failures never replace them.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no free instance id in {start}..{end}")]
    Exhausted { start: u32, end: u32 },

    #[error("{operation} failed: {cause:#}")]
    Remote {
        operation: &'static str,
        cause: anyhow::Error,
    },

    #[error("metadata upload rejected with HTTP {status}")]
    Upload { status: u16 },

    #[error("{url} did not become ready within {}s", waited.as_secs())]
    Timeout { url: String, waited: Duration },

    #[error("step '{step}' ran before the step producing its input")]
    StepOrder { step: &'static str },
}

impl ProvisionError {
    /// Wrap a port failure with the operation that was being attempted.
    pub fn remote(operation: &'static str, cause: anyhow::Error) -> Self {
        Self::Remote { operation, cause }
    }

    /// Stable machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Exhausted { .. } => "exhausted",
            Self::Remote { .. } => "remote",
            Self::Upload { .. } => "upload",
            Self::Timeout { .. } => "timeout",
            Self::StepOrder { .. } => "internal",
        }
    }
}
