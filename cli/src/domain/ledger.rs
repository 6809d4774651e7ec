//! Per-attempt record of what a provisioning run has created.

use std::fmt;

use serde::Serialize;

/// Kind of external resource an environment is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Instance,
    Metadata,
    DnsRecord,
    Tunnel,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Instance => "instance",
            Self::Metadata => "metadata",
            Self::DnsRecord => "dns record",
            Self::Tunnel => "tunnel",
        })
    }
}

/// A resource that exists because of the current run, carrying exactly the
/// identifiers needed to remove it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Compensation {
    Tunnel { tunnel_id: String },
    DnsRecord { record_id: String },
    Metadata { instance_id: u32 },
    Instance { instance_id: u32 },
}

impl Compensation {
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Tunnel { .. } => ResourceKind::Tunnel,
            Self::DnsRecord { .. } => ResourceKind::DnsRecord,
            Self::Metadata { .. } => ResourceKind::Metadata,
            Self::Instance { .. } => ResourceKind::Instance,
        }
    }
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tunnel { tunnel_id } => write!(f, "tunnel {tunnel_id}"),
            Self::DnsRecord { record_id } => write!(f, "dns record {record_id}"),
            Self::Metadata { instance_id } => write!(f, "metadata for {instance_id}"),
            Self::Instance { instance_id } => write!(f, "instance {instance_id}"),
        }
    }
}

/// Append-only list of records in creation order.
///
/// There is no way to remove or reorder entries; the set is either handed to
/// rollback, which drains it newest-first, or returned with a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedResourceSet<R> {
    entries: Vec<R>,
}

impl<R> CreatedResourceSet<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: R) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest-first.
    #[must_use]
    pub fn entries(&self) -> &[R] {
        &self.entries
    }

    /// Consumes the set, yielding entries newest-first.
    pub fn into_rollback_order(self) -> impl Iterator<Item = R> {
        self.entries.into_iter().rev()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<R> {
        self.entries
    }
}

impl<R> Default for CreatedResourceSet<R> {
    fn default() -> Self {
        Self::new()
    }
}
