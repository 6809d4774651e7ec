//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::time::Duration;

use anyhow::Result;

use crate::domain::IngressRule;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Result of deleting something that may already be gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    NotFound,
}

/// Parameters for a full clone of a template instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneSpec<'a> {
    pub template_id: u32,
    pub new_id: u32,
    pub hostname: &'a str,
    pub storage_pool: &'a str,
}

/// A tunnel as reported by the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelInfo {
    pub id: String,
    pub name: String,
}

/// A DNS record as reported by the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecordInfo {
    pub id: String,
    pub name: String,
}

/// A record to create in the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecordSpec<'a> {
    pub record_type: &'a str,
    /// Fully-qualified name.
    pub name: &'a str,
    pub target: &'a str,
    /// `1` means automatic.
    pub ttl: u32,
    pub proxied: bool,
}

// ── Platform Ports ────────────────────────────────────────────────────────────

/// Compute platform holding templates and cloned instances.
#[allow(async_fn_in_trait)]
pub trait ComputePlatform {
    /// Identifiers of every instance the platform currently knows about.
    async fn list_instances(&self) -> Result<Vec<u32>>;
    /// Full clone of `spec.template_id` into `spec.new_id`.
    async fn clone_template(&self, spec: &CloneSpec<'_>) -> Result<()>;
    async fn start_instance(&self, id: u32) -> Result<()>;
    async fn stop_instance(&self, id: u32) -> Result<()>;
    async fn delete_instance(&self, id: u32) -> Result<Removal>;
}

/// Broker that relays public traffic into instances through outbound tunnels.
#[allow(async_fn_in_trait)]
pub trait TunnelBroker {
    /// Tunnels whose name matches `name`. The broker may match loosely;
    /// callers filter on exact equality.
    async fn list_tunnels(&self, name: &str) -> Result<Vec<TunnelInfo>>;
    async fn create_tunnel(&self, name: &str, secret: &str) -> Result<TunnelInfo>;
    /// Connector credential the instance uses to open the tunnel.
    async fn tunnel_token(&self, tunnel_id: &str) -> Result<String>;
    /// Replace the tunnel's routing table.
    async fn update_ingress(&self, tunnel_id: &str, rules: &[IngressRule]) -> Result<()>;
    async fn delete_tunnel(&self, tunnel_id: &str) -> Result<Removal>;
}

/// Public DNS zone.
#[allow(async_fn_in_trait)]
pub trait DnsZone {
    /// Records named `fqdn`. Callers filter on exact equality.
    async fn list_records(&self, fqdn: &str) -> Result<Vec<DnsRecordInfo>>;
    async fn create_record(&self, spec: &DnsRecordSpec<'_>) -> Result<DnsRecordInfo>;
    async fn delete_record(&self, record_id: &str) -> Result<Removal>;
}

/// Store the instance fetches its metadata from on first boot.
///
/// Both calls return the HTTP status; interpreting it is the caller's job.
#[allow(async_fn_in_trait)]
pub trait ArtifactStore {
    async fn put(&self, path: &str, body: &[u8]) -> Result<u16>;
    async fn delete(&self, path: &str) -> Result<u16>;
}

/// Single unauthenticated GET against a public URL.
#[allow(async_fn_in_trait)]
pub trait ReadinessProbe {
    /// HTTP status of one attempt.
    ///
    /// # Errors
    ///
    /// Returns an error when no response arrived (refused, reset, timed out).
    async fn probe(&self, url: &str, timeout: Duration) -> Result<u16>;
}

/// Composite trait: any type implementing all five platform ports is a `Platform`.
pub trait Platform: ComputePlatform + TunnelBroker + DnsZone + ArtifactStore + ReadinessProbe {}

/// Blanket implementation: any type implementing all five ports is a `Platform`.
impl<T> Platform for T where T: ComputePlatform + TunnelBroker + DnsZone + ArtifactStore + ReadinessProbe
{}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
