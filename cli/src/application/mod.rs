//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` and never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;

pub use ports::{
    ArtifactStore, CloneSpec, ComputePlatform, DnsRecordInfo, DnsRecordSpec, DnsZone, Platform,
    ProgressReporter, ReadinessProbe, Removal, TunnelBroker, TunnelInfo,
};
