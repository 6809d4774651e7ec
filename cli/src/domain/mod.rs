//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod environment;
pub mod error;
pub mod ledger;

pub use config::{ComputeSettings, ProvisionerConfig, ReadinessPolicy};
pub use environment::IngressRule;
pub use error::{ConfigError, ProvisionError, ValidationError};
pub use ledger::{Compensation, CreatedResourceSet, ResourceKind};
