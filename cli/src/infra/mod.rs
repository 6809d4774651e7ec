//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the Proxmox, Cloudflare and
//! file server HTTP adapters, the readiness probe, and environment config.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod cloudflare;
pub mod config;
pub mod fileserver;
pub mod http;
pub mod platform;
pub mod probe;
pub mod proxmox;

pub use config::EnvConfig;
pub use platform::LivePlatform;
