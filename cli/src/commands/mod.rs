//! Command implementations

pub mod check;
pub mod cleanup;
pub mod provision;
pub mod version;

use thiserror::Error;

/// The command already printed why it failed; only the exit code is left.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Reported(pub &'static str);
