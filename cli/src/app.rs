//! Application context: unified state passed to every command handler.

use anyhow::{Context, Result};

use crate::domain::ProvisionerConfig;
use crate::infra::EnvConfig;
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags passed from the top-level CLI.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
///
/// Constructed once in `Cli::run()`. Configuration is not loaded here:
/// commands validate their input first and only then read the environment.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
}

impl AppContext {
    /// JSON mode implies quiet so stdout carries a single document.
    #[must_use]
    pub fn new(flags: &OutputFlags) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet || flags.json),
            mode,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Reads `DEMOENV_*` and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn load_config(&self) -> Result<(EnvConfig, ProvisionerConfig)> {
        let env = EnvConfig::from_env()?;
        let config = env
            .provisioner_config()
            .context("invalid DEMOENV_* configuration")?;
        tracing::debug!(?env, "configuration loaded");
        Ok((env, config))
    }
}
