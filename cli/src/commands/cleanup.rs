//! `demoenv cleanup`: tear down an environment by its identifiers.

use anyhow::Result;
use clap::Args;
use demoenv_common::CleanupRequest;

use crate::app::AppContext;
use crate::application::services::CleanupSaga;
use crate::commands::Reported;
use crate::output::{TerminalReporter, human, json};

#[derive(Args)]
pub struct CleanupArgs {
    /// Instance id returned by `provision`
    #[arg(long)]
    pub instance_id: u32,

    /// Tunnel id returned by `provision`
    #[arg(long)]
    pub tunnel_id: String,

    /// Subdomain the environment was published under
    #[arg(long)]
    pub name: String,
}

/// Run the cleanup command. Every step is attempted; the exit code is
/// non-zero if any of them failed.
///
/// # Errors
///
/// Returns an error if config cannot be loaded or a step failed. An
/// unreachable platform fails only the steps that need it.
pub async fn run(app: &AppContext, args: &CleanupArgs) -> Result<()> {
    let (env, config) = app.load_config()?;
    let platform = env.connect()?;
    let reporter = TerminalReporter::new(&app.output);

    let request = CleanupRequest {
        vmid: args.instance_id,
        tunnel_id: args.tunnel_id.clone(),
        subdomain: args.name.clone(),
    };
    let report = CleanupSaga::new(&platform, &config, &reporter)
        .run(&request)
        .await;

    if app.is_json() {
        json::print(&report)?;
    } else {
        human::cleanup(&app.output, &report);
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(Reported("cleanup incomplete").into())
    }
}
