//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands;

/// Provision and tear down short-lived public demo environments
#[derive(Parser)]
#[command(
    name = "demoenv",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true,
    after_help = "Configuration is read from DEMOENV_* environment variables \
                  (PROXMOX_HOST, PROXMOX_USER, PROXMOX_PASSWORD, CLOUDFLARE_API_TOKEN, \
                  CLOUDFLARE_ACCOUNT_ID, CLOUDFLARE_ZONE_ID, FILESERVER_HOST, DOMAIN). \
                  PROXMOX_HOST may carry a port or an https:// prefix."
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an environment and wait until it answers
    Provision(commands::provision::ProvisionArgs),

    /// Remove an environment's instance, metadata, DNS record and tunnel
    Cleanup(commands::cleanup::CleanupArgs),

    /// Check whether a subdomain is still free
    Check(commands::check::CheckArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            no_color,
            quiet,
            json,
            command,
        } = self;
        let app = AppContext::new(&OutputFlags {
            no_color,
            quiet,
            json,
        });
        match command {
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
            Command::Provision(args) => commands::provision::run(&app, &args).await,
            Command::Cleanup(args) => commands::cleanup::run(&app, &args).await,
            Command::Check(args) => commands::check::run(&app, &args).await,
        }
    }
}
