//! demoenv - short-lived public demo environments on Proxmox and Cloudflare

use clap::Parser;
use tracing_subscriber::EnvFilter;

use demoenv_cli::cli::Cli;
use demoenv_cli::commands::Reported;
use demoenv_cli::domain::{ConfigError, ProvisionError};
use demoenv_cli::output::json::format_error;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    if let Err(e) = cli.run().await {
        if e.downcast_ref::<Reported>().is_none() {
            report(&e, json);
        }
        std::process::exit(1);
    }
}

fn report(error: &anyhow::Error, json: bool) {
    if !json {
        eprintln!("Error: {error:#}");
        return;
    }
    let code = error_code(error);
    match format_error(&format!("{error:#}"), code) {
        Ok(text) => println!("{text}"),
        Err(_) => eprintln!("Error: {error:#}"),
    }
}

fn error_code(error: &anyhow::Error) -> &'static str {
    if let Some(e) = error.downcast_ref::<ProvisionError>() {
        return e.code();
    }
    if error.chain().any(|c| c.is::<ConfigError>()) {
        return "config";
    }
    "error"
}
