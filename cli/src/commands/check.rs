//! `demoenv check`: is a subdomain free to hand out?

use anyhow::Result;
use clap::Args;
use demoenv_common::validate_subdomain;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::services::check_availability;
use crate::domain::{ProvisionError, ValidationError};
use crate::output::{human, json};

#[derive(Args)]
pub struct CheckArgs {
    /// Subdomain to look up
    pub name: String,
}

#[derive(Serialize)]
struct Availability<'a> {
    name: &'a str,
    available: bool,
}

/// Run the check command.
///
/// # Errors
///
/// Returns a validation error for a malformed name, or an error if the DNS
/// zone cannot be queried.
pub async fn run(app: &AppContext, args: &CheckArgs) -> Result<()> {
    validate_subdomain(&args.name)
        .map_err(|e| ProvisionError::from(ValidationError::from(e)))?;

    let (env, config) = app.load_config()?;
    let zone = env.dns_client()?;
    let available = check_availability(&zone, &config.domain, &args.name).await?;

    if app.is_json() {
        json::print(&Availability {
            name: &args.name,
            available,
        })?;
    } else {
        human::availability(&app.output, &args.name, available);
    }
    Ok(())
}
