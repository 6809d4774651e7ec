//! `demoenv provision`: create one environment end to end.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use demoenv_common::{EnvironmentKind, ProvisionRequest};
use serde::Deserialize;

use crate::app::AppContext;
use crate::application::services::ProvisioningSaga;
use crate::domain::environment::validate_request;
use crate::domain::{ProvisionError, ValidationError};
use crate::output::{TerminalReporter, human, json};

#[derive(Args)]
pub struct ProvisionArgs {
    /// Customer contact address
    #[arg(long, required_unless_present = "request")]
    pub email: Option<String>,

    /// Environment kind (nginx)
    #[arg(long, required_unless_present = "request")]
    pub kind: Option<String>,

    /// Subdomain to publish under: 1-12 of [a-z0-9-], no leading or trailing hyphen
    #[arg(long, required_unless_present = "request")]
    pub name: Option<String>,

    /// Requested lifetime in days
    #[arg(long, required_unless_present = "request", value_parser = clap::value_parser!(u32).range(1..))]
    pub days: Option<u32>,

    /// Read the request as JSON from a file, or from stdin with `-`
    #[arg(long, value_name = "FILE", conflicts_with_all = ["email", "kind", "name", "days"])]
    pub request: Option<PathBuf>,
}

impl ProvisionArgs {
    /// Builds the request from flags or the request document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or parsed, or the
    /// kind is not supported.
    pub fn to_request(&self) -> Result<ProvisionRequest> {
        if let Some(path) = &self.request {
            return read_request(path);
        }
        let (Some(email), Some(kind), Some(name), Some(days)) =
            (&self.email, &self.kind, &self.name, self.days)
        else {
            anyhow::bail!("--email, --kind, --name and --days are required without --request");
        };
        Ok(ProvisionRequest {
            customer_email: email.clone(),
            environment_kind: parse_kind(kind)?,
            requested_name: name.clone(),
            duration_days: days,
        })
    }
}

/// Request document as the upstream checkout sends it. The kind stays a
/// string until it is checked, so an unknown kind is a validation error
/// rather than a parse error.
#[derive(Deserialize)]
struct RequestDocument {
    customer_email: String,
    oss_type: String,
    subdomain: String,
    duration_days: u32,
}

impl RequestDocument {
    fn into_request(self) -> Result<ProvisionRequest, ProvisionError> {
        Ok(ProvisionRequest {
            environment_kind: parse_kind(&self.oss_type)?,
            customer_email: self.customer_email,
            requested_name: self.subdomain,
            duration_days: self.duration_days,
        })
    }
}

fn parse_kind(kind: &str) -> Result<EnvironmentKind, ProvisionError> {
    kind.parse::<EnvironmentKind>()
        .map_err(|e| ProvisionError::from(ValidationError::from(e)))
}

fn read_request(path: &Path) -> Result<ProvisionRequest> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?
    };
    let document: RequestDocument =
        serde_json::from_str(&text).context("invalid request document")?;
    Ok(document.into_request()?)
}

/// Run the provision command.
///
/// # Errors
///
/// Returns the provisioning error after rollback, or a config/connection error.
pub async fn run(app: &AppContext, args: &ProvisionArgs) -> Result<()> {
    let request = args.to_request()?;
    validate_request(&request).map_err(ProvisionError::from)?;

    let (env, config) = app.load_config()?;
    let platform = env.connect()?;
    let reporter = TerminalReporter::new(&app.output);

    let report = ProvisioningSaga::new(&platform, &config, &reporter)
        .provision(&request)
        .await?;

    if app.is_json() {
        json::print(&report.result)?;
    } else {
        human::provisioned(&app.output, &report.result);
    }
    Ok(())
}
