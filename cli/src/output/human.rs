//! Human-readable renderings of command results.

use demoenv_common::ProvisioningResult;

use crate::application::services::{CleanupReport, StepOutcome};
use crate::output::OutputContext;

pub fn provisioned(ctx: &OutputContext, result: &ProvisioningResult) {
    ctx.header("Environment provisioned");
    ctx.kv("url        ", &result.url);
    ctx.kv("instance id", &result.vmid.to_string());
    ctx.kv("tunnel id  ", &result.tunnel_id);
}

pub fn cleanup(ctx: &OutputContext, report: &CleanupReport) {
    ctx.header("Cleanup");
    for entry in &report.steps {
        let label = entry.step.to_string();
        match &entry.outcome {
            StepOutcome::Removed => ctx.kv(&label, "removed"),
            StepOutcome::NotFound => ctx.kv(&label, "not found"),
            StepOutcome::Failed { reason } => ctx.kv(&label, &format!("failed: {reason}")),
        }
    }
    if report.is_clean() {
        ctx.success("nothing left behind");
    } else {
        ctx.error("cleanup incomplete: some resources could not be removed");
    }
}

pub fn availability(ctx: &OutputContext, name: &str, available: bool) {
    if available {
        ctx.success(&format!("{name} is available"));
    } else {
        ctx.warn(&format!("{name} is already taken"));
    }
}
