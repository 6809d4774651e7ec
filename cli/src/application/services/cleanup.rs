//! Teardown of a previously provisioned environment.
//!
//! Unlike rollback this is driven by identifiers the caller kept, not by a
//! ledger, so any of the resources may already be gone. Every step runs
//! regardless of how the previous one went.

use std::fmt;

use demoenv_common::CleanupRequest;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::application::ports::{Platform, ProgressReporter, Removal};
use crate::application::services::{
    compute::ComputeManager, dns::DnsManager, metadata::MetadataPublisher, tunnel::TunnelManager,
};
use crate::domain::ProvisionerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStep {
    Instance,
    Metadata,
    DnsRecord,
    Tunnel,
}

impl fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Instance => "delete instance",
            Self::Metadata => "remove metadata",
            Self::DnsRecord => "delete dns record",
            Self::Tunnel => "delete tunnel",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Removed,
    NotFound,
    Failed { reason: String },
}

impl From<anyhow::Result<Removal>> for StepOutcome {
    fn from(result: anyhow::Result<Removal>) -> Self {
        match result {
            Ok(Removal::Removed) => Self::Removed,
            Ok(Removal::NotFound) => Self::NotFound,
            Err(e) => Self::Failed {
                reason: format!("{e:#}"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: CleanupStep,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub steps: Vec<StepReport>,
}

impl CleanupReport {
    /// True when nothing failed; `not_found` counts as clean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.steps
            .iter()
            .all(|s| !matches!(s.outcome, StepOutcome::Failed { .. }))
    }

    #[must_use]
    pub fn outcome_of(&self, step: CleanupStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.outcome)
    }
}

pub struct CleanupSaga<'a, P: Platform, R: ProgressReporter> {
    platform: &'a P,
    config: &'a ProvisionerConfig,
    reporter: &'a R,
}

impl<'a, P: Platform, R: ProgressReporter> CleanupSaga<'a, P, R> {
    pub fn new(platform: &'a P, config: &'a ProvisionerConfig, reporter: &'a R) -> Self {
        Self {
            platform,
            config,
            reporter,
        }
    }

    /// Attempts every teardown step and reports each outcome. Never fails.
    #[instrument(skip(self, request), fields(vmid = request.vmid, name = %request.subdomain))]
    pub async fn run(&self, request: &CleanupRequest) -> CleanupReport {
        let compute = ComputeManager::new(self.platform, &self.config.compute);
        let dns = DnsManager::new(self.platform, &self.config.domain);

        let mut steps = Vec::with_capacity(4);

        self.reporter.step(&format!("{}...", CleanupStep::Instance));
        let outcome = compute.stop_and_delete(request.vmid).await.into();
        steps.push(self.report(CleanupStep::Instance, outcome));

        self.reporter.step(&format!("{}...", CleanupStep::Metadata));
        let outcome = MetadataPublisher::new(self.platform)
            .remove(request.vmid)
            .await
            .into();
        steps.push(self.report(CleanupStep::Metadata, outcome));

        self.reporter.step(&format!("{}...", CleanupStep::DnsRecord));
        let outcome = dns.delete_by_name(&request.subdomain).await.into();
        steps.push(self.report(CleanupStep::DnsRecord, outcome));

        self.reporter.step(&format!("{}...", CleanupStep::Tunnel));
        let outcome = TunnelManager::new(self.platform)
            .delete(&request.tunnel_id)
            .await
            .into();
        steps.push(self.report(CleanupStep::Tunnel, outcome));

        CleanupReport { steps }
    }

    fn report(&self, step: CleanupStep, outcome: StepOutcome) -> StepReport {
        match &outcome {
            StepOutcome::Removed => {
                info!(%step, "removed");
                self.reporter.success(&format!("{step}: removed"));
            }
            StepOutcome::NotFound => {
                info!(%step, "already gone");
                self.reporter.success(&format!("{step}: not found"));
            }
            StepOutcome::Failed { reason } => {
                warn!(%step, %reason, "cleanup step failed");
                self.reporter.warn(&format!("{step}: {reason}"));
            }
        }
        StepReport { step, outcome }
    }
}
