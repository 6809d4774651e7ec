//! Provisioning saga: one public environment from a validated request.

use std::fmt;

use chrono::Utc;
use demoenv_common::{EnvironmentMetadata, ProvisionRequest, ProvisionStatus, ProvisioningResult};
use serde::Serialize;
use tracing::instrument;

use crate::application::ports::{Platform, ProgressReporter, TunnelInfo};
use crate::application::services::{
    allocator::ResourceIdAllocator,
    compute::ComputeManager,
    dns::DnsManager,
    metadata::MetadataPublisher,
    readiness::ReadinessWaiter,
    saga::{Saga, run_saga},
    tunnel::TunnelManager,
};
use crate::domain::environment::{build_metadata, fqdn, public_url, tunnel_name, validate_request};
use crate::domain::{Compensation, ProvisionError, ProvisionerConfig};

/// Provisioning steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    AllocateId,
    CreateTunnel,
    FetchToken,
    ConfigureRouting,
    CreateDnsRecord,
    BuildMetadata,
    PublishMetadata,
    CloneTemplate,
    StartInstance,
    WaitReady,
}

impl ProvisionStep {
    pub const ALL: &'static [Self] = &[
        Self::AllocateId,
        Self::CreateTunnel,
        Self::FetchToken,
        Self::ConfigureRouting,
        Self::CreateDnsRecord,
        Self::BuildMetadata,
        Self::PublishMetadata,
        Self::CloneTemplate,
        Self::StartInstance,
        Self::WaitReady,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllocateId => "allocate instance id",
            Self::CreateTunnel => "create tunnel",
            Self::FetchToken => "fetch tunnel token",
            Self::ConfigureRouting => "configure tunnel routing",
            Self::CreateDnsRecord => "create dns record",
            Self::BuildMetadata => "build metadata",
            Self::PublishMetadata => "publish metadata",
            Self::CloneTemplate => "clone template",
            Self::StartInstance => "start instance",
            Self::WaitReady => "wait for readiness",
        }
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful run: the caller-facing result and what was created, oldest-first.
#[derive(Debug, Serialize)]
pub struct ProvisionReport {
    pub result: ProvisioningResult,
    pub created: Vec<Compensation>,
}

pub struct ProvisioningSaga<'a, P: Platform, R: ProgressReporter> {
    platform: &'a P,
    config: &'a ProvisionerConfig,
    reporter: &'a R,
}

impl<'a, P: Platform, R: ProgressReporter> ProvisioningSaga<'a, P, R> {
    pub fn new(platform: &'a P, config: &'a ProvisionerConfig, reporter: &'a R) -> Self {
        Self {
            platform,
            config,
            reporter,
        }
    }

    /// Validates `request`, then runs every step. Nothing external is touched
    /// when validation fails.
    ///
    /// # Errors
    ///
    /// The error of the failing step, after everything created so far has
    /// been removed.
    #[instrument(skip(self, request), fields(name = %request.requested_name, kind = %request.environment_kind))]
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionReport, ProvisionError> {
        validate_request(request)?;

        let run = ProvisionRun {
            saga: self,
            request,
            instance_id: None,
            tunnel: None,
            token: None,
            metadata: None,
        };
        let outcome = run_saga(run).await?;
        self.reporter
            .success(&format!("environment ready at {}", outcome.output.url));
        Ok(ProvisionReport {
            result: outcome.output,
            created: outcome.created,
        })
    }
}

/// State carried between steps of one attempt.
struct ProvisionRun<'s, 'a, P: Platform, R: ProgressReporter> {
    saga: &'s ProvisioningSaga<'a, P, R>,
    request: &'s ProvisionRequest,
    instance_id: Option<u32>,
    tunnel: Option<TunnelInfo>,
    token: Option<String>,
    metadata: Option<EnvironmentMetadata>,
}

fn require<T>(value: Option<T>, step: ProvisionStep) -> Result<T, ProvisionError> {
    value.ok_or(ProvisionError::StepOrder {
        step: step.as_str(),
    })
}

impl<P: Platform, R: ProgressReporter> ProvisionRun<'_, '_, P, R> {
    fn name(&self) -> &str {
        &self.request.requested_name
    }

    fn domain(&self) -> &str {
        &self.saga.config.domain
    }

    fn compute(&self) -> ComputeManager<'_, P> {
        ComputeManager::new(self.saga.platform, &self.saga.config.compute)
    }
}

impl<P: Platform, R: ProgressReporter> Saga for ProvisionRun<'_, '_, P, R> {
    type Step = ProvisionStep;
    type Record = Compensation;
    type Output = ProvisioningResult;

    fn steps(&self) -> &'static [ProvisionStep] {
        ProvisionStep::ALL
    }

    async fn execute(
        &mut self,
        step: ProvisionStep,
    ) -> Result<Option<Compensation>, ProvisionError> {
        let platform = self.saga.platform;
        self.saga.reporter.step(&format!("{step}..."));

        match step {
            ProvisionStep::AllocateId => {
                let id = ResourceIdAllocator::new(platform, self.saga.config.compute.id_range.clone())
                    .next()
                    .await?;
                self.instance_id = Some(id);
                Ok(None)
            }
            ProvisionStep::CreateTunnel => {
                let id = require(self.instance_id, step)?;
                let tunnel = TunnelManager::new(platform)
                    .create_or_replace(&tunnel_name(id, self.name()))
                    .await?;
                let record = Compensation::Tunnel {
                    tunnel_id: tunnel.id.clone(),
                };
                self.tunnel = Some(tunnel);
                Ok(Some(record))
            }
            ProvisionStep::FetchToken => {
                let tunnel_id = require(self.tunnel.as_ref(), step)?.id.clone();
                self.token = Some(TunnelManager::new(platform).token(&tunnel_id).await?);
                Ok(None)
            }
            ProvisionStep::ConfigureRouting => {
                let tunnel = require(self.tunnel.as_ref(), step)?;
                TunnelManager::new(platform)
                    .configure_routing(
                        &tunnel.id,
                        &fqdn(self.name(), self.domain()),
                        self.request.environment_kind.service_port(),
                    )
                    .await?;
                Ok(None)
            }
            ProvisionStep::CreateDnsRecord => {
                let tunnel = require(self.tunnel.as_ref(), step)?;
                let record_id = DnsManager::new(platform, self.domain())
                    .create_or_replace(self.name(), &tunnel.id)
                    .await?;
                Ok(Some(Compensation::DnsRecord { record_id }))
            }
            ProvisionStep::BuildMetadata => {
                let id = require(self.instance_id, step)?;
                let token = require(self.token.as_deref(), step)?;
                self.metadata = Some(build_metadata(
                    id,
                    self.request,
                    self.domain(),
                    token,
                    Utc::now(),
                ));
                Ok(None)
            }
            ProvisionStep::PublishMetadata => {
                let id = require(self.instance_id, step)?;
                let metadata = require(self.metadata.as_ref(), step)?;
                MetadataPublisher::new(platform).publish(id, metadata).await?;
                Ok(Some(Compensation::Metadata { instance_id: id }))
            }
            ProvisionStep::CloneTemplate => {
                let id = require(self.instance_id, step)?;
                self.compute()
                    .clone_instance(id, self.request.environment_kind, self.name())
                    .await?;
                Ok(Some(Compensation::Instance { instance_id: id }))
            }
            ProvisionStep::StartInstance => {
                let id = require(self.instance_id, step)?;
                self.compute().start(id).await?;
                Ok(None)
            }
            ProvisionStep::WaitReady => {
                let url = public_url(self.name(), self.domain());
                ReadinessWaiter::new(platform, self.saga.config.readiness)
                    .wait_until_ready(&url)
                    .await?;
                Ok(None)
            }
        }
    }

    async fn compensate(&self, record: &Compensation) -> anyhow::Result<()> {
        let platform = self.saga.platform;
        self.saga.reporter.warn(&format!("rolling back {record}"));
        match record {
            Compensation::Instance { instance_id } => {
                self.compute().stop_and_delete(*instance_id).await?;
            }
            Compensation::Metadata { instance_id } => {
                MetadataPublisher::new(platform).remove(*instance_id).await?;
            }
            Compensation::DnsRecord { record_id } => {
                DnsManager::new(platform, self.domain())
                    .delete(record_id)
                    .await?;
            }
            Compensation::Tunnel { tunnel_id } => {
                TunnelManager::new(platform).delete(tunnel_id).await?;
            }
        }
        Ok(())
    }

    fn finish(&self) -> Result<ProvisioningResult, ProvisionError> {
        let step = ProvisionStep::WaitReady;
        Ok(ProvisioningResult {
            vmid: require(self.instance_id, step)?,
            tunnel_id: require(self.tunnel.as_ref(), step)?.id.clone(),
            url: public_url(self.name(), self.domain()),
            status: ProvisionStatus::Active,
        })
    }
}
