//! Instance lifecycle on the compute platform.

use tracing::{debug, info, instrument, warn};

use crate::application::ports::{CloneSpec, ComputePlatform, Removal};
use crate::domain::{ComputeSettings, ProvisionError};
use demoenv_common::EnvironmentKind;

pub struct ComputeManager<'a, C: ComputePlatform> {
    compute: &'a C,
    settings: &'a ComputeSettings,
}

impl<'a, C: ComputePlatform> ComputeManager<'a, C> {
    pub fn new(compute: &'a C, settings: &'a ComputeSettings) -> Self {
        Self { compute, settings }
    }

    /// Full clone of the kind's template onto the configured pool, then waits
    /// for the platform to settle.
    ///
    /// # Errors
    ///
    /// `Remote` if the platform rejects the clone.
    #[instrument(skip(self))]
    pub async fn clone_instance(
        &self,
        instance_id: u32,
        kind: EnvironmentKind,
        hostname: &str,
    ) -> Result<(), ProvisionError> {
        let template_id = self.settings.template_for(kind);
        self.compute
            .clone_template(&CloneSpec {
                template_id,
                new_id: instance_id,
                hostname,
                storage_pool: &self.settings.storage_pool,
            })
            .await
            .map_err(|e| ProvisionError::remote("clone template", e))?;
        info!(template_id, "instance cloned");
        tokio::time::sleep(self.settings.clone_settle).await;
        Ok(())
    }

    /// # Errors
    ///
    /// `Remote` if the platform refuses to start the instance.
    #[instrument(skip(self))]
    pub async fn start(&self, instance_id: u32) -> Result<(), ProvisionError> {
        self.compute
            .start_instance(instance_id)
            .await
            .map_err(|e| ProvisionError::remote("start instance", e))?;
        tokio::time::sleep(self.settings.start_settle).await;
        Ok(())
    }

    /// Stops (ignoring failure, it may already be stopped) then deletes.
    ///
    /// # Errors
    ///
    /// Returns the delete error; a stop error is only logged.
    #[instrument(skip(self))]
    pub async fn stop_and_delete(&self, instance_id: u32) -> anyhow::Result<Removal> {
        match self.compute.stop_instance(instance_id).await {
            Ok(()) => tokio::time::sleep(self.settings.stop_settle).await,
            Err(e) => debug!(error = %format!("{e:#}"), "stop failed, continuing with delete"),
        }
        let removal = self.compute.delete_instance(instance_id).await?;
        if removal == Removal::NotFound {
            warn!("instance already gone");
        }
        Ok(removal)
    }
}
