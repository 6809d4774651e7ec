//! Publishing the per-instance metadata document.

use demoenv_common::EnvironmentMetadata;
use tracing::{debug, instrument};

use crate::application::ports::{ArtifactStore, Removal};
use crate::domain::ProvisionError;
use crate::domain::environment::metadata_path;

const NOT_FOUND: u16 = 404;

pub struct MetadataPublisher<'a, S: ArtifactStore> {
    store: &'a S,
}

impl<'a, S: ArtifactStore> MetadataPublisher<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Uploads `metadata` as pretty JSON to the instance's path.
    ///
    /// # Errors
    ///
    /// `Upload` on any non-2xx status, `Remote` if the store is unreachable.
    #[instrument(skip(self, metadata))]
    pub async fn publish(
        &self,
        instance_id: u32,
        metadata: &EnvironmentMetadata,
    ) -> Result<(), ProvisionError> {
        let body = serde_json::to_vec_pretty(metadata)
            .map_err(|e| ProvisionError::remote("serialize metadata", e.into()))?;
        let status = self
            .store
            .put(&metadata_path(instance_id), &body)
            .await
            .map_err(|e| ProvisionError::remote("upload metadata", e))?;
        if !is_success(status) {
            return Err(ProvisionError::Upload { status });
        }
        debug!(status, "metadata published");
        Ok(())
    }

    /// Deletes the instance's document.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx, non-404 status.
    pub async fn remove(&self, instance_id: u32) -> anyhow::Result<Removal> {
        let status = self.store.delete(&metadata_path(instance_id)).await?;
        match status {
            s if is_success(s) => Ok(Removal::Removed),
            NOT_FOUND => Ok(Removal::NotFound),
            s => anyhow::bail!("metadata delete rejected with HTTP {s}"),
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
