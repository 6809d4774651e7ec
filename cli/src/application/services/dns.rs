//! Public name records pointing at tunnels.

use tracing::{info, instrument, warn};

use crate::application::ports::{DnsRecordInfo, DnsRecordSpec, DnsZone, Removal};
use crate::domain::ProvisionError;
use crate::domain::environment::{fqdn, tunnel_alias};

const RECORD_TYPE: &str = "CNAME";
/// Cloudflare's "automatic" TTL.
const AUTO_TTL: u32 = 1;

pub struct DnsManager<'a, Z: DnsZone> {
    zone: &'a Z,
    domain: &'a str,
}

impl<'a, Z: DnsZone> DnsManager<'a, Z> {
    pub fn new(zone: &'a Z, domain: &'a str) -> Self {
        Self { zone, domain }
    }

    /// Removes every record named `<name>.<domain>`, then creates a proxied
    /// CNAME to the tunnel's routing alias. Returns the new record id.
    ///
    /// # Errors
    ///
    /// `Remote` if listing, deleting a leftover, or creating fails.
    #[instrument(skip(self))]
    pub async fn create_or_replace(
        &self,
        name: &str,
        tunnel_id: &str,
    ) -> Result<String, ProvisionError> {
        let fqdn = fqdn(name, self.domain);
        for stale in self
            .matching(&fqdn)
            .await
            .map_err(|e| ProvisionError::remote("list dns records", e))?
        {
            info!(record_id = %stale.id, "removing leftover dns record");
            self.zone
                .delete_record(&stale.id)
                .await
                .map_err(|e| ProvisionError::remote("delete leftover dns record", e))?;
        }

        let target = tunnel_alias(tunnel_id);
        let record = self
            .zone
            .create_record(&DnsRecordSpec {
                record_type: RECORD_TYPE,
                name: &fqdn,
                target: &target,
                ttl: AUTO_TTL,
                proxied: true,
            })
            .await
            .map_err(|e| ProvisionError::remote("create dns record", e))?;
        info!(record_id = %record.id, %fqdn, "dns record created");
        Ok(record.id)
    }

    /// # Errors
    ///
    /// Returns the zone error unchanged.
    pub async fn delete(&self, record_id: &str) -> anyhow::Result<Removal> {
        self.zone.delete_record(record_id).await
    }

    /// Deletes every record named `<name>.<domain>`.
    ///
    /// # Errors
    ///
    /// Returns the first zone error; records deleted before it stay deleted.
    pub async fn delete_by_name(&self, name: &str) -> anyhow::Result<Removal> {
        let fqdn = fqdn(name, self.domain);
        let records = self.matching(&fqdn).await?;
        if records.is_empty() {
            return Ok(Removal::NotFound);
        }
        for record in records {
            if self.zone.delete_record(&record.id).await? == Removal::NotFound {
                warn!(record_id = %record.id, "dns record vanished before delete");
            }
        }
        Ok(Removal::Removed)
    }

    /// Whether any record is published under `<name>.<domain>`.
    ///
    /// # Errors
    ///
    /// Returns the zone error unchanged.
    pub async fn exists(&self, name: &str) -> anyhow::Result<bool> {
        Ok(!self.matching(&fqdn(name, self.domain)).await?.is_empty())
    }

    async fn matching(&self, fqdn: &str) -> anyhow::Result<Vec<DnsRecordInfo>> {
        Ok(self
            .zone
            .list_records(fqdn)
            .await?
            .into_iter()
            .filter(|r| r.name == fqdn)
            .collect())
    }
}
