//! The live platform: one adapter per port, bundled behind `Platform`.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{
    ArtifactStore, CloneSpec, ComputePlatform, DnsRecordInfo, DnsRecordSpec, DnsZone,
    ReadinessProbe, Removal, TunnelBroker, TunnelInfo,
};
use crate::domain::IngressRule;
use crate::infra::{
    cloudflare::CloudflareClient, fileserver::FileServerStore, probe::HttpReadinessProbe,
    proxmox::ProxmoxClient,
};

pub struct LivePlatform {
    pub compute: ProxmoxClient,
    pub cloudflare: CloudflareClient,
    pub files: FileServerStore,
    pub probe: HttpReadinessProbe,
}

impl ComputePlatform for LivePlatform {
    async fn list_instances(&self) -> Result<Vec<u32>> {
        self.compute.list_instances().await
    }
    async fn clone_template(&self, spec: &CloneSpec<'_>) -> Result<()> {
        self.compute.clone_template(spec).await
    }
    async fn start_instance(&self, id: u32) -> Result<()> {
        self.compute.start_instance(id).await
    }
    async fn stop_instance(&self, id: u32) -> Result<()> {
        self.compute.stop_instance(id).await
    }
    async fn delete_instance(&self, id: u32) -> Result<Removal> {
        self.compute.delete_instance(id).await
    }
}

impl TunnelBroker for LivePlatform {
    async fn list_tunnels(&self, name: &str) -> Result<Vec<TunnelInfo>> {
        self.cloudflare.list_tunnels(name).await
    }
    async fn create_tunnel(&self, name: &str, secret: &str) -> Result<TunnelInfo> {
        self.cloudflare.create_tunnel(name, secret).await
    }
    async fn tunnel_token(&self, tunnel_id: &str) -> Result<String> {
        self.cloudflare.tunnel_token(tunnel_id).await
    }
    async fn update_ingress(&self, tunnel_id: &str, rules: &[IngressRule]) -> Result<()> {
        self.cloudflare.update_ingress(tunnel_id, rules).await
    }
    async fn delete_tunnel(&self, tunnel_id: &str) -> Result<Removal> {
        self.cloudflare.delete_tunnel(tunnel_id).await
    }
}

impl DnsZone for LivePlatform {
    async fn list_records(&self, fqdn: &str) -> Result<Vec<DnsRecordInfo>> {
        self.cloudflare.list_records(fqdn).await
    }
    async fn create_record(&self, spec: &DnsRecordSpec<'_>) -> Result<DnsRecordInfo> {
        self.cloudflare.create_record(spec).await
    }
    async fn delete_record(&self, record_id: &str) -> Result<Removal> {
        self.cloudflare.delete_record(record_id).await
    }
}

impl ArtifactStore for LivePlatform {
    async fn put(&self, path: &str, body: &[u8]) -> Result<u16> {
        self.files.put(path, body).await
    }
    async fn delete(&self, path: &str) -> Result<u16> {
        self.files.delete(path).await
    }
}

impl ReadinessProbe for LivePlatform {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<u16> {
        self.probe.probe(url, timeout).await
    }
}
