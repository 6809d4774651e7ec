//! Cloudflare v4 API adapter for the tunnel broker and DNS zone ports.

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use crate::application::ports::{
    DnsRecordInfo, DnsRecordSpec, DnsZone, Removal, TunnelBroker, TunnelInfo,
};
use crate::domain::IngressRule;
use crate::infra::http::{build_client, is_not_found};

pub const API_BASE: &str = "https://api.cloudflare.com/client/v4";

#[derive(Clone)]
pub struct CloudflareSettings {
    pub api_token: String,
    pub account_id: String,
    pub zone_id: String,
}

/// Response envelope shared by every v4 endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

impl<T> Envelope<T> {
    fn into_result(self) -> Result<Option<T>> {
        if self.success {
            return Ok(self.result);
        }
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{} ({})", e.message, e.code))
            .collect();
        if messages.is_empty() {
            anyhow::bail!("cloudflare reported failure without details");
        }
        anyhow::bail!("cloudflare: {}", messages.join("; "))
    }
}

#[derive(Debug, Deserialize)]
struct Named {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct CreateTunnel<'a> {
    name: &'a str,
    tunnel_secret: &'a str,
    config_src: &'static str,
}

#[derive(Debug, Serialize)]
struct CreateRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

pub struct CloudflareClient {
    http: Client,
    base_url: String,
    settings: CloudflareSettings,
}

impl CloudflareClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_base_url(settings: CloudflareSettings, base_url: &str) -> Result<Self> {
        Ok(Self {
            http: build_client(true)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/{path}", self.base_url))
            .bearer_auth(&self.settings.api_token)
    }

    fn tunnels_path(&self) -> String {
        format!("accounts/{}/cfd_tunnel", self.settings.account_id)
    }

    fn records_path(&self) -> String {
        format!("zones/{}/dns_records", self.settings.zone_id)
    }

    /// Sends `request` and unwraps the envelope, requiring a result.
    async fn call<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        Self::call_optional(request)
            .await?
            .context("cloudflare response carried no result")
    }

    async fn call_optional<T: DeserializeOwned>(request: RequestBuilder) -> Result<Option<T>> {
        let response = request.send().await.context("cloudflare unreachable")?;
        let status = response.status();
        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("malformed cloudflare response (HTTP {status})"))?;
        envelope.into_result()
    }

    /// DELETE that treats 404 as already gone.
    async fn remove(&self, path: &str) -> Result<Removal> {
        let response = self
            .request(Method::DELETE, path)
            .send()
            .await
            .context("cloudflare unreachable")?;
        if is_not_found(response.status()) {
            return Ok(Removal::NotFound);
        }
        let envelope: Envelope<serde_json::Value> = response
            .json()
            .await
            .context("malformed cloudflare response")?;
        envelope.into_result()?;
        Ok(Removal::Removed)
    }
}

impl TunnelBroker for CloudflareClient {
    async fn list_tunnels(&self, name: &str) -> Result<Vec<TunnelInfo>> {
        let found: Vec<Named> = Self::call(
            self.request(Method::GET, &self.tunnels_path())
                .query(&[("name", name), ("is_deleted", "false")]),
        )
        .await
        .context("failed to list tunnels")?;
        Ok(found
            .into_iter()
            .map(|t| TunnelInfo {
                id: t.id,
                name: t.name,
            })
            .collect())
    }

    #[instrument(skip(self, secret))]
    async fn create_tunnel(&self, name: &str, secret: &str) -> Result<TunnelInfo> {
        let created: Named = Self::call(self.request(Method::POST, &self.tunnels_path()).json(
            &CreateTunnel {
                name,
                tunnel_secret: secret,
                config_src: "cloudflare",
            },
        ))
        .await
        .context("failed to create tunnel")?;
        debug!(tunnel_id = %created.id, "tunnel created");
        Ok(TunnelInfo {
            id: created.id,
            name: created.name,
        })
    }

    async fn tunnel_token(&self, tunnel_id: &str) -> Result<String> {
        Self::call(self.request(
            Method::GET,
            &format!("{}/{tunnel_id}/token", self.tunnels_path()),
        ))
        .await
        .context("failed to fetch tunnel token")
    }

    async fn update_ingress(&self, tunnel_id: &str, rules: &[IngressRule]) -> Result<()> {
        let _: Option<serde_json::Value> = Self::call_optional(
            self.request(
                Method::PUT,
                &format!("{}/{tunnel_id}/configurations", self.tunnels_path()),
            )
            .json(&json!({ "config": { "ingress": rules } })),
        )
        .await
        .context("failed to update tunnel ingress")?;
        Ok(())
    }

    async fn delete_tunnel(&self, tunnel_id: &str) -> Result<Removal> {
        self.remove(&format!("{}/{tunnel_id}", self.tunnels_path()))
            .await
            .context("failed to delete tunnel")
    }
}

impl DnsZone for CloudflareClient {
    async fn list_records(&self, fqdn: &str) -> Result<Vec<DnsRecordInfo>> {
        let found: Vec<Named> = Self::call(
            self.request(Method::GET, &self.records_path())
                .query(&[("name", fqdn)]),
        )
        .await
        .context("failed to list dns records")?;
        Ok(found
            .into_iter()
            .map(|r| DnsRecordInfo {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn create_record(&self, spec: &DnsRecordSpec<'_>) -> Result<DnsRecordInfo> {
        let created: Named = Self::call(self.request(Method::POST, &self.records_path()).json(
            &CreateRecord {
                record_type: spec.record_type,
                name: spec.name,
                content: spec.target,
                ttl: spec.ttl,
                proxied: spec.proxied,
            },
        ))
        .await
        .context("failed to create dns record")?;
        Ok(DnsRecordInfo {
            id: created.id,
            name: created.name,
        })
    }

    async fn delete_record(&self, record_id: &str) -> Result<Removal> {
        self.remove(&format!("{}/{record_id}", self.records_path()))
            .await
            .context("failed to delete dns record")
    }
}
