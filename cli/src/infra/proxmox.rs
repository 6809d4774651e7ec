//! Proxmox VE REST adapter for the compute port.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::application::ports::{CloneSpec, ComputePlatform, Removal};
use crate::infra::http::{build_client, ensure_success, is_not_found};

const DEFAULT_PORT: u16 = 8006;
const AUTH_COOKIE: &str = "PVEAuthCookie";
const CSRF_HEADER: &str = "CSRFPreventionToken";

/// Connection settings for one Proxmox node.
#[derive(Clone)]
pub struct ProxmoxSettings {
    /// `host`, `host:port` or an IPv6 address, optionally behind `https://`.
    pub host: String,
    pub user: String,
    pub password: String,
    pub node: String,
    pub verify_tls: bool,
}

/// Every Proxmox response wraps its payload in `data`.
#[derive(Debug, Deserialize)]
struct Data<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Ticket {
    ticket: String,
    #[serde(rename = "CSRFPreventionToken")]
    csrf_token: String,
}

#[derive(Debug, Deserialize)]
struct ClusterResource {
    vmid: Option<u32>,
}

/// Ticket pair returned by `/access/ticket`.
struct Session {
    ticket: String,
    csrf_token: String,
}

/// Client for the Proxmox API. Logs in on the first call that needs a
/// session; a failed login is retried by the next call.
pub struct ProxmoxClient {
    http: Client,
    base_url: String,
    node: String,
    user: String,
    password: String,
    session: OnceCell<Session>,
}

impl ProxmoxClient {
    /// Builds the client without contacting the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is malformed or the HTTP client cannot
    /// be built.
    pub fn new(settings: &ProxmoxSettings) -> Result<Self> {
        Ok(Self {
            http: build_client(settings.verify_tls)?,
            base_url: api_base(&settings.host)?,
            node: settings.node.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            session: OnceCell::new(),
        })
    }

    async fn session(&self) -> Result<&Session> {
        self.session.get_or_try_init(|| self.login()).await
    }

    #[instrument(skip(self), fields(base_url = %self.base_url, user = %self.user))]
    async fn login(&self) -> Result<Session> {
        let response = self
            .http
            .post(format!("{}/access/ticket", self.base_url))
            .form(&[
                ("username", self.user.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .context("proxmox unreachable")?;
        let ticket: Data<Ticket> = ensure_success(response)
            .await
            .context("proxmox login rejected")?
            .json()
            .await
            .context("malformed proxmox ticket response")?;

        info!("proxmox session opened");
        Ok(Session {
            ticket: ticket.data.ticket,
            csrf_token: ticket.data.csrf_token,
        })
    }

    async fn read(&self, path: &str) -> Result<RequestBuilder> {
        let session = self.session().await?;
        Ok(self
            .http
            .get(format!("{}/{path}", self.base_url))
            .header("Cookie", format!("{AUTH_COOKIE}={}", session.ticket)))
    }

    async fn write(&self, method: reqwest::Method, path: &str) -> Result<RequestBuilder> {
        let session = self.session().await?;
        Ok(self
            .http
            .request(method, format!("{}/{path}", self.base_url))
            .header("Cookie", format!("{AUTH_COOKIE}={}", session.ticket))
            .header(CSRF_HEADER, &session.csrf_token))
    }

    async fn data<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = ensure_success(request.send().await?).await?;
        Ok(response.json::<Data<T>>().await?.data)
    }

    fn lxc_path(&self, id: u32) -> String {
        format!("nodes/{}/lxc/{id}", self.node)
    }
}

impl ComputePlatform for ProxmoxClient {
    async fn list_instances(&self) -> Result<Vec<u32>> {
        let resources: Vec<ClusterResource> =
            Self::data(self.read("cluster/resources").await?.query(&[("type", "vm")]))
                .await
                .context("failed to list cluster resources")?;
        Ok(resources.into_iter().filter_map(|r| r.vmid).collect())
    }

    #[instrument(skip(self))]
    async fn clone_template(&self, spec: &CloneSpec<'_>) -> Result<()> {
        let new_id = spec.new_id.to_string();
        let task: String = Self::data(
            self.write(
                reqwest::Method::POST,
                &format!("{}/clone", self.lxc_path(spec.template_id)),
            )
            .await?
            .form(&[
                ("newid", new_id.as_str()),
                ("hostname", spec.hostname),
                ("full", "1"),
                ("storage", spec.storage_pool),
            ]),
        )
        .await
        .with_context(|| format!("failed to clone template {}", spec.template_id))?;
        debug!(%task, "clone task queued");
        Ok(())
    }

    async fn start_instance(&self, id: u32) -> Result<()> {
        let request = self
            .write(
                reqwest::Method::POST,
                &format!("{}/status/start", self.lxc_path(id)),
            )
            .await?;
        let _task: String = Self::data(request)
            .await
            .with_context(|| format!("failed to start {id}"))?;
        Ok(())
    }

    async fn stop_instance(&self, id: u32) -> Result<()> {
        let request = self
            .write(
                reqwest::Method::POST,
                &format!("{}/status/stop", self.lxc_path(id)),
            )
            .await?;
        let _task: String = Self::data(request)
            .await
            .with_context(|| format!("failed to stop {id}"))?;
        Ok(())
    }

    async fn delete_instance(&self, id: u32) -> Result<Removal> {
        let response = self
            .write(reqwest::Method::DELETE, &self.lxc_path(id))
            .await?
            .send()
            .await
            .with_context(|| format!("failed to delete {id}"))?;
        let status = response.status();
        if status.is_success() {
            return Ok(Removal::Removed);
        }
        let body = response.text().await.unwrap_or_default();
        if is_missing(status, &body) {
            return Ok(Removal::NotFound);
        }
        anyhow::bail!("failed to delete {id}: HTTP {status}: {body}")
    }
}

/// `https://host:8006/api2/json`, keeping an explicit port if given.
///
/// Accepts `host`, `host:port`, a bracketed or bare IPv6 address, and any of
/// these behind an `https://` prefix. Other schemes are rejected.
fn api_base(host: &str) -> Result<String> {
    let host = host.trim().trim_end_matches('/');
    let host = host.strip_prefix("https://").unwrap_or(host);
    if host.contains("://") {
        anyhow::bail!("proxmox host must be reached over https: {host}");
    }
    if host.is_empty() {
        anyhow::bail!("proxmox host is empty");
    }

    let authority = if host.starts_with('[') {
        if host.contains("]:") {
            host.to_string()
        } else {
            format!("{host}:{DEFAULT_PORT}")
        }
    } else {
        match host.matches(':').count() {
            0 => format!("{host}:{DEFAULT_PORT}"),
            1 => host.to_string(),
            _ => format!("[{host}]:{DEFAULT_PORT}"),
        }
    };
    Ok(format!("https://{authority}/api2/json"))
}

/// Proxmox answers 500 with "does not exist" for unknown guests.
fn is_missing(status: StatusCode, body: &str) -> bool {
    is_not_found(status) || body.contains("does not exist")
}
