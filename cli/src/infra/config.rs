//! Settings loaded from `DEMOENV_*` environment variables.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::domain::config::{
    DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_CLONE_SETTLE, DEFAULT_ID_RANGE, DEFAULT_NGINX_TEMPLATE,
    DEFAULT_READINESS_INTERVAL, DEFAULT_READINESS_TIMEOUT, DEFAULT_START_SETTLE,
    DEFAULT_STOP_SETTLE, DEFAULT_STORAGE_POOL,
};
use crate::domain::{ComputeSettings, ConfigError, ProvisionerConfig, ReadinessPolicy};
use crate::infra::cloudflare::{
    API_BASE as CLOUDFLARE_API_BASE, CloudflareClient, CloudflareSettings,
};
use crate::infra::fileserver::FileServerStore;
use crate::infra::platform::LivePlatform;
use crate::infra::probe::HttpReadinessProbe;
use crate::infra::proxmox::{ProxmoxClient, ProxmoxSettings};

pub const ENV_PREFIX: &str = "DEMOENV_";

/// Raw settings. Each field maps to `DEMOENV_<FIELD>`:
///   - `DEMOENV_PROXMOX_HOST`, `_USER`, `_PASSWORD` (required). The host is
///     `host`, `host:port` or an IPv6 address, optionally prefixed with
///     `https://`; the port defaults to 8006.
///   - `DEMOENV_CLOUDFLARE_API_TOKEN`, `_ACCOUNT_ID`, `_ZONE_ID` (required)
///   - `DEMOENV_FILESERVER_HOST` (required)
///   - `DEMOENV_DOMAIN` (required)
///
/// Everything else has a default.
#[derive(Clone, Deserialize)]
pub struct EnvConfig {
    pub proxmox_host: String,
    pub proxmox_user: String,
    pub proxmox_password: String,
    #[serde(default = "default_node")]
    pub proxmox_node: String,
    #[serde(default = "default_storage")]
    pub proxmox_storage: String,
    #[serde(default)]
    pub proxmox_verify_tls: bool,

    pub cloudflare_api_token: String,
    pub cloudflare_account_id: String,
    pub cloudflare_zone_id: String,
    #[serde(default = "default_cloudflare_api_url")]
    pub cloudflare_api_url: String,

    pub fileserver_host: String,
    #[serde(default = "default_fileserver_port")]
    pub fileserver_port: u16,

    pub domain: String,

    #[serde(default = "default_id_start")]
    pub instance_id_start: u32,
    #[serde(default = "default_id_end")]
    pub instance_id_end: u32,
    #[serde(default = "default_nginx_template")]
    pub nginx_template_id: u32,

    #[serde(default = "default_clone_settle")]
    pub clone_settle_secs: u64,
    #[serde(default = "default_start_settle")]
    pub start_settle_secs: u64,
    #[serde(default = "default_readiness_timeout")]
    pub readiness_timeout_secs: u64,
    #[serde(default = "default_readiness_interval")]
    pub readiness_interval_secs: u64,
    #[serde(default = "default_attempt_timeout")]
    pub readiness_attempt_timeout_secs: u64,
}

fn default_node() -> String {
    "odin".to_string()
}

fn default_storage() -> String {
    DEFAULT_STORAGE_POOL.to_string()
}

fn default_cloudflare_api_url() -> String {
    CLOUDFLARE_API_BASE.to_string()
}

fn default_fileserver_port() -> u16 {
    8080
}

fn default_id_start() -> u32 {
    DEFAULT_ID_RANGE.start
}

fn default_id_end() -> u32 {
    DEFAULT_ID_RANGE.end
}

fn default_nginx_template() -> u32 {
    DEFAULT_NGINX_TEMPLATE
}

fn default_clone_settle() -> u64 {
    DEFAULT_CLONE_SETTLE.as_secs()
}

fn default_start_settle() -> u64 {
    DEFAULT_START_SETTLE.as_secs()
}

fn default_readiness_timeout() -> u64 {
    DEFAULT_READINESS_TIMEOUT.as_secs()
}

fn default_readiness_interval() -> u64 {
    DEFAULT_READINESS_INTERVAL.as_secs()
}

fn default_attempt_timeout() -> u64 {
    DEFAULT_ATTEMPT_TIMEOUT.as_secs()
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("proxmox_host", &self.proxmox_host)
            .field("proxmox_user", &self.proxmox_user)
            .field("proxmox_password", &REDACTED)
            .field("proxmox_node", &self.proxmox_node)
            .field("proxmox_storage", &self.proxmox_storage)
            .field("proxmox_verify_tls", &self.proxmox_verify_tls)
            .field("cloudflare_api_token", &REDACTED)
            .field("cloudflare_account_id", &self.cloudflare_account_id)
            .field("cloudflare_zone_id", &self.cloudflare_zone_id)
            .field("cloudflare_api_url", &self.cloudflare_api_url)
            .field("fileserver_host", &self.fileserver_host)
            .field("fileserver_port", &self.fileserver_port)
            .field("domain", &self.domain)
            .field("instance_id_start", &self.instance_id_start)
            .field("instance_id_end", &self.instance_id_end)
            .field("nginx_template_id", &self.nginx_template_id)
            .finish_non_exhaustive()
    }
}

impl EnvConfig {
    /// # Errors
    ///
    /// Returns an error naming the prefix when a required variable is missing
    /// or a value does not parse.
    pub fn from_env() -> Result<Self> {
        envy::prefixed(ENV_PREFIX).from_env().with_context(|| {
            format!("failed to load config from {ENV_PREFIX}* env vars (see `demoenv --help`)")
        })
    }

    /// Same as `from_env` but reads `vars` instead of the process environment.
    ///
    /// # Errors
    ///
    /// See [`EnvConfig::from_env`].
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .with_context(|| format!("failed to load config from {ENV_PREFIX}* vars"))
    }

    /// The validated configuration the services run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty id range or domain, or a zero
    /// probe interval.
    pub fn provisioner_config(&self) -> Result<ProvisionerConfig, ConfigError> {
        let config = ProvisionerConfig {
            domain: self.domain.trim().to_string(),
            compute: ComputeSettings {
                id_range: self.instance_id_start..self.instance_id_end,
                storage_pool: self.proxmox_storage.clone(),
                nginx_template: self.nginx_template_id,
                clone_settle: Duration::from_secs(self.clone_settle_secs),
                start_settle: Duration::from_secs(self.start_settle_secs),
                stop_settle: DEFAULT_STOP_SETTLE,
            },
            readiness: ReadinessPolicy {
                timeout: Duration::from_secs(self.readiness_timeout_secs),
                interval: Duration::from_secs(self.readiness_interval_secs),
                attempt_timeout: Duration::from_secs(self.readiness_attempt_timeout_secs),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn proxmox_settings(&self) -> ProxmoxSettings {
        ProxmoxSettings {
            host: self.proxmox_host.clone(),
            user: self.proxmox_user.clone(),
            password: self.proxmox_password.clone(),
            node: self.proxmox_node.clone(),
            verify_tls: self.proxmox_verify_tls,
        }
    }

    pub fn cloudflare_settings(&self) -> CloudflareSettings {
        CloudflareSettings {
            api_token: self.cloudflare_api_token.clone(),
            account_id: self.cloudflare_account_id.clone(),
            zone_id: self.cloudflare_zone_id.clone(),
        }
    }

    /// Builds every adapter. Nothing is contacted here; Proxmox logs in on
    /// its first call, so an unreachable node only fails the compute steps.
    ///
    /// # Errors
    ///
    /// Returns an error if a host is malformed or a client cannot be built.
    pub fn connect(&self) -> Result<LivePlatform> {
        let compute = ProxmoxClient::new(&self.proxmox_settings())
            .context("invalid proxmox settings")?;
        let platform = LivePlatform {
            compute,
            cloudflare: self.dns_client()?,
            files: FileServerStore::new(&self.fileserver_host, self.fileserver_port)?,
            probe: HttpReadinessProbe::new()?,
        };
        info!(
            proxmox = %self.proxmox_host,
            node = %self.proxmox_node,
            fileserver = %self.fileserver_host,
            "platform configured",
        );
        Ok(platform)
    }

    /// Only what DNS lookups need; used by `check`, which never touches compute.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn dns_client(&self) -> Result<CloudflareClient> {
        CloudflareClient::with_base_url(self.cloudflare_settings(), &self.cloudflare_api_url)
    }
}
