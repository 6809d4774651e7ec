//! Naming rules and documents derived from a provision request.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

use chrono::{DateTime, Utc};
use demoenv_common::{EnvironmentMetadata, ProvisionRequest, validate_subdomain};
use serde::{Deserialize, Serialize};

use crate::domain::error::ValidationError;

/// Suffix of the routing alias every tunnel is reachable under.
pub const TUNNEL_ALIAS_DOMAIN: &str = "cfargotunnel.com";

/// Service answering any hostname no other rule matched.
pub const CATCH_ALL_SERVICE: &str = "http_status:404";

/// One entry of a tunnel's routing table. First match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    /// Host to match; `None` matches everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub service: String,
}

/// Checks everything about a request that can be checked offline.
///
/// # Errors
///
/// Returns `ValidationError::Subdomain` when the requested name is malformed.
pub fn validate_request(request: &ProvisionRequest) -> Result<(), ValidationError> {
    validate_subdomain(&request.requested_name)?;
    Ok(())
}

/// Tunnel names embed the instance id so two attempts for the same name on
/// different instances never collide.
#[must_use]
pub fn tunnel_name(instance_id: u32, name: &str) -> String {
    format!("service-{instance_id}-{name}")
}

#[must_use]
pub fn fqdn(name: &str, domain: &str) -> String {
    format!("{name}.{domain}")
}

#[must_use]
pub fn public_url(name: &str, domain: &str) -> String {
    format!("https://{}", fqdn(name, domain))
}

/// CNAME target that routes into the given tunnel.
#[must_use]
pub fn tunnel_alias(tunnel_id: &str) -> String {
    format!("{tunnel_id}.{TUNNEL_ALIAS_DOMAIN}")
}

/// Artifact-store path of an instance's metadata document.
#[must_use]
pub fn metadata_path(instance_id: u32) -> String {
    format!("metadata-{instance_id}.json")
}

/// Routing table for a single-host environment: the host goes to the local
/// service, everything else gets a 404. The catch-all is always last.
#[must_use]
pub fn ingress_rules(hostname: &str, port: u16) -> Vec<IngressRule> {
    vec![
        IngressRule {
            hostname: Some(hostname.to_string()),
            service: format!("http://localhost:{port}"),
        },
        IngressRule {
            hostname: None,
            service: CATCH_ALL_SERVICE.to_string(),
        },
    ]
}

/// Builds the descriptor published for a new instance.
#[must_use]
pub fn build_metadata(
    instance_id: u32,
    request: &ProvisionRequest,
    domain: &str,
    tunnel_token: &str,
    created_at: DateTime<Utc>,
) -> EnvironmentMetadata {
    EnvironmentMetadata {
        vmid: instance_id,
        hostname: request.requested_name.clone(),
        subdomain: request.requested_name.clone(),
        customer_email: request.customer_email.clone(),
        oss_type: request.environment_kind,
        url: public_url(&request.requested_name, domain),
        tunnel_token: tunnel_token.to_string(),
        created_at,
    }
}
