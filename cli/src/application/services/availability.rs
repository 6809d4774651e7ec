//! Whether a name can still be handed out.

use demoenv_common::validate_subdomain;

use crate::application::ports::DnsZone;
use crate::application::services::dns::DnsManager;
use crate::domain::{ProvisionError, ValidationError};

/// A name is available when it is well-formed and no record with its FQDN
/// exists in the zone.
///
/// # Errors
///
/// `Validation` for a malformed name, `Remote` if the zone cannot be listed.
pub async fn check_availability<Z: DnsZone>(
    zone: &Z,
    domain: &str,
    name: &str,
) -> Result<bool, ProvisionError> {
    validate_subdomain(name).map_err(ValidationError::from)?;
    let taken = DnsManager::new(zone, domain)
        .exists(name)
        .await
        .map_err(|e| ProvisionError::remote("list dns records", e))?;
    Ok(!taken)
}
