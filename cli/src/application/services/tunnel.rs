//! Tunnel lifecycle: idempotent create, token retrieval, routing.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore as _;
use tracing::{info, instrument, warn};

use crate::application::ports::{Removal, TunnelBroker, TunnelInfo};
use crate::domain::environment::ingress_rules;
use crate::domain::ProvisionError;

const SECRET_LEN: usize = 32;

pub struct TunnelManager<'a, B: TunnelBroker> {
    broker: &'a B,
}

impl<'a, B: TunnelBroker> TunnelManager<'a, B> {
    pub fn new(broker: &'a B) -> Self {
        Self { broker }
    }

    /// Removes every tunnel called `name`, then creates a fresh one with a
    /// new random secret.
    ///
    /// # Errors
    ///
    /// `Remote` if listing, deleting a leftover, or creating fails.
    #[instrument(skip(self))]
    pub async fn create_or_replace(&self, name: &str) -> Result<TunnelInfo, ProvisionError> {
        let existing = self
            .broker
            .list_tunnels(name)
            .await
            .map_err(|e| ProvisionError::remote("list tunnels", e))?;

        for stale in existing.iter().filter(|t| t.name == name) {
            info!(tunnel_id = %stale.id, "removing leftover tunnel");
            let removal = self
                .broker
                .delete_tunnel(&stale.id)
                .await
                .map_err(|e| ProvisionError::remote("delete leftover tunnel", e))?;
            if removal == Removal::NotFound {
                warn!(tunnel_id = %stale.id, "leftover tunnel already gone");
            }
        }

        let tunnel = self
            .broker
            .create_tunnel(name, &generate_secret())
            .await
            .map_err(|e| ProvisionError::remote("create tunnel", e))?;
        info!(tunnel_id = %tunnel.id, "tunnel created");
        Ok(tunnel)
    }

    /// # Errors
    ///
    /// `Remote` if the broker refuses.
    pub async fn token(&self, tunnel_id: &str) -> Result<String, ProvisionError> {
        self.broker
            .tunnel_token(tunnel_id)
            .await
            .map_err(|e| ProvisionError::remote("fetch tunnel token", e))
    }

    /// Routes `hostname` to the local service on `port`; anything else 404s.
    ///
    /// # Errors
    ///
    /// `Remote` if the broker refuses.
    #[instrument(skip(self))]
    pub async fn configure_routing(
        &self,
        tunnel_id: &str,
        hostname: &str,
        port: u16,
    ) -> Result<(), ProvisionError> {
        self.broker
            .update_ingress(tunnel_id, &ingress_rules(hostname, port))
            .await
            .map_err(|e| ProvisionError::remote("configure tunnel routing", e))
    }

    /// # Errors
    ///
    /// Returns the broker error unchanged; callers decide whether it is fatal.
    pub async fn delete(&self, tunnel_id: &str) -> anyhow::Result<Removal> {
        self.broker.delete_tunnel(tunnel_id).await
    }
}

/// 32 random bytes, base64 encoded.
fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
