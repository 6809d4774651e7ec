//! Readiness probe over HTTPS.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;

use crate::application::ports::ReadinessProbe;
use crate::infra::http::build_client;

/// Fresh environments may be served before a valid certificate is issued,
/// so certificate verification is off.
pub struct HttpReadinessProbe {
    http: Client,
}

impl HttpReadinessProbe {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: build_client(false)?,
        })
    }
}

impl ReadinessProbe for HttpReadinessProbe {
    async fn probe(&self, url: &str, timeout: Duration) -> Result<u16> {
        let response = self.http.get(url).timeout(timeout).send().await?;
        Ok(response.status().as_u16())
    }
}
