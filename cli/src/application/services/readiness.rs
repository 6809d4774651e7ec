//! Bounded wait for a fresh environment to answer on its public URL.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::application::ports::ReadinessProbe;
use crate::domain::{ProvisionError, ReadinessPolicy};

/// Statuses below this mean something answered; 5xx means the edge is up
/// but the origin is not.
const FIRST_NOT_READY_STATUS: u16 = 500;

pub struct ReadinessWaiter<'a, P: ReadinessProbe> {
    probe: &'a P,
    policy: ReadinessPolicy,
}

impl<'a, P: ReadinessProbe> ReadinessWaiter<'a, P> {
    pub fn new(probe: &'a P, policy: ReadinessPolicy) -> Self {
        Self { probe, policy }
    }

    /// Probes `url` every `policy.interval` until a status below 500 comes
    /// back. Returns how long it took.
    ///
    /// # Errors
    ///
    /// `Timeout` once `policy.timeout` has elapsed; no probe is issued after
    /// the deadline.
    #[instrument(skip(self))]
    pub async fn wait_until_ready(&self, url: &str) -> Result<Duration, ProvisionError> {
        let started = Instant::now();
        let mut attempts = 0u32;

        while started.elapsed() < self.policy.timeout {
            attempts += 1;
            match self.probe.probe(url, self.policy.attempt_timeout).await {
                Ok(status) if status < FIRST_NOT_READY_STATUS => {
                    let waited = started.elapsed();
                    info!(status, attempts, waited_secs = waited.as_secs(), "environment ready");
                    return Ok(waited);
                }
                Ok(status) => debug!(status, attempts, "not ready yet"),
                Err(e) => debug!(error = %format!("{e:#}"), attempts, "no response yet"),
            }
            tokio::time::sleep(self.policy.interval).await;
        }

        Err(ProvisionError::Timeout {
            url: url.to_string(),
            waited: self.policy.timeout,
        })
    }
}
