//! Plain HTTP file server the instances fetch their metadata from.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::application::ports::ArtifactStore;
use crate::infra::http::build_client;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);

pub struct FileServerStore {
    http: Client,
    base_url: String,
}

impl FileServerStore {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        Ok(Self {
            http: build_client(true)?,
            base_url: upload_base(host, port),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl ArtifactStore for FileServerStore {
    async fn put(&self, path: &str, body: &[u8]) -> Result<u16> {
        let response = self
            .http
            .put(self.url(path))
            .header("Content-Type", "application/json")
            .timeout(UPLOAD_TIMEOUT)
            .body(body.to_vec())
            .send()
            .await
            .with_context(|| format!("file server unreachable at {}", self.base_url))?;
        Ok(response.status().as_u16())
    }

    async fn delete(&self, path: &str) -> Result<u16> {
        let response = self
            .http
            .delete(self.url(path))
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("file server unreachable at {}", self.base_url))?;
        Ok(response.status().as_u16())
    }
}

fn upload_base(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/upload")
}
