use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::endpoint::{self, PING_PATH};

#[derive(Debug, Deserialize)]
struct PingResponse {
    status: String,
}

/// HTTP side of the backend. Only the health probe is used by the dashboard.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub async fn ping(&self) -> Result<()> {
        let url = endpoint::api_url(&self.base_url, PING_PATH)?;
        let resp: PingResponse = self
            .http
            .get(url)
            .send()
            .await
            .context("ping failed")?
            .error_for_status()
            .context("ping returned error status")?
            .json()
            .await
            .context("ping returned malformed body")?;
        if resp.status != "ok" {
            bail!("ping reported status '{}'", resp.status);
        }
        Ok(())
    }
}
