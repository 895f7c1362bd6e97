//! API client for a running cost agent

use anyhow::{Context, Result};
use cost_analyzer::{ErrorDocument, PricingEntry};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

const INVOKE_PATH: &str = "api/v1/invoke";
const CATALOG_PATH: &str = "api/v1/catalog";

/// API client for the cost agent
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Turn a non-success response into an error, preferring the agent's
    /// error document message
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorDocument>(&body) {
            Ok(doc) => anyhow::bail!("{}", doc.message),
            Err(_) => anyhow::bail!("API error ({}): {}", status, body),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::check(response)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::check(response)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    /// Run one action request on the agent
    pub async fn invoke(&self, request: &Value) -> Result<Value> {
        self.post(INVOKE_PATH, request).await
    }

    pub async fn catalog(&self) -> Result<Vec<PricingEntry>> {
        self.get(CATALOG_PATH).await
    }
}
