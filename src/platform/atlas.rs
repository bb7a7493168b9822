//! RIPE Atlas REST client
//!
//! Creation needs an API key; reading results of public measurements does not.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{CreateRequest, CreateResponse, MeasurementPlatform, RawResult};
use crate::config::ApiConfig;
use crate::error::PlatformError;

#[derive(Clone)]
pub struct AtlasClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AtlasClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(2)
            .user_agent(concat!("root-reachability/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build AtlasClient")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.key.clone(),
        })
    }

    #[inline]
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }
}

async fn rejected(resp: reqwest::Response) -> PlatformError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    PlatformError::Rejected { status, body }
}

#[async_trait]
impl MeasurementPlatform for AtlasClient {
    async fn submit(&self, request: &CreateRequest) -> Result<Vec<u64>, PlatformError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(PlatformError::MissingCredential)?;

        let resp = self
            .client
            .post(self.url("/measurements/"))
            .header(reqwest::header::AUTHORIZATION, format!("Key {}", key))
            .json(request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(rejected(resp).await);
        }

        let created: CreateResponse = resp
            .json()
            .await
            .map_err(|e| PlatformError::UnexpectedResponse(e.to_string()))?;
        debug!("Atlas created measurements {:?}", created.measurements);
        Ok(created.measurements)
    }

    async fn fetch_results(&self, msm_id: u64) -> Result<Vec<RawResult>, PlatformError> {
        let resp = self
            .client
            .get(self.url(&format!("/measurements/{}/results/", msm_id)))
            .query(&[("format", "json")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(rejected(resp).await);
        }

        let results: Vec<RawResult> = resp
            .json()
            .await
            .map_err(|e| PlatformError::UnexpectedResponse(e.to_string()))?;
        debug!("Atlas returned {} results for {}", results.len(), msm_id);
        Ok(results)
    }
}
