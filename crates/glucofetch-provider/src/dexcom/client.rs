//! Low-level EGV retrieval client.
//!
//! Readings come back as opaque JSON objects and are passed through to the
//! output sink unmodified; this module never interprets their fields.

use serde::Deserialize;
use tracing::debug;

use glucofetch_core::TimeWindow;

use crate::error::{ProviderError, ProviderResult};

/// A single estimated glucose value, exactly as the vendor sent it.
pub type Reading = serde_json::Map<String, serde_json::Value>;

/// Bearer-authenticated client for the EGV endpoint.
#[derive(Debug)]
pub struct EgvClient {
    http_client: reqwest::Client,
    egvs_url: String,
}

impl EgvClient {
    /// Creates a new EGV client for the given endpoint.
    pub fn new(egvs_url: impl Into<String>, timeout: std::time::Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            egvs_url: egvs_url.into(),
        }
    }

    /// Fetches all readings in the window, presenting `access_token` as a
    /// bearer credential.
    ///
    /// An empty result set is a success with zero readings, distinguished
    /// from an error. Non-success statuses surface as
    /// [`ProviderError::Fetch`] carrying the vendor's body; the caller
    /// decides whether a 401 warrants a refresh-and-retry.
    pub async fn fetch(
        &self,
        access_token: &str,
        window: &TimeWindow,
    ) -> ProviderResult<Vec<Reading>> {
        let response = self
            .http_client
            .get(&self.egvs_url)
            .bearer_auth(access_token)
            .query(&[
                ("startDate", window.start_param()),
                ("endDate", window.end_param()),
            ])
            .send()
            .await
            .map_err(ProviderError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::transport)?;

        if !status.is_success() {
            return Err(ProviderError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EgvResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("bad EGV response: {}", e)))?;

        debug!(count = parsed.egvs.len(), "fetched readings");
        Ok(parsed.egvs)
    }
}

/// Response envelope from the EGV endpoint.
#[derive(Debug, Deserialize)]
struct EgvResponse {
    #[serde(default)]
    egvs: Vec<Reading>,
}
