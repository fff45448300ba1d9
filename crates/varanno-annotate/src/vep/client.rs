//! HTTP client for the Ensembl VEP REST service

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::debug;
use varanno_common::{Result, VarannoError};

use super::types::HgvsRequest;
use crate::config::AnnotateConfig;

/// A service that annotates a batch of HGVS notations.
///
/// On success the returned payloads are expected in request order. Any
/// error fails the whole batch.
#[async_trait]
pub trait AnnotationService: Send + Sync {
    async fn annotate_batch(&self, notations: &[String]) -> Result<Vec<Value>>;
}

/// VEP client posting `{"hgvs_notations": [...]}` to the configured endpoint
pub struct VepClient {
    client: Client,
    endpoint: String,
}

impl VepClient {
    /// Create a new client with the configured endpoint and timeout
    pub fn new(config: &AnnotateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| VarannoError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint_url(),
        })
    }

    /// Full URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnnotationService for VepClient {
    async fn annotate_batch(&self, notations: &[String]) -> Result<Vec<Value>> {
        let request = HgvsRequest {
            hgvs_notations: notations.to_vec(),
        };
        debug!(endpoint = %self.endpoint, notations = notations.len(), "Sending VEP request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VarannoError::batch_transport(format!(
                "{} returned {}: {}",
                self.endpoint,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| VarannoError::batch_transport(format!("invalid VEP response body: {e}")))
    }
}

fn transport_error(endpoint: &str, err: reqwest::Error) -> VarannoError {
    if err.is_timeout() {
        VarannoError::batch_transport(format!("request to {endpoint} timed out"))
    } else {
        VarannoError::batch_transport(format!("request to {endpoint} failed: {err}"))
    }
}
