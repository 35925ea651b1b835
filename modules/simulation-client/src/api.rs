use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{Result, SimulationError};
use crate::types::{JobCreated, ModelList, SimulateRequest, SimulateResult, SimulateStatus};

/// Models the job API accepts, used when the model list cannot be fetched.
pub const ALLOWED_MODELS: [&str; 8] = [
    "amazon/nova-micro-v1",
    "amazon/nova-lite-v1",
    "anthropic/claude-3-haiku",
    "anthropic/claude-3.5-sonnet",
    "gemini-2.0-flash-lite-001",
    "gemini-2.0-flash",
    "meta/llama-3.1-8b-instruct",
    "mistral/mistral-small-latest",
];

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// The four calls of the external stakeholder simulation service.
#[async_trait]
pub trait JobApi: Send + Sync + 'static {
    async fn submit(&self, request: &SimulateRequest) -> Result<JobCreated>;
    async fn status(&self, job_id: &str) -> Result<SimulateStatus>;
    /// Fails with a 409 until the job is complete.
    async fn result(&self, job_id: &str) -> Result<SimulateResult>;
    async fn models(&self) -> Result<Vec<String>>;
}

/// Available models, falling back to [`ALLOWED_MODELS`] when the service is
/// unreachable or returns nothing.
pub async fn list_models<A: JobApi + ?Sized>(api: &A) -> Vec<String> {
    match api.models().await {
        Ok(models) if !models.is_empty() => models,
        Ok(_) => fallback_models(),
        Err(e) => {
            tracing::warn!(error = %e, "Model list unavailable, using built-in list");
            fallback_models()
        }
    }
}

fn fallback_models() -> Vec<String> {
    ALLOWED_MODELS.iter().map(|m| m.to_string()).collect()
}

pub struct HttpJobApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpJobApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;
        let body = checked_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Body of a successful response, or an `Api` error carrying the server's
/// `detail` message when it sent one.
async fn checked_body(resp: reqwest::Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or(body);
    Err(SimulationError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn submit(&self, request: &SimulateRequest) -> Result<JobCreated> {
        let url = format!("{}/api/simulate", self.base_url);
        let resp = self.client.post(&url).json(request).send().await?;
        let body = checked_body(resp).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn status(&self, job_id: &str) -> Result<SimulateStatus> {
        self.get_json(&format!("/api/simulate/{job_id}/status")).await
    }

    async fn result(&self, job_id: &str) -> Result<SimulateResult> {
        self.get_json(&format!("/api/simulate/{job_id}/result")).await
    }

    async fn models(&self) -> Result<Vec<String>> {
        let list: ModelList = self.get_json("/api/models").await?;
        Ok(list.models)
    }
}
