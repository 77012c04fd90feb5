//! HTTP client for the inference API.
//!
//! - `POST {base}/ask`    `{question, character_id, user_id, history}` -> `{answer}`
//! - `POST {base}/reset`  `{user_id, character_id}`
//! - `GET  {base}/health`

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use kindred_core::chat::{AskRequest, InferenceBackend, ResetRequest, Turn};
use kindred_core::{KindredError, Result};

#[derive(Debug, Serialize)]
struct AskPayload<'a> {
    question: &'a str,
    character_id: &'a str,
    user_id: &'a str,
    history: &'a [Turn],
}

#[derive(Debug, Deserialize)]
struct AskResponse {
    answer: String,
}

#[derive(Debug, Serialize)]
struct ResetPayload<'a> {
    user_id: &'a str,
    character_id: &'a str,
}

/// Inference backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpInferenceBackend {
    client: Client,
    base_url: String,
}

impl HttpInferenceBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KindredError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Returns true when `GET /health` answers with a success status.
    pub async fn check_health(&self) -> bool {
        match self.client.get(self.endpoint("/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("[Backend] Health check failed: {}", e);
                false
            }
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<reqwest::Response> {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| KindredError::network(format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KindredError::network(format!("POST {} returned {}", url, status)));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl InferenceBackend for HttpInferenceBackend {
    async fn ask(&self, request: &AskRequest) -> Result<String> {
        let payload = AskPayload {
            question: &request.input,
            character_id: &request.character_id,
            user_id: &request.persona_id,
            history: &request.history,
        };
        let response = self.post("/ask", &payload).await?;
        let body: AskResponse = response
            .json()
            .await
            .map_err(|e| KindredError::network(format!("Invalid /ask response: {}", e)))?;
        Ok(body.answer)
    }

    async fn reset(&self, request: &ResetRequest) -> Result<()> {
        let payload = ResetPayload {
            user_id: &request.user_id,
            character_id: &request.character_id,
        };
        self.post("/reset", &payload).await?;
        Ok(())
    }
}
