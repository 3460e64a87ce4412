use super::types::{ErrorEnvelope, GenerateContentResponse};
use crate::models::DEFAULT_GEMINI_BASE_URL;
use crate::InferenceError;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

/// Lightweight Gemini REST client. The API key is supplied per call so one
/// client can serve a whole credential pool.
pub struct GeminiHttpClient {
    client: Client,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-flash`);
    /// a `models/` prefix is stripped.
    pub fn new_with_client(model: String, timeout: Duration, client: Client) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            model,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Calls Gemini's `generateContent` endpoint, classifying any failure.
    pub async fn generate_content<Req: Serialize>(
        &self,
        api_key: &str,
        request: &Req,
    ) -> Result<GenerateContentResponse, InferenceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                transport_error(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::error!("Gemini API error (status {}): {}", status, body);
            return Err(classify_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            InferenceError::Other(format!("Failed to parse Gemini response: {}", e))
        })
    }
}

fn transport_error(e: reqwest::Error) -> InferenceError {
    if e.is_timeout() {
        InferenceError::Transport(format!("Gemini request timed out: {}", e))
    } else {
        InferenceError::Transport(format!("Gemini request failed: {}", e))
    }
}

/// Map a non-success response to the inference error taxonomy.
///
/// Quota exhaustion shows up either as HTTP 429 or as a
/// `RESOURCE_EXHAUSTED` status in the error envelope.
pub fn classify_error(status: StatusCode, body: &str) -> InferenceError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let exhausted = envelope
        .as_ref()
        .is_some_and(|e| e.error.status == "RESOURCE_EXHAUSTED");

    if status == StatusCode::TOO_MANY_REQUESTS || exhausted {
        return InferenceError::RateLimited {
            status: status.as_u16(),
            message,
        };
    }

    InferenceError::Other(format!(
        "Gemini API error (status {}): {}",
        status.as_u16(),
        message
    ))
}
