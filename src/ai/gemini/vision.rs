use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
};
use crate::ai::{ImagePayload, VisionModel};
use crate::models::Config;
use crate::InferenceError;
use async_trait::async_trait;
use std::time::Duration;

const BLOCKING_FINISH_REASONS: [&str; 4] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Gemini implementation of [`VisionModel`].
pub struct GeminiVisionClient {
    http: GeminiHttpClient,
}

impl GeminiVisionClient {
    pub fn new(model: String) -> Self {
        Self::new_with_client(model, Duration::from_secs(30), reqwest::Client::new())
    }

    pub fn new_with_client(model: String, timeout: Duration, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(model, timeout, client),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new_with_client(config.model.clone(), config.timeout, reqwest::Client::new())
            .with_base_url(config.base_url.clone())
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    fn extract_text(
        response: &GenerateContentResponse,
    ) -> std::result::Result<String, InferenceError> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(InferenceError::ContentRejected(format!(
                "prompt blocked by Gemini ({})",
                reason
            )));
        }

        let candidate = response
            .candidates
            .first()
            .ok_or_else(|| InferenceError::Other("No candidates in Gemini response".to_string()))?;

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        if !text.trim().is_empty() {
            return Ok(text);
        }

        match candidate.finish_reason.as_deref() {
            Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason) => Err(
                InferenceError::ContentRejected(format!("response blocked by Gemini ({})", reason)),
            ),
            _ => Err(InferenceError::Other(
                "No text in Gemini response".to_string(),
            )),
        }
    }
}

#[async_trait]
impl VisionModel for GeminiVisionClient {
    async fn generate(
        &self,
        credential: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> std::result::Result<String, InferenceError> {
        tracing::debug!(
            "Sending {} image ({} base64 chars) to Gemini model {}",
            image.mime_type,
            image.data.len(),
            self.http.model()
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                ],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
            }),
        };

        let response = self.http.generate_content(credential, &request).await?;
        Self::extract_text(&response)
    }
}
