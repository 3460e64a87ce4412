use super::credentials::CredentialPool;
use super::normalize;
use super::AnalysisStrategy;
use crate::ai::{ImagePayload, VisionModel};
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::prompts;
use async_trait::async_trait;
use tracing::{error, info, warn};

pub const EXHAUSTED_REASON: &str =
    "All AI capacity is currently maxed out globally. Please try again in a few moments.";

/// Analyzes images through a [`VisionModel`], rotating to the next API key
/// whenever the current one is rate limited.
pub struct RemoteAnalyzer {
    model: Box<dyn VisionModel>,
    pool: CredentialPool,
}

impl RemoteAnalyzer {
    pub fn new(model: impl VisionModel + 'static, pool: CredentialPool) -> Self {
        Self {
            model: Box::new(model),
            pool,
        }
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }
}

#[async_trait]
impl AnalysisStrategy for RemoteAnalyzer {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        let image = ImagePayload::from_encoded(&request.image);
        let prompt = prompts::analysis_prompt(request);

        // Attempts run one after another; a rate-limited key is never retried
        // within the same scan.
        let mut attempts = 0;
        while attempts < self.pool.len() {
            let Some((index, credential)) = self.pool.current() else {
                break;
            };

            match self.model.generate(credential, &prompt, &image).await {
                Ok(text) => {
                    let result = normalize::parse_model_output(&text, request);
                    info!(
                        "Analysis finished with key {} (is_food={})",
                        index,
                        result.is_food()
                    );
                    return result;
                }
                Err(e) if e.is_rate_limited() => {
                    let next = self.pool.advance_from(index);
                    attempts += 1;
                    warn!(
                        "API key {} hit its rate limit ({}); rotating to key {}",
                        index, e, next
                    );
                }
                Err(e) => {
                    error!("Analysis failed with key {}: {}", index, e);
                    return AnalysisResult::non_food(format!("Error analyzing image: {}", e));
                }
            }
        }

        error!("All {} API keys are rate limited", self.pool.len());
        AnalysisResult::non_food(EXHAUSTED_REASON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockVisionClient;
    use crate::scan::normalize::UNREADABLE_REASON;
    use crate::InferenceError;

    const FOOD_JSON: &str = r#"{"isFood": true, "foodName": "Apple", "calories": 95, "protein": 0, "carbs": 25, "fat": 0, "healthScore": 92, "briefTip": "Eat the skin.", "confidence": 97, "isSafe": true, "warning": null, "carbonFootprint": "Low", "sustainabilityTip": "Compost the core."}"#;

    fn analyzer(mock: &MockVisionClient, keys: &[&str]) -> RemoteAnalyzer {
        RemoteAnalyzer::new(mock.clone(), CredentialPool::new(keys.iter().copied()))
    }

    #[tokio::test]
    async fn test_rotates_past_rate_limited_keys() {
        let mock = MockVisionClient::new()
            .with_rate_limit()
            .with_rate_limit()
            .with_response(FOOD_JSON);
        let analyzer = analyzer(&mock, &["k1", "k2", "k3"]);

        let result = analyzer.analyze(&AnalysisRequest::new("img")).await;

        assert_eq!(result.food().unwrap().food_name, "Apple");
        assert_eq!(mock.credentials_used(), vec!["k1", "k2", "k3"]);
        assert_eq!(analyzer.pool().cursor(), 2);
    }

    #[tokio::test]
    async fn test_non_quota_error_fails_fast() {
        let mock = MockVisionClient::new()
            .with_error(InferenceError::Other("Gemini API error (status 400): bad image".to_string()))
            .with_response(FOOD_JSON);
        let analyzer = analyzer(&mock, &["k1", "k2", "k3"]);

        let result = analyzer.analyze(&AnalysisRequest::new("img")).await;

        assert!(!result.is_food());
        assert_eq!(
            result.reason(),
            Some("Error analyzing image: Gemini API error (status 400): bad image")
        );
        assert_eq!(mock.get_call_count(), 1);
        assert_eq!(analyzer.pool().cursor(), 0);
    }

    #[tokio::test]
    async fn test_content_rejection_is_not_retried() {
        let mock = MockVisionClient::new()
            .with_error(InferenceError::ContentRejected("SAFETY".to_string()));
        let analyzer = analyzer(&mock, &["k1", "k2"]);

        let result = analyzer.analyze(&AnalysisRequest::new("img")).await;

        assert!(result.reason().unwrap().contains("SAFETY"));
        assert_eq!(mock.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_all_keys_exhausted() {
        let mock = MockVisionClient::new()
            .with_rate_limit()
            .with_rate_limit()
            .with_rate_limit()
            .with_rate_limit();
        let analyzer = analyzer(&mock, &["k1", "k2", "k3", "k4"]);

        let result = analyzer.analyze(&AnalysisRequest::new("img")).await;

        assert_eq!(result.reason(), Some(EXHAUSTED_REASON));
        assert_eq!(mock.get_call_count(), 4);
        assert_eq!(analyzer.pool().cursor(), 0);
    }

    #[tokio::test]
    async fn test_cursor_persists_across_scans() {
        let mock = MockVisionClient::new()
            .with_rate_limit()
            .with_response(FOOD_JSON)
            .with_response(FOOD_JSON);
        let analyzer = analyzer(&mock, &["k1", "k2", "k3"]);

        analyzer.analyze(&AnalysisRequest::new("img")).await;
        analyzer.analyze(&AnalysisRequest::new("img")).await;

        assert_eq!(mock.credentials_used(), vec!["k1", "k2", "k2"]);
    }

    #[tokio::test]
    async fn test_unreadable_output_is_not_retried() {
        let mock = MockVisionClient::new()
            .with_response("I think this is a sandwich!")
            .with_response(FOOD_JSON);
        let analyzer = analyzer(&mock, &["k1", "k2"]);

        let result = analyzer.analyze(&AnalysisRequest::new("img")).await;

        assert_eq!(result.reason(), Some(UNREADABLE_REASON));
        assert_eq!(mock.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_fenced_output_is_parsed() {
        let mock = MockVisionClient::new().with_response(format!("```json\n{}\n```", FOOD_JSON));
        let analyzer = analyzer(&mock, &["k1"]);

        let result = analyzer.analyze(&AnalysisRequest::new("img")).await;
        assert_eq!(result.food().unwrap().calories, 95);
    }

    #[tokio::test]
    async fn test_mime_type_is_forwarded() {
        let mock = MockVisionClient::new();
        let analyzer = analyzer(&mock, &["k1"]);

        analyzer
            .analyze(&AnalysisRequest::new("data:image/png;base64,iVBORw=="))
            .await;
        analyzer.analyze(&AnalysisRequest::new("iVBORw==")).await;

        let calls = mock.calls();
        assert_eq!(calls[0].mime_type, "image/png");
        assert_eq!(calls[1].mime_type, "image/jpeg");
    }
}
