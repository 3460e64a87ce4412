//! Scan orchestration
//!
//! [`FoodScanner`] is the single entry point the presentation layer calls.
//! It picks its analysis strategy once, at construction: the remote Gemini
//! path when API keys are configured, the offline stub otherwise.

pub mod credentials;
pub mod normalize;
pub mod remote;
pub mod stub;

pub use credentials::CredentialPool;
pub use remote::RemoteAnalyzer;
pub use stub::StubAnalyzer;

use crate::ai::{GeminiVisionClient, VisionModel};
use crate::models::{AnalysisRequest, AnalysisResult, Config, DietaryPreference, ToneMode};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait AnalysisStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Never fails: every error is reported as a non-food result.
    async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult;
}

pub struct FoodScanner {
    strategy: Box<dyn AnalysisStrategy>,
}

impl FoodScanner {
    pub fn new(strategy: impl AnalysisStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    /// Construct a scanner from environment configuration (`Config::from_env`).
    pub fn from_config(config: &Config) -> Self {
        let client = GeminiVisionClient::from_config(config);
        let pool = CredentialPool::new(config.api_keys.iter().cloned());
        if !pool.is_empty() {
            info!("Gemini model: {} (timeout {:?})", client.model(), config.timeout);
        }
        Self::with_vision_model(client, pool, config.stub_delay)
    }

    /// Use `model` when `pool` has keys, otherwise fall back to the stub.
    pub fn with_vision_model(
        model: impl VisionModel + 'static,
        pool: CredentialPool,
        stub_delay: Duration,
    ) -> Self {
        if pool.is_empty() {
            tracing::warn!("No Gemini API keys found; using stub analysis results");
            Self::new(StubAnalyzer::new().with_delay(stub_delay))
        } else {
            info!("Analyzer: remote ({} API key(s))", pool.len());
            Self::new(RemoteAnalyzer::new(model, pool))
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    #[tracing::instrument(skip_all, fields(scan_id = %Uuid::new_v4()))]
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        info!(
            "Analyzing image with {} analyzer (language={}, diet={}, tone={:?})",
            self.strategy.name(),
            request.language,
            request.dietary_preference.as_str(),
            request.tone
        );
        self.strategy.analyze(request).await
    }

    /// Convenience wrapper taking the caller's raw preference strings.
    pub async fn analyze_image(
        &self,
        image: &str,
        language: &str,
        dietary_preference: &str,
        tone: ToneMode,
    ) -> AnalysisResult {
        let request = AnalysisRequest::new(image)
            .with_language(language)
            .with_dietary_preference(DietaryPreference::from(dietary_preference))
            .with_tone(tone);
        self.analyze(&request).await
    }
}
