use super::AnalysisStrategy;
use crate::locale;
use crate::models::{AnalysisRequest, AnalysisResult, CarbonFootprint, FoodAnalysis};
use async_trait::async_trait;
use std::time::Duration;

/// Offline stand-in used when no API key is configured. Always reports the
/// same soup, named in the requested language, without touching the network.
#[derive(Debug, Clone, Default)]
pub struct StubAnalyzer {
    delay: Duration,
}

impl StubAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate inference latency so UI loading states can be exercised.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn result_for(language: &str) -> AnalysisResult {
        AnalysisResult::Food(FoodAnalysis {
            food_name: locale::stub_food_name(language).to_string(),
            calories: 250,
            protein: 10,
            carbs: 20,
            fat: 15,
            health_score: 88,
            brief_tip: "Great source of vitamins!".to_string(),
            confidence: 95,
            is_safe: true,
            warning: None,
            carbon_footprint: CarbonFootprint::Low,
            sustainability_tip: "Seasonal vegetables travel less.".to_string(),
            next_action_tip: None,
        })
    }
}

#[async_trait]
impl AnalysisStrategy for StubAnalyzer {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::info!("Returning stub analysis for language {}", request.language);
        Self::result_for(&request.language)
    }
}
