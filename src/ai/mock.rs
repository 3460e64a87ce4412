use super::{ImagePayload, VisionModel};
use crate::InferenceError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One call observed by [`MockVisionClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub credential: String,
    pub mime_type: String,
    pub prompt: String,
}

pub const DEFAULT_MOCK_RESPONSE: &str = r#"{"isFood": true, "foodName": "Grilled Chicken Salad", "calories": 420, "protein": 35, "carbs": 18, "fat": 22, "healthScore": 82, "briefTip": "Go easy on the dressing.", "confidence": 90, "isSafe": true, "warning": null, "carbonFootprint": "Medium", "sustainabilityTip": "Choose seasonal greens."}"#;

/// Scripted [`VisionModel`]: queued outcomes are returned in order, then a
/// canned food response once the queue is empty.
#[derive(Clone)]
pub struct MockVisionClient {
    responses: Arc<Mutex<VecDeque<std::result::Result<String, InferenceError>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn with_error(self, error: InferenceError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_rate_limit(self) -> Self {
        self.with_error(InferenceError::RateLimited {
            status: 429,
            message: "Resource has been exhausted (e.g. check quota).".to_string(),
        })
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn credentials_used(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.credential.clone())
            .collect()
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionModel for MockVisionClient {
    async fn generate(
        &self,
        credential: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> std::result::Result<String, InferenceError> {
        self.calls.lock().unwrap().push(RecordedCall {
            credential: credential.to_string(),
            mime_type: image.mime_type.clone(),
            prompt: prompt.to_string(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_MOCK_RESPONSE.to_string()))
    }
}
