//! Vision model integration for food photo analysis
//!
//! Defines the seam the scan orchestrator talks through: one prompt plus one
//! inline image in, free-form text out, with failures already classified.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiVisionClient;
pub use mime::ImagePayload;
pub use mock::MockVisionClient;

use crate::InferenceError;
use async_trait::async_trait;

#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Run one inference call authorized by `credential`.
    async fn generate(
        &self,
        credential: &str,
        prompt: &str,
        image: &ImagePayload,
    ) -> std::result::Result<String, InferenceError>;
}
