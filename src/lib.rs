//! Food-photo nutrition scanner backed by a generative vision model
//!
//! Sends a captured meal photo to Gemini with a structured nutrition prompt,
//! rotates across a pool of API keys when one runs out of quota, and
//! normalizes the model's free-form reply into a typed result. Without any
//! keys configured, a deterministic stand-in result is returned instead.

pub mod ai;
pub mod error;
pub mod locale;
pub mod models;
pub mod prompts;
pub mod scan;

pub use error::{Error, InferenceError, Result};
