pub mod client;
#[cfg(test)]
pub(crate) mod test_support;
pub mod types;
pub mod vision;

pub use vision::GeminiVisionClient;
