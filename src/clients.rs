pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;

pub use gemini::GeminiClient;

/// Prompt-in, text-out generative model. Implementations may fail for any reason
/// (transport, quota, malformed payload); callers treat all failures alike.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
