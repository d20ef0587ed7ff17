//! Image generation capability: prompt in, image URL out.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("image api error: {0}")]
    Api(String),
    #[error("image api returned no image url")]
    EmptyResult,
}

/// Turns a prompt into the URL of a generated image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ImageError>;
}
