//! OpenAI images API client (https://api.openai.com/v1 by default).

use crate::config::ImagesConfig;
use crate::images::generator::{ImageError, ImageGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for `POST /images/generations`.
#[derive(Clone)]
pub struct OpenAiImageClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    size: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    url: Option<String>,
}

impl OpenAiImageClient {
    pub fn new(
        base_url: Option<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key,
            model: model.into(),
            size: size.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from the `images` config section and a resolved API key.
    pub fn from_config(images: &ImagesConfig, api_key: Option<String>) -> Self {
        Self::new(
            Some(images.base_url.clone()),
            api_key,
            images.model.clone(),
            images.size.clone(),
        )
    }

    /// POST /images/generations with n = 1; returns the first image URL.
    pub async fn create_image(&self, prompt: &str) -> Result<String, ImageError> {
        let url = format!("{}/images/generations", self.base_url);
        let body = GenerationRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };
        let mut req = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ImageError::Api(format!("{} {}", status, body)));
        }
        let data: GenerationResponse = res.json().await?;
        data.data
            .into_iter()
            .next()
            .and_then(|img| img.url)
            .filter(|u| !u.trim().is_empty())
            .ok_or(ImageError::EmptyResult)
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    async fn generate(&self, prompt: &str) -> Result<String, ImageError> {
        self.create_image(prompt).await
    }
}
