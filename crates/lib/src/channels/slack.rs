//! Slack channel: chat.postMessage and auth.test via the Web API.

use crate::channels::handle::{ChannelHandle, SendError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Common envelope of Slack Web API responses.
#[derive(Debug, Deserialize)]
struct SlackApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    /// Present on auth.test.
    #[serde(default)]
    user_id: Option<String>,
}

/// Per-request deadline for Web API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// How long a failed auth.test is remembered before the next lookup tries again.
const IDENTITY_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Cached result of the bot identity lookup.
#[derive(Debug, Clone)]
enum Identity {
    Unknown,
    Known(String),
    Failed { at: Instant, error: String },
}

/// Slack channel connector: posts replies and resolves the bot user id (cached).
pub struct SlackChannel {
    token: Option<String>,
    api_base: String,
    client: reqwest::Client,
    /// Only held for reads and stores, never across a request.
    identity: RwLock<Identity>,
    identity_retry_after: Duration,
}

impl SlackChannel {
    pub fn new(token: Option<String>, api_base: impl Into<String>) -> Self {
        Self {
            token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            identity: RwLock::new(Identity::Unknown),
            identity_retry_after: IDENTITY_RETRY_AFTER,
        }
    }

    /// Override how long a failed identity lookup is cached.
    pub fn with_identity_retry_after(mut self, retry_after: Duration) -> Self {
        self.identity_retry_after = retry_after;
        self
    }

    /// POST a Web API method with a JSON body. `ok: false` becomes `SendError::Api`.
    async fn call(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<SlackApiResponse, SendError> {
        let token = self.token.as_ref().ok_or(SendError::MissingToken)?;
        let url = format!("{}/{}", self.api_base, method);
        let res = self
            .client
            .post(&url)
            .bearer_auth(token)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SendError::Http(format!("{} failed: {} {}", method, status, body)));
        }
        let data: SlackApiResponse = res.json().await?;
        if !data.ok {
            let err = data.error.unwrap_or_else(|| "unknown_error".to_string());
            return Err(SendError::Api(err));
        }
        Ok(data)
    }

    /// Call auth.test and return the bot user id (uncached).
    pub async fn auth_test(&self) -> Result<String, SendError> {
        let data = self.call("auth.test", &serde_json::json!({})).await?;
        data.user_id
            .filter(|u| !u.is_empty())
            .ok_or_else(|| SendError::Api("auth.test returned no user_id".to_string()))
    }

    /// Send a text message to a channel via chat.postMessage.
    /// An auth failure also clears the cached bot user id.
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), SendError> {
        let body = serde_json::json!({ "channel": channel, "text": text });
        match self.call("chat.postMessage", &body).await {
            Ok(_) => Ok(()),
            Err(e) => {
                if e.is_auth_failure() {
                    self.invalidate_identity().await;
                }
                Err(e)
            }
        }
    }

    /// Bot user id, fetched with auth.test on first use and cached afterwards.
    /// A failed lookup is cached too and answered with `IdentityUnavailable`
    /// until `identity_retry_after` has passed.
    pub async fn cached_user_id(&self) -> Result<String, SendError> {
        match &*self.identity.read().await {
            Identity::Known(id) => return Ok(id.clone()),
            Identity::Failed { at, error } if at.elapsed() < self.identity_retry_after => {
                return Err(SendError::IdentityUnavailable(error.clone()));
            }
            _ => {}
        }

        // Concurrent misses may each call auth.test; the last result wins.
        let result = self.auth_test().await;
        let mut g = self.identity.write().await;
        match result {
            Ok(id) => {
                log::info!("slack: bot user id resolved: {}", id);
                *g = Identity::Known(id.clone());
                Ok(id)
            }
            Err(e) => {
                if let Identity::Known(id) = &*g {
                    return Ok(id.clone());
                }
                log::warn!("slack: auth.test failed: {}", e);
                *g = Identity::Failed {
                    at: Instant::now(),
                    error: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Drop the cached bot user id so the next lookup calls auth.test again.
    pub async fn invalidate_identity(&self) {
        let previous = std::mem::replace(&mut *self.identity.write().await, Identity::Unknown);
        if matches!(previous, Identity::Known(_)) {
            log::warn!("slack: auth failure, cleared cached bot user id");
        }
    }
}

#[async_trait]
impl ChannelHandle for SlackChannel {
    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<(), SendError> {
        SlackChannel::post_message(self, conversation_id, text).await
    }

    async fn self_identity(&self) -> Result<String, SendError> {
        self.cached_user_id().await
    }
}
