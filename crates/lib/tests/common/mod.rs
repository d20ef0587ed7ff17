//! Shared fakes and a tiny harness that runs the gateway router on an ephemeral port.

#![allow(dead_code)]

use async_trait::async_trait;
use lib::channels::{ChannelHandle, SendError};
use lib::config::Config;
use lib::gateway::{build_router, GatewayState};
use lib::images::{ImageError, ImageGenerator};
use lib::intake::{IntakeStats, MemoryDedupStore, StatsSnapshot};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BOT_USER_ID: &str = "UBOT";

/// Image generator that records prompts and returns a fixed result.
#[derive(Default)]
pub struct FakeImages {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
    /// URL to return; None means the API produced no image.
    pub url: Option<String>,
    pub delay: Option<Duration>,
    /// Panic when asked for this prompt.
    pub panic_on: Option<String>,
}

impl FakeImages {
    pub fn returning(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate(&self, prompt: &str) -> Result<String, ImageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.panic_on.as_deref() == Some(prompt) {
            panic!("fake image generator exploded on {prompt}");
        }
        self.url.clone().ok_or(ImageError::EmptyResult)
    }
}

/// Channel that records sends. `fail_with` makes every send fail with that Slack error.
#[derive(Default)]
pub struct FakeChannel {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_with: Option<String>,
}

impl FakeChannel {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelHandle for FakeChannel {
    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<(), SendError> {
        if let Some(ref e) = self.fail_with {
            return Err(SendError::Api(e.clone()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn self_identity(&self) -> Result<String, SendError> {
        Ok(BOT_USER_ID.to_string())
    }
}

/// Gateway running in a background task.
pub struct TestServer {
    pub base: String,
    pub client: reqwest::Client,
    pub stats: Arc<IntakeStats>,
}

pub async fn start(config: Config, images: Arc<FakeImages>, channel: Arc<FakeChannel>) -> TestServer {
    let state = GatewayState::new(config, images, channel, Arc::new(MemoryDedupStore::new()));
    let stats = state.stats.clone();
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    TestServer {
        base: format!("http://{}", addr),
        client: reqwest::Client::new(),
        stats,
    }
}

pub fn message_event(event_id: &str, text: &str, channel: &str, user: &str) -> Value {
    serde_json::json!({
        "event_id": event_id,
        "event": { "type": "message", "text": text, "channel": channel, "user": user }
    })
}

impl TestServer {
    /// POST a raw body to the events endpoint with an optional retry header.
    pub async fn post_raw(
        &self,
        body: impl Into<reqwest::Body>,
        retry: Option<(&str, &str)>,
    ) -> (reqwest::StatusCode, String) {
        let mut req = self
            .client
            .post(format!("{}/slack/events", self.base))
            .header("content-type", "application/json")
            .body(body);
        if let Some((name, value)) = retry {
            req = req.header(name, value);
        }
        let res = req.send().await.expect("POST /slack/events");
        let status = res.status();
        let text = res.text().await.expect("response body");
        (status, text)
    }

    pub async fn post_event(&self, body: &Value) -> (reqwest::StatusCode, String) {
        self.post_raw(body.to_string(), None).await
    }

    pub async fn post_retry(&self, body: &Value, retry_num: &str) -> (reqwest::StatusCode, String) {
        self.post_raw(body.to_string(), Some(("X-Slack-Retry-Num", retry_num)))
            .await
    }

    /// Wait until every accepted event reached a terminal state and `done` holds.
    pub async fn settle(&self, done: impl Fn(&StatsSnapshot) -> bool) -> StatsSnapshot {
        for _ in 0..200 {
            let s = self.stats.snapshot();
            if s.in_flight == 0 && done(&s) {
                return s;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!(
            "intake did not settle within 5s: {:?}",
            self.stats.snapshot()
        );
    }
}
