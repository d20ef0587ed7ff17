//! Gateway HTTP server: Slack events endpoint and health.

use crate::channels::{ChannelHandle, SlackChannel};
use crate::config::{self, Config, ReplyMode};
use crate::gateway::protocol::{
    self, AckResponse, ChallengeResponse, ErrorResponse, WebhookPayload,
};
use crate::images::{ImageGenerator, OpenAiImageClient};
use crate::intake::{DedupStore, Dispatcher, IntakeStats, MemoryDedupStore, Worker};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub dispatcher: Dispatcher,
    pub stats: Arc<IntakeStats>,
}

impl GatewayState {
    /// Wire the intake path from its capabilities.
    pub fn new(
        config: Config,
        generator: Arc<dyn ImageGenerator>,
        channel: Arc<dyn ChannelHandle>,
        dedup: Arc<dyn DedupStore>,
    ) -> Self {
        let stats = Arc::new(IntakeStats::new());
        let worker = Arc::new(Worker::new(generator, channel, &config.bot));
        let dispatcher = Dispatcher::new(dedup, worker, stats.clone());
        Self {
            config: Arc::new(config),
            dispatcher,
            stats,
        }
    }
}

/// Events path from config, always starting with '/'.
fn events_path(config: &Config) -> String {
    let p = config.gateway.events_path.trim();
    if p.starts_with('/') {
        p.to_string()
    } else {
        format!("/{}", p)
    }
}

/// Router with `GET /` (health) and `POST <eventsPath>` (Slack events).
pub fn build_router(state: GatewayState) -> Router {
    let path = events_path(&state.config);
    Router::new()
        .route("/", get(health_http))
        .route(&path, post(slack_events))
        .with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Fails at startup when the Slack token is missing, or the image API key is missing in image mode.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let slack_token = config::resolve_slack_token(&config).context(
        "slack bot token not configured (set slack.botToken or SLACK_BOT_TOKEN)",
    )?;
    let images_key = config::resolve_images_api_key(&config);
    if config.bot.mode == ReplyMode::Image && images_key.is_none() {
        anyhow::bail!("image API key not configured (set images.apiKey or OPENAI_API_KEY)");
    }

    let slack = Arc::new(SlackChannel::new(
        Some(slack_token),
        config::resolve_slack_api_base(&config),
    ));
    if let Err(e) = slack.cached_user_id().await {
        log::warn!(
            "could not resolve bot user id at startup, own-message check is off until a later lookup succeeds: {}",
            e
        );
    }
    let images = Arc::new(OpenAiImageClient::from_config(&config.images, images_key));

    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let path = events_path(&config);
    let state = GatewayState::new(config, images, slack, Arc::new(MemoryDedupStore::new()));
    let stats = state.stats.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {} (events at {})", bind_addr, path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;

    let in_flight = stats.snapshot().in_flight;
    if in_flight > 0 {
        log::warn!("gateway stopped with {} event(s) still in flight", in_flight);
    } else {
        log::info!("gateway stopped");
    }
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// POST <eventsPath>: answer handshakes synchronously, acknowledge everything else at once.
/// Only an unparseable body gets a non-200 status.
async fn slack_events(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = match WebhookPayload::parse(&body) {
        Ok(p) => p,
        Err(e) => {
            log::debug!("slack events: rejecting body: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };
    match payload {
        WebhookPayload::Handshake { challenge } => {
            log::info!("slack events: url_verification handshake");
            Json(ChallengeResponse { challenge }).into_response()
        }
        WebhookPayload::Event(mut event) => {
            event.retry_count = protocol::retry_count(&headers);
            state.dispatcher.dispatch(event).await;
            Json(AckResponse::ok()).into_response()
        }
        WebhookPayload::Other => {
            log::debug!("slack events: payload without event, acknowledged");
            Json(AckResponse::ok()).into_response()
        }
    }
}

/// GET / returns a simple health JSON with intake counters (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "events": state.stats.snapshot(),
    }))
}
