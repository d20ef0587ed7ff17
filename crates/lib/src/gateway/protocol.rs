//! Slack Events API wire types: request body parsing, retry header, response bodies.

use crate::intake::InboundEvent;
use axum::http::HeaderMap;
use serde::Serialize;
use serde_json::Value;

/// Headers carrying the delivery attempt number. Absent or "0" means first attempt.
pub const RETRY_HEADERS: &[&str] = &["x-slack-retry-num", "x-retry-num"];

/// Parsed POST body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookPayload {
    /// `{"type":"url_verification","challenge":"..."}`: echo the challenge back.
    Handshake { challenge: String },
    /// `{"event_id":"...","event":{...}}`.
    Event(InboundEvent),
    /// Valid JSON object that is neither of the above; acknowledged and dropped.
    Other,
}

/// The body could not be understood at all. The only case answered with 400.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("body is not a JSON object")]
    NotAnObject,
    #[error("url_verification without challenge")]
    MissingChallenge,
    #[error("event payload without event_id")]
    MissingEventId,
    #[error("event is not a JSON object")]
    InvalidEvent,
}

/// `{"challenge":"<token>"}`
#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub challenge: String,
}

/// `{"status":"ok"}`
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// `{"error":"<detail>"}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// String field of a JSON object; non-string values count as absent.
fn str_field<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(|v| v.as_str())
}

impl WebhookPayload {
    /// Parse a request body. The returned event has `retry_count` 0; the caller fills it from headers.
    ///
    /// Inner event fields are read leniently: a field of an unexpected JSON type is treated as
    /// missing so that unusual events are acknowledged instead of rejected.
    pub fn parse(body: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(PayloadError::NotAnObject);
        }

        if str_field(&value, "type") == Some("url_verification") {
            let challenge = str_field(&value, "challenge").ok_or(PayloadError::MissingChallenge)?;
            return Ok(WebhookPayload::Handshake {
                challenge: challenge.to_string(),
            });
        }

        let Some(event) = value.get("event") else {
            return Ok(WebhookPayload::Other);
        };
        if !event.is_object() {
            return Err(PayloadError::InvalidEvent);
        }
        let event_id = str_field(&value, "event_id")
            .filter(|id| !id.is_empty())
            .ok_or(PayloadError::MissingEventId)?;

        Ok(WebhookPayload::Event(InboundEvent {
            event_id: event_id.to_string(),
            retry_count: 0,
            event_type: str_field(event, "type").map(str::to_string),
            subtype: str_field(event, "subtype").map(str::to_string),
            originator_id: str_field(event, "user").unwrap_or_default().to_string(),
            text: str_field(event, "text").unwrap_or_default().to_string(),
            conversation_id: str_field(event, "channel").unwrap_or_default().to_string(),
        }))
    }
}

/// Attempt number from a retry header value. Absent, empty or "0" is the first attempt;
/// anything that is not a number counts as a retry.
pub fn parse_retry_num(value: Option<&str>) -> u32 {
    match value.map(str::trim) {
        None | Some("") => 0,
        Some(v) => v.parse().unwrap_or(1),
    }
}

/// Attempt number from request headers (first matching header in `RETRY_HEADERS`).
pub fn retry_count(headers: &HeaderMap) -> u32 {
    let value = RETRY_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .map(|v| v.to_str().unwrap_or("invalid"));
    parse_retry_num(value)
}
