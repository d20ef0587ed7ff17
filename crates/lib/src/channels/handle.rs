//! Channel capability: send a message to a conversation and report the bot's own identity.

use async_trait::async_trait;

/// Slack error strings that mean the token is no longer usable.
const AUTH_FAILURE_ERRORS: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "token_revoked",
    "token_expired",
    "account_inactive",
];

/// Failure of a channel call. `Api` carries the platform-reported error string.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("channel request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("channel http error: {0}")]
    Http(String),
    #[error("channel api error: {0}")]
    Api(String),
    #[error("channel token not configured")]
    MissingToken,
    /// A recent identity lookup failed; not retried yet.
    #[error("bot identity unavailable: {0}")]
    IdentityUnavailable(String),
}

impl SendError {
    /// True when the platform rejected our credentials.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            SendError::Api(e) => AUTH_FAILURE_ERRORS.contains(&e.as_str()),
            SendError::MissingToken => true,
            _ => false,
        }
    }
}

/// Handle to a chat channel (send message, look up who we are).
#[async_trait]
pub trait ChannelHandle: Send + Sync {
    /// Send a text message to a conversation (e.g. Slack channel id).
    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<(), SendError>;

    /// The bot's own user id on the platform. Implementations cache this.
    async fn self_identity(&self) -> Result<String, SendError>;
}
