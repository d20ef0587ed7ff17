//! Gateway: HTTP boundary of the bot.
//!
//! Single port serves `POST /slack/events` (Slack Events API webhook) and `GET /` (health).
//! Handshakes are answered inline; every other well-formed delivery is acknowledged
//! immediately and handed to the intake dispatcher.

mod protocol;
mod server;

pub use protocol::{parse_retry_num, retry_count, PayloadError, WebhookPayload, RETRY_HEADERS};
pub use server::{build_router, run_gateway, GatewayState};
