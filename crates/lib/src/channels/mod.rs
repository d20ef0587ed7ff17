//! Communication channels (Slack).
//!
//! `ChannelHandle` is the capability the intake worker uses to reply and to learn
//! the bot's own identity; `SlackChannel` implements it over the Slack Web API.

mod handle;
mod slack;

pub use handle::{ChannelHandle, SendError};
pub use slack::SlackChannel;
