//! slackdraw core library: Slack webhook intake, dedup, background image generation and replies.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod images;
pub mod init;
pub mod intake;
