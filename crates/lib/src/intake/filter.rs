//! Decides whether an accepted event should produce a reply.

use crate::intake::event::InboundEvent;

/// Why an event produced no reply. Ignoring is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Inner event type is neither `message` nor `app_mention`.
    UnsupportedType,
    /// System-generated event (edit, deletion, bot message, ...).
    Subtype,
    /// Sent by the bot itself.
    OwnMessage,
    EmptyText,
    NoConversation,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::UnsupportedType => "unsupported event type",
            IgnoreReason::Subtype => "subtype",
            IgnoreReason::OwnMessage => "own message",
            IgnoreReason::EmptyText => "empty text",
            IgnoreReason::NoConversation => "no conversation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Actionable,
    Ignore(IgnoreReason),
}

/// Inner event types that can carry a prompt. An event without a type is treated as a message.
const REPLYABLE_TYPES: &[&str] = &["message", "app_mention"];

/// Classify an event. `bot_user_id` is the bot's own user id; `None` skips the own-message check.
pub fn classify(event: &InboundEvent, bot_user_id: Option<&str>) -> Verdict {
    if let Some(t) = event.event_type.as_deref() {
        if !REPLYABLE_TYPES.contains(&t) {
            return Verdict::Ignore(IgnoreReason::UnsupportedType);
        }
    }
    if event.subtype.as_deref().is_some_and(|s| !s.is_empty()) {
        return Verdict::Ignore(IgnoreReason::Subtype);
    }
    if let Some(bot) = bot_user_id {
        if !event.originator_id.is_empty() && event.originator_id == bot {
            return Verdict::Ignore(IgnoreReason::OwnMessage);
        }
    }
    if event.text.trim().is_empty() {
        return Verdict::Ignore(IgnoreReason::EmptyText);
    }
    if event.conversation_id.is_empty() {
        return Verdict::Ignore(IgnoreReason::NoConversation);
    }
    Verdict::Actionable
}
