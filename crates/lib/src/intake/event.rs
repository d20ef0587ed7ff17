//! Inbound chat event as seen by the intake path.

/// One delivery attempt of a platform message event.
///
/// `event_id` is stable across redeliveries of the same logical event and is the only dedup key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    pub event_id: String,
    /// 0 on the first delivery attempt; taken from the retry header.
    pub retry_count: u32,
    /// Inner event type (e.g. "message", "app_mention"), when the platform sent one.
    /// Types that cannot carry a prompt are ignored by the filter.
    pub event_type: Option<String>,
    /// Non-empty for system-generated events (edits, deletions, bot echoes).
    pub subtype: Option<String>,
    /// Sender user id; empty when unknown.
    pub originator_id: String,
    pub text: String,
    /// Where a reply goes (Slack channel id).
    pub conversation_id: String,
}

impl InboundEvent {
    pub fn is_first_attempt(&self) -> bool {
        self.retry_count == 0
    }
}
