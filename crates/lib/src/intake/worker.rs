//! Background processing of one accepted event: filter, generate, reply.

use crate::channels::ChannelHandle;
use crate::config::{BotConfig, ReplyMode};
use crate::images::ImageGenerator;
use crate::intake::event::InboundEvent;
use crate::intake::filter::{classify, IgnoreReason, Verdict};
use crate::intake::stats::EventState;
use std::sync::Arc;

/// How a worker run ended. Every variant is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    Ignored(IgnoreReason),
    GenerationFailed,
    Sent,
    SendFailed,
}

impl WorkerOutcome {
    pub fn state(&self) -> EventState {
        match self {
            WorkerOutcome::Ignored(_) => EventState::Ignored,
            WorkerOutcome::GenerationFailed => EventState::GenerationFailed,
            WorkerOutcome::Sent => EventState::Sent,
            WorkerOutcome::SendFailed => EventState::SendFailed,
        }
    }
}

/// Executes accepted events. Holds only capabilities; no shared mutable state.
pub struct Worker {
    generator: Arc<dyn ImageGenerator>,
    channel: Arc<dyn ChannelHandle>,
    mode: ReplyMode,
    reply_template: String,
}

impl Worker {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        channel: Arc<dyn ChannelHandle>,
        bot: &BotConfig,
    ) -> Self {
        Self {
            generator,
            channel,
            mode: bot.mode,
            reply_template: bot.reply_template.clone(),
        }
    }

    /// Process one event to a terminal outcome. Never returns an error and never retries.
    pub async fn run(&self, event: &InboundEvent) -> WorkerOutcome {
        // Identity-free checks first: only an otherwise actionable event pays for the lookup.
        let mut verdict = classify(event, None);
        if verdict == Verdict::Actionable && !event.originator_id.is_empty() {
            match self.channel.self_identity().await {
                Ok(id) => verdict = classify(event, Some(&id)),
                Err(e) => log::debug!(
                    "event {}: bot identity unavailable, skipping own-message check: {}",
                    event.event_id,
                    e
                ),
            }
        }
        if let Verdict::Ignore(reason) = verdict {
            log::debug!("event {}: ignored ({})", event.event_id, reason.as_str());
            return WorkerOutcome::Ignored(reason);
        }

        let prompt = event.text.as_str();
        let reply = match self.mode {
            ReplyMode::Echo => format!("Echo: {}", prompt),
            ReplyMode::Image => match self.generator.generate(prompt).await {
                Ok(url) => render_reply(&self.reply_template, &url, prompt),
                Err(e) => {
                    log::warn!("event {}: image generation failed: {}", event.event_id, e);
                    return WorkerOutcome::GenerationFailed;
                }
            },
        };

        match self
            .channel
            .send_message(&event.conversation_id, &reply)
            .await
        {
            Ok(()) => {
                log::info!(
                    "event {}: reply sent to {}",
                    event.event_id,
                    event.conversation_id
                );
                WorkerOutcome::Sent
            }
            Err(e) => {
                log::warn!(
                    "event {}: send to {} failed: {}",
                    event.event_id,
                    event.conversation_id,
                    e
                );
                WorkerOutcome::SendFailed
            }
        }
    }
}

/// Fill `{url}` and `{prompt}` in the reply template. A template without `{url}` gets the URL appended.
pub fn render_reply(template: &str, url: &str, prompt: &str) -> String {
    if template.contains("{url}") {
        template.replace("{url}", url).replace("{prompt}", prompt)
    } else {
        format!("{} {}", template.replace("{prompt}", prompt).trim_end(), url)
    }
}
