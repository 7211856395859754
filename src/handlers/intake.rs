use std::sync::Arc;
use tokio::time::Instant;

use crate::config::ThinkDelay;
use crate::models::{InboundMessage, Update};
use crate::services::reply::ReplyGenerator;
use crate::services::telegram::ChatTransport;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NoText,
    Command,
    Cooldown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Dropped(DropReason),
    Replied(String),
    SendFailed(String),
}

/// Runs one inbound update through filter, cooldown, delay, generate and send.
#[derive(Clone)]
pub struct IntakeHandler {
    state: AppState,
    replies: ReplyGenerator,
    transport: Arc<dyn ChatTransport>,
    think_delay: ThinkDelay,
    bot_username: Option<String>,
}

impl IntakeHandler {
    pub fn new(
        state: AppState,
        replies: ReplyGenerator,
        transport: Arc<dyn ChatTransport>,
        think_delay: ThinkDelay,
        bot_username: Option<String>,
    ) -> Self {
        Self {
            state,
            replies,
            transport,
            think_delay,
            bot_username,
        }
    }

    pub async fn handle_update(&self, update: Update, received_at: Instant) -> Outcome {
        match InboundMessage::from_update(&update, received_at, self.bot_username.as_deref()) {
            Some(msg) => self.process(msg).await,
            None => {
                tracing::debug!(update_id = update.update_id, "Ignoring update without text");
                Outcome::Dropped(DropReason::NoText)
            }
        }
    }

    pub async fn process(&self, msg: InboundMessage) -> Outcome {
        tracing::info!(
            sender = %msg.sender_name,
            chat_id = msg.chat_id,
            chat_type = msg.chat_kind.as_str(),
            mention = msg.is_mention,
            text = %msg.text,
            "Message received"
        );

        if msg.is_command() {
            tracing::info!(chat_id = msg.chat_id, "Ignored command message");
            return Outcome::Dropped(DropReason::Command);
        }

        let Some(context) = self.state.admit(&msg.text, msg.received_at) else {
            tracing::info!(chat_id = msg.chat_id, "Cooldown active, ignoring message");
            return Outcome::Dropped(DropReason::Cooldown);
        };

        if self.think_delay.is_enabled() {
            if let Err(e) = self.transport.send_typing(msg.chat_id).await {
                tracing::warn!(chat_id = msg.chat_id, error = %e, "Failed to send typing action");
            }
            let pause = self.think_delay.sample();
            tracing::debug!(chat_id = msg.chat_id, secs = pause.as_secs(), "Thinking");
            tokio::time::sleep(pause).await;
        }

        let reply = self.replies.generate(&msg.text, &context).await;
        self.state.record_reply(&reply);

        match self.transport.send_text(msg.chat_id, &reply).await {
            Ok(message_id) => {
                tracing::info!(sender = %msg.sender_name, chat_id = msg.chat_id, message_id, reply = %reply, "Sent reply");
                Outcome::Replied(reply)
            }
            Err(e) => {
                tracing::error!(chat_id = msg.chat_id, error = %e, "Failed to send message");
                Outcome::SendFailed(reply)
            }
        }
    }
}
