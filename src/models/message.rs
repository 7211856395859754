use tokio::time::Instant;

use super::telegram::{ChatKind, Update};

/// A text message that passed validation, scoped to one processing cycle.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender_name: String,
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub text: String,
    /// Monotonic arrival time, fed to the cooldown gate.
    pub received_at: Instant,
    pub is_mention: bool,
}

impl InboundMessage {
    /// Returns `None` for updates without a message, without text, or with
    /// blank text.
    pub fn from_update(
        update: &Update,
        received_at: Instant,
        bot_username: Option<&str>,
    ) -> Option<Self> {
        let message = update.message.as_ref()?;
        let text = message.text.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }

        let sender_name = message
            .from
            .as_ref()
            .map(|u| u.first_name.clone())
            .or_else(|| message.chat.title.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let is_mention = bot_username
            .map(|name| text.starts_with(&format!("@{}", name)))
            .unwrap_or(false);

        Some(InboundMessage {
            sender_name,
            chat_id: message.chat.id,
            chat_kind: message.chat.kind,
            text: text.to_string(),
            received_at,
            is_mention,
        })
    }

    pub fn is_command(&self) -> bool {
        self.text.starts_with('/')
    }
}
