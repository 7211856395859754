use std::sync::Arc;

use crate::error::GenerationError;
use crate::services::gemini::TextGenerator;

pub const FALLBACK_REPLY: &str = "I'm buffering my next genius joke...";
pub const EMPTY_REPLY: &str = "...";

/// Wraps a [`TextGenerator`] with the persona prompt and the reply fallbacks.
#[derive(Clone)]
pub struct ReplyGenerator {
    generator: Arc<dyn TextGenerator>,
    persona: String,
}

impl ReplyGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, persona: impl Into<String>) -> Self {
        Self {
            generator,
            persona: persona.into(),
        }
    }

    pub fn build_prompt(&self, user_text: &str, history_context: &str) -> String {
        format!(
            "{}\n\nChat so far:\n{}\n\nUser: {}\nFunny Bot:",
            self.persona, history_context, user_text
        )
    }

    /// Calls the service and trims the result. Blank output becomes `"..."`.
    pub async fn try_generate(&self, user_text: &str, history_context: &str) -> Result<String, GenerationError> {
        let prompt = self.build_prompt(user_text, history_context);
        tracing::info!(text = %user_text, "Sending to Gemini API");
        tracing::debug!(%prompt, "Full Gemini prompt");

        let raw = self.generator.generate_content(&prompt).await?;
        let text = raw.trim();
        Ok(if text.is_empty() { EMPTY_REPLY.to_string() } else { text.to_string() })
    }

    /// Never fails: service errors are logged and replaced with [`FALLBACK_REPLY`].
    pub async fn generate(&self, user_text: &str, history_context: &str) -> String {
        match self.try_generate(user_text, history_context).await {
            Ok(text) => {
                tracing::info!(reply = %text, "Gemini replied");
                text
            }
            Err(e) => {
                tracing::error!(error = %e, "Gemini API error");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
