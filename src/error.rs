use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Gemini request failed: {0}")]
    Http(reqwest::Error),

    #[error("Gemini returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse Gemini response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Gemini returned no candidates")]
    NoCandidates,
}

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Http(reqwest::Error),

    #[error("failed to parse Telegram response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Telegram API error: {}", .0.as_deref().unwrap_or("no description"))]
    Api(Option<String>),

    #[error("Telegram response carried no result")]
    EmptyResult,
}

// Request URLs carry the bot token and the Gemini key, so they never reach
// an error message.
impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Http(e.without_url())
    }
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        TelegramError::Http(e.without_url())
    }
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telegram(#[from] TelegramError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to install log subscriber: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),
}
