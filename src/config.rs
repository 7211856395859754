use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";

pub const DEFAULT_PERSONA: &str = "You are Olivia Emma, a vibrant, confident, and kind-hearted girl in a Telegram community.
You radiate good vibes, warmth, and playful wit. Your messages are short (under 25–50 words), positive, and full of personality.
You tease lightly, joke with charm, and uplift others, always respectful, never flirty or crude.
Be the person everyone loves chatting with: smart, funny, and effortlessly cool 🌸";

/// Randomized pause before generating, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkDelay {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl ThinkDelay {
    pub const DISABLED: ThinkDelay = ThinkDelay { min_secs: 0, max_secs: 0 };

    pub fn is_enabled(&self) -> bool {
        self.max_secs > 0
    }

    /// Picks a uniform duration in `[min, max]`. A `min` above `max` collapses to `max`.
    pub fn sample(&self) -> Duration {
        let min = self.min_secs.min(self.max_secs);
        let secs = rand::random_range(min..=self.max_secs);
        Duration::from_secs(secs)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub telegram_api_url: String,
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    pub gemini_model: String,
    pub persona: String,
    /// Minimum gap between accepted messages, across all chats.
    pub cooldown: Duration,
    /// How many `User:`/`Bot:` lines the rolling context keeps.
    pub memory_limit: usize,
    pub think_delay: ThinkDelay,
    /// Health server port. `None` means no health server.
    pub port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_bot_token = var("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let gemini_api_key = var("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let telegram_api_url = var("TELEGRAM_API_URL")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let gemini_api_url = var("GEMINI_API_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let gemini_model = var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let persona = var("PERSONA_PROMPT").unwrap_or_else(|| DEFAULT_PERSONA.to_string());

        let cooldown_secs: u64 = parse_or(&var, "COOLDOWN_SECONDS", 3);
        let memory_limit: usize = parse_or(&var, "MEMORY_LIMIT", 5);
        let think_delay = ThinkDelay {
            min_secs: parse_or(&var, "THINK_DELAY_MIN_SECONDS", 5),
            max_secs: parse_or(&var, "THINK_DELAY_MAX_SECONDS", 20),
        };
        let port = var("PORT").and_then(|raw| match raw.parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => {
                tracing::warn!(value = %raw, "Invalid PORT, health server disabled");
                None
            }
        });

        Ok(Config {
            telegram_bot_token,
            telegram_api_url,
            gemini_api_key,
            gemini_api_url,
            gemini_model,
            persona,
            cooldown: Duration::from_secs(cooldown_secs),
            memory_limit,
            think_delay,
            port,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Unparseable value, using default");
            default
        }),
    }
}
