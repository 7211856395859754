pub mod history;
pub mod cooldown;
pub mod message;
pub mod telegram;

pub use history::{HistoryBuffer, HistoryEntry};
pub use cooldown::RateLimiter;
pub use message::InboundMessage;
pub use telegram::{ChatKind, TelegramUser, Update};
