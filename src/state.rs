use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::models::{HistoryBuffer, HistoryEntry, RateLimiter};

/// Everything the pipeline mutates. Shared by all chats.
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<Mutex<HistoryBuffer>>,
    pub cooldown: Arc<Mutex<RateLimiter>>,
}

impl AppState {
    pub fn new(memory_limit: usize, cooldown: Duration) -> Self {
        Self {
            history: Arc::new(Mutex::new(HistoryBuffer::new(memory_limit))),
            cooldown: Arc::new(Mutex::new(RateLimiter::new(cooldown))),
        }
    }

    /// Cooldown check plus the `User:` append, done under both locks so two
    /// racing messages cannot both pass the gate. Returns the rendered context
    /// on acceptance.
    pub fn admit(&self, text: &str, now: Instant) -> Option<String> {
        let mut cooldown = lock(&self.cooldown);
        if !cooldown.try_accept(now) {
            return None;
        }
        let mut history = lock(&self.history);
        history.append(HistoryEntry::User(text.to_string()));
        Some(history.render_context())
    }

    pub fn record_reply(&self, reply: &str) {
        let mut history = lock(&self.history);
        history.append(HistoryEntry::Bot(reply.to_string()));
        tracing::debug!(entries = history.len(), capacity = history.capacity(), "History updated");
    }

    #[cfg(test)]
    pub fn history_snapshot(&self) -> Vec<HistoryEntry> {
        lock(&self.history).iter().cloned().collect()
    }
}

// A panic mid-append cannot leave the buffer in a broken shape, so a poisoned
// lock is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
