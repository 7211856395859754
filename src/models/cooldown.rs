use std::time::Duration;
use tokio::time::Instant;

/// Process-wide gate: at most one accepted message per `cooldown`.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    cooldown: Duration,
    last_accepted: Option<Instant>,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: None,
        }
    }

    /// Records `now` and returns true when at least `cooldown` has passed
    /// since the last accepted call. Rejections leave the state untouched.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            // an instant older than `last` counts as zero elapsed
            if now.saturating_duration_since(last) < self.cooldown {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }

    #[cfg(test)]
    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }
}
