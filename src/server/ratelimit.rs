//! Fixed-window request limiter keyed by client identifier.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::{DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW};
use crate::foundation::error::MemeError;

#[derive(Clone, Copy, Debug)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Outcome of one [`RateLimiter::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// When the caller's window ends.
    pub reset_at: Instant,
}

impl RateLimitDecision {
    /// Time left until the window resets, measured from `now`.
    pub fn retry_after(&self, now: Instant) -> Duration {
        self.reset_at.saturating_duration_since(now)
    }

    /// The decision itself when allowed, otherwise a [`MemeError::RateLimited`].
    pub fn into_result(self, now: Instant) -> Result<Self, MemeError> {
        if self.allowed {
            Ok(self)
        } else {
            Err(MemeError::rate_limited(self.retry_after(now)))
        }
    }
}

/// In-memory limiter: at most `limit` requests per client per `window`.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW)
    }
}

impl RateLimiter {
    /// Create a limiter; `limit` is clamped to at least 1.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1),
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Requests allowed per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request from `key` now.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Count a request from `key` at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self.lock();

        match windows.get_mut(key) {
            Some(w) if now <= w.reset_at => {
                if w.count < self.limit {
                    w.count += 1;
                    RateLimitDecision {
                        allowed: true,
                        remaining: self.limit - w.count,
                        reset_at: w.reset_at,
                    }
                } else {
                    RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at: w.reset_at,
                    }
                }
            }
            _ => {
                let reset_at = now + self.window;
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at,
                    },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: self.limit - 1,
                    reset_at,
                }
            }
        }
    }

    /// Drop every window that has elapsed at `now`; returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, w| now <= w.reset_at);
        before - windows.len()
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when no client is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Purge expired windows every `interval` on the current tokio runtime.
    pub fn spawn_purge_task(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.purge_expired(Instant::now());
                if removed > 0 {
                    tracing::debug!(removed, remaining = self.len(), "purged rate-limit windows");
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        // A poisoned map only holds counters; keep serving with whatever it has.
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/server/ratelimit.rs"]
mod tests;
