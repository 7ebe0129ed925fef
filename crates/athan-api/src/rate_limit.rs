//! In-memory login rate limiter.
//!
//! A per-identifier sliding-window attempt counter guarding the login
//! endpoint against brute-force password attacks. The store is a
//! mutex-guarded map so the check-then-increment invariant holds on the
//! multi-threaded runtime; single-process memory only, which is all a
//! single-user deployment needs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use athan_core::defaults;

/// Per-identifier attempt counter.
#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    attempts: u32,
    reset_at: Instant,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining_attempts: u32,
    pub reset_at: Instant,
}

/// Mutex-guarded attempt store with atomic check-and-increment.
pub struct LoginRateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    max_attempts: u32,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_attempts,
            window,
        }
    }

    /// Limiter with the production constants (5 attempts per 15 minutes).
    pub fn from_defaults() -> Self {
        Self::new(
            defaults::LOGIN_MAX_ATTEMPTS,
            Duration::from_secs(defaults::LOGIN_WINDOW_SECS),
        )
    }

    /// Record one attempt for `identifier` and decide whether it may
    /// proceed.
    ///
    /// A missing or expired entry starts a fresh window. A live entry at
    /// the attempt ceiling is denied without incrementing further, leaving
    /// its reset time unchanged.
    pub fn check(&self, identifier: &str) -> RateLimitDecision {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("rate limiter mutex poisoned");

        match entries.get_mut(identifier) {
            Some(entry) if now <= entry.reset_at => {
                if entry.attempts >= self.max_attempts {
                    return RateLimitDecision {
                        allowed: false,
                        remaining_attempts: 0,
                        reset_at: entry.reset_at,
                    };
                }

                entry.attempts += 1;
                RateLimitDecision {
                    allowed: true,
                    remaining_attempts: self.max_attempts - entry.attempts,
                    reset_at: entry.reset_at,
                }
            }
            _ => {
                let entry = RateLimitEntry {
                    attempts: 1,
                    reset_at: now + self.window,
                };
                entries.insert(identifier.to_string(), entry);
                RateLimitDecision {
                    allowed: true,
                    remaining_attempts: self.max_attempts - 1,
                    reset_at: entry.reset_at,
                }
            }
        }
    }

    /// Forget an identifier entirely.
    ///
    /// Called after a successful login so a legitimate user is not
    /// punished for earlier mistyped attempts.
    pub fn reset(&self, identifier: &str) {
        self.entries
            .lock()
            .expect("rate limiter mutex poisoned")
            .remove(identifier);
    }

    /// Drop all expired entries, bounding memory growth.
    ///
    /// Advisory housekeeping: expired entries are already treated as
    /// absent by `check`.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("rate limiter mutex poisoned");
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.reset_at);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed = removed, "Swept expired rate-limit entries");
        }
        removed
    }
}
