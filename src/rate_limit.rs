use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use dashmap::DashMap;

use crate::models::SessionId;

/// Sliding window in-memory rate limiter (process local).
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    windows: Arc<DashMap<String, VecDeque<Instant>>>,
    pub enabled: bool,
}

impl InMemoryRateLimiter {
    pub fn new(enabled: bool) -> Self {
        Self { windows: Arc::new(DashMap::new()), enabled }
    }

    /// Returns true if allowed, false if limited.
    pub fn check(&self, key: &str, limit: usize, window: Duration) -> bool {
        if !self.enabled { return true; }
        let now = Instant::now();
        let mut hits = self.windows.entry(key.to_string()).or_default();
        expire(&mut hits, now, window);
        if hits.len() < limit {
            hits.push_back(now);
            true
        } else {
            false
        }
    }

    /// Drops the window for `key`, e.g. when its session ends.
    pub fn forget(&self, key: &str) {
        self.windows.remove(key);
    }

    /// Drops every window whose hits have all aged out of `window`.
    /// Returns how many keys were released.
    pub fn prune(&self, window: Duration) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, hits| {
            expire(hits, now, window);
            !hits.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of keys currently holding a window.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

fn expire(hits: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while hits.front().is_some_and(|t| now.duration_since(*t) >= window) {
        hits.pop_front();
    }
}

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub report_limit: usize,
    pub report_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { report_limit: 30, report_window: Duration::from_secs(60) }
    }
}

/// Guard used by the report handlers: caps submissions per session.
#[derive(Clone)]
pub struct RateLimiterFacade {
    pub limiter: InMemoryRateLimiter,
    pub cfg: RateLimitConfig,
}

impl RateLimiterFacade {
    pub fn new(limiter: InMemoryRateLimiter, cfg: RateLimitConfig) -> Self { Self { limiter, cfg } }

    fn key(session: SessionId) -> String { format!("report:{session}") }

    pub fn allow_report(&self, session: SessionId) -> bool {
        self.limiter.check(&Self::key(session), self.cfg.report_limit, self.cfg.report_window)
    }

    pub fn forget_session(&self, session: SessionId) {
        self.limiter.forget(&Self::key(session));
    }

    /// Releases windows of sessions that have not reported recently.
    pub fn prune(&self) -> usize {
        self.limiter.prune(self.cfg.report_window)
    }
}
