use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::rate_limit::RateLimiterFacade;
use crate::repo::Repo;
use crate::telemetry;

/// One eviction pass. Evicted sessions also lose their rate-limit windows.
/// Returns the number of sessions dropped.
pub async fn sweep_once(repo: &dyn Repo, limiter: Option<&RateLimiterFacade>, idle_ttl: Duration) -> usize {
    let evicted = repo.evict_idle(idle_ttl).await;
    if let Some(rl) = limiter {
        for id in &evicted { rl.forget_session(*id); }
        let released = rl.prune();
        if released > 0 { debug!(released, "released idle rate-limit windows"); }
    }
    if !evicted.is_empty() {
        telemetry::sessions_evicted(evicted.len());
        info!(evicted = evicted.len(), "evicted idle sessions");
    }
    telemetry::sessions_active(repo.session_count().await);
    evicted.len()
}

/// Runs [`sweep_once`] every `every` until the task is dropped.
pub async fn run(repo: Arc<dyn Repo>, limiter: Option<RateLimiterFacade>, idle_ttl: Duration, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // first tick fires immediately
    ticker.tick().await;
    loop {
        ticker.tick().await;
        sweep_once(repo.as_ref(), limiter.as_ref(), idle_ttl).await;
    }
}
