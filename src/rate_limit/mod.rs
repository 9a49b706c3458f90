// Fixed-window rate limiting with process-local state.
pub mod clock;
pub mod middleware;

pub use clock::{Clock, ManualClock, SystemClock};
pub use middleware::{default_key, rate_limit_middleware, RateLimitContext};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// One counting window for a single identifier.
#[derive(Debug, Clone, Copy)]
pub struct WindowEntry {
    pub count: u64,
    pub reset_at: DateTime<Utc>,
}

/// Outcome of a single `check` call.
///
/// `count` is the total number of requests seen in the current window,
/// including denied ones, so it can exceed `limit`.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub count: u64,
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
    pub limit: u64,
}

/// Custom identifier derivation for a policy (e.g. per-user instead of
/// per-IP).
pub type KeyFn = Arc<dyn Fn(&axum::extract::Request) -> String + Send + Sync>;

/// A named limit applied to a route group.
#[derive(Clone)]
pub struct RateLimitPolicy {
    pub name: &'static str,
    pub limit: u64,
    pub window: Duration,
    pub key_fn: Option<KeyFn>,
}

impl RateLimitPolicy {
    pub fn new(name: &'static str, limit: u64, window_secs: u64) -> Self {
        Self {
            name,
            limit,
            window: Duration::seconds(window_secs as i64),
            key_fn: None,
        }
    }

    /// 100 requests per 15 minutes
    pub fn standard() -> Self {
        Self::new("default", 100, 15 * 60)
    }

    /// 5 requests per minute
    pub fn strict() -> Self {
        Self::new("strict", 5, 60)
    }

    /// 5 requests per 15 minutes, for credential endpoints
    pub fn auth() -> Self {
        Self::new("auth", 5, 15 * 60)
    }

    pub fn with_key_fn(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = Some(key_fn);
        self
    }

    /// Human-readable form for the docs registry
    pub fn describe(&self) -> String {
        let secs = self.window.num_seconds();
        if secs >= 60 && secs % 60 == 0 {
            format!("{} requests per {} minutes", self.limit, secs / 60)
        } else {
            format!("{} requests per {} seconds", self.limit, secs)
        }
    }
}

/// Fixed-window counter keyed by caller identity.
///
/// Windows are not sliding: the first request for an identifier opens a
/// window, every further request inside it increments the count, and the
/// first request after `reset_at` opens a fresh one. State is volatile and
/// process-local; restarts forget all counts.
pub struct RateLimiter {
    entries: DashMap<String, WindowEntry>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Current time as seen by this limiter's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Number of tracked identifiers (live and expired-but-unswept)
    pub fn tracked(&self) -> usize {
        self.entries.len()
    }

    /// Count a request for `identifier` and decide whether it is allowed.
    ///
    /// The entry guard holds the per-key lock for the whole read-modify-
    /// write, so concurrent checks on the same identifier serialize and
    /// at most `limit` of them are admitted per window.
    pub fn check(&self, identifier: &str, limit: u64, window: Duration) -> RateLimitDecision {
        let now = self.clock.now();

        let mut entry = self
            .entries
            .entry(identifier.to_string())
            .or_insert(WindowEntry {
                count: 0,
                reset_at: now + window,
            });

        if now > entry.reset_at {
            // Window expired: start a fresh one
            entry.count = 1;
            entry.reset_at = now + window;
        } else {
            entry.count += 1;
        }

        let (count, reset_at) = (entry.count, entry.reset_at);
        drop(entry);

        RateLimitDecision {
            allowed: count <= limit,
            count,
            remaining: limit.saturating_sub(count),
            reset_at,
            limit,
        }
    }

    /// Drop every entry whose window has passed. Returns how many were
    /// removed. Sweeping only reclaims memory; `check` handles expired
    /// entries correctly whether or not they were swept first.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_at >= now);
        before.saturating_sub(self.entries.len())
    }

    /// Start the periodic sweep task.
    ///
    /// The returned handle owns the task: call `shutdown()` for an orderly
    /// stop, or drop it to abort. There is no detached mode.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: std::time::Duration) -> SweeperHandle {
        let limiter = Arc::clone(self);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let removed = limiter.sweep();
                        if removed > 0 {
                            tracing::debug!(removed, "Swept expired rate limit windows");
                        }
                    }
                }
            }
        });

        SweeperHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for the background sweep task.
pub struct SweeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_limiter() -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = RateLimiter::with_clock(clock.clone());
        (clock, limiter)
    }

    #[test]
    fn test_first_request_opens_window() {
        let (clock, limiter) = manual_limiter();
        let decision = limiter.check("client", 5, Duration::seconds(60));

        assert!(decision.allowed);
        assert_eq!(decision.count, 1);
        assert_eq!(decision.remaining, 4);
        assert_eq!(decision.reset_at, clock.now() + Duration::seconds(60));
    }

    #[test]
    fn test_burst_to_limit_is_fully_admitted() {
        let (_clock, limiter) = manual_limiter();
        for i in 1..=5 {
            let decision = limiter.check("client", 5, Duration::seconds(60));
            assert!(decision.allowed, "request {} should be allowed", i);
            assert_eq!(decision.count, i);
        }
        let last = limiter.check("client", 5, Duration::seconds(60));
        assert!(!last.allowed);
    }

    #[test]
    fn test_count_grows_past_limit() {
        let (_clock, limiter) = manual_limiter();
        for _ in 0..8 {
            limiter.check("client", 5, Duration::seconds(60));
        }
        let decision = limiter.check("client", 5, Duration::seconds(60));

        assert!(!decision.allowed);
        assert_eq!(decision.count, 9);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let (clock, limiter) = manual_limiter();
        for _ in 0..7 {
            limiter.check("client", 5, Duration::seconds(60));
        }

        clock.advance(Duration::seconds(61));
        let decision = limiter.check("client", 5, Duration::seconds(60));

        assert!(decision.allowed);
        assert_eq!(decision.count, 1);
        assert_eq!(decision.remaining, 4);
        assert_eq!(decision.reset_at, clock.now() + Duration::seconds(60));
    }

    #[test]
    fn test_window_boundary_is_still_live() {
        // Expiry is strictly `now > reset_at`; at the boundary instant the
        // old window still counts.
        let (clock, limiter) = manual_limiter();
        let first = limiter.check("client", 5, Duration::seconds(60));

        clock.set(first.reset_at);
        let at_boundary = limiter.check("client", 5, Duration::seconds(60));
        assert_eq!(at_boundary.count, 2);

        clock.advance(Duration::milliseconds(1));
        let past_boundary = limiter.check("client", 5, Duration::seconds(60));
        assert_eq!(past_boundary.count, 1);
    }

    #[test]
    fn test_identifiers_do_not_share_windows() {
        let (_clock, limiter) = manual_limiter();
        for _ in 0..5 {
            limiter.check("a", 5, Duration::seconds(60));
        }
        let other = limiter.check("b", 5, Duration::seconds(60));

        assert!(other.allowed);
        assert_eq!(other.count, 1);
    }

    #[test]
    fn test_sweep_removes_only_expired_entries() {
        let (clock, limiter) = manual_limiter();
        limiter.check("early", 5, Duration::seconds(60));
        clock.advance(Duration::seconds(30));
        limiter.check("late", 5, Duration::seconds(60));

        // 61s in: "early" expired at 60s, "late" resets at 90s
        clock.advance(Duration::seconds(31));
        let removed = limiter.sweep();

        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked(), 1);

        // A swept identifier starts over cleanly
        let fresh = limiter.check("early", 5, Duration::seconds(60));
        assert_eq!(fresh.count, 1);
    }

    #[test]
    fn test_concurrent_checks_admit_at_most_limit() {
        let limiter = Arc::new(RateLimiter::new());
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    limiter.check("shared", 5, Duration::seconds(60)).allowed
                })
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&allowed| allowed)
            .count();
        assert_eq!(allowed, 5);
    }

    #[tokio::test]
    async fn test_sweeper_reclaims_expired_windows() {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = Arc::new(RateLimiter::with_clock(clock.clone()));
        limiter.check("client", 5, Duration::seconds(60));
        clock.advance(Duration::seconds(61));

        let sweeper = limiter.spawn_sweeper(std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(80)).await;

        assert_eq!(limiter.tracked(), 0);
        sweeper.shutdown().await;
    }

    #[test]
    fn test_policy_presets() {
        let standard = RateLimitPolicy::standard();
        assert_eq!(standard.limit, 100);
        assert_eq!(standard.window, Duration::minutes(15));

        let strict = RateLimitPolicy::strict();
        assert_eq!(strict.limit, 5);
        assert_eq!(strict.window, Duration::minutes(1));

        let auth = RateLimitPolicy::auth();
        assert_eq!(auth.limit, 5);
        assert_eq!(auth.window, Duration::minutes(15));
        assert_eq!(auth.describe(), "5 requests per 15 minutes");
    }
}
