//! Fixed-window request limiter keyed by identity.
//!
//! A window opens on the first request for a key and lasts `window`; once it
//! has passed, the next request replaces the entry with a fresh window. This is
//! a fixed window with reset (bursty at the window edge), not a sliding log.
//!
//! Expired entries are swept inline, at most once per sweep interval. The
//! "is it time" check is a single atomic load on every call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default quota per window for API keys.
pub const DEFAULT_MAX_REQUESTS: u32 = 100;
/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);
/// Default separation between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Outcome of a limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Whole seconds until the window resets (ceil, min 1); set only when denied.
    pub retry_after_secs: Option<u64>,
}

/// Limiter seam owned by the gateway; a shared/distributed counter can replace
/// the in-memory implementation without changing the gateway.
pub trait RateLimiter: Send + Sync {
    fn check(&self, key: &str, max_requests: u32, window: Duration, now: Instant) -> RateLimitDecision;
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Process-local fixed-window limiter.
///
/// Read-check-increment for a key runs under the map shard's write lock
/// (`DashMap::entry`), so concurrent requests on the same key never lose
/// updates.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    entries: DashMap<String, WindowEntry>,
    sweep_interval: Duration,
    // Sweep bookkeeping in millis since `epoch`.
    epoch: Instant,
    last_sweep_ms: AtomicU64,
    evicted_total: AtomicU64,
}

impl FixedWindowLimiter {
    pub fn new(sweep_interval: Duration) -> Self {
        Self::starting_at(sweep_interval, Instant::now())
    }

    /// Construct with an explicit start instant (for simulated clocks).
    pub fn starting_at(sweep_interval: Duration, epoch: Instant) -> Self {
        Self {
            entries: DashMap::new(),
            sweep_interval,
            epoch,
            last_sweep_ms: AtomicU64::new(0),
            evicted_total: AtomicU64::new(0),
        }
    }

    /// Number of tracked keys (expired-but-unswept entries included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries removed by sweeps since construction.
    pub fn evicted_total(&self) -> u64 {
        self.evicted_total.load(Ordering::Relaxed)
    }

    /// Run a sweep if the interval has elapsed. Returns evicted entries, if swept.
    pub fn maybe_sweep(&self, now: Instant) -> Option<usize> {
        let now_ms = self.millis_since_epoch(now);
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        if now_ms.saturating_sub(last) < self.sweep_interval.as_millis() as u64 {
            return None;
        }
        // Only the caller that wins the swap sweeps this interval.
        if self
            .last_sweep_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return None;
        }
        Some(self.sweep(now))
    }

    /// Delete every entry whose window has passed.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| now <= e.reset_at);
        let evicted = before.saturating_sub(self.entries.len());
        self.evicted_total.fetch_add(evicted as u64, Ordering::Relaxed);
        tracing::debug!(evicted, remaining = self.entries.len(), "rate limit sweep");
        evicted
    }

    fn millis_since_epoch(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.epoch).as_millis() as u64
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL)
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, key: &str, max_requests: u32, window: Duration, now: Instant) -> RateLimitDecision {
        self.maybe_sweep(now);

        let max_requests = max_requests.max(1);
        let mut entry = self.entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            reset_at: now + window,
        });
        let e = entry.value_mut();

        if e.count == 0 || now > e.reset_at {
            *e = WindowEntry {
                count: 1,
                reset_at: now + window,
            };
            return RateLimitDecision {
                allowed: true,
                remaining: max_requests - 1,
                retry_after_secs: None,
            };
        }

        if e.count >= max_requests {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after_secs: Some(ceil_secs(e.reset_at.saturating_duration_since(now))),
            };
        }

        e.count += 1;
        RateLimitDecision {
            allowed: true,
            remaining: max_requests - e.count,
            retry_after_secs: None,
        }
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let ms = d.as_millis() as u64;
    ms.div_ceil(1000).max(1)
}
