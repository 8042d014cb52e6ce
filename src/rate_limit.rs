use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::interval;
use tracing::debug;

use crate::metrics::RATE_LIMIT_TRACKED;

// Time source in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Clock that only moves when told to.
#[derive(Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max: usize,         // max requests allowed
    pub window: Duration,   // duration of one window
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max: 100,
            window: Duration::from_secs(60),
        }
    }
}

/// In-memory sliding window limiter keyed by caller identifier.
///
/// Every call is recorded, admitted or not. The filter-and-append step runs
/// while holding the identifier's map entry, so concurrent callers sharing an
/// identifier never lose an update.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Vec<u64>>>, // identifier -> admission timestamps
    clock: Arc<dyn Clock>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            clock,
            config,
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn window_ms(&self) -> u64 {
        self.config.window.as_millis() as u64
    }

    // true means reject
    pub fn is_rate_limited(&self, identifier: &str) -> bool {
        let now = self.clock.now_ms();
        let window_start = now.saturating_sub(self.window_ms());

        let retained = {
            let mut timestamps = self.windows.entry(identifier.to_string()).or_default();
            timestamps.retain(|&t| t > window_start);
            let retained = timestamps.len();
            timestamps.push(now);
            retained
        };

        if retained == 0 {
            self.schedule_cleanup(identifier);
        }

        retained >= self.config.max
    }

    pub fn get_remaining(&self, identifier: &str) -> usize {
        let window_start = self.clock.now_ms().saturating_sub(self.window_ms());
        let live = self
            .windows
            .get(identifier)
            .map(|timestamps| timestamps.iter().filter(|&&t| t > window_start).count())
            .unwrap_or(0);

        self.config.max.saturating_sub(live)
    }

    /// Drop every identifier whose timestamps have all expired.
    pub fn purge_expired(&self) -> usize {
        let window_start = self.clock.now_ms().saturating_sub(self.window_ms());
        let before = self.windows.len();
        self.windows
            .retain(|_, timestamps| timestamps.iter().any(|&t| t > window_start));
        before - self.windows.len()
    }

    // Number of identifiers currently held in memory
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }

    // One-shot removal once the window has passed; skipped outside a runtime
    fn schedule_cleanup(&self, identifier: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let windows = Arc::clone(&self.windows);
        let clock = Arc::clone(&self.clock);
        let window = self.config.window;
        let window_ms = self.window_ms();
        let key = identifier.to_string();

        handle.spawn(async move {
            tokio::time::sleep(window).await;

            let window_start = clock.now_ms().saturating_sub(window_ms);
            let removed = windows.remove_if(&key, |_, timestamps| {
                timestamps.iter().all(|&t| t <= window_start)
            });
            if removed.is_some() {
                debug!(identifier = %key, "Rate window expired, entry removed");
            }
        });
    }
}

// Background sweep, runs for the life of the process. Catches identifiers
// the one-shot cleanup kept because they were still active at the time.
pub async fn sweep_expired(limiter: RateLimiter, every: Duration) {
    let mut interval = interval(every.max(Duration::from_secs(1)));

    loop {
        interval.tick().await;

        let removed = limiter.purge_expired();
        RATE_LIMIT_TRACKED.set(limiter.tracked() as f64);
        if removed > 0 {
            debug!(removed, remaining = limiter.tracked(), "Rate limiter sweep completed");
        }
    }
}
