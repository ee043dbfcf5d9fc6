//! Per-address connection rate limiting
//!
//! One token bucket per client host. Each bucket refills continuously at `rate` tokens per second
//! up to `burst`, and one token is spent per accepted session.
//!
//! The registry map sits behind one coarse mutex that is held only for the
//! lookup/insert; each bucket carries its own mutex so that a busy origin
//! never stalls the check of another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::Instant;

/// Sustained permits per second: one permit every 20 seconds.
pub const DEFAULT_RATE: f64 = 0.05;

/// Permits available to a fresh origin.
pub const DEFAULT_BURST: u32 = 5;

struct BucketState {
    /// Fractional token level, always within `[0, burst]`.
    tokens: f64,
    /// When the level was last brought up to date.
    last: Instant,
}

/// Token bucket for a single origin.
pub struct TokenBucket {
    rate: f64,
    burst: f64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket.
    pub fn new(rate: f64, burst: u32) -> Self {
        Self::new_at(rate, burst, Instant::now())
    }

    fn new_at(rate: f64, burst: u32, now: Instant) -> Self {
        let burst = f64::from(burst);
        Self {
            rate,
            burst,
            state: Mutex::new(BucketState { tokens: burst, last: now }),
        }
    }

    /// Take one permit if available. Returns false without deducting when
    /// the bucket holds less than one token.
    pub fn try_consume(&self) -> bool {
        self.try_consume_at(Instant::now())
    }

    /// Same as [`try_consume`](Self::try_consume) with an explicit clock reading.
    pub fn try_consume_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let elapsed = now.saturating_duration_since(state.last).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.rate).min(self.burst);
        // A clock reading older than `last` must not rewind it.
        if now > state.last {
            state.last = now;
        }

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Current token level, without replenishing.
    pub fn tokens(&self) -> f64 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).tokens
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn burst(&self) -> f64 {
        self.burst
    }
}

/// Registry of token buckets keyed by client host.
///
/// Entries are created on first contact and never evicted, so memory grows
/// with the number of distinct origins seen over the process lifetime.
pub struct AddressLimiter {
    rate: f64,
    burst: u32,
    buckets: Mutex<HashMap<String, Arc<TokenBucket>>>,
}

impl AddressLimiter {
    pub fn new(rate: f64, burst: u32) -> Self {
        Self {
            rate,
            burst,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Return the bucket for `addr`, creating a full one on first contact.
    ///
    /// Lookup and insert happen under a single lock, so concurrent first
    /// contacts from one host always share the same bucket.
    pub fn get_or_create(&self, addr: &str) -> Arc<TokenBucket> {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bucket) = buckets.get(addr) {
            return Arc::clone(bucket);
        }

        let bucket = Arc::new(TokenBucket::new(self.rate, self.burst));
        buckets.insert(addr.to_string(), Arc::clone(&bucket));
        tracing::debug!(
            "[limiter] new origin ip={} tracked={}",
            addr,
            buckets.len()
        );
        bucket
    }

    /// Number of origins tracked so far.
    pub fn len(&self) -> usize {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AddressLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, DEFAULT_BURST)
    }
}
