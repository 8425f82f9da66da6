//! Client-side throttling
//!
//! SODA services throttle clients without an app token far harder than
//! clients with one. A [`RateLimiter`] keeps a single `HttpClient` under a
//! chosen request rate; every request through that client, from any
//! traversal, draws from the same bucket. Off unless configured.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Request rate for one client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed back to back before throttling kicks in
    pub burst_size: u32,
}

impl RateLimiterConfig {
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// One request at a time, one per second; for clients without a token
    pub fn anonymous() -> Self {
        Self::new(1, 1)
    }

    /// Token bucket quota; zero values are raised to one
    fn quota(self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Shared token bucket
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    limiter: Arc<DirectLimiter>,
}

impl RateLimiter {
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            config: *config,
            limiter: Arc::new(Governor::direct(config.quota())),
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Wait for a permit
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
