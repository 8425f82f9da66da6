//! HTTP module
//!
//! The transport seam between the page engine and the network.
//!
//! # Features
//!
//! - **Transport trait**: one page fetch per call, classified failures
//! - **HttpClient**: reqwest-backed transport with app token support
//! - **Rate Limiting**: optional token bucket limiter using governor
//! - **Retry Policy**: opt-in backoff for callers; the transport never retries

mod client;
mod rate_limit;
mod retry;
mod transport;

pub use client::{HttpClient, APP_TOKEN_HEADER};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::RetryPolicy;
pub use transport::Transport;

pub(crate) use client::join_segment;

#[cfg(test)]
mod tests;
