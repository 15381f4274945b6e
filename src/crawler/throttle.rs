//! Request pacing
//!
//! A [`Throttle`] is an explicit value owned by whoever issues a sequence of
//! requests and handed to every fetch. The first request of a sequence goes
//! out immediately; each later one waits `base + uniform[0, jitter)`.

use crate::config::DelayConfig;
use rand::Rng;
use std::time::Duration;

/// Base delay plus random jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    pub base: Duration,
    pub jitter: Duration,
}

impl DelayPolicy {
    /// Cadence between pages of one listing
    pub fn page(config: &DelayConfig) -> Self {
        Self {
            base: Duration::from_millis(config.page_base_ms),
            jitter: Duration::from_millis(config.page_jitter_ms),
        }
    }

    /// Cadence between the items of a deep crawl batch
    pub fn batch(config: &DelayConfig) -> Self {
        Self {
            base: Duration::from_millis(config.batch_base_ms),
            jitter: Duration::from_millis(config.batch_jitter_ms),
        }
    }

    /// Draws one delay from the policy
    pub fn sample(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        let extra = rand::thread_rng().gen_range(0..jitter_ms);
        self.base + Duration::from_millis(extra)
    }
}

/// Paces a sequence of requests
#[derive(Debug)]
pub struct Throttle {
    policy: DelayPolicy,
    requests: u32,
}

impl Throttle {
    pub fn new(policy: DelayPolicy) -> Self {
        Self {
            policy,
            requests: 0,
        }
    }

    /// Waits until the next request may be sent
    pub async fn wait(&mut self) {
        self.requests += 1;
        if self.requests == 1 {
            return;
        }

        let delay = self.policy.sample();
        if !delay.is_zero() {
            tracing::debug!("Waiting {:?} before request {}", delay, self.requests);
            tokio::time::sleep(delay).await;
        }
    }

    /// Number of requests paced so far
    pub fn requests(&self) -> u32 {
        self.requests
    }
}
