// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Outbound rate limiting for paid search APIs

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;

use super::types::SearchError;

const FALLBACK_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(60) {
    Some(n) => n,
    None => unreachable!(),
};

/// Process-wide token bucket in front of every provider
pub struct SearchRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    requests_per_minute: u32,
}

impl SearchRateLimiter {
    /// `0` falls back to 60 requests per minute
    pub fn new(requests_per_minute: u32) -> Self {
        let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(FALLBACK_PER_MINUTE);

        Self {
            limiter: RateLimiter::direct(Quota::per_minute(rpm)),
            requests_per_minute: rpm.get(),
        }
    }

    /// Take one token or fail with `RateLimited`
    pub fn check(&self) -> Result<(), SearchError> {
        self.limiter
            .check()
            .map_err(|_| SearchError::RateLimited {
                retry_after_secs: 60,
            })
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }
}
