// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-key exponential requeue backoff.
//!
//! A failed reconciliation is requeued after a delay that doubles with every
//! consecutive failure of the same key, capped at a maximum. A successful
//! reconciliation resets the key, and keys that stop failing without ever
//! succeeding (a parent deleted mid-retry) expire.
//!
//! # Schedule
//!
//! With the defaults (5s base, 300s cap) consecutive failures requeue after:
//!
//! 1. 5s
//! 2. 10s
//! 3. 20s
//! 4. 40s
//! 5. 80s
//! 6. 160s
//! 7. 300s (capped), and every failure after that

use crate::constants::{
    DEFAULT_REQUEUE_BASE_SECS, DEFAULT_REQUEUE_MAX_SECS, REQUEUE_BACKOFF_MULTIPLIER,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Failure count of one key and when it last failed.
#[derive(Clone, Copy, Debug)]
struct FailureRecord {
    failures: u32,
    last_failure: Instant,
}

/// Tracks consecutive failures per work-queue key.
///
/// A key that keeps failing is retried at most `max` after its last failure, so
/// an entry that has not failed for twice that long belongs to an object the
/// controller no longer reconciles (typically a parent deleted while failing).
/// Such entries are dropped whenever a failure is recorded.
#[derive(Debug)]
pub struct RequeueBackoff {
    /// Delay after the first failure
    pub base: Duration,
    /// Upper bound for any delay
    pub max: Duration,
    failures: Mutex<HashMap<String, FailureRecord>>,
}

impl Default for RequeueBackoff {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_REQUEUE_BASE_SECS),
            Duration::from_secs(DEFAULT_REQUEUE_MAX_SECS),
        )
    }
}

impl RequeueBackoff {
    #[must_use]
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Record a failure for `key` and return how long to wait before retrying it.
    pub fn next_delay(&self, key: &str) -> Duration {
        self.next_delay_at(key, Instant::now())
    }

    /// [`RequeueBackoff::next_delay`] with an explicit clock reading.
    pub fn next_delay_at(&self, key: &str, now: Instant) -> Duration {
        let stale_after = self.stale_after();
        let attempt = {
            let mut failures = self.lock();
            failures.retain(|_, record| {
                now.saturating_duration_since(record.last_failure) <= stale_after
            });
            let record = failures.entry(key.to_string()).or_insert(FailureRecord {
                failures: 0,
                last_failure: now,
            });
            record.failures = record.failures.saturating_add(1);
            record.last_failure = now;
            record.failures
        };
        self.delay_for(attempt)
    }

    /// Forget the failures recorded for `key`.
    pub fn reset(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Number of consecutive failures recorded for `key`.
    #[must_use]
    pub fn failures(&self, key: &str) -> u32 {
        self.lock().get(key).map_or(0, |record| record.failures)
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    /// Delay for the given 1-based attempt: `base * multiplier^(attempt - 1)`, capped.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        REQUEUE_BACKOFF_MULTIPLIER
            .checked_pow(exponent)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.max, |delay| delay.min(self.max))
    }

    /// Age after which an entry no longer belongs to a retried key.
    fn stale_after(&self) -> Duration {
        self.max.saturating_mul(2)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, FailureRecord>> {
        // A poisoned map only holds counters; keep using it.
        self.failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod backoff_tests;
