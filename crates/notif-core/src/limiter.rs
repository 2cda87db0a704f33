//! Per-address sliding-window send limiter.
//!
//! History lives in a [`SendLogStore`] and is re-read on every call. Stale
//! timestamps are filtered out when a decision is computed; they are only
//! removed from storage when prune-on-write is enabled.
//!
//! `check` and `record` are separate calls. Two concurrent requests for the
//! same address can both pass `check` before either records, so the limit
//! can be exceeded by the degree of concurrency. The store's `update`
//! guarantees that no recorded send is lost.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{
    RateLimitDecision, RateLimitPolicy, SendLog, TimeLabels, format_wait, normalize_key,
};
use crate::ports::{Clock, SendLogStore, StoreError};

/// Rate limiter over a persisted send log.
pub struct SendRateLimiter {
    store: Arc<dyn SendLogStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
    prune_on_write: bool,
}

impl SendRateLimiter {
    pub fn new(
        store: Arc<dyn SendLogStore>,
        clock: Arc<dyn Clock>,
        policy: RateLimitPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
            prune_on_write: false,
        }
    }

    /// Also drop the address's expired timestamps whenever a send is
    /// recorded, bounding per-address storage.
    pub fn with_prune_on_write(mut self, enabled: bool) -> Self {
        self.prune_on_write = enabled;
        self
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Admission check under the configured policy.
    pub async fn check(&self, email: &str) -> RateLimitDecision {
        self.check_with(email, &self.policy).await
    }

    /// Admission check under an explicit policy.
    ///
    /// An unreadable store is treated as empty: a broken log must not turn
    /// into a denial of service against legitimate senders.
    pub async fn check_with(&self, email: &str, policy: &RateLimitPolicy) -> RateLimitDecision {
        let key = normalize_key(email);
        let log = match self.store.load().await {
            Ok(log) => log,
            Err(e) => {
                warn!(error = %e, "Send log unreadable, failing open");
                SendLog::default()
            }
        };

        let now = self.clock.now_unix();
        let decision = RateLimitDecision::evaluate(log.timestamps(&key), now, policy);
        debug!(
            key = %key,
            allowed = decision.allowed,
            attempt_count = decision.attempt_count,
            remaining = decision.remaining,
            "Rate limit evaluated"
        );
        decision
    }

    /// Record one successful send for `email` at the current time.
    pub async fn record(&self, email: &str) -> Result<(), StoreError> {
        let key = normalize_key(email);
        let now = self.clock.now_unix();
        let prune_window = self.prune_on_write.then_some(self.policy.window_secs);

        debug!(key = %key, timestamp = now, "Recording send");
        self.store
            .update(Box::new(move |log: &mut SendLog| {
                if let Some(window_secs) = prune_window {
                    log.prune(&key, now, window_secs);
                }
                log.append(&key, now);
            }))
            .await
    }

    /// Seconds until `reset_time`; zero or negative once it has passed.
    pub fn seconds_until(&self, reset_time: i64) -> i64 {
        reset_time.saturating_sub(self.clock.now_unix())
    }

    /// Human-readable time until `reset_time`, e.g. `"2 hours 5 minutes"`.
    pub fn format_time_remaining(&self, reset_time: i64, labels: &TimeLabels) -> String {
        format_wait(self.seconds_until(reset_time), labels)
    }
}
