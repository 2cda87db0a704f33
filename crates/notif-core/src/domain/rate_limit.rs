/// Fixed (max attempts, time window) admission policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Sends allowed per address inside one window.
    pub max_attempts: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window_secs: 3600,
        }
    }
}

impl RateLimitPolicy {
    pub fn new(max_attempts: u32, window_secs: u64) -> Self {
        Self {
            max_attempts,
            window_secs,
        }
    }

    pub(crate) fn window(&self) -> i64 {
        i64::try_from(self.window_secs).unwrap_or(i64::MAX)
    }
}

/// Outcome of an admission check. Recomputed per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Unix time at which the newest counted send leaves the window, or 0
    /// when nothing is counted.
    pub reset_time: i64,
    pub attempt_count: u32,
}

impl RateLimitDecision {
    /// Evaluate a sender's history at `now`.
    ///
    /// Only timestamps with `now - ts < window` are counted; older entries
    /// are ignored without being removed from the history.
    pub fn evaluate(timestamps: &[i64], now: i64, policy: &RateLimitPolicy) -> Self {
        let window = policy.window();
        let counted: Vec<i64> = timestamps
            .iter()
            .copied()
            .filter(|ts| now.saturating_sub(*ts) < window)
            .collect();

        let attempt_count = u32::try_from(counted.len()).unwrap_or(u32::MAX);
        let reset_time = counted
            .iter()
            .max()
            .map(|latest| latest.saturating_add(window))
            .unwrap_or(0);

        Self {
            allowed: attempt_count < policy.max_attempts,
            remaining: policy.max_attempts.saturating_sub(attempt_count),
            reset_time,
            attempt_count,
        }
    }
}
