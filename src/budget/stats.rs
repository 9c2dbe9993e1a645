//! Exact-solver usage statistics.

/// Running count, total, min, and max of exact-solver call durations.
///
/// Each [`BudgetContext`](super::BudgetContext) keeps one; contexts from
/// different workers can be combined with [`UsageStats::merge`] for a
/// run-wide summary.
///
/// # Examples
///
/// ```
/// use pdp_gp::budget::UsageStats;
///
/// let mut stats = UsageStats::default();
/// stats.record(0.5);
/// stats.record(1.5);
/// assert_eq!(stats.calls(), 2);
/// assert_eq!(stats.mean_seconds(), Some(1.0));
/// assert_eq!(stats.min_seconds(), Some(0.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UsageStats {
    calls: u64,
    total_seconds: f64,
    min_seconds: Option<f64>,
    max_seconds: f64,
}

impl UsageStats {
    /// Adds one call that took `seconds`.
    pub fn record(&mut self, seconds: f64) {
        self.calls += 1;
        self.total_seconds += seconds;
        self.min_seconds = Some(self.min_seconds.map_or(seconds, |m| m.min(seconds)));
        self.max_seconds = self.max_seconds.max(seconds);
    }

    /// Folds another set of statistics into this one.
    pub fn merge(&mut self, other: &UsageStats) {
        self.calls += other.calls;
        self.total_seconds += other.total_seconds;
        self.min_seconds = match (self.min_seconds, other.min_seconds) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max_seconds = self.max_seconds.max(other.max_seconds);
    }

    /// Number of recorded calls.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Sum of recorded durations.
    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }

    /// Shortest recorded call.
    pub fn min_seconds(&self) -> Option<f64> {
        self.min_seconds
    }

    /// Longest recorded call, `0.0` if none.
    pub fn max_seconds(&self) -> f64 {
        self.max_seconds
    }

    /// Mean call duration.
    pub fn mean_seconds(&self) -> Option<f64> {
        (self.calls > 0).then(|| self.total_seconds / self.calls as f64)
    }
}

impl std::fmt::Display for UsageStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "calls={} total={:.2}s mean={:.2}s min={:.2}s max={:.2}s",
            self.calls,
            self.total_seconds,
            self.mean_seconds().unwrap_or(0.0),
            self.min_seconds.unwrap_or(0.0),
            self.max_seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let s = UsageStats::default();
        assert_eq!(s.calls(), 0);
        assert_eq!(s.mean_seconds(), None);
        assert_eq!(s.min_seconds(), None);
        assert_eq!(
            s.to_string(),
            "calls=0 total=0.00s mean=0.00s min=0.00s max=0.00s"
        );
    }

    #[test]
    fn test_merge() {
        let mut a = UsageStats::default();
        a.record(2.0);
        let mut b = UsageStats::default();
        b.record(0.25);
        b.record(4.0);
        a.merge(&b);
        assert_eq!(a.calls(), 3);
        assert!((a.total_seconds() - 6.25).abs() < 1e-12);
        assert_eq!(a.min_seconds(), Some(0.25));
        assert_eq!(a.max_seconds(), 4.0);

        let mut empty = UsageStats::default();
        empty.merge(&a);
        assert_eq!(empty, a);
    }
}
