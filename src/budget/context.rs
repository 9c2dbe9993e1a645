//! Per-evaluation exact-solver budget.

use tracing::debug;

use super::{BudgetAllocator, ConfigError, UsageStats};

/// Default fraction of the remaining budget one solver call may take.
pub const DEFAULT_CALL_SHARE: f64 = 0.4;

/// Exact-solver time budget for one (worker × instance) evaluation.
///
/// Created by [`BudgetAllocator::context_for`] or reset in place with
/// [`BudgetContext::reset_for_instance`]. Each call may take at most a fixed
/// share of what remains, so one evaluation can issue several progressively
/// shorter calls instead of spending everything at once.
///
/// # Examples
///
/// ```
/// use pdp_gp::budget::BudgetContext;
///
/// let mut ctx = BudgetContext::new("A-n10", 10.0);
/// assert!((ctx.next_call_limit() - 4.0).abs() < 1e-12);
/// ctx.record_usage(4.0);
/// assert!((ctx.next_call_limit() - 2.4).abs() < 1e-12);
/// ctx.record_usage(6.0);
/// assert_eq!(ctx.next_call_limit(), 0.0);
/// assert_eq!(ctx.call_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetContext {
    instance: String,
    total: f64,
    used: f64,
    calls: u64,
    call_share: f64,
    usage: UsageStats,
}

impl BudgetContext {
    /// Creates a context granting `total_seconds` with the default call share.
    pub fn new(instance: impl Into<String>, total_seconds: f64) -> Self {
        Self::with_call_share(instance, total_seconds, DEFAULT_CALL_SHARE)
    }

    /// Creates a context with an explicit per-call share of the remainder.
    pub fn with_call_share(instance: impl Into<String>, total_seconds: f64, call_share: f64) -> Self {
        Self {
            instance: instance.into(),
            total: total_seconds.max(0.0),
            used: 0.0,
            calls: 0,
            call_share,
            usage: UsageStats::default(),
        }
    }

    /// A context in which the exact solver never runs.
    pub fn disabled(instance: impl Into<String>) -> Self {
        Self::new(instance, 0.0)
    }

    /// Starts a new instance evaluation: looks up its budget and zeroes the
    /// used time and call count. Usage statistics carry over.
    pub fn reset_for_instance(
        &mut self,
        allocator: &BudgetAllocator,
        instance: &str,
    ) -> Result<(), ConfigError> {
        self.total = allocator.budget_for(instance)?;
        self.instance = instance.to_string();
        self.call_share = allocator.config().call_share;
        self.used = 0.0;
        self.calls = 0;
        Ok(())
    }

    /// Instance this context currently budgets.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Seconds granted for this instance.
    pub fn total_budget(&self) -> f64 {
        self.total
    }

    /// Seconds consumed so far.
    pub fn used_budget(&self) -> f64 {
        self.used
    }

    /// Seconds left, never negative.
    pub fn remaining(&self) -> f64 {
        (self.total - self.used).max(0.0)
    }

    /// Solver calls recorded for this instance.
    pub fn call_count(&self) -> u64 {
        self.calls
    }

    /// Statistics over every call recorded by this context.
    pub fn usage(&self) -> &UsageStats {
        &self.usage
    }

    /// Time limit for the next solver call; `0.0` means do not call.
    pub fn next_call_limit(&self) -> f64 {
        let remaining = self.total - self.used;
        if remaining <= 0.0 {
            return 0.0;
        }
        remaining.min(remaining * self.call_share)
    }

    /// Charges a finished call, whatever its outcome.
    ///
    /// Negative or non-finite durations are charged as zero so that used time
    /// never decreases.
    pub fn record_usage(&mut self, seconds: f64) {
        let seconds = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        self.used += seconds;
        self.calls += 1;
        self.usage.record(seconds);
        debug!(
            instance = %self.instance,
            seconds,
            used = self.used,
            remaining = self.remaining(),
            calls = self.calls,
            "exact solver usage"
        );
    }
}

impl std::fmt::Display for BudgetContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pct = if self.total > 0.0 {
            self.used / self.total * 100.0
        } else {
            0.0
        };
        write!(
            f,
            "{}: budget={:.2}s used={:.2}s ({:.1}%) calls={}",
            self.instance, self.total, self.used, pct, self.calls
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BaselineTable, BudgetConfig};

    #[test]
    fn test_disabled_never_grants_time() {
        let mut ctx = BudgetContext::disabled("x");
        assert_eq!(ctx.next_call_limit(), 0.0);
        ctx.record_usage(0.0);
        assert_eq!(ctx.next_call_limit(), 0.0);
    }

    #[test]
    fn test_overspend_clamps_remaining() {
        let mut ctx = BudgetContext::new("x", 1.0);
        ctx.record_usage(3.0);
        assert_eq!(ctx.remaining(), 0.0);
        assert_eq!(ctx.next_call_limit(), 0.0);
        assert_eq!(ctx.used_budget(), 3.0);
    }

    #[test]
    fn test_bad_durations_charge_nothing() {
        let mut ctx = BudgetContext::new("x", 5.0);
        ctx.record_usage(-1.0);
        ctx.record_usage(f64::NAN);
        assert_eq!(ctx.used_budget(), 0.0);
        assert_eq!(ctx.call_count(), 2);
    }

    #[test]
    fn test_reset_keeps_usage_stats() {
        let table = BaselineTable::from_entries([("a", 10.0), ("b", 20.0)]).expect("valid");
        let allocator =
            BudgetAllocator::new(table, BudgetConfig::default().with_percentage(0.5)).expect("valid");
        let mut ctx = allocator.context_for("a").expect("known");
        assert_eq!(ctx.total_budget(), 5.0);
        ctx.record_usage(1.0);

        ctx.reset_for_instance(&allocator, "b").expect("known");
        assert_eq!(ctx.instance(), "b");
        assert_eq!(ctx.total_budget(), 10.0);
        assert_eq!(ctx.used_budget(), 0.0);
        assert_eq!(ctx.call_count(), 0);
        assert_eq!(ctx.usage().calls(), 1);
    }

    #[test]
    fn test_display() {
        let mut ctx = BudgetContext::new("P", 4.0);
        ctx.record_usage(1.0);
        assert_eq!(ctx.to_string(), "P: budget=4.00s used=1.00s (25.0%) calls=1");
    }
}
