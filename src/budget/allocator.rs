//! Baseline-proportional budget allocation.

use std::path::Path;

use tracing::warn;

use super::context::DEFAULT_CALL_SHARE;
use super::{BaselineTable, BudgetContext, ConfigError};

/// What to do when an evaluated instance has no baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingBaselinePolicy {
    /// Warn and grant no solver time for that instance.
    #[default]
    FailClosed,
    /// Abort with [`ConfigError::MissingBaseline`].
    Require,
}

/// Configuration for exact-solver budgeting.
///
/// # Examples
///
/// ```
/// use pdp_gp::budget::{BudgetConfig, MissingBaselinePolicy};
///
/// let config = BudgetConfig::default()
///     .with_percentage(0.25)
///     .with_missing_baseline(MissingBaselinePolicy::Require);
/// assert!(config.validate().is_ok());
/// assert!(BudgetConfig::default().with_percentage(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetConfig {
    /// Fraction of each instance's baseline granted per evaluation, in `[0, 1]`.
    /// Zero disables the exact solver.
    pub percentage: f64,

    /// Fraction of the remaining budget a single call may use, in `(0, 1]`.
    pub call_share: f64,

    /// Behavior for instances missing from the baseline table.
    pub missing_baseline: MissingBaselinePolicy,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            percentage: 0.0,
            call_share: DEFAULT_CALL_SHARE,
            missing_baseline: MissingBaselinePolicy::FailClosed,
        }
    }
}

impl BudgetConfig {
    /// Sets the fraction of baseline time granted.
    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = percentage;
        self
    }

    /// Sets the per-call share of the remaining budget.
    pub fn with_call_share(mut self, call_share: f64) -> Self {
        self.call_share = call_share;
        self
    }

    /// Sets the missing-baseline policy.
    pub fn with_missing_baseline(mut self, policy: MissingBaselinePolicy) -> Self {
        self.missing_baseline = policy;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.percentage) {
            return Err(ConfigError::InvalidPercentage(self.percentage));
        }
        if !(self.call_share > 0.0 && self.call_share <= 1.0) {
            return Err(ConfigError::InvalidCallShare(self.call_share));
        }
        Ok(())
    }
}

/// Turns a baseline table and a percentage into per-instance budgets.
///
/// Shared read-only across workers; all mutable budget state lives in the
/// [`BudgetContext`] each evaluation task obtains from it.
///
/// # Examples
///
/// ```
/// use pdp_gp::budget::{BaselineTable, BudgetAllocator, BudgetConfig};
///
/// let table = BaselineTable::from_entries([("A-n10", 30.0)]).expect("valid");
/// let allocator = BudgetAllocator::new(table, BudgetConfig::default().with_percentage(0.1))
///     .expect("valid");
/// let ctx = allocator.context_for("A-n10").expect("known");
/// assert!((ctx.total_budget() - 3.0).abs() < 1e-12);
///
/// // unknown instances get no solver time
/// let ctx = allocator.context_for("B-n5").expect("fail-closed");
/// assert_eq!(ctx.next_call_limit(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct BudgetAllocator {
    baselines: BaselineTable,
    config: BudgetConfig,
}

impl BudgetAllocator {
    /// Creates an allocator from a loaded table.
    pub fn new(baselines: BaselineTable, config: BudgetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { baselines, config })
    }

    /// Loads the baseline table at `path` and creates an allocator.
    pub fn load(path: impl AsRef<Path>, config: BudgetConfig) -> Result<Self, ConfigError> {
        Self::new(BaselineTable::from_path(path)?, config)
    }

    /// Changes the granted fraction of baseline time.
    pub fn configure(&mut self, percentage: f64) -> Result<(), ConfigError> {
        let config = self.config.clone().with_percentage(percentage);
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Current configuration.
    pub fn config(&self) -> &BudgetConfig {
        &self.config
    }

    /// The loaded baseline table.
    pub fn baselines(&self) -> &BaselineTable {
        &self.baselines
    }

    /// Seconds granted to `instance` per evaluation.
    pub fn budget_for(&self, instance: &str) -> Result<f64, ConfigError> {
        match self.baselines.get(instance) {
            Some(baseline) => Ok(baseline * self.config.percentage),
            None => match self.config.missing_baseline {
                MissingBaselinePolicy::FailClosed => {
                    warn!(instance, "no baseline for instance, exact solver disabled");
                    Ok(0.0)
                }
                MissingBaselinePolicy::Require => Err(ConfigError::MissingBaseline {
                    instance: instance.to_string(),
                }),
            },
        }
    }

    /// Fresh budget context for one evaluation of `instance`.
    pub fn context_for(&self, instance: &str) -> Result<BudgetContext, ConfigError> {
        Ok(BudgetContext::with_call_share(
            instance,
            self.budget_for(instance)?,
            self.config.call_share,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BaselineTable {
        BaselineTable::from_entries([("p1", 10.0), ("p2", 100.0)]).expect("valid")
    }

    #[test]
    fn test_budget_scales_with_baseline() {
        let alloc =
            BudgetAllocator::new(table(), BudgetConfig::default().with_percentage(0.5)).expect("valid");
        assert_eq!(alloc.budget_for("p1").expect("known"), 5.0);
        assert_eq!(alloc.budget_for("p2").expect("known"), 50.0);
    }

    #[test]
    fn test_default_percentage_disables_solver() {
        let alloc = BudgetAllocator::new(table(), BudgetConfig::default()).expect("valid");
        let ctx = alloc.context_for("p2").expect("known");
        assert_eq!(ctx.next_call_limit(), 0.0);
    }

    #[test]
    fn test_configure_validates() {
        let mut alloc = BudgetAllocator::new(table(), BudgetConfig::default()).expect("valid");
        alloc.configure(0.25).expect("valid");
        assert_eq!(alloc.config().percentage, 0.25);
        assert!(matches!(
            alloc.configure(-0.1),
            Err(ConfigError::InvalidPercentage(_))
        ));
        assert_eq!(alloc.config().percentage, 0.25);
    }

    #[test]
    fn test_missing_baseline_policies() {
        let alloc =
            BudgetAllocator::new(table(), BudgetConfig::default().with_percentage(1.0)).expect("valid");
        assert_eq!(alloc.budget_for("zz").expect("fail-closed"), 0.0);

        let strict = BudgetAllocator::new(
            table(),
            BudgetConfig::default()
                .with_percentage(1.0)
                .with_missing_baseline(MissingBaselinePolicy::Require),
        )
        .expect("valid");
        let err = strict.context_for("zz").expect_err("required");
        assert!(err.to_string().contains("zz"));
    }

    #[test]
    fn test_invalid_call_share() {
        let config = BudgetConfig::default().with_call_share(0.0);
        assert!(matches!(
            BudgetAllocator::new(table(), config),
            Err(ConfigError::InvalidCallShare(_))
        ));
    }

    #[test]
    fn test_call_share_flows_into_context() {
        let config = BudgetConfig::default()
            .with_percentage(1.0)
            .with_call_share(1.0);
        let alloc = BudgetAllocator::new(table(), config).expect("valid");
        let ctx = alloc.context_for("p1").expect("known");
        assert_eq!(ctx.next_call_limit(), 10.0);
    }
}
