//! Exact-solver time budgeting.
//!
//! Each instance has a baseline: the time the exact solver needs to solve it
//! on its own. An evaluation of that instance may spend a configured fraction
//! of its baseline on solver calls, tracked by a [`BudgetContext`] that the
//! evaluation owns.
//!
//! - [`BaselineTable`] — instance name → baseline seconds
//! - [`BudgetAllocator`] — table + [`BudgetConfig`], hands out contexts
//! - [`BudgetContext`] — per-evaluation limits and usage
//! - [`UsageStats`] — call duration statistics

mod allocator;
mod baseline;
mod context;
mod err;
mod stats;

pub use allocator::{BudgetAllocator, BudgetConfig, MissingBaselinePolicy};
pub use baseline::{BaselineStats, BaselineTable};
pub use context::{BudgetContext, DEFAULT_CALL_SHARE};
pub use err::ConfigError;
pub use stats::UsageStats;
