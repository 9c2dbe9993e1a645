//! Program evaluation on instances.
//!
//! [`evaluate`] runs one program on one instance against a caller-owned
//! [`BudgetContext`](crate::budget::BudgetContext); [`evaluate_all`] fans a
//! program out over many instances, building a context per instance.

mod err;
mod evaluate;

pub use err::EvaluationError;
pub use evaluate::{evaluate, evaluate_all, evaluate_from, relative_error, Evaluation};
