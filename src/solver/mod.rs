//! Exact-solver interface and the budgeted solver step.
//!
//! The exact solver is a collaborator: anything implementing [`ExactSolver`]
//! can be plugged in (a MIP solver binding in production runs). The
//! [`ExhaustiveSolver`] bundled here solves small instances by enumeration.
//! [`exact_solver_step`] sizes each call from a
//! [`BudgetContext`](crate::budget::BudgetContext) and imports the result.

mod assignment;
mod exhaustive;
mod split;
mod terminal;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::Instance;

pub use assignment::Assignment;
pub use exhaustive::{ExhaustiveConfig, ExhaustiveSolver};
pub use terminal::{exact_solver_step, SolverVerdict};

/// Status reported by an exact solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible, not necessarily optimal, solution found within the limit.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Time limit reached before any solution was found.
    Timeout,
}

/// Result of one exact-solver call.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    /// Solver status.
    pub status: SolveStatus,
    /// Objective value of `assignment`; meaningless without one.
    pub objective: f64,
    /// Arc assignment of the returned solution.
    pub assignment: Option<Assignment>,
    /// Wall-clock time the solver spent.
    pub elapsed: Duration,
}

impl SolveOutcome {
    /// An outcome without a solution.
    pub fn no_solution(status: SolveStatus, elapsed: Duration) -> Self {
        Self {
            status,
            objective: f64::INFINITY,
            assignment: None,
            elapsed,
        }
    }

    /// Whether a solution was returned.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
            && self.assignment.is_some()
    }
}

/// An exact solver for the pickup-and-delivery problem.
///
/// Implementations must return within roughly `time_limit` and report the
/// time they actually used; that time is charged to the caller's budget
/// whatever the outcome.
pub trait ExactSolver {
    /// Solves `instance`, optionally starting from `warm_start`.
    fn solve(&self, instance: &Instance, warm_start: &Assignment, time_limit: Duration) -> SolveOutcome;
}

impl<S: ExactSolver + ?Sized> ExactSolver for &S {
    fn solve(&self, instance: &Instance, warm_start: &Assignment, time_limit: Duration) -> SolveOutcome {
        (**self).solve(instance, warm_start, time_limit)
    }
}
