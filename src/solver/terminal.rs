//! The budgeted exact-solver step of a program.

use std::time::Duration;

use tracing::debug;

use super::{Assignment, ExactSolver, SolveOutcome, SolveStatus};
use crate::budget::BudgetContext;
use crate::models::{round_cost, InvariantViolation, RouteState};

/// How the outcome of a solver call compared with the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverVerdict {
    /// Proven optimal solution that passes the improvement test.
    Optimal,
    /// Feasible solution cheaper than the current state, or the current state
    /// was still incomplete.
    Improved,
    /// Feasible solution no better than the current state.
    NotImproved,
    /// Infeasible or timed out without a solution.
    NoSolution,
}

impl SolverVerdict {
    fn classify(outcome: &SolveOutcome, state: &RouteState) -> Self {
        if !outcome.is_solution_found() {
            return Self::NoSolution;
        }
        if round_cost(outcome.objective) >= state.total_cost() && state.is_complete() {
            Self::NotImproved
        } else if outcome.status == SolveStatus::Optimal {
            Self::Optimal
        } else {
            Self::Improved
        }
    }
}

/// Runs the exact solver on `state` if the budget and dirty flags allow it.
///
/// Nothing happens, and `Ok(false)` is returned, when the state is already
/// optimal, has not changed since the solver last failed to improve it, or
/// the budget grants no time. Otherwise the solver is called with the current
/// routes as warm start and a limit of [`BudgetContext::next_call_limit`];
/// the time it used is charged whatever the outcome.
///
/// A returned solution is installed when it is strictly cheaper than the
/// current cost or the state still has unserved customers, whatever the
/// solver status. Only an installed proven optimum freezes the state.
/// Returns `Ok(true)` iff a solution was installed.
///
/// # Errors
///
/// Returns an [`InvariantViolation`] if the solver's assignment cannot be
/// traced into routes or does not feasibly cover every customer. The state is
/// left unchanged in that case.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pdp_gp::budget::BudgetContext;
/// use pdp_gp::models::{Instance, RouteState};
/// use pdp_gp::solver::{exact_solver_step, ExhaustiveSolver};
///
/// let instance = Arc::new(Instance::random("r", 5, 3));
/// let mut state = RouteState::new(instance);
/// let mut budget = BudgetContext::new("r", 10.0);
///
/// let installed = exact_solver_step(&mut state, &mut budget, &ExhaustiveSolver::default())
///     .expect("valid solution");
/// assert!(installed);
/// assert!(state.is_complete());
/// assert!(state.is_optimal());
/// assert_eq!(budget.call_count(), 1);
/// ```
pub fn exact_solver_step<S: ExactSolver + ?Sized>(
    state: &mut RouteState,
    budget: &mut BudgetContext,
    solver: &S,
) -> Result<bool, InvariantViolation> {
    if state.is_optimal() || !state.solver_eligible() {
        return Ok(false);
    }
    let limit = budget.next_call_limit();
    if limit <= 0.0 {
        return Ok(false);
    }

    let warm_start = Assignment::from_state(state);
    let time_limit = Duration::try_from_secs_f64(limit).unwrap_or(Duration::MAX);
    let outcome = solver.solve(state.instance(), &warm_start, time_limit);
    budget.record_usage(outcome.elapsed.as_secs_f64());

    let verdict = SolverVerdict::classify(&outcome, state);
    debug!(
        instance = %state.instance().name(),
        limit,
        elapsed = outcome.elapsed.as_secs_f64(),
        status = ?outcome.status,
        ?verdict,
        remaining = budget.remaining(),
        "exact solver call"
    );

    let assignment = match (&verdict, outcome.assignment) {
        (SolverVerdict::Optimal | SolverVerdict::Improved, Some(assignment)) => assignment,
        _ => {
            state.reject_solver();
            return Ok(false);
        }
    };

    let routes = assignment.to_routes()?;
    state.install_solution(&routes, verdict == SolverVerdict::Optimal)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;

    use super::*;
    use crate::constructive::{nearest_insertion, nearest_neighbor_back};
    use crate::distance::CostMatrix;
    use crate::models::Instance;
    use crate::solver::ExhaustiveSolver;

    /// Returns a fixed outcome and counts calls.
    struct Scripted {
        outcome: SolveOutcome,
        calls: Cell<usize>,
        last_limit: Cell<Duration>,
    }

    impl Scripted {
        fn new(outcome: SolveOutcome) -> Self {
            Self {
                outcome,
                calls: Cell::new(0),
                last_limit: Cell::new(Duration::ZERO),
            }
        }
    }

    impl ExactSolver for Scripted {
        fn solve(&self, _: &Instance, _: &Assignment, time_limit: Duration) -> SolveOutcome {
            self.calls.set(self.calls.get() + 1);
            self.last_limit.set(time_limit);
            self.outcome.clone()
        }
    }

    fn worked_example() -> Arc<Instance> {
        let costs = CostMatrix::from_rows(&[
            vec![0.0, 2.0, 9.0, 10.0, 7.0],
            vec![2.0, 0.0, 6.0, 4.0, 3.0],
            vec![9.0, 6.0, 0.0, 8.0, 5.0],
            vec![10.0, 4.0, 8.0, 0.0, 6.0],
            vec![7.0, 3.0, 5.0, 6.0, 0.0],
        ])
        .expect("valid");
        Arc::new(Instance::new("w4", costs, vec![5.0; 4], vec![0.0; 4], 15.0).expect("valid"))
    }

    fn solution(status: SolveStatus, objective: f64, routes: &[&[usize]]) -> SolveOutcome {
        SolveOutcome {
            status,
            objective,
            assignment: Some(Assignment::from_routes(5, routes.iter().copied())),
            elapsed: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_no_call_without_budget() {
        let mut state = RouteState::new(worked_example());
        let mut budget = BudgetContext::disabled("w4");
        let solver = Scripted::new(SolveOutcome::no_solution(SolveStatus::Timeout, Duration::ZERO));

        assert!(!exact_solver_step(&mut state, &mut budget, &solver).expect("ok"));
        assert_eq!(solver.calls.get(), 0);
        assert_eq!(budget.call_count(), 0);
    }

    #[test]
    fn test_limit_is_share_of_remaining() {
        let mut state = RouteState::new(worked_example());
        let mut budget = BudgetContext::new("w4", 10.0);
        let solver = Scripted::new(SolveOutcome::no_solution(SolveStatus::Timeout, Duration::from_secs(4)));

        exact_solver_step(&mut state, &mut budget, &solver).expect("ok");
        assert_eq!(solver.last_limit.get(), Duration::from_secs(4));
        assert!((budget.used_budget() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_failure_charges_budget_and_clears_eligibility() {
        let mut state = RouteState::new(worked_example());
        let before = state.clone();
        let mut budget = BudgetContext::new("w4", 10.0);
        let solver = Scripted::new(SolveOutcome::no_solution(SolveStatus::Infeasible, Duration::from_secs(1)));

        assert!(!exact_solver_step(&mut state, &mut budget, &solver).expect("ok"));
        assert_eq!(budget.call_count(), 1);
        assert!(!state.solver_eligible());
        assert_eq!(state.routes(), before.routes());
        assert_eq!(state.total_cost(), before.total_cost());

        // not called again until the state changes
        assert!(!exact_solver_step(&mut state, &mut budget, &solver).expect("ok"));
        assert_eq!(solver.calls.get(), 1);

        assert!(nearest_insertion(&mut state));
        exact_solver_step(&mut state, &mut budget, &solver).expect("ok");
        assert_eq!(solver.calls.get(), 2);
    }

    #[test]
    fn test_incomplete_state_accepts_any_solution() {
        let mut state = RouteState::new(worked_example());
        let mut budget = BudgetContext::new("w4", 10.0);
        let solver = Scripted::new(solution(
            SolveStatus::Feasible,
            37.0,
            &[&[0, 1, 2, 0], &[0, 3, 4, 0]],
        ));

        assert!(exact_solver_step(&mut state, &mut budget, &solver).expect("ok"));
        assert!(state.is_complete());
        assert!(!state.is_optimal());
        // cost is recomputed from the routes, not taken from the solver
        assert_eq!(state.total_cost(), 40.0);
        assert_eq!(state.visited(), &[1, 2, 3, 4]);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_worse_solution_rejected_on_complete_state() {
        let mut state = RouteState::new(worked_example());
        while nearest_neighbor_back(&mut state) {}
        assert!(state.is_complete());
        let before = state.clone();

        let mut budget = BudgetContext::new("w4", 10.0);
        let solver = Scripted::new(solution(
            SolveStatus::Feasible,
            state.total_cost(),
            &[&[0, 1, 2, 0], &[0, 3, 4, 0]],
        ));
        assert!(!exact_solver_step(&mut state, &mut budget, &solver).expect("ok"));
        assert_eq!(state.routes(), before.routes());
        assert!(!state.solver_eligible());
    }

    #[test]
    fn test_optimal_solution_freezes_state() {
        let mut state = RouteState::new(worked_example());
        let mut budget = BudgetContext::new("w4", 10.0);

        assert!(exact_solver_step(&mut state, &mut budget, &ExhaustiveSolver::default()).expect("ok"));
        assert!(state.is_optimal());
        assert_eq!(state.total_cost(), 34.0);

        let frozen = state.clone();
        assert!(!nearest_insertion(&mut state));
        assert!(!exact_solver_step(&mut state, &mut budget, &ExhaustiveSolver::default()).expect("ok"));
        assert_eq!(state, frozen);
        assert_eq!(budget.call_count(), 1);
    }

    #[test]
    fn test_optimal_confirmation_is_not_installed() {
        let mut state =
            RouteState::from_routes(worked_example(), &[vec![1], vec![2, 4, 3]]).expect("valid");
        assert_eq!(state.total_cost(), 34.0);
        let before = state.routes().to_vec();
        let mut budget = BudgetContext::new("w4", 10.0);

        let installed =
            exact_solver_step(&mut state, &mut budget, &ExhaustiveSolver::default()).expect("ok");
        assert!(!installed);
        assert!(!state.is_optimal());
        assert!(!state.solver_eligible());
        assert_eq!(state.routes(), &before[..]);
        assert_eq!(budget.call_count(), 1);
    }

    #[test]
    fn test_malformed_assignment_is_violation() {
        let mut state = RouteState::new(worked_example());
        let mut assignment = Assignment::from_routes(5, [&[0, 1, 2, 0][..]]);
        assignment.set(1, 3, 1);
        let solver = Scripted::new(SolveOutcome {
            status: SolveStatus::Feasible,
            objective: 1.0,
            assignment: Some(assignment),
            elapsed: Duration::ZERO,
        });
        let mut budget = BudgetContext::new("w4", 10.0);

        let err = exact_solver_step(&mut state, &mut budget, &solver).expect_err("malformed");
        assert_eq!(err, InvariantViolation::MalformedAssignment { node: 1 });
        assert_eq!(state.unvisited().len(), 4);
        assert_eq!(budget.call_count(), 1);
    }

    #[test]
    fn test_partial_cover_is_violation() {
        let mut state = RouteState::new(worked_example());
        let solver = Scripted::new(solution(SolveStatus::Feasible, 4.0, &[&[0, 1, 0]]));
        let mut budget = BudgetContext::new("w4", 10.0);

        let err = exact_solver_step(&mut state, &mut budget, &solver).expect_err("partial");
        assert_eq!(err, InvariantViolation::PartitionBroken { customer: 2 });
        assert!(!state.is_complete());
    }
}
