//! Evaluation entry points.

use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::warn;

use super::EvaluationError;
use crate::budget::{BudgetAllocator, BudgetContext};
use crate::models::{Instance, InvariantViolation, RouteState};
use crate::program::{Interpreter, Node};
use crate::solver::ExactSolver;

/// Outcome of running one program on one instance.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Final route state.
    pub state: RouteState,
    /// Wall-clock time of the run, solver calls included.
    pub elapsed: Duration,
    /// Cost plus the unvisited penalty.
    pub penalized_cost: f64,
    /// Distance from the instance's reference value, if it has one.
    pub relative_error: Option<f64>,
    /// Exact-solver calls made during the run.
    pub solver_calls: u64,
    /// Seconds charged to the budget during the run.
    pub solver_seconds: f64,
}

/// `|reference - cost| / reference`, or `cost` itself for a zero reference.
///
/// # Examples
///
/// ```
/// use pdp_gp::runner::relative_error;
///
/// assert!((relative_error(110.0, 100.0) - 0.1).abs() < 1e-12);
/// assert_eq!(relative_error(7.0, 0.0), 7.0);
/// ```
pub fn relative_error(cost: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        cost
    } else {
        (reference - cost).abs() / reference
    }
}

/// Runs `program` on a fresh state of `instance`.
///
/// Solver calls are charged to `budget`, which must already be set up for
/// this instance. The final state is validated before it is returned.
///
/// # Errors
///
/// Returns the [`InvariantViolation`] that aborted the run, whether raised by
/// the exact-solver step or found by the final validation.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pdp_gp::budget::BudgetContext;
/// use pdp_gp::models::Instance;
/// use pdp_gp::runner::evaluate;
/// use pdp_gp::solver::ExhaustiveSolver;
///
/// let instance = Arc::new(Instance::random("r", 5, 1));
/// let program = "(Repeat FarthestInsertion)".parse().expect("valid");
/// let mut budget = BudgetContext::disabled("r");
///
/// let eval = evaluate(&program, instance, &mut budget, &ExhaustiveSolver::default())
///     .expect("consistent");
/// assert!(eval.state.is_complete());
/// assert_eq!(eval.penalized_cost, eval.state.total_cost());
/// assert_eq!(eval.solver_calls, 0);
/// ```
pub fn evaluate<S: ExactSolver + ?Sized>(
    program: &Node,
    instance: Arc<Instance>,
    budget: &mut BudgetContext,
    solver: &S,
) -> Result<Evaluation, InvariantViolation> {
    evaluate_from(program, &RouteState::new(instance), budget, solver)
}

/// Runs `program` on a clone of `initial`.
///
/// # Errors
///
/// See [`evaluate`].
pub fn evaluate_from<S: ExactSolver + ?Sized>(
    program: &Node,
    initial: &RouteState,
    budget: &mut BudgetContext,
    solver: &S,
) -> Result<Evaluation, InvariantViolation> {
    let calls_before = budget.call_count();
    let used_before = budget.used_budget();
    let start = Instant::now();

    let mut interpreter = Interpreter::new(initial.clone(), budget, solver);
    let outcome = interpreter.run(program);
    let state = interpreter.into_state();
    let elapsed = start.elapsed();

    if let Err(violation) = outcome.and_then(|()| state.validate()) {
        warn!(
            instance = %state.instance().name(),
            program = %program,
            %violation,
            "evaluation aborted"
        );
        return Err(violation);
    }

    let penalized_cost = state.penalized_cost();
    let error = state
        .instance()
        .reference()
        .map(|r| relative_error(penalized_cost, r.value()));
    Ok(Evaluation {
        penalized_cost,
        relative_error: error,
        elapsed,
        solver_calls: budget.call_count() - calls_before,
        solver_seconds: budget.used_budget() - used_before,
        state,
    })
}

/// Runs `program` on every instance, each with its own budget context from
/// `allocator`.
///
/// With the `parallel` feature the instances are evaluated concurrently.
/// Results keep the order of `instances`; a failed evaluation does not stop
/// the others.
pub fn evaluate_all<S: ExactSolver + Sync + ?Sized>(
    program: &Node,
    instances: &[Arc<Instance>],
    allocator: &BudgetAllocator,
    solver: &S,
) -> Vec<Result<Evaluation, EvaluationError>> {
    let run = |instance: &Arc<Instance>| -> Result<Evaluation, EvaluationError> {
        let mut budget = allocator.context_for(instance.name())?;
        Ok(evaluate(program, Arc::clone(instance), &mut budget, solver)?)
    };

    #[cfg(feature = "parallel")]
    let results = instances.par_iter().map(run).collect();
    #[cfg(not(feature = "parallel"))]
    let results = instances.iter().map(run).collect();

    results
}
