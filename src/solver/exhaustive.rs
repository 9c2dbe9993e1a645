//! Enumerative exact solver for small instances.

use std::time::{Duration, Instant};

use super::split::split;
use super::{Assignment, ExactSolver, SolveOutcome, SolveStatus};
use crate::evaluation::RouteEvaluator;
use crate::models::{arc_cost_sum, Instance};

/// Permutations evaluated between two clock checks.
const CLOCK_INTERVAL: usize = 256;

/// Configuration for [`ExhaustiveSolver`].
///
/// # Examples
///
/// ```
/// use pdp_gp::solver::ExhaustiveConfig;
///
/// let config = ExhaustiveConfig::default().with_max_customers(7);
/// assert!(config.validate().is_ok());
/// assert!(ExhaustiveConfig::default().with_max_customers(40).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhaustiveConfig {
    /// Largest instance (in customers) the solver attempts to enumerate.
    /// Larger instances return the warm start or time out immediately.
    pub max_customers: usize,
}

impl Default for ExhaustiveConfig {
    fn default() -> Self {
        Self { max_customers: 9 }
    }
}

impl ExhaustiveConfig {
    /// Sets the enumeration size limit.
    pub fn with_max_customers(mut self, max_customers: usize) -> Self {
        self.max_customers = max_customers;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_customers > 20 {
            return Err("max_customers must be at most 20".into());
        }
        Ok(())
    }
}

/// Exact solver that enumerates every customer order and splits each one
/// optimally into routes.
///
/// Every solution is some ordering of customers cut into consecutive routes,
/// so the enumeration is exhaustive. Only practical for a handful of
/// customers; meant as a reference solver and for tests.
///
/// Honors the time limit: if it expires the best solution found so far is
/// returned as [`SolveStatus::Feasible`], or [`SolveStatus::Timeout`] when
/// there is none. A feasible warm start seeds the incumbent.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use pdp_gp::models::Instance;
/// use pdp_gp::solver::{Assignment, ExactSolver, ExhaustiveSolver, SolveStatus};
///
/// let instance = Instance::random("r", 5, 9);
/// let solver = ExhaustiveSolver::default();
/// let outcome = solver.solve(&instance, &Assignment::new(6), Duration::from_secs(5));
/// assert_eq!(outcome.status, SolveStatus::Optimal);
/// assert!(outcome.assignment.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveSolver {
    config: ExhaustiveConfig,
}

impl ExhaustiveSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: ExhaustiveConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub fn config(&self) -> &ExhaustiveConfig {
        &self.config
    }
}

impl ExactSolver for ExhaustiveSolver {
    fn solve(&self, instance: &Instance, warm_start: &Assignment, time_limit: Duration) -> SolveOutcome {
        let start = Instant::now();
        let n = instance.node_count();
        let mut best = warm_incumbent(instance, warm_start);

        let mut perm: Vec<usize> = instance.customers().collect();
        if perm.len() > self.config.max_customers {
            return finish(best, n, false, start);
        }

        let mut since_check = 0;
        loop {
            if let Some(result) = split(&perm, instance) {
                if best.as_ref().is_none_or(|(c, _)| result.total_cost < *c) {
                    best = Some((result.total_cost, result.routes));
                }
            }
            if !next_permutation(&mut perm) {
                break;
            }
            since_check += 1;
            if since_check == CLOCK_INTERVAL {
                since_check = 0;
                if start.elapsed() >= time_limit {
                    return finish(best, n, false, start);
                }
            }
        }
        finish(best, n, true, start)
    }
}

/// Cost and routes of the warm start if it is a complete feasible solution.
fn warm_incumbent(instance: &Instance, warm_start: &Assignment) -> Option<(f64, Vec<Vec<usize>>)> {
    if warm_start.size() != instance.node_count() {
        return None;
    }
    let routes = warm_start.to_routes().ok()?;
    let covered: usize = routes.iter().map(Vec::len).sum();
    if covered != instance.customer_count() {
        return None;
    }
    let nodes: Vec<Vec<usize>> = routes.iter().map(|r| with_depots(r)).collect();
    let evaluator = RouteEvaluator::new(instance);
    evaluator.is_feasible(&nodes).then(|| {
        let cost = arc_cost_sum(instance.costs(), nodes.iter().map(Vec::as_slice));
        (cost, routes)
    })
}

fn finish(
    best: Option<(f64, Vec<Vec<usize>>)>,
    size: usize,
    exhausted: bool,
    start: Instant,
) -> SolveOutcome {
    let elapsed = start.elapsed();
    match best {
        Some((objective, routes)) => {
            let nodes: Vec<Vec<usize>> = routes.iter().map(|r| with_depots(r)).collect();
            SolveOutcome {
                status: if exhausted {
                    SolveStatus::Optimal
                } else {
                    SolveStatus::Feasible
                },
                objective,
                assignment: Some(Assignment::from_routes(size, nodes.iter().map(Vec::as_slice))),
                elapsed,
            }
        }
        None if exhausted => SolveOutcome::no_solution(SolveStatus::Infeasible, elapsed),
        None => SolveOutcome::no_solution(SolveStatus::Timeout, elapsed),
    }
}

fn with_depots(customers: &[usize]) -> Vec<usize> {
    let mut nodes = Vec::with_capacity(customers.len() + 2);
    nodes.push(0);
    nodes.extend_from_slice(customers);
    nodes.push(0);
    nodes
}

/// Advances to the next lexicographic permutation; `false` after the last.
fn next_permutation(perm: &mut [usize]) -> bool {
    let n = perm.len();
    if n < 2 {
        return false;
    }
    let mut i = n - 1;
    while i > 0 && perm[i - 1] >= perm[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = n - 1;
    while perm[j] <= perm[i - 1] {
        j -= 1;
    }
    perm.swap(i - 1, j);
    perm[i..].reverse();
    true
}
