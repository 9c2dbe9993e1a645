//! Single-customer relocation across and within routes.
//!
//! # Algorithm
//!
//! Removes each routed customer in turn (dropping its route if that empties
//! it) and re-inserts it at every slot of every remaining route and of one
//! new route. Each candidate solution is priced in full and checked for
//! capacity on every route. The strictly best (or strictly worst) candidate
//! relative to the current cost is committed.
//!
//! Scan order is source route, source position, destination route (new
//! route last), destination slot; the first candidate found wins ties.
//!
//! # Complexity
//!
//! O(N³) per call where N = routed customers: O(N²) candidates, each
//! priced and checked in O(N).
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluation::RouteEvaluator;
use crate::models::{Route, RouteState};

/// Whether the relocation search looks for the cheapest or the costliest
/// neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    /// Strictly cheaper than the current solution.
    Best,
    /// Strictly costlier than the current solution.
    Worst,
}

impl MoveDirection {
    fn prefers(self, cost: f64, incumbent: f64) -> bool {
        match self {
            MoveDirection::Best => cost < incumbent,
            MoveDirection::Worst => cost > incumbent,
        }
    }
}

/// Applies the best single relocation if it strictly lowers the cost.
///
/// Requires at least two routes. Returns `false` and leaves the state
/// unchanged if no strictly improving feasible relocation exists.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pdp_gp::constructive::farthest_neighbor_back;
/// use pdp_gp::local_search::best_move;
/// use pdp_gp::models::{Instance, RouteState};
///
/// let mut state = RouteState::new(Arc::new(Instance::random("r", 6, 11)));
/// while farthest_neighbor_back(&mut state) {}
/// let before = state.total_cost();
/// while best_move(&mut state) {}
/// assert!(state.total_cost() <= before);
/// assert!(state.validate().is_ok());
/// ```
pub fn best_move(state: &mut RouteState) -> bool {
    relocate(state, MoveDirection::Best)
}

/// Applies the worst single relocation if it strictly raises the cost.
pub fn worst_move(state: &mut RouteState) -> bool {
    relocate(state, MoveDirection::Worst)
}

/// Runs one relocation step in the given direction.
pub fn relocate(state: &mut RouteState, direction: MoveDirection) -> bool {
    if state.is_optimal() || state.routes().len() < 2 {
        return false;
    }
    let Some((routes, cost)) = find_relocation(state, direction) else {
        return false;
    };
    debug!(
        ?direction,
        from = state.total_cost(),
        to = cost,
        routes = routes.len(),
        "relocate"
    );
    let instance = state.instance_arc().clone();
    let routes = routes
        .iter()
        .map(|nodes| Route::from_customers(&nodes[1..nodes.len() - 1], &instance))
        .collect();
    state.replace_routes(routes, cost);
    true
}

/// Searches every relocation; returns the winning route set and its cost.
fn find_relocation(
    state: &RouteState,
    direction: MoveDirection,
) -> Option<(Vec<Vec<usize>>, f64)> {
    let evaluator = RouteEvaluator::new(state.instance());
    let routes: Vec<Vec<usize>> = state.routes().iter().map(|r| r.nodes().to_vec()).collect();
    let mut incumbent = state.total_cost();
    let mut best = None;

    for from in 0..routes.len() {
        for from_pos in 1..routes[from].len() - 1 {
            let mut reduced = routes.clone();
            let node = reduced[from].remove(from_pos);
            if reduced[from].len() <= 2 {
                reduced.remove(from);
            }
            // the last entry is the synthetic new route
            reduced.push(vec![0, 0]);
            let fresh = reduced.len() - 1;

            for to in 0..reduced.len() {
                for to_pos in 1..reduced[to].len() {
                    reduced[to].insert(to_pos, node);
                    let candidate = if to == fresh {
                        &reduced[..]
                    } else {
                        &reduced[..fresh]
                    };
                    if let Some(cost) = evaluator.evaluate(candidate) {
                        if direction.prefers(cost, incumbent) {
                            incumbent = cost;
                            best = Some(candidate.to_vec());
                        }
                    }
                    reduced[to].remove(to_pos);
                }
            }
        }
    }

    best.map(|routes| (routes, incumbent))
}
