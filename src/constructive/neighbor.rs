//! Nearest and farthest neighbor insertion at route ends.
//!
//! # Algorithm
//!
//! For every unvisited customer, prices splicing it next to one end of every
//! route (right after the starting depot, or right before the returning
//! depot) and prices seeding a new route with it. The customer and position
//! with the smallest (nearest) or largest (farthest) marginal cost among the
//! capacity-feasible candidates is inserted. One customer per call.
//!
//! Ties go to the first candidate in scan order: unvisited customers in
//! ascending id, routes in order, new route last. Farthest starts from a
//! zero incumbent, so zero-cost moves are never chosen by it.
//!
//! # Complexity
//!
//! O(u × R × n) per call where u = unvisited customers, R = routes, and
//! n = route length (for the capacity check).

use super::scan::{insert_one, Placement};
use super::Criterion;
use crate::models::RouteState;

/// The route end a neighbor insertion works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteEnd {
    /// Between the starting depot and the first customer.
    Front,
    /// Between the last customer and the returning depot.
    Back,
}

/// Inserts one customer at the chosen end of some route.
///
/// Returns `true` if a customer was inserted; `false` leaves the state
/// untouched (no feasible candidate, nothing unvisited, or state optimal).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pdp_gp::constructive::{insert_at_end, Criterion, RouteEnd};
/// use pdp_gp::models::{Instance, RouteState};
///
/// let mut state = RouteState::new(Arc::new(Instance::random("r", 6, 1)));
/// while insert_at_end(&mut state, RouteEnd::Back, Criterion::Nearest) {}
/// assert!(state.is_complete());
/// assert!(state.validate().is_ok());
/// ```
pub fn insert_at_end(state: &mut RouteState, end: RouteEnd, criterion: Criterion) -> bool {
    let placement = match end {
        RouteEnd::Front => Placement::Front,
        RouteEnd::Back => Placement::Back,
    };
    insert_one(state, placement, criterion)
}

/// Cheapest splice right after a route's starting depot.
pub fn nearest_neighbor_front(state: &mut RouteState) -> bool {
    insert_at_end(state, RouteEnd::Front, Criterion::Nearest)
}

/// Cheapest splice right before a route's returning depot.
pub fn nearest_neighbor_back(state: &mut RouteState) -> bool {
    insert_at_end(state, RouteEnd::Back, Criterion::Nearest)
}

/// Costliest splice right after a route's starting depot.
pub fn farthest_neighbor_front(state: &mut RouteState) -> bool {
    insert_at_end(state, RouteEnd::Front, Criterion::Farthest)
}

/// Costliest splice right before a route's returning depot.
pub fn farthest_neighbor_back(state: &mut RouteState) -> bool {
    insert_at_end(state, RouteEnd::Back, Criterion::Farthest)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::distance::CostMatrix;
    use crate::models::Instance;

    fn worked_example() -> Arc<Instance> {
        let costs = CostMatrix::from_rows(&[
            vec![0.0, 2.0, 9.0, 10.0, 7.0],
            vec![2.0, 0.0, 6.0, 4.0, 3.0],
            vec![9.0, 6.0, 0.0, 8.0, 5.0],
            vec![10.0, 4.0, 8.0, 0.0, 6.0],
            vec![7.0, 3.0, 5.0, 6.0, 0.0],
        ])
        .expect("valid");
        Arc::new(
            Instance::new("w4", costs, vec![5.0; 4], vec![0.0; 4], 15.0).expect("valid"),
        )
    }

    /// Direct simulation of back insertion: every unvisited node, every
    /// route's last slot then a new route, strict improvement only.
    fn simulate_back(inst: &Instance) -> (Vec<Vec<usize>>, f64) {
        let c = inst.costs();
        let mut routes: Vec<Vec<usize>> = vec![vec![0, 0]];
        let mut unvisited: Vec<usize> = inst.customers().collect();
        let mut total = 0.0;
        while !unvisited.is_empty() {
            let mut best: Option<(usize, Option<usize>, f64)> = None;
            for (ui, &v) in unvisited.iter().enumerate() {
                for (r, route) in routes.iter().enumerate() {
                    let load: f64 = route.iter().map(|&n| inst.delivery(n)).sum();
                    if load + inst.delivery(v) > inst.capacity() {
                        continue;
                    }
                    let k = route.len();
                    let delta =
                        c.get(route[k - 2], v) + c.get(v, route[k - 1]) - c.get(route[k - 2], route[k - 1]);
                    if best.is_none_or(|b| delta < b.2) {
                        best = Some((ui, Some(r), delta));
                    }
                }
                let delta = c.get(0, v) + c.get(v, 0);
                if best.is_none_or(|b| delta < b.2) {
                    best = Some((ui, None, delta));
                }
            }
            let (ui, r, delta) = best.expect("a new route always fits");
            let v = unvisited.remove(ui);
            match r {
                Some(r) => {
                    let k = routes[r].len();
                    routes[r].insert(k - 1, v);
                }
                None => routes.push(vec![0, v, 0]),
            }
            total += delta;
        }
        (routes, total)
    }

    #[test]
    fn test_nearest_back_matches_simulation() {
        let inst = worked_example();
        let mut state = RouteState::new(Arc::clone(&inst));
        while nearest_neighbor_back(&mut state) {}

        let (routes, total) = simulate_back(&inst);
        assert!(state.is_complete());
        assert!((state.total_cost() - total).abs() < 1e-9);
        assert!((state.total_cost() - 39.0).abs() < 1e-9);
        let got: Vec<Vec<usize>> = state.routes().iter().map(|r| r.nodes().to_vec()).collect();
        assert_eq!(got, routes);
        assert_eq!(got, vec![vec![0, 1, 4, 2, 0], vec![0, 3, 0]]);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_nearest_front_builds_reverse_chain() {
        let inst = worked_example();
        let mut state = RouteState::new(inst);
        assert!(nearest_neighbor_front(&mut state));
        assert_eq!(state.routes()[0].nodes(), &[0, 1, 0]);
        // front of [0,1,0]: c(0,v) + c(v,1) - c(0,1); node 4 gives 7 + 3 - 2 = 8
        assert!(nearest_neighbor_front(&mut state));
        assert_eq!(state.routes()[0].nodes(), &[0, 4, 1, 0]);
        assert_eq!(state.total_cost(), 12.0);
    }

    #[test]
    fn test_farthest_back_prefers_expensive_splice() {
        let inst = worked_example();
        let mut state = RouteState::new(inst);
        assert!(farthest_neighbor_back(&mut state));
        // 0 -> 3 -> 0 costs 20, the largest seed
        assert_eq!(state.routes()[0].nodes(), &[0, 3, 0]);
        assert_eq!(state.total_cost(), 20.0);
        while farthest_neighbor_back(&mut state) {}
        assert!(state.is_complete());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_farthest_never_takes_zero_cost() {
        let inst = Arc::new(
            Instance::new("zero", CostMatrix::new(3), vec![1.0, 1.0], vec![0.0, 0.0], 5.0)
                .expect("valid"),
        );
        let mut state = RouteState::new(inst);
        let before = state.clone();
        assert!(!farthest_neighbor_front(&mut state));
        assert_eq!(state, before);
        assert!(nearest_neighbor_front(&mut state));
    }

    #[test]
    fn test_infeasible_customer_is_skipped() {
        let costs = CostMatrix::from_rows(&[
            vec![0.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ])
        .expect("valid");
        let inst = Arc::new(
            Instance::new("big", costs, vec![20.0, 2.0], vec![0.0, 0.0], 10.0).expect("valid"),
        );
        let mut state = RouteState::new(inst);
        assert!(nearest_neighbor_back(&mut state));
        assert_eq!(state.visited(), &[2]);
        let before = state.clone();
        assert!(!nearest_neighbor_back(&mut state));
        assert_eq!(state, before);
        assert_eq!(state.unvisited(), &[1]);
    }
}
