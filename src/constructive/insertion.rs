//! Cheapest and costliest insertion anywhere in a route.
//!
//! # Algorithm
//!
//! Like neighbor insertion, but every interior slot of every route is a
//! candidate position. One customer is inserted per call.
//!
//! # Complexity
//!
//! O(u × N × n) per call where u = unvisited customers, N = routed nodes,
//! and n = route length (for the capacity check).

use super::scan::{insert_one, Placement};
use super::Criterion;
use crate::models::RouteState;

/// Inserts the unvisited customer whose cheapest feasible slot is the
/// cheapest overall.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pdp_gp::constructive::nearest_insertion;
/// use pdp_gp::models::{Instance, RouteState};
///
/// let mut state = RouteState::new(Arc::new(Instance::random("r", 5, 3)));
/// let mut inserted = 0;
/// while nearest_insertion(&mut state) {
///     inserted += 1;
/// }
/// assert_eq!(inserted, 5);
/// ```
pub fn nearest_insertion(state: &mut RouteState) -> bool {
    insert_one(state, Placement::Anywhere, Criterion::Nearest)
}

/// Inserts the unvisited customer with the costliest feasible slot.
pub fn farthest_insertion(state: &mut RouteState) -> bool {
    insert_one(state, Placement::Anywhere, Criterion::Farthest)
}
