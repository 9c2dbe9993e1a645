//! Optimal split of a customer sequence into pickup-and-delivery routes.
//!
//! # Algorithm
//!
//! Given a giant tour (permutation of customers), finds the cheapest
//! partition into consecutive depot-to-depot routes whose load profile stays
//! within vehicle capacity at every position.
//!
//! Models the problem as a shortest path on an auxiliary graph where node i
//! is the boundary after customer i and edge (i, j) serves customers
//! i+1..=j in one route. Extending a route by customer c raises every
//! earlier load by c's delivery and ends at the route's pickup total, so the
//! peak load obeys `peak' = max(peak + delivery(c), pickups)` and can only
//! grow: the inner loop stops at the first overload.
//!
//! # Complexity
//!
//! O(n²) where n = number of customers.
//!
//! # Reference
//!
//! Prins, C. (2004). "A simple and effective evolutionary algorithm for the
//! vehicle routing problem", *Computers & Operations Research* 31(12), 1985-2002.

use crate::models::Instance;

/// Result of the split algorithm.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SplitResult {
    /// Routes as sequences of customer ids.
    pub routes: Vec<Vec<usize>>,
    /// Total cost of all routes.
    pub total_cost: f64,
}

/// Splits a giant tour into capacity-feasible routes of minimum total cost.
///
/// Returns `None` if some customer cannot be served even on its own.
pub(crate) fn split(tour: &[usize], instance: &Instance) -> Option<SplitResult> {
    let n = tour.len();
    if n == 0 {
        return Some(SplitResult {
            routes: vec![],
            total_cost: 0.0,
        });
    }

    let depot = 0;
    let costs = instance.costs();
    let capacity = instance.capacity();

    // cost[i] = minimum cost to serve tour[0..i]
    // pred[i] = start of the last route ending at i
    let mut cost = vec![f64::INFINITY; n + 1];
    let mut pred = vec![0usize; n + 1];
    cost[0] = 0.0;

    for i in 0..n {
        if cost[i] == f64::INFINITY {
            continue;
        }

        let mut peak = 0.0f64;
        let mut pickups = 0.0;
        let mut route_cost = 0.0;

        for j in i..n {
            let c = tour[j];
            pickups += instance.pickup(c);
            peak = (peak + instance.delivery(c)).max(pickups);
            if peak > capacity {
                break;
            }

            route_cost += if j == i {
                costs.get(depot, c)
            } else {
                costs.get(tour[j - 1], c)
            };

            let new_cost = cost[i] + route_cost + costs.get(c, depot);
            if new_cost < cost[j + 1] {
                cost[j + 1] = new_cost;
                pred[j + 1] = i;
            }
        }
    }

    if cost[n] == f64::INFINITY {
        return None;
    }

    let mut routes = Vec::new();
    let mut j = n;
    while j > 0 {
        let i = pred[j];
        routes.push(tour[i..j].to_vec());
        j = i;
    }
    routes.reverse();

    Some(SplitResult {
        routes,
        total_cost: cost[n],
    })
}
