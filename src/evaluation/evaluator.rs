//! Whole-solution evaluator for candidate route sets.

use crate::models::{arc_cost_sum, round_cost, Instance, InvariantViolation};

/// Evaluates candidate route sets given as depot-to-depot node lists,
/// recomputing cost and load profiles from scratch.
///
/// Used where a move changes several routes at once and the incremental
/// bookkeeping of [`RouteState`](crate::models::RouteState) does not apply.
///
/// # Examples
///
/// ```
/// use pdp_gp::distance::CostMatrix;
/// use pdp_gp::models::Instance;
/// use pdp_gp::evaluation::RouteEvaluator;
///
/// let instance = Instance::new(
///     "e",
///     CostMatrix::from_rows(&[
///         vec![0.0, 3.0, 4.0],
///         vec![3.0, 0.0, 5.0],
///         vec![4.0, 5.0, 0.0],
///     ])
///     .expect("valid"),
///     vec![6.0, 6.0],
///     vec![0.0, 0.0],
///     10.0,
/// )
/// .expect("valid");
///
/// let evaluator = RouteEvaluator::new(&instance);
/// assert_eq!(evaluator.evaluate(&[vec![0, 1, 0], vec![0, 2, 0]]), Some(14.0));
/// // both deliveries on one vehicle exceed capacity
/// assert_eq!(evaluator.evaluate(&[vec![0, 1, 2, 0]]), None);
/// ```
pub struct RouteEvaluator<'a> {
    instance: &'a Instance,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates a new evaluator for the given instance.
    pub fn new(instance: &'a Instance) -> Self {
        Self { instance }
    }

    /// Total arc cost of the route set, rounded to two decimals.
    pub fn total_cost(&self, routes: &[Vec<usize>]) -> f64 {
        round_cost(arc_cost_sum(
            self.instance.costs(),
            routes.iter().map(Vec::as_slice),
        ))
    }

    /// First capacity violation in a single route, if any.
    ///
    /// Checks the delivery sum, the pickup sum, and the load at every
    /// position.
    pub fn route_violation(&self, route_index: usize, nodes: &[usize]) -> Option<InvariantViolation> {
        let capacity = self.instance.capacity();
        let delivery: f64 = nodes.iter().map(|&n| self.instance.delivery(n)).sum();
        let pickup: f64 = nodes.iter().map(|&n| self.instance.pickup(n)).sum();
        if delivery > capacity {
            return Some(InvariantViolation::CapacityExceeded {
                route_index,
                position: 0,
                load: delivery,
                capacity,
            });
        }
        if pickup > capacity {
            return Some(InvariantViolation::CapacityExceeded {
                route_index,
                position: nodes.len().saturating_sub(1),
                load: pickup,
                capacity,
            });
        }
        let mut load = delivery;
        for (position, &n) in nodes.iter().enumerate() {
            load += self.instance.pickup(n) - self.instance.delivery(n);
            if load > capacity {
                return Some(InvariantViolation::CapacityExceeded {
                    route_index,
                    position,
                    load,
                    capacity,
                });
            }
        }
        None
    }

    /// Returns `true` if every route respects capacity everywhere.
    pub fn is_feasible(&self, routes: &[Vec<usize>]) -> bool {
        routes
            .iter()
            .enumerate()
            .all(|(i, nodes)| self.route_violation(i, nodes).is_none())
    }

    /// Rounded total cost of a feasible route set, `None` if infeasible.
    pub fn evaluate(&self, routes: &[Vec<usize>]) -> Option<f64> {
        self.is_feasible(routes).then(|| self.total_cost(routes))
    }
}
