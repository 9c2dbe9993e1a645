//! Mutable pickup-and-delivery solution state.

use std::sync::Arc;

use super::route::load_profile;
use super::{Instance, InvariantViolation, Route};
use crate::distance::CostMatrix;

/// Load profiles are compared against a recomputation with this tolerance.
const LOAD_TOLERANCE: f64 = 1e-6;

/// Rounds a cost to two decimals.
///
/// Every mutation of [`RouteState`] rounds its running cost this way so that
/// thousands of incremental updates do not accumulate float drift.
///
/// # Examples
///
/// ```
/// use pdp_gp::models::round_cost;
///
/// assert_eq!(round_cost(12.3456), 12.35);
/// assert_eq!(round_cost(7.0), 7.0);
/// ```
pub fn round_cost(cost: f64) -> f64 {
    (cost * 100.0).round() / 100.0
}

/// Sums every consecutive arc over a sequence of depot-to-depot node lists,
/// accumulating in visiting order.
pub(crate) fn arc_cost_sum<'a>(
    costs: &CostMatrix,
    routes: impl IntoIterator<Item = &'a [usize]>,
) -> f64 {
    let mut total = 0.0;
    for nodes in routes {
        for w in nodes.windows(2) {
            total += costs.get(w[0], w[1]);
        }
    }
    total
}

/// Target of an insertion: an existing route or a freshly seeded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSlot {
    /// Route index in [`RouteState::routes`].
    Existing(usize),
    /// A new route `[0, v, 0]` appended after the existing ones.
    New,
}

/// The solution an evolved program builds and repairs.
///
/// Holds the routes, the visited/unvisited partition of the customers, the
/// running cost, and the flags that freeze the state or gate the exact
/// solver. Instance data is shared immutably between clones; everything
/// else is owned, so a clone is a fully independent working copy.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pdp_gp::models::{Instance, RouteState};
///
/// let state = RouteState::new(Arc::new(Instance::random("r", 5, 7)));
/// assert_eq!(state.routes().len(), 1);
/// assert_eq!(state.unvisited(), &[1, 2, 3, 4, 5]);
/// assert!(state.visited().is_empty());
/// assert_eq!(state.total_cost(), 0.0);
/// assert!(state.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouteState {
    instance: Arc<Instance>,
    routes: Vec<Route>,
    visited: Vec<usize>,
    unvisited: Vec<usize>,
    total_cost: f64,
    optimal: bool,
    last_changed: bool,
    solver_eligible: bool,
}

impl RouteState {
    /// Creates an empty state: one depot-only route, every customer unvisited.
    pub fn new(instance: Arc<Instance>) -> Self {
        let unvisited = instance.customers().collect();
        Self {
            instance,
            routes: vec![Route::new()],
            visited: Vec::new(),
            unvisited,
            total_cost: 0.0,
            optimal: false,
            last_changed: false,
            solver_eligible: true,
        }
    }

    /// Restores a state from customer sequences, one per route.
    ///
    /// Customers not covered by any route stay unvisited in ascending order.
    /// Fails if the routes duplicate a customer, reference an unknown node,
    /// or exceed capacity.
    pub fn from_routes(
        instance: Arc<Instance>,
        customer_routes: &[Vec<usize>],
    ) -> Result<Self, InvariantViolation> {
        let n = instance.node_count();
        let mut routed = vec![false; n];
        let mut visited = Vec::new();
        for (route_index, customers) in customer_routes.iter().enumerate() {
            for &c in customers {
                if c == 0 {
                    return Err(InvariantViolation::MalformedRoute { route_index });
                }
                if c >= n {
                    return Err(InvariantViolation::UnknownNode {
                        route_index,
                        node: c,
                    });
                }
                if routed[c] {
                    return Err(InvariantViolation::DuplicateCustomer { customer: c });
                }
                routed[c] = true;
                visited.push(c);
            }
        }
        let routes: Vec<Route> = customer_routes
            .iter()
            .map(|c| Route::from_customers(c, &instance))
            .collect();
        let routes = if routes.is_empty() {
            vec![Route::new()]
        } else {
            routes
        };
        let total_cost = round_cost(arc_cost_sum(
            instance.costs(),
            routes.iter().map(|r| r.nodes()),
        ));
        let unvisited = instance.customers().filter(|&c| !routed[c]).collect();
        let state = Self {
            instance,
            routes,
            visited,
            unvisited,
            total_cost,
            optimal: false,
            last_changed: false,
            solver_eligible: true,
        };
        state.validate()?;
        Ok(state)
    }

    /// The instance this state solves.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Shared handle to the instance.
    pub fn instance_arc(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// Number of nodes, depot included.
    pub fn node_count(&self) -> usize {
        self.instance.node_count()
    }

    /// Routes in order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Customers served, in the order they were inserted.
    pub fn visited(&self) -> &[usize] {
        &self.visited
    }

    /// Customers not yet served, in ascending id order.
    pub fn unvisited(&self) -> &[usize] {
        &self.unvisited
    }

    /// Running cost, rounded to two decimals.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Returns `true` once the exact solver has certified this state optimal.
    /// An optimal state is frozen.
    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    /// Returns `true` when every customer is served.
    pub fn is_complete(&self) -> bool {
        self.unvisited.is_empty()
    }

    /// Returns `true` if any mutation has been committed.
    pub fn last_changed(&self) -> bool {
        self.last_changed
    }

    /// Returns `true` if the exact solver may run on this state.
    ///
    /// Cleared when the solver fails to improve the state, set again by the
    /// next committed mutation.
    pub fn solver_eligible(&self) -> bool {
        self.solver_eligible
    }

    /// Cost plus [`Instance::unvisited_penalty`] for every unserved customer.
    pub fn penalized_cost(&self) -> f64 {
        self.total_cost + self.unvisited.len() as f64 * self.instance.unvisited_penalty()
    }

    /// Forces both dirty flags on, making the exact solver eligible again.
    pub fn mark_dirty(&mut self) {
        self.last_changed = true;
        self.solver_eligible = true;
    }

    /// Checks the three capacity predicates for inserting `node` at `pos`.
    ///
    /// For [`RouteSlot::New`] the checks run against an empty route and `pos`
    /// is ignored.
    pub fn can_insert(&self, slot: RouteSlot, pos: usize, node: usize) -> bool {
        let (d, p, q) = (
            self.instance.delivery(node),
            self.instance.pickup(node),
            self.instance.capacity(),
        );
        match slot {
            RouteSlot::Existing(r) => self.routes[r].can_insert(pos, d, p, q),
            RouteSlot::New => Route::new().can_insert(1, d, p, q),
        }
    }

    /// Marginal cost of inserting `node` at `pos`.
    pub fn insertion_cost(&self, slot: RouteSlot, pos: usize, node: usize) -> f64 {
        let costs = self.instance.costs();
        match slot {
            RouteSlot::Existing(r) => {
                let nodes = self.routes[r].nodes();
                costs.insertion_delta(nodes[pos - 1], node, nodes[pos])
            }
            RouteSlot::New => costs.insertion_delta(0, node, 0),
        }
    }

    /// Commits an insertion and moves `node` from unvisited to visited.
    pub(crate) fn insert(&mut self, slot: RouteSlot, pos: usize, node: usize, marginal: f64) {
        let (d, p) = (self.instance.delivery(node), self.instance.pickup(node));
        match slot {
            RouteSlot::Existing(r) => self.routes[r].insert(pos, node, d, p),
            RouteSlot::New => {
                let mut route = Route::new();
                route.insert(1, node, d, p);
                self.routes.push(route);
            }
        }
        self.total_cost = round_cost(self.total_cost + round_cost(marginal));
        if let Some(i) = self.unvisited.iter().position(|&c| c == node) {
            self.unvisited.remove(i);
        }
        self.visited.push(node);
        self.mark_dirty();
    }

    /// Replaces the route set after a relocation; the partition is unchanged.
    pub(crate) fn replace_routes(&mut self, routes: Vec<Route>, total_cost: f64) {
        self.routes = routes;
        self.total_cost = round_cost(total_cost);
        self.mark_dirty();
    }

    /// Installs a complete solution returned by the exact solver.
    ///
    /// Fails, leaving `self` untouched, if the routes are not a capacity-
    /// feasible cover of every customer.
    pub(crate) fn install_solution(
        &mut self,
        customer_routes: &[Vec<usize>],
        optimal: bool,
    ) -> Result<(), InvariantViolation> {
        let mut candidate = Self::from_routes(Arc::clone(&self.instance), customer_routes)?;
        if let Some(&customer) = candidate.unvisited.first() {
            return Err(InvariantViolation::PartitionBroken { customer });
        }
        candidate.visited.sort_unstable();
        candidate.optimal = optimal;
        candidate.mark_dirty();
        *self = candidate;
        Ok(())
    }

    /// Records that the exact solver could not improve this state.
    pub(crate) fn reject_solver(&mut self) {
        self.solver_eligible = false;
    }

    /// Recomputes every derived quantity and reports the first inconsistency.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let n = self.node_count();
        let capacity = self.instance.capacity();
        let mut routed = vec![false; n];

        for (route_index, route) in self.routes.iter().enumerate() {
            let nodes = route.nodes();
            if nodes.len() < 2 || nodes[0] != 0 || nodes[nodes.len() - 1] != 0 {
                return Err(InvariantViolation::MalformedRoute { route_index });
            }
            for &node in route.customers() {
                if node >= n {
                    return Err(InvariantViolation::UnknownNode { route_index, node });
                }
                if node == 0 {
                    return Err(InvariantViolation::MalformedRoute { route_index });
                }
                if routed[node] {
                    return Err(InvariantViolation::DuplicateCustomer { customer: node });
                }
                routed[node] = true;
            }

            let (loads, delivery, pickup) = load_profile(nodes, &self.instance);
            let stale = route.loads().len() != loads.len()
                || route
                    .loads()
                    .iter()
                    .zip(&loads)
                    .any(|(a, b)| (a - b).abs() > LOAD_TOLERANCE)
                || (route.delivery_sum() - delivery).abs() > LOAD_TOLERANCE
                || (route.pickup_sum() - pickup).abs() > LOAD_TOLERANCE;
            if stale {
                return Err(InvariantViolation::LoadProfileMismatch { route_index });
            }
            if let Some((position, &load)) = route
                .loads()
                .iter()
                .enumerate()
                .find(|(_, &l)| l > capacity + LOAD_TOLERANCE)
            {
                return Err(InvariantViolation::CapacityExceeded {
                    route_index,
                    position,
                    load,
                    capacity,
                });
            }
        }

        let mut listed = vec![0u8; n];
        for &c in &self.visited {
            if c == 0 || c >= n || !routed[c] {
                return Err(InvariantViolation::PartitionBroken { customer: c });
            }
            listed[c] += 1;
        }
        for &c in &self.unvisited {
            if c == 0 || c >= n || routed[c] {
                return Err(InvariantViolation::PartitionBroken { customer: c });
            }
            listed[c] += 1;
        }
        if let Some(customer) = self.instance.customers().find(|&c| listed[c] != 1) {
            return Err(InvariantViolation::PartitionBroken { customer });
        }

        let expected = arc_cost_sum(self.instance.costs(), self.routes.iter().map(|r| r.nodes()));
        // each incremental insertion may round by up to half a cent
        let tolerance = 0.005 * (n as f64 + 1.0) + 1e-6;
        if (expected - self.total_cost).abs() > tolerance {
            return Err(InvariantViolation::CostMismatch {
                expected,
                found: self.total_cost,
            });
        }
        Ok(())
    }
}
