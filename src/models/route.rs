//! Depot-to-depot routes with on-board load profiles.

use super::Instance;
use crate::distance::CostMatrix;

/// One vehicle's visiting sequence `0, c1, …, ck, 0` together with its
/// on-board load at every position.
///
/// The load at position `i` is the delivery demand of every customer after
/// `i` (still on board) plus the pickup demand of every customer up to and
/// including `i` (already collected). A vehicle therefore leaves the depot
/// carrying all deliveries and returns carrying all pickups.
///
/// # Examples
///
/// ```
/// use pdp_gp::distance::CostMatrix;
/// use pdp_gp::models::{Instance, Route};
///
/// let instance = Instance::new(
///     "two",
///     CostMatrix::from_rows(&[
///         vec![0.0, 1.0, 1.0],
///         vec![1.0, 0.0, 1.0],
///         vec![1.0, 1.0, 0.0],
///     ])
///     .expect("valid"),
///     vec![4.0, 2.0],
///     vec![1.0, 5.0],
///     10.0,
/// )
/// .expect("valid");
///
/// let route = Route::from_customers(&[1, 2], &instance);
/// assert_eq!(route.nodes(), &[0, 1, 2, 0]);
/// assert_eq!(route.loads(), &[6.0, 3.0, 6.0, 6.0]);
/// assert_eq!(route.delivery_sum(), 6.0);
/// assert_eq!(route.pickup_sum(), 6.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    nodes: Vec<usize>,
    loads: Vec<f64>,
    delivery_sum: f64,
    pickup_sum: f64,
}

impl Route {
    /// Creates a depot-only route `[0, 0]`.
    pub fn new() -> Self {
        Self {
            nodes: vec![0, 0],
            loads: vec![0.0, 0.0],
            delivery_sum: 0.0,
            pickup_sum: 0.0,
        }
    }

    /// Builds a route serving `customers` in order, computing its load profile.
    pub fn from_customers(customers: &[usize], instance: &Instance) -> Self {
        let mut nodes = Vec::with_capacity(customers.len() + 2);
        nodes.push(0);
        nodes.extend_from_slice(customers);
        nodes.push(0);
        let (loads, delivery_sum, pickup_sum) = load_profile(&nodes, instance);
        Self {
            nodes,
            loads,
            delivery_sum,
            pickup_sum,
        }
    }

    /// Full node sequence including both depot visits.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Customer ids in visit order (depots excluded).
    pub fn customers(&self) -> &[usize] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// Number of customers served.
    pub fn len(&self) -> usize {
        self.nodes.len() - 2
    }

    /// Returns `true` if this route serves no customer.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 2
    }

    /// On-board load at each position, same length as [`Route::nodes`].
    pub fn loads(&self) -> &[f64] {
        &self.loads
    }

    /// Total delivery demand served.
    pub fn delivery_sum(&self) -> f64 {
        self.delivery_sum
    }

    /// Total pickup demand served.
    pub fn pickup_sum(&self) -> f64 {
        self.pickup_sum
    }

    /// Peak on-board load.
    pub fn max_load(&self) -> f64 {
        self.loads.iter().copied().fold(0.0, f64::max)
    }

    /// Sum of arc costs along the route.
    pub fn cost(&self, costs: &CostMatrix) -> f64 {
        costs.route_cost(&self.nodes)
    }

    /// Returns `true` if the route's pickups plus `pickup` fit the vehicle.
    #[inline]
    pub fn pickup_feasible(&self, pickup: f64, capacity: f64) -> bool {
        self.pickup_sum + pickup <= capacity
    }

    /// Returns `true` if the route's deliveries plus `delivery` fit the vehicle.
    #[inline]
    pub fn delivery_feasible(&self, delivery: f64, capacity: f64) -> bool {
        self.delivery_sum + delivery <= capacity
    }

    /// Returns `true` if inserting a node with the given demands at `pos`
    /// keeps every entry of the resulting load profile within `capacity`.
    ///
    /// Entries before `pos` grow by `delivery`, entries at or after `pos`
    /// grow by `pickup`, and the inserted entry is `loads[pos - 1] + pickup`.
    pub fn intermediate_feasible(
        &self,
        pos: usize,
        delivery: f64,
        pickup: f64,
        capacity: f64,
    ) -> bool {
        debug_assert!(pos >= 1 && pos < self.nodes.len());
        self.loads[..pos].iter().all(|l| l + delivery <= capacity)
            && self.loads[pos..].iter().all(|l| l + pickup <= capacity)
            && self.loads[pos - 1] + pickup <= capacity
    }

    /// All three feasibility checks for inserting at `pos`.
    pub fn can_insert(&self, pos: usize, delivery: f64, pickup: f64, capacity: f64) -> bool {
        self.pickup_feasible(pickup, capacity)
            && self.delivery_feasible(delivery, capacity)
            && self.intermediate_feasible(pos, delivery, pickup, capacity)
    }

    /// Splices `node` in at `pos`, updating the load profile in place.
    ///
    /// Does not check feasibility.
    pub(crate) fn insert(&mut self, pos: usize, node: usize, delivery: f64, pickup: f64) {
        debug_assert!(pos >= 1 && pos < self.nodes.len());
        for load in &mut self.loads[..pos] {
            *load += delivery;
        }
        for load in &mut self.loads[pos..] {
            *load += pickup;
        }
        let entry = self.loads[pos - 1] - delivery + pickup;
        self.loads.insert(pos, entry);
        self.nodes.insert(pos, node);
        self.delivery_sum += delivery;
        self.pickup_sum += pickup;
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes `(loads, delivery_sum, pickup_sum)` for a depot-to-depot sequence.
pub(crate) fn load_profile(nodes: &[usize], instance: &Instance) -> (Vec<f64>, f64, f64) {
    let delivery_sum: f64 = nodes.iter().map(|&n| instance.delivery(n)).sum();
    let pickup_sum: f64 = nodes.iter().map(|&n| instance.pickup(n)).sum();
    let mut loads = Vec::with_capacity(nodes.len());
    let mut load = delivery_sum;
    for &n in nodes {
        load += instance.pickup(n) - instance.delivery(n);
        loads.push(load);
    }
    (loads, delivery_sum, pickup_sum)
}
