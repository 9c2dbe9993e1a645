//! Route-state invariant violations.

/// An inconsistency found when validating a [`RouteState`](super::RouteState)
/// or importing a solver assignment.
///
/// These never arise from correct operator code; finding one aborts the
/// evaluation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    /// Route does not start and end at the depot, is too short, or revisits
    /// the depot in its interior.
    MalformedRoute {
        /// Route index in the state.
        route_index: usize,
    },
    /// Route references a node id outside the instance.
    UnknownNode {
        /// Route index in the state.
        route_index: usize,
        /// Offending node id.
        node: usize,
    },
    /// A customer appears more than once across all routes.
    DuplicateCustomer {
        /// Customer id.
        customer: usize,
    },
    /// A customer is routed but unvisited, visited but not routed, or in
    /// neither set.
    PartitionBroken {
        /// Customer id.
        customer: usize,
    },
    /// On-board load exceeds vehicle capacity.
    CapacityExceeded {
        /// Route index in the state.
        route_index: usize,
        /// Position within the route.
        position: usize,
        /// Load at that position.
        load: f64,
        /// Vehicle capacity.
        capacity: f64,
    },
    /// Stored load profile or demand sums disagree with a recomputation.
    LoadProfileMismatch {
        /// Route index in the state.
        route_index: usize,
    },
    /// Running total cost disagrees with the sum of arc costs.
    CostMismatch {
        /// Recomputed cost.
        expected: f64,
        /// Stored cost.
        found: f64,
    },
    /// A solver assignment matrix does not decompose into depot-to-depot routes.
    MalformedAssignment {
        /// Node at which tracing the assignment failed.
        node: usize,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantViolation::MalformedRoute { route_index } => {
                write!(f, "Route {route_index} is not a depot-to-depot sequence")
            }
            InvariantViolation::UnknownNode { route_index, node } => {
                write!(f, "Route {route_index} visits unknown node {node}")
            }
            InvariantViolation::DuplicateCustomer { customer } => {
                write!(f, "Customer {customer} is routed more than once")
            }
            InvariantViolation::PartitionBroken { customer } => write!(
                f,
                "Customer {customer} is inconsistent between routes and visited/unvisited sets"
            ),
            InvariantViolation::CapacityExceeded {
                route_index,
                position,
                load,
                capacity,
            } => write!(
                f,
                "Route {route_index} carries {load} at position {position}, above capacity {capacity}"
            ),
            InvariantViolation::LoadProfileMismatch { route_index } => {
                write!(f, "Route {route_index} has a stale load profile")
            }
            InvariantViolation::CostMismatch { expected, found } => {
                write!(f, "Total cost is {found}, arcs sum to {expected}")
            }
            InvariantViolation::MalformedAssignment { node } => {
                write!(f, "Assignment matrix cannot be traced at node {node}")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}
