//! Instance validation errors.

/// Which per-customer demand vector an [`InstanceError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemandKind {
    /// Quantities loaded at the depot and dropped at the customer.
    Delivery,
    /// Quantities collected at the customer and carried back to the depot.
    Pickup,
}

impl std::fmt::Display for DemandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemandKind::Delivery => write!(f, "delivery"),
            DemandKind::Pickup => write!(f, "pickup"),
        }
    }
}

/// A reason an instance descriptor cannot be turned into an [`Instance`](super::Instance).
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceError {
    /// The instance has no depot.
    Empty { name: String },
    /// `node_count` disagrees with the cost matrix dimension.
    NodeCountMismatch {
        name: String,
        declared: usize,
        matrix: usize,
    },
    /// The cost matrix is ragged, negative, non-finite, or has a non-zero diagonal.
    InvalidCostMatrix { name: String },
    /// A demand vector does not have one entry per customer.
    DemandLength {
        name: String,
        kind: DemandKind,
        expected: usize,
        found: usize,
    },
    /// A demand entry is negative or non-finite.
    InvalidDemand {
        name: String,
        kind: DemandKind,
        customer: usize,
        value: f64,
    },
    /// Vehicle capacity is not a positive finite number.
    InvalidCapacity { name: String, capacity: f64 },
}

impl std::fmt::Display for InstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceError::Empty { name } => write!(f, "Instance {name} has no nodes"),
            InstanceError::NodeCountMismatch {
                name,
                declared,
                matrix,
            } => write!(
                f,
                "Instance {name} declares {declared} nodes but its cost matrix is {matrix}x{matrix}"
            ),
            InstanceError::InvalidCostMatrix { name } => write!(
                f,
                "Instance {name} has a cost matrix that is not square, non-negative and zero on the diagonal"
            ),
            InstanceError::DemandLength {
                name,
                kind,
                expected,
                found,
            } => write!(
                f,
                "Instance {name} has {found} {kind} demands, expected one per customer ({expected})"
            ),
            InstanceError::InvalidDemand {
                name,
                kind,
                customer,
                value,
            } => write!(
                f,
                "Instance {name} has invalid {kind} demand {value} at customer {customer}"
            ),
            InstanceError::InvalidCapacity { name, capacity } => {
                write!(f, "Instance {name} has invalid vehicle capacity {capacity}")
            }
        }
    }
}

impl std::error::Error for InstanceError {}
