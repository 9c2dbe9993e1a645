//! Pickup-and-delivery problem instances.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::err::{DemandKind, InstanceError};
use crate::distance::CostMatrix;

/// A published objective value for an instance, used to score evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceValue {
    /// Proven optimum.
    Optimal(f64),
    /// Best known feasible value.
    Feasible(f64),
}

impl ReferenceValue {
    /// The objective value regardless of its certification.
    pub fn value(&self) -> f64 {
        match self {
            ReferenceValue::Optimal(v) | ReferenceValue::Feasible(v) => *v,
        }
    }

    /// Returns `true` if the value is a proven optimum.
    pub fn is_optimal(&self) -> bool {
        matches!(self, ReferenceValue::Optimal(_))
    }
}

/// Plain, serializable instance description as produced by an instance reader.
///
/// Demand vectors hold one entry per customer (node ids `1..node_count`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    pub name: String,
    pub node_count: usize,
    pub cost_matrix: Vec<Vec<f64>>,
    pub delivery_demand: Vec<f64>,
    pub pickup_demand: Vec<f64>,
    pub vehicle_capacity: f64,
    #[serde(default)]
    pub reference: Option<ReferenceValue>,
}

/// A validated pickup-and-delivery instance.
///
/// Node 0 is the depot; customers are `1..node_count`. Demand lookups are
/// indexed by node id and return `0.0` for the depot.
///
/// # Examples
///
/// ```
/// use pdp_gp::distance::CostMatrix;
/// use pdp_gp::models::Instance;
///
/// let costs = CostMatrix::from_rows(&[
///     vec![0.0, 4.0, 5.0],
///     vec![4.0, 0.0, 3.0],
///     vec![5.0, 3.0, 0.0],
/// ])
/// .expect("valid");
/// let instance = Instance::new("tiny", costs, vec![3.0, 4.0], vec![1.0, 0.0], 10.0)
///     .expect("valid");
/// assert_eq!(instance.node_count(), 3);
/// assert_eq!(instance.delivery(2), 4.0);
/// assert_eq!(instance.pickup(0), 0.0);
/// assert_eq!(instance.unvisited_penalty(), 20.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    name: String,
    costs: CostMatrix,
    delivery: Vec<f64>,
    pickup: Vec<f64>,
    capacity: f64,
    reference: Option<ReferenceValue>,
}

impl Instance {
    /// Builds an instance from a cost matrix and per-customer demands.
    pub fn new(
        name: impl Into<String>,
        costs: CostMatrix,
        delivery: Vec<f64>,
        pickup: Vec<f64>,
        capacity: f64,
    ) -> Result<Self, InstanceError> {
        let name = name.into();
        let n = costs.size();
        if n == 0 {
            return Err(InstanceError::Empty { name });
        }
        let delivery = with_depot(&name, DemandKind::Delivery, delivery, n)?;
        let pickup = with_depot(&name, DemandKind::Pickup, pickup, n)?;
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(InstanceError::InvalidCapacity { name, capacity });
        }
        Ok(Self {
            name,
            costs,
            delivery,
            pickup,
            capacity,
            reference: None,
        })
    }

    /// Attaches a known optimal or feasible objective value.
    pub fn with_reference(mut self, reference: ReferenceValue) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Validates a descriptor and builds the instance from it.
    pub fn from_descriptor(descriptor: InstanceDescriptor) -> Result<Self, InstanceError> {
        let InstanceDescriptor {
            name,
            node_count,
            cost_matrix,
            delivery_demand,
            pickup_demand,
            vehicle_capacity,
            reference,
        } = descriptor;
        if cost_matrix.len() != node_count {
            return Err(InstanceError::NodeCountMismatch {
                name,
                declared: node_count,
                matrix: cost_matrix.len(),
            });
        }
        let Some(costs) = CostMatrix::from_rows(&cost_matrix) else {
            return Err(InstanceError::InvalidCostMatrix { name });
        };
        let mut instance = Self::new(name, costs, delivery_demand, pickup_demand, vehicle_capacity)?;
        instance.reference = reference;
        Ok(instance)
    }

    /// Converts back into the plain descriptor form.
    pub fn to_descriptor(&self) -> InstanceDescriptor {
        let n = self.node_count();
        InstanceDescriptor {
            name: self.name.clone(),
            node_count: n,
            cost_matrix: (0..n)
                .map(|i| (0..n).map(|j| self.costs.get(i, j)).collect())
                .collect(),
            delivery_demand: self.delivery[1..].to_vec(),
            pickup_demand: self.pickup[1..].to_vec(),
            vehicle_capacity: self.capacity,
            reference: self.reference,
        }
    }

    /// Generates a reproducible random instance with `customers` customers.
    ///
    /// Off-diagonal costs are integers in `1..=20`, deliveries and pickups
    /// integers in `0..20`, and the capacity an integer in `20..50`, so every
    /// customer fits a vehicle on its own.
    pub fn random(name: impl Into<String>, customers: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = customers + 1;
        let mut costs = CostMatrix::new(n);
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    costs.set(i, j, f64::from(rng.random_range(1..=20u32)));
                }
            }
        }
        let mut delivery = vec![0.0; n];
        let mut pickup = vec![0.0; n];
        for c in 1..n {
            delivery[c] = f64::from(rng.random_range(0..20u32));
            pickup[c] = f64::from(rng.random_range(0..20u32));
        }
        Self {
            name: name.into(),
            costs,
            delivery,
            pickup,
            capacity: f64::from(rng.random_range(20..50u32)),
            reference: None,
        }
    }

    /// Instance name, used as the baseline-table key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The travel-cost matrix.
    pub fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    /// Number of nodes, depot included.
    pub fn node_count(&self) -> usize {
        self.costs.size()
    }

    /// Number of customers.
    pub fn customer_count(&self) -> usize {
        self.node_count() - 1
    }

    /// Customer node ids in ascending order.
    pub fn customers(&self) -> Range<usize> {
        1..self.node_count()
    }

    /// Delivery demand of `node` (`0.0` for the depot).
    #[inline]
    pub fn delivery(&self, node: usize) -> f64 {
        self.delivery[node]
    }

    /// Pickup demand of `node` (`0.0` for the depot).
    #[inline]
    pub fn pickup(&self, node: usize) -> f64 {
        self.pickup[node]
    }

    /// Shared vehicle capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Known optimal or feasible objective, if any.
    pub fn reference(&self) -> Option<ReferenceValue> {
        self.reference
    }

    /// Cost charged per customer left unvisited: four times the largest arc.
    pub fn unvisited_penalty(&self) -> f64 {
        4.0 * self.costs.max_entry()
    }
}

impl TryFrom<InstanceDescriptor> for Instance {
    type Error = InstanceError;

    fn try_from(descriptor: InstanceDescriptor) -> Result<Self, Self::Error> {
        Self::from_descriptor(descriptor)
    }
}

/// Checks a per-customer demand vector and prepends the depot's zero entry.
fn with_depot(
    name: &str,
    kind: DemandKind,
    demands: Vec<f64>,
    node_count: usize,
) -> Result<Vec<f64>, InstanceError> {
    if demands.len() != node_count - 1 {
        return Err(InstanceError::DemandLength {
            name: name.to_string(),
            kind,
            expected: node_count - 1,
            found: demands.len(),
        });
    }
    if let Some((i, &value)) = demands
        .iter()
        .enumerate()
        .find(|(_, d)| !d.is_finite() || **d < 0.0)
    {
        return Err(InstanceError::InvalidDemand {
            name: name.to_string(),
            kind,
            customer: i + 1,
            value,
        });
    }
    let mut indexed = Vec::with_capacity(node_count);
    indexed.push(0.0);
    indexed.extend(demands);
    Ok(indexed)
}
