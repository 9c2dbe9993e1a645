//! Domain model types for the pickup-and-delivery problem.
//!
//! Provides the validated instance data, depot-to-depot routes with their
//! load profiles, and the mutable route state that evolved programs
//! operate on.

mod err;
mod instance;
mod route;
mod state;
mod violation;

pub use err::{DemandKind, InstanceError};
pub use instance::{Instance, InstanceDescriptor, ReferenceValue};
pub use route::Route;
pub(crate) use state::arc_cost_sum;
pub use state::{round_cost, RouteSlot, RouteState};
pub use violation::InvariantViolation;
