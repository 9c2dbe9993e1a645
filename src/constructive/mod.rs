//! Construction operators that insert one unvisited customer per call.
//!
//! - [`nearest_neighbor_front`], [`nearest_neighbor_back`],
//!   [`farthest_neighbor_front`], [`farthest_neighbor_back`] — splice at a
//!   route end
//! - [`nearest_insertion`], [`farthest_insertion`] — splice at any slot
//!
//! Every operator returns `true` only if it committed an insertion. A `false`
//! return leaves the [`RouteState`](crate::models::RouteState) unchanged.

mod insertion;
mod neighbor;
mod scan;

use serde::{Deserialize, Serialize};

pub use insertion::{farthest_insertion, nearest_insertion};
pub use neighbor::{
    farthest_neighbor_back, farthest_neighbor_front, insert_at_end, nearest_neighbor_back,
    nearest_neighbor_front, RouteEnd,
};

/// Selection rule over candidate marginal costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    /// Strictly smallest marginal cost.
    Nearest,
    /// Strictly largest marginal cost, above zero.
    Farthest,
}

impl Criterion {
    pub(crate) fn initial(self) -> f64 {
        match self {
            Criterion::Nearest => f64::INFINITY,
            Criterion::Farthest => 0.0,
        }
    }

    /// Returns `true` if `cost` strictly beats `incumbent`.
    pub(crate) fn prefers(self, cost: f64, incumbent: f64) -> bool {
        match self {
            Criterion::Nearest => cost < incumbent,
            Criterion::Farthest => cost > incumbent,
        }
    }
}
