//! Travel-cost matrices.
//!
//! Provides the dense, possibly asymmetric cost matrix shared by every
//! operator and the exact solver.

mod matrix;

pub use matrix::CostMatrix;
