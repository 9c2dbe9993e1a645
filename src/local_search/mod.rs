//! Local search operators over complete or partial route sets.
//!
//! - [`best_move`] / [`worst_move`] — strictly best or worst single-customer
//!   relocation, new routes included

mod relocate;

pub use relocate::{best_move, relocate, worst_move, MoveDirection};
