//! # pdp-gp
//!
//! Pickup-and-delivery routing substrate for evolved heuristic programs:
//! capacity-checked construction and relocation operators over a shared route
//! state, a small control-flow language that sequences them, and an
//! exact-solver step whose time is drawn from per-instance baseline budgets.
//!
//! ## Modules
//!
//! - [`models`] — Instance data, routes with load profiles, the mutable route state
//! - [`distance`] — Cost matrix
//! - [`evaluation`] — Whole-solution feasibility and cost evaluation
//! - [`constructive`] — Nearest/farthest insertion operators
//! - [`local_search`] — Best/worst single-customer relocation
//! - [`solver`] — Exact-solver interface, warm starts, reference solver, budgeted step
//! - [`budget`] — Baseline tables and per-evaluation time budgets
//! - [`program`] — Program trees, text form and interpreter
//! - [`runner`] — Evaluation entry points, optionally parallel
//!
//! The library logs through [`tracing`] and never installs a subscriber.

pub mod budget;
pub mod constructive;
pub mod distance;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod program;
pub mod runner;
pub mod solver;
