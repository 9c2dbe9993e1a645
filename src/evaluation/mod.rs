//! Candidate solution evaluation.
//!
//! Recomputes cost and capacity feasibility of whole route sets, used by
//! the relocation search where moves touch more than one route.

mod evaluator;

pub use evaluator::RouteEvaluator;
