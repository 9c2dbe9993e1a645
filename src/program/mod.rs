//! Heuristic programs and their interpreter.
//!
//! A program is a small tree of control-flow nodes whose leaves are the
//! routing operators of this crate. [`Node`] is the tree (with an
//! s-expression text form), [`Interpreter`] walks it against a
//! [`RouteState`](crate::models::RouteState).

mod interpreter;
mod node;

pub use interpreter::Interpreter;
pub use node::{Node, ProgramParseError, Terminal};
