//! Arc-assignment matrices exchanged with the exact solver.

use serde::{Deserialize, Serialize};

use crate::models::{InvariantViolation, RouteState};

/// An N×N matrix of arc usage counts, `x[i][j]` = times arc `i → j` is used.
///
/// This is the solver's view of a solution: warm starts are built from the
/// current routes and returned solutions are traced back into routes.
///
/// # Examples
///
/// ```
/// use pdp_gp::solver::Assignment;
///
/// let a = Assignment::from_routes(4, [&[0, 2, 1, 0][..], &[0, 3, 0][..]]);
/// assert_eq!(a.get(0, 2), 1);
/// assert_eq!(a.get(1, 0), 1);
/// assert_eq!(a.arc_count(), 5);
/// assert_eq!(a.to_routes().expect("valid"), vec![vec![2, 1], vec![3]]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    size: usize,
    arcs: Vec<u8>,
}

impl Assignment {
    /// Creates an all-zero assignment.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            arcs: vec![0; size * size],
        }
    }

    /// Counts the arcs of depot-to-depot node lists. Depot-only routes are
    /// skipped.
    pub fn from_routes<'a>(size: usize, routes: impl IntoIterator<Item = &'a [usize]>) -> Self {
        let mut assignment = Self::new(size);
        for nodes in routes {
            if nodes.len() <= 2 {
                continue;
            }
            for w in nodes.windows(2) {
                let cell = &mut assignment.arcs[w[0] * size + w[1]];
                *cell = cell.saturating_add(1);
            }
        }
        assignment
    }

    /// Warm start for the current routes of `state`.
    pub fn from_state(state: &RouteState) -> Self {
        Self::from_routes(state.node_count(), state.routes().iter().map(|r| r.nodes()))
    }

    /// Usage count of arc `from → to`.
    pub fn get(&self, from: usize, to: usize) -> u8 {
        self.arcs[from * self.size + to]
    }

    /// Sets the usage count of arc `from → to`.
    pub fn set(&mut self, from: usize, to: usize, value: u8) {
        self.arcs[from * self.size + to] = value;
    }

    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of arcs used.
    pub fn arc_count(&self) -> usize {
        self.arcs.iter().map(|&c| usize::from(c)).sum()
    }

    /// Traces every route leaving the depot back to it, in order of the
    /// first customer's id. Returns customer sequences without depots.
    ///
    /// Fails if a customer on a traced path has no single successor or is
    /// reached twice. Customers on cycles detached from the depot are not
    /// returned.
    pub fn to_routes(&self) -> Result<Vec<Vec<usize>>, InvariantViolation> {
        let n = self.size;
        let mut seen = vec![false; n];
        let mut routes = Vec::new();

        for first in 1..n {
            for _ in 0..self.get(0, first) {
                let mut route = Vec::new();
                let mut current = first;
                loop {
                    if seen[current] {
                        return Err(InvariantViolation::MalformedAssignment { node: current });
                    }
                    seen[current] = true;
                    route.push(current);
                    let mut successors = (0..n).filter(|&k| self.get(current, k) > 0);
                    let (Some(next), None) = (successors.next(), successors.next()) else {
                        return Err(InvariantViolation::MalformedAssignment { node: current });
                    };
                    if self.get(current, next) != 1 {
                        return Err(InvariantViolation::MalformedAssignment { node: current });
                    }
                    if next == 0 {
                        break;
                    }
                    current = next;
                }
                routes.push(route);
            }
        }
        Ok(routes)
    }
}
