//! Shared candidate scan for the insertion operators.

use std::ops::Range;

use tracing::trace;

use super::Criterion;
use crate::models::{Route, RouteSlot, RouteState};

/// Which positions of a route an operator may splice into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Right after the starting depot.
    Front,
    /// Right before the returning depot.
    Back,
    /// Any interior slot.
    Anywhere,
}

impl Placement {
    fn positions(self, route: &Route) -> Range<usize> {
        let last = route.nodes().len() - 1;
        match self {
            Placement::Front => 1..2,
            Placement::Back => last..last + 1,
            Placement::Anywhere => 1..last + 1,
        }
    }
}

/// A feasible insertion found by the scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub node: usize,
    pub slot: RouteSlot,
    pub pos: usize,
    pub cost: f64,
}

/// Finds the insertion preferred by `criterion`.
///
/// Scans unvisited nodes in order, then routes in order, then positions, and
/// finally a new route for each node. A later candidate replaces the
/// incumbent only if strictly preferred, so the first one found wins ties.
pub(crate) fn select(
    state: &RouteState,
    placement: Placement,
    criterion: Criterion,
) -> Option<Candidate> {
    let mut incumbent = criterion.initial();
    let mut best = None;

    let mut consider = |slot: RouteSlot, pos: usize, node: usize| {
        let cost = state.insertion_cost(slot, pos, node);
        if criterion.prefers(cost, incumbent) && state.can_insert(slot, pos, node) {
            incumbent = cost;
            best = Some(Candidate {
                node,
                slot,
                pos,
                cost,
            });
        }
    };

    for &node in state.unvisited() {
        for (r, route) in state.routes().iter().enumerate() {
            for pos in placement.positions(route) {
                consider(RouteSlot::Existing(r), pos, node);
            }
        }
        consider(RouteSlot::New, 1, node);
    }
    best
}

/// Runs one insertion step; returns `true` if a node was inserted.
pub(crate) fn insert_one(state: &mut RouteState, placement: Placement, criterion: Criterion) -> bool {
    if state.is_optimal() || state.is_complete() {
        return false;
    }
    let Some(c) = select(state, placement, criterion) else {
        return false;
    };
    trace!(
        node = c.node,
        slot = ?c.slot,
        pos = c.pos,
        cost = c.cost,
        ?placement,
        ?criterion,
        "insert"
    );
    state.insert(c.slot, c.pos, c.node, c.cost);
    true
}
