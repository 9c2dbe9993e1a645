//! Tree-walking evaluation of programs against a route state.

use super::{Node, Terminal};
use crate::budget::BudgetContext;
use crate::constructive::{
    farthest_insertion, farthest_neighbor_back, farthest_neighbor_front, nearest_insertion,
    nearest_neighbor_back, nearest_neighbor_front,
};
use crate::local_search::{best_move, worst_move};
use crate::models::{InvariantViolation, RouteState};
use crate::solver::{exact_solver_step, ExactSolver};

/// Cost and route node lists, compared before and after a loop body.
#[derive(Debug, PartialEq)]
struct Snapshot {
    cost: f64,
    routes: Vec<Vec<usize>>,
}

impl Snapshot {
    fn of(state: &RouteState) -> Self {
        Self {
            cost: state.total_cost(),
            routes: state.routes().iter().map(|r| r.nodes().to_vec()).collect(),
        }
    }
}

/// Evaluates programs against one [`RouteState`].
///
/// The interpreter owns the state for the duration of an evaluation and
/// carries the shared "last result" register that control nodes read:
///
/// | Node | Semantics |
/// |---|---|
/// | `If_Then c t` | run `c`; if it succeeded run `t` and succeed, else fail |
/// | `If_Then_Else c t e` | run `c`, then `t` or `e`; always succeeds |
/// | `Or a b` | run `a`; if it failed run `b`; result is `b`'s or `a`'s |
/// | `While c b` | run `c`; while it succeeds and `b` changes the state, run `b` then `c` |
/// | `Repeat b` | run `b` while it succeeds and changes the state |
///
/// Loops run at most [`RouteState::node_count`] iterations and succeed iff
/// at least one iteration changed the state. A loop stops as soon as the
/// cost and every route are the same after a body run as they were before
/// the previous condition run (for `Repeat`, the previous body run), so
/// operators that report success without mutating cannot spin.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pdp_gp::budget::BudgetContext;
/// use pdp_gp::models::{Instance, RouteState};
/// use pdp_gp::program::{Interpreter, Node};
/// use pdp_gp::solver::ExhaustiveSolver;
///
/// let state = RouteState::new(Arc::new(Instance::random("r", 6, 5)));
/// let mut budget = BudgetContext::disabled("r");
/// let solver = ExhaustiveSolver::default();
/// let program: Node = "(Repeat NearestInsertion)".parse().expect("valid");
///
/// let mut interpreter = Interpreter::new(state, &mut budget, &solver);
/// interpreter.run(&program).expect("consistent state");
/// assert!(interpreter.last_result());
/// assert!(interpreter.state().is_complete());
/// ```
pub struct Interpreter<'a, S: ExactSolver + ?Sized> {
    state: RouteState,
    budget: &'a mut BudgetContext,
    solver: &'a S,
    last_result: bool,
}

impl<'a, S: ExactSolver + ?Sized> Interpreter<'a, S> {
    /// Creates an interpreter over `state`, charging solver calls to `budget`.
    pub fn new(state: RouteState, budget: &'a mut BudgetContext, solver: &'a S) -> Self {
        Self {
            state,
            budget,
            solver,
            last_result: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> &RouteState {
        &self.state
    }

    /// Consumes the interpreter, returning the state.
    pub fn into_state(self) -> RouteState {
        self.state
    }

    /// Result left by the most recently evaluated node.
    pub fn last_result(&self) -> bool {
        self.last_result
    }

    /// Evaluates `program` against the state.
    ///
    /// # Errors
    ///
    /// Propagates an [`InvariantViolation`] from the exact-solver step; the
    /// evaluation should be abandoned.
    pub fn run(&mut self, program: &Node) -> Result<(), InvariantViolation> {
        self.eval(program)
    }

    fn eval(&mut self, node: &Node) -> Result<(), InvariantViolation> {
        match node {
            Node::Terminal(t) => {
                self.last_result = self.apply(*t)?;
            }
            Node::IfThen(condition, then) => {
                self.eval(condition)?;
                if self.last_result {
                    self.eval(then)?;
                    self.last_result = true;
                }
            }
            Node::IfThenElse(condition, then, otherwise) => {
                self.eval(condition)?;
                if self.last_result {
                    self.eval(then)?;
                } else {
                    self.eval(otherwise)?;
                }
                self.last_result = true;
            }
            Node::Or(first, second) => {
                self.eval(first)?;
                let x = self.last_result;
                if !x {
                    self.eval(second)?;
                    self.last_result = self.last_result || x;
                }
            }
            Node::While(condition, body) => {
                self.eval(condition)?;
                let x = self.last_result;
                self.last_result = self.converge(x, body, Some(&**condition))?;
            }
            Node::Repeat(body) => {
                self.eval(body)?;
                let x = self.last_result;
                self.last_result = self.converge(x, body, None)?;
            }
        }
        Ok(())
    }

    /// Shared loop of `While` and `Repeat`. Without a separate condition the
    /// body's own result decides whether to continue.
    fn converge(
        &mut self,
        mut x: bool,
        body: &Node,
        condition: Option<&Node>,
    ) -> Result<bool, InvariantViolation> {
        let limit = self.state.node_count();
        let mut iterations = 0;
        let mut snapshot = Snapshot::of(&self.state);
        while x && iterations < limit {
            self.eval(body)?;
            let current = Snapshot::of(&self.state);
            if current == snapshot {
                break;
            }
            // taken before the condition so its changes count as progress
            snapshot = current;
            if let Some(c) = condition {
                self.eval(c)?;
            }
            x = self.last_result;
            iterations += 1;
        }
        Ok(iterations > 0)
    }

    fn apply(&mut self, terminal: Terminal) -> Result<bool, InvariantViolation> {
        let state = &mut self.state;
        Ok(match terminal {
            Terminal::NearestNeighborFront => nearest_neighbor_front(state),
            Terminal::NearestNeighborBack => nearest_neighbor_back(state),
            Terminal::FarthestNeighborFront => farthest_neighbor_front(state),
            Terminal::FarthestNeighborBack => farthest_neighbor_back(state),
            Terminal::NearestInsertion => nearest_insertion(state),
            Terminal::FarthestInsertion => farthest_insertion(state),
            Terminal::BestMove => best_move(state),
            Terminal::WorstMove => worst_move(state),
            Terminal::ExactSolver => exact_solver_step(state, &mut *self.budget, self.solver)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Arc;
    use std::time::Duration;

    use proptest::prelude::*;

    use super::*;
    use crate::distance::CostMatrix;
    use crate::models::Instance;
    use crate::solver::{Assignment, ExhaustiveSolver, SolveOutcome, SolveStatus};

    fn worked_example() -> Arc<Instance> {
        let costs = CostMatrix::from_rows(&[
            vec![0.0, 2.0, 9.0, 10.0, 7.0],
            vec![2.0, 0.0, 6.0, 4.0, 3.0],
            vec![9.0, 6.0, 0.0, 8.0, 5.0],
            vec![10.0, 4.0, 8.0, 0.0, 6.0],
            vec![7.0, 3.0, 5.0, 6.0, 0.0],
        ])
        .expect("valid");
        Arc::new(Instance::new("w4", costs, vec![5.0; 4], vec![0.0; 4], 15.0).expect("valid"))
    }

    fn run(program: &str, state: RouteState) -> (RouteState, bool) {
        let mut budget = BudgetContext::disabled("w4");
        let solver = ExhaustiveSolver::default();
        let program: Node = program.parse().expect("valid");
        let mut interpreter = Interpreter::new(state, &mut budget, &solver);
        interpreter.run(&program).expect("consistent");
        let result = interpreter.last_result();
        (interpreter.into_state(), result)
    }

    /// Reports success every call without touching anything.
    struct AlwaysSucceeds {
        calls: Cell<usize>,
    }

    impl ExactSolver for AlwaysSucceeds {
        fn solve(&self, _: &Instance, warm_start: &Assignment, _: Duration) -> SolveOutcome {
            self.calls.set(self.calls.get() + 1);
            SolveOutcome {
                status: SolveStatus::Feasible,
                objective: 0.0,
                assignment: Some(warm_start.clone()),
                elapsed: Duration::ZERO,
            }
        }
    }

    #[test]
    fn test_terminal_sets_result() {
        let (state, result) = run("NearestInsertion", RouteState::new(worked_example()));
        assert!(result);
        assert_eq!(state.visited().len(), 1);

        let (_, result) = run("BestMove", RouteState::new(worked_example()));
        assert!(!result);
    }

    #[test]
    fn test_if_then_skips_branch_on_failure() {
        let (state, result) = run("(If_Then BestMove NearestInsertion)", RouteState::new(worked_example()));
        assert!(!result);
        assert!(state.visited().is_empty());

        let (state, result) =
            run("(If_Then NearestInsertion NearestInsertion)", RouteState::new(worked_example()));
        assert!(result);
        assert_eq!(state.visited().len(), 2);
    }

    #[test]
    fn test_if_then_else_always_succeeds() {
        let (state, result) = run(
            "(If_Then_Else BestMove WorstMove BestMove)",
            RouteState::new(worked_example()),
        );
        assert!(result);
        assert!(state.visited().is_empty());
    }

    #[test]
    fn test_or_short_circuits() {
        let (state, result) = run("(Or NearestInsertion NearestInsertion)", RouteState::new(worked_example()));
        assert!(result);
        assert_eq!(state.visited().len(), 1);

        let (state, result) = run("(Or BestMove NearestInsertion)", RouteState::new(worked_example()));
        assert!(result);
        assert_eq!(state.visited().len(), 1);

        let (_, result) = run("(Or BestMove WorstMove)", RouteState::new(worked_example()));
        assert!(!result);
    }

    #[test]
    fn test_repeat_completes_construction() {
        let (state, result) = run("(Repeat NearestNeighborBack)", RouteState::new(worked_example()));
        assert!(result);
        assert!(state.is_complete());
        assert_eq!(state.total_cost(), 39.0);
    }

    #[test]
    fn test_repeat_of_failing_body_fails() {
        let (state, result) = run("(Repeat BestMove)", RouteState::new(worked_example()));
        assert!(!result);
        assert_eq!(state, RouteState::new(worked_example()));
    }

    #[test]
    fn test_while_runs_body_on_condition() {
        // condition and body both insert until nothing is left
        let (state, result) = run(
            "(While NearestInsertion FarthestNeighborFront)",
            RouteState::new(worked_example()),
        );
        assert!(state.validate().is_ok());
        assert!(state.is_complete());
        assert!(result);
    }

    #[test]
    fn test_while_with_failing_condition() {
        let (state, result) = run("(While BestMove NearestInsertion)", RouteState::new(worked_example()));
        assert!(!result);
        assert!(state.visited().is_empty());
    }

    #[test]
    fn test_while_counts_condition_changes_as_progress() {
        // depot and customers 1..=5 on a line, room for everyone in one route
        let mut costs = CostMatrix::new(6);
        for i in 0..6 {
            for j in 0..6 {
                costs.set(i, j, (i as f64 - j as f64).abs());
            }
        }
        let line = Arc::new(
            Instance::new("line", costs, vec![1.0; 5], vec![0.0; 5], 100.0).expect("valid"),
        );
        let state = RouteState::from_routes(line, &[vec![1], vec![2]]).expect("valid");

        // BestMove merges the two routes once and then has nothing left to do,
        // while every NearestInsertion still serves one more customer
        let (state, result) = run("(While NearestInsertion BestMove)", state);
        assert!(result);
        assert!(state.is_complete());
        assert_eq!(state.routes().len(), 1);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_no_progress_stops_loop() {
        let mut state = RouteState::new(worked_example());
        while nearest_neighbor_back(&mut state) {}
        let mut budget = BudgetContext::new("w4", 100.0);
        let solver = AlwaysSucceeds { calls: Cell::new(0) };
        let program = Node::repeat(Terminal::ExactSolver.into());

        let mut interpreter = Interpreter::new(state.clone(), &mut budget, &solver);
        interpreter.run(&program).expect("consistent");
        // the warm start comes back with a bogus objective and is installed
        // every time; nothing changes, so the loop stops after one body run
        assert!(!interpreter.last_result());
        assert_eq!(solver.calls.get(), 2);
        assert_eq!(interpreter.state().routes(), state.routes());
    }

    #[test]
    fn test_solver_terminal_inside_program() {
        let mut budget = BudgetContext::new("w4", 10.0);
        let solver = ExhaustiveSolver::default();
        let program: Node = "(If_Then_Else ExactSolver BestMove NearestInsertion)"
            .parse()
            .expect("valid");
        let mut interpreter = Interpreter::new(RouteState::new(worked_example()), &mut budget, &solver);
        interpreter.run(&program).expect("consistent");
        let state = interpreter.into_state();
        assert!(state.is_optimal());
        assert_eq!(state.total_cost(), 34.0);
        assert_eq!(budget.call_count(), 1);
    }

    fn terminal() -> impl Strategy<Value = Node> {
        prop::sample::select(Terminal::ALL.to_vec())
            .prop_filter("no solver", |t| *t != Terminal::ExactSolver)
            .prop_map(Node::Terminal)
    }

    fn program() -> impl Strategy<Value = Node> {
        terminal().prop_recursive(4, 24, 3, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Node::if_then(a, b)),
                (inner.clone(), inner.clone(), inner.clone())
                    .prop_map(|(a, b, c)| Node::if_then_else(a, b, c)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Node::or(a, b)),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| Node::while_loop(a, b)),
                inner.prop_map(Node::repeat),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_programs_preserve_invariants(program in program(), seed in 0u64..500) {
            let instance = Arc::new(Instance::random("p", 6, seed));
            let (state, _) = run(&program.to_string(), RouteState::new(instance));
            prop_assert!(state.validate().is_ok());
            let served: usize = state.routes().iter().map(|r| r.len()).sum();
            prop_assert_eq!(served + state.unvisited().len(), 6);
        }

        #[test]
        fn prop_text_form_round_trips(program in program()) {
            let parsed: Node = program.to_string().parse().expect("valid");
            prop_assert_eq!(parsed, program);
        }
    }
}
