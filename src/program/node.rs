//! Program trees and their s-expression text form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Leaf operators of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terminal {
    /// Cheapest splice after the depot of some route.
    NearestNeighborFront,
    /// Cheapest splice before the closing depot of some route.
    NearestNeighborBack,
    /// Costliest splice after the depot of some route.
    FarthestNeighborFront,
    /// Costliest splice before the closing depot of some route.
    FarthestNeighborBack,
    /// Cheapest insertion at any position.
    NearestInsertion,
    /// Costliest insertion at any position.
    FarthestInsertion,
    /// Best improving single-customer relocation.
    BestMove,
    /// Worst cost-raising single-customer relocation.
    WorstMove,
    /// Budgeted exact-solver call.
    ExactSolver,
}

impl Terminal {
    /// Every terminal, in declaration order.
    pub const ALL: [Terminal; 9] = [
        Terminal::NearestNeighborFront,
        Terminal::NearestNeighborBack,
        Terminal::FarthestNeighborFront,
        Terminal::FarthestNeighborBack,
        Terminal::NearestInsertion,
        Terminal::FarthestInsertion,
        Terminal::BestMove,
        Terminal::WorstMove,
        Terminal::ExactSolver,
    ];

    /// Name used in the text form.
    pub fn name(self) -> &'static str {
        match self {
            Terminal::NearestNeighborFront => "NearestNeighborFront",
            Terminal::NearestNeighborBack => "NearestNeighborBack",
            Terminal::FarthestNeighborFront => "FarthestNeighborFront",
            Terminal::FarthestNeighborBack => "FarthestNeighborBack",
            Terminal::NearestInsertion => "NearestInsertion",
            Terminal::FarthestInsertion => "FarthestInsertion",
            Terminal::BestMove => "BestMove",
            Terminal::WorstMove => "WorstMove",
            Terminal::ExactSolver => "ExactSolver",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A program: control-flow nodes over [`Terminal`] leaves.
///
/// Every node leaves a boolean "last result" behind when evaluated; control
/// nodes branch and loop on it. See
/// [`Interpreter`](crate::program::Interpreter) for the semantics.
///
/// # Text form
///
/// Programs print as s-expressions and parse back:
///
/// ```
/// use pdp_gp::program::{Node, Terminal};
///
/// let program: Node = "(If_Then NearestInsertion (Repeat BestMove))".parse().expect("valid");
/// assert_eq!(
///     program,
///     Node::if_then(
///         Node::Terminal(Terminal::NearestInsertion),
///         Node::repeat(Node::Terminal(Terminal::BestMove)),
///     )
/// );
/// assert_eq!(program.to_string(), "(If_Then NearestInsertion (Repeat BestMove))");
/// assert_eq!(program.depth(), 3);
/// assert_eq!(program.size(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    /// Leaf operator.
    Terminal(Terminal),
    /// Condition, then-branch.
    IfThen(Box<Node>, Box<Node>),
    /// Condition, then-branch, else-branch.
    IfThenElse(Box<Node>, Box<Node>, Box<Node>),
    /// Short-circuit disjunction.
    Or(Box<Node>, Box<Node>),
    /// Condition, body.
    While(Box<Node>, Box<Node>),
    /// Subtree used as both condition and body.
    Repeat(Box<Node>),
}

impl Node {
    /// Builds an [`Node::IfThen`].
    pub fn if_then(condition: Node, then: Node) -> Self {
        Node::IfThen(Box::new(condition), Box::new(then))
    }

    /// Builds an [`Node::IfThenElse`].
    pub fn if_then_else(condition: Node, then: Node, otherwise: Node) -> Self {
        Node::IfThenElse(Box::new(condition), Box::new(then), Box::new(otherwise))
    }

    /// Builds an [`Node::Or`].
    pub fn or(first: Node, second: Node) -> Self {
        Node::Or(Box::new(first), Box::new(second))
    }

    /// Builds a [`Node::While`].
    pub fn while_loop(condition: Node, body: Node) -> Self {
        Node::While(Box::new(condition), Box::new(body))
    }

    /// Builds a [`Node::Repeat`].
    pub fn repeat(body: Node) -> Self {
        Node::Repeat(Box::new(body))
    }

    /// Name of this node kind in the text form.
    pub fn name(&self) -> &'static str {
        match self {
            Node::Terminal(t) => t.name(),
            Node::IfThen(..) => "If_Then",
            Node::IfThenElse(..) => "If_Then_Else",
            Node::Or(..) => "Or",
            Node::While(..) => "While",
            Node::Repeat(..) => "Repeat",
        }
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Terminal(_) => vec![],
            Node::IfThen(a, b) | Node::Or(a, b) | Node::While(a, b) => vec![&**a, &**b],
            Node::IfThenElse(a, b, c) => vec![&**a, &**b, &**c],
            Node::Repeat(a) => vec![&**a],
        }
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        1 + self.children().into_iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        1 + self.children().into_iter().map(Node::size).sum::<usize>()
    }

    /// Returns `true` if the exact solver appears anywhere in the tree.
    pub fn uses_exact_solver(&self) -> bool {
        match self {
            Node::Terminal(t) => *t == Terminal::ExactSolver,
            _ => self.children().into_iter().any(Node::uses_exact_solver),
        }
    }
}

impl From<Terminal> for Node {
    fn from(t: Terminal) -> Self {
        Node::Terminal(t)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Node::Terminal(t) = self {
            return write!(f, "{t}");
        }
        write!(f, "({}", self.name())?;
        for child in self.children() {
            write!(f, " {child}")?;
        }
        write!(f, ")")
    }
}

/// Error parsing a program from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramParseError {
    /// Input ended inside an expression (or was empty).
    UnexpectedEnd,
    /// A token appeared where it is not allowed.
    UnexpectedToken { token: String, offset: usize },
    /// Name is neither a control node nor a terminal.
    UnknownName { name: String, offset: usize },
    /// Control node with the wrong number of children.
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    /// Text left over after a complete program.
    TrailingInput { offset: usize },
}

impl fmt::Display for ProgramParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd => write!(f, "unexpected end of program text"),
            Self::UnexpectedToken { token, offset } => {
                write!(f, "unexpected token '{token}' at offset {offset}")
            }
            Self::UnknownName { name, offset } => {
                write!(f, "unknown node '{name}' at offset {offset}")
            }
            Self::Arity {
                name,
                expected,
                found,
            } => write!(f, "{name} takes {expected} children, found {found}"),
            Self::TrailingInput { offset } => {
                write!(f, "trailing input at offset {offset}")
            }
        }
    }
}

impl std::error::Error for ProgramParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Atom(&'a str),
}

fn tokenize(text: &str) -> Vec<(usize, Token<'_>)> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some(&(start, ch)) = chars.peek() {
        match ch {
            '(' => {
                tokens.push((start, Token::Open));
                chars.next();
            }
            ')' => {
                tokens.push((start, Token::Close));
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut end = text.len();
                while let Some(&(i, c)) = chars.peek() {
                    if c == '(' || c == ')' || c.is_whitespace() {
                        end = i;
                        break;
                    }
                    chars.next();
                }
                tokens.push((start, Token::Atom(&text[start..end])));
            }
        }
    }
    tokens
}

struct Parser<'a> {
    tokens: Vec<(usize, Token<'a>)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<(usize, Token<'a>)> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn peek(&self) -> Option<(usize, Token<'a>)> {
        self.tokens.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<Node, ProgramParseError> {
        match self.next() {
            None => Err(ProgramParseError::UnexpectedEnd),
            Some((offset, Token::Atom(name))) => Terminal::from_name(name)
                .map(Node::Terminal)
                .ok_or_else(|| ProgramParseError::UnknownName {
                    name: name.to_string(),
                    offset,
                }),
            Some((offset, Token::Close)) => Err(ProgramParseError::UnexpectedToken {
                token: ")".into(),
                offset,
            }),
            Some((_, Token::Open)) => self.list(),
        }
    }

    /// Parses the remainder of a parenthesized form after `(`.
    fn list(&mut self) -> Result<Node, ProgramParseError> {
        let (offset, name) = match self.next() {
            None => return Err(ProgramParseError::UnexpectedEnd),
            Some((offset, Token::Atom(name))) => (offset, name),
            Some((offset, token)) => {
                return Err(ProgramParseError::UnexpectedToken {
                    token: if token == Token::Open { "(" } else { ")" }.into(),
                    offset,
                })
            }
        };

        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => return Err(ProgramParseError::UnexpectedEnd),
                Some((_, Token::Close)) => {
                    self.pos += 1;
                    break;
                }
                Some(_) => children.push(self.expr()?),
            }
        }
        build(name, offset, children)
    }
}

fn build(name: &str, offset: usize, children: Vec<Node>) -> Result<Node, ProgramParseError> {
    match name {
        "If_Then" => {
            let [c, t] = take::<2>(name, children)?;
            Ok(Node::if_then(c, t))
        }
        "If_Then_Else" => {
            let [c, t, e] = take::<3>(name, children)?;
            Ok(Node::if_then_else(c, t, e))
        }
        "Or" => {
            let [a, b] = take::<2>(name, children)?;
            Ok(Node::or(a, b))
        }
        "While" => {
            let [c, b] = take::<2>(name, children)?;
            Ok(Node::while_loop(c, b))
        }
        "Repeat" => {
            let [b] = take::<1>(name, children)?;
            Ok(Node::repeat(b))
        }
        _ => match Terminal::from_name(name) {
            Some(t) => {
                let [] = take::<0>(name, children)?;
                Ok(Node::Terminal(t))
            }
            None => Err(ProgramParseError::UnknownName {
                name: name.to_string(),
                offset,
            }),
        },
    }
}

/// Moves exactly `N` children out of `children`.
fn take<const N: usize>(name: &str, children: Vec<Node>) -> Result<[Node; N], ProgramParseError> {
    let found = children.len();
    children.try_into().map_err(|_| ProgramParseError::Arity {
        name: name.to_string(),
        expected: N,
        found,
    })
}

impl FromStr for Node {
    type Err = ProgramParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser {
            tokens: tokenize(s),
            pos: 0,
        };
        let node = parser.expr()?;
        if let Some((offset, _)) = parser.peek() {
            return Err(ProgramParseError::TrailingInput { offset });
        }
        Ok(node)
    }
}
