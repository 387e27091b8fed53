use std::slice;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::alphabet::ByteSet;
use crate::error::Error;

/// The identifier of an AST node.
///
/// IDs are unique and monotonically increasing in construction order. They
/// are not necessarily contiguous for any particular pattern: everything
/// that consumes them either keys a map on the ID or compacts the IDs it
/// cares about into a dense index of its own.
pub type NodeID = usize;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> NodeID {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A single node of a pattern AST.
///
/// An `Ast` is immutable once built. It is produced by the factory
/// constructors on this type ([`Ast::class`], [`Ast::concat`],
/// [`Ast::star`], ...), which are the surface a parser front end would
/// target. Every node carries a stable [`NodeID`] assigned at construction;
/// the IDs key the memoisation tables and the static analysis side table.
#[derive(Debug)]
pub struct Ast {
    id: NodeID,
    kind: AstKind,
}

/// The kind of an AST node, including its children.
///
/// Arity is structural: a repetition has exactly one child, a concatenation
/// any number, a backreference none. This makes the "children arity matches
/// kind" invariant impossible to violate; the invariants that remain
/// representable (group numbers, repetition bounds) are checked once when a
/// matcher is built, before any matching work is done.
#[derive(Debug)]
pub enum AstKind {
    /// `^`: succeeds without consuming iff the cursor is at offset 0.
    AtBeginning,
    /// `$`: succeeds without consuming iff the cursor is at the end.
    AtEnd,
    /// `[abc]`: matches one byte in the set. Single literal bytes are
    /// represented as one-element classes.
    Class(ByteSet),
    /// `[^abc]`: matches one byte not in the set. The empty negated class
    /// represents `.`, which matches any byte.
    NegatedClass(ByteSet),
    /// `RS`: matches each child in order.
    Concat(Vec<Ast>),
    /// `R|S`: matches the leftmost child that succeeds.
    Alternative(Vec<Ast>),
    /// `R{min,max}`: matches the child between `min` and `max` times,
    /// greedily. `max` of `None` means unbounded.
    Repeat {
        child: Box<Ast>,
        min: u32,
        max: Option<u32>,
    },
    /// `(R)`: matches the child and records the span it consumed under
    /// `index`, which must be in `1..=9`.
    CaptureGroup { child: Box<Ast>, index: u32 },
    /// `\N`: matches the literal text last captured by group `index`.
    Backreference { index: u32 },
    /// `(?=R)`: zero-width assertion that the child matches here.
    PositiveLookahead(Box<Ast>),
    /// `(?!R)`: zero-width assertion that the child does not match here.
    NegativeLookahead(Box<Ast>),
}

impl Ast {
    fn new(kind: AstKind) -> Ast {
        Ast { id: next_id(), kind }
    }

    /// Returns the ID of this node.
    pub fn id(&self) -> NodeID {
        self.id
    }

    /// Returns the kind of this node.
    pub fn kind(&self) -> &AstKind {
        &self.kind
    }

    /// Returns the children of this node, in order. Empty for leaves.
    pub(crate) fn children(&self) -> &[Ast] {
        match self.kind {
            AstKind::Concat(ref children) | AstKind::Alternative(ref children) => children,
            AstKind::Repeat { ref child, .. }
            | AstKind::CaptureGroup { ref child, .. }
            | AstKind::PositiveLookahead(ref child)
            | AstKind::NegativeLookahead(ref child) => slice::from_ref(&**child),
            AstKind::AtBeginning
            | AstKind::AtEnd
            | AstKind::Class(_)
            | AstKind::NegatedClass(_)
            | AstKind::Backreference { .. } => &[],
        }
    }

    /// Create a character class matching any one of the given bytes.
    pub fn class<B: AsRef<[u8]>>(bytes: B) -> Ast {
        Ast::new(AstKind::Class(bytes.as_ref().iter().copied().collect()))
    }

    /// Create a negated character class matching any one byte not among the
    /// given bytes.
    pub fn negated_class<B: AsRef<[u8]>>(bytes: B) -> Ast {
        Ast::new(AstKind::NegatedClass(bytes.as_ref().iter().copied().collect()))
    }

    /// Create `.`, which matches any one byte.
    ///
    /// This is represented as an empty negated class.
    pub fn any() -> Ast {
        Ast::new(AstKind::NegatedClass(ByteSet::empty()))
    }

    /// Create a concatenation that matches the given patterns in order.
    pub fn concat(exprs: Vec<Ast>) -> Ast {
        Ast::new(AstKind::Concat(exprs))
    }

    /// Create a pattern matching the given bytes literally, as a
    /// concatenation of one-byte classes.
    pub fn literal<B: AsRef<[u8]>>(bytes: B) -> Ast {
        let classes = bytes.as_ref().iter().map(|&b| Ast::class([b])).collect();
        Ast::concat(classes)
    }

    /// Create an alternation. Branches are tried left to right and the
    /// first branch that matches wins, even if a later branch would have
    /// matched more.
    pub fn alternative(exprs: Vec<Ast>) -> Ast {
        Ast::new(AstKind::Alternative(exprs))
    }

    /// Create a bounded repetition of `expr`. Both bounds are inclusive;
    /// a `max` of `None` means no upper bound. Matching is greedy.
    pub fn repeat(expr: Ast, min: u32, max: Option<u32>) -> Ast {
        Ast::new(AstKind::Repeat { child: Box::new(expr), min, max })
    }

    /// Create `expr*`, i.e. `expr{0,}`.
    pub fn star(expr: Ast) -> Ast {
        Ast::repeat(expr, 0, None)
    }

    /// Create `expr+`, i.e. `expr{1,}`.
    pub fn plus(expr: Ast) -> Ast {
        Ast::repeat(expr, 1, None)
    }

    /// Create `expr?`, i.e. `expr{0,1}`.
    pub fn question(expr: Ast) -> Ast {
        Ast::repeat(expr, 0, Some(1))
    }

    /// Create a capture group with the given number, which must be in
    /// `1..=9`.
    pub fn capture(expr: Ast, index: u32) -> Ast {
        Ast::new(AstKind::CaptureGroup { child: Box::new(expr), index })
    }

    /// Create a backreference to the capture group with the given number,
    /// which must be in `1..=9` and must refer to a group that appears
    /// earlier in the pattern.
    pub fn backreference(index: u32) -> Ast {
        Ast::new(AstKind::Backreference { index })
    }

    /// Create a positive lookahead: a zero-width assertion that `expr`
    /// matches at the current position.
    pub fn positive_lookahead(expr: Ast) -> Ast {
        Ast::new(AstKind::PositiveLookahead(Box::new(expr)))
    }

    /// Create a negative lookahead: a zero-width assertion that `expr`
    /// does not match at the current position.
    pub fn negative_lookahead(expr: Ast) -> Ast {
        Ast::new(AstKind::NegativeLookahead(Box::new(expr)))
    }

    /// Create `^`.
    pub fn at_beginning() -> Ast {
        Ast::new(AstKind::AtBeginning)
    }

    /// Create `$`.
    pub fn at_end() -> Ast {
        Ast::new(AstKind::AtEnd)
    }

    /// Anchor `expr` at both ends, i.e. `^expr$`.
    pub fn full_match(expr: Ast) -> Ast {
        Ast::concat(vec![Ast::at_beginning(), expr, Ast::at_end()])
    }
}

/// Check the invariants that the matching engine assumes but the type
/// system cannot enforce: group numbers in `1..=9`, repetition bounds
/// ordered, and every backreference preceded by its capture group. Returns
/// an error identifying the offending node.
pub(crate) fn validate(ast: &Ast) -> Result<(), Error> {
    let mut seen_groups = [false; 10];
    validate_node(ast, &mut seen_groups)
}

fn validate_node(ast: &Ast, seen_groups: &mut [bool; 10]) -> Result<(), Error> {
    match *ast.kind() {
        AstKind::Repeat { min, max, .. } => {
            if let Some(max) = max {
                if min > max {
                    return Err(Error::malformed_ast(
                        ast.id(),
                        format!("repetition minimum {} exceeds maximum {}", min, max),
                    ));
                }
            }
        }
        AstKind::CaptureGroup { index, .. } => {
            if index < 1 || index > 9 {
                return Err(Error::malformed_ast(
                    ast.id(),
                    format!("capture group number {} is outside 1..=9", index),
                ));
            }
            // Registered before the child is visited, so a backreference
            // inside its own group is considered preceded by it.
            seen_groups[index as usize] = true;
        }
        AstKind::Backreference { index } => {
            if index < 1 || index > 9 {
                return Err(Error::malformed_ast(
                    ast.id(),
                    format!("backreference number {} is outside 1..=9", index),
                ));
            }
            if !seen_groups[index as usize] {
                return Err(Error::malformed_ast(
                    ast.id(),
                    format!("backreference \\{} has no preceding capture group", index),
                ));
            }
        }
        _ => {}
    }
    for child in ast.children() {
        validate_node(child, seen_groups)?;
    }
    Ok(())
}
