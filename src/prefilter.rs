use memchr::{memchr, memchr2, memchr3};

use crate::alphabet::ByteSet;
use crate::ast::{Ast, AstKind};

/// A literal first-byte accelerator for the sliding-start driver.
///
/// When every possible match of a pattern must begin with one of at most
/// three known bytes, the driver can skip dead start offsets with
/// `memchr` instead of attempting a full search at every one. A prefilter
/// never changes which match is reported, only how quickly dead start
/// offsets are rejected: a start offset it skips provably cannot begin a
/// match.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Prefilter {
    Memchr(u8),
    Memchr2(u8, u8),
    Memchr3(u8, u8, u8),
}

impl Prefilter {
    /// Build a prefilter for the given pattern, if its set of viable first
    /// bytes is computable and small enough to be worth it.
    pub(crate) fn from_ast(ast: &Ast) -> Option<Prefilter> {
        let mut set = ByteSet::empty();
        if !first_bytes(ast, &mut set) {
            debug!("prefilter: first bytes not computable");
            return None;
        }
        let needles: Vec<u8> = set.iter().collect();
        let prefilter = match needles.as_slice() {
            &[a] => Prefilter::Memchr(a),
            &[a, b] => Prefilter::Memchr2(a, b),
            &[a, b, c] => Prefilter::Memchr3(a, b, c),
            _ => {
                debug!("prefilter: {} first byte(s), not usable", needles.len());
                return None;
            }
        };
        debug!("prefilter built: {:?}", prefilter);
        Some(prefilter)
    }

    /// Returns the next offset at or past `at` that could begin a match,
    /// or `None` if there is none.
    pub(crate) fn find(&self, haystack: &[u8], at: usize) -> Option<usize> {
        if at >= haystack.len() {
            return None;
        }
        let found = match *self {
            Prefilter::Memchr(a) => memchr(a, &haystack[at..]),
            Prefilter::Memchr2(a, b) => memchr2(a, b, &haystack[at..]),
            Prefilter::Memchr3(a, b, c) => memchr3(a, b, c, &haystack[at..]),
        };
        found.map(|i| at + i)
    }
}

/// Accumulate the set of bytes a match of `ast` can begin with into `set`.
/// Returns false to give up, which happens whenever the pattern could
/// match without consuming a first byte from a known set: anchors,
/// lookaheads, backreferences, negated classes and possibly-empty
/// repetitions all bail out. Giving up is always safe; the driver falls
/// back to trying every start offset.
fn first_bytes(ast: &Ast, set: &mut ByteSet) -> bool {
    match *ast.kind() {
        AstKind::Class(ref class) => {
            set.union(class);
            true
        }
        AstKind::Concat(ref children) => match children.first() {
            None => false,
            Some(first) => first_bytes(first, set),
        },
        AstKind::Alternative(ref children) => {
            !children.is_empty()
                && children.iter().all(|child| first_bytes(child, set))
        }
        AstKind::Repeat { ref child, min, .. } => {
            // A possibly-empty repetition defers its first byte to
            // whatever follows it, which is unknown here.
            min > 0 && first_bytes(child, set)
        }
        AstKind::CaptureGroup { ref child, .. } => first_bytes(child, set),
        AstKind::AtBeginning
        | AstKind::AtEnd
        | AstKind::NegatedClass(_)
        | AstKind::Backreference { .. }
        | AstKind::PositiveLookahead(_)
        | AstKind::NegativeLookahead(_) => false,
    }
}
