/*!
The backtracking matching engine and its public entry points.

The engine is a recursive evaluator in continuation-passing style. A
continuation represents "everything that must still match after this node
succeeds": each node's rule advances the cursor, invokes the continuation
and, when the continuation reports failure, restores the cursor before
failing itself. Failure therefore unwinds the call stack to the nearest
remaining choice point (an alternation branch, a repetition count) with
the cursor exactly where that choice point left it, which is what makes a
plain recursive evaluator a full backtracking search without any explicit
stack of alternatives.

Before dispatching on a node, the engine consults the memoisation table
and refuses to re-enter a (node, offset) pair that has already been
attempted during the current search. The pair is marked *before* the
attempt, not after a confirmed failure: a repetition whose body matches
the empty string re-enters itself at the same offset, and the pessimistic
mark is what stops that recursion.
*/

use std::cell::Cell;

use crate::analysis::Analysis;
use crate::ast::{self, Ast, AstKind, NodeID};
use crate::error::Error;
use crate::input::{Input, Position};
use crate::memo::{self, Encoding, Memo, Policy};
use crate::prefilter::Prefilter;

/// The default maximum recursion depth of a search.
///
/// Depth is bounded by pattern size × the repetition counts actually
/// attempted, so it scales with the haystack, not just the pattern.
const DEFAULT_RECURSION_LIMIT: usize = 4096;

/// A representation of a match reported by a [`Matcher`].
///
/// A match records the start and end offsets of the match in the
/// haystack.
///
/// Every match guarantees that `start <= end`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Match {
    /// The start offset of the match, inclusive.
    start: usize,
    /// The end offset of the match, exclusive.
    end: usize,
}

impl Match {
    /// Create a new match from a byte offset span.
    ///
    /// # Panics
    ///
    /// This panics if `end < start`.
    #[inline]
    pub fn new(start: usize, end: usize) -> Match {
        assert!(start <= end);
        Match { start, end }
    }

    /// The starting position of the match.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// The ending position of the match.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns the match location as a range.
    #[inline]
    pub fn range(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }

    /// Returns true if and only if this match is empty. That is, when
    /// `start() == end()`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A half-open span of the haystack captured by a group, as a pair of
/// cursor markers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Span {
    start: Position,
    end: Position,
}

/// The capture store: the span last captured by each group `1..=9`.
///
/// A group records its span on every successful pass through its end,
/// including passes that deeper backtracking later abandons; captures are
/// never rolled back when the cursor is. One store lives for a whole
/// top-level search, across every retried start offset.
#[derive(Debug)]
struct Captures {
    slots: [Option<Span>; 9],
}

impl Captures {
    fn new() -> Captures {
        Captures { slots: [None; 9] }
    }

    /// `group` must be in `1..=9`, which validation guarantees.
    fn get(&self, group: u32) -> Option<Span> {
        self.slots[group as usize - 1]
    }

    fn set(&mut self, group: u32, span: Span) {
        self.slots[group as usize - 1] = Some(span);
    }
}

/// A continuation: the remainder of the match, invoked with the cursor
/// advanced past the current node's consumption. Its result is propagated
/// upward unchanged.
type Cont<'a, 'h> = &'a (dyn Fn(&mut Search<'h>) -> bool + 'a);

/// The state of one in-flight search: the cursor, the capture store, the
/// memoisation table and the recursion depth guard. Continuation closures
/// capture only node references and outer continuations; the state is
/// threaded through them as an argument.
struct Search<'h> {
    input: Input<'h>,
    captures: Captures,
    memo: Memo,
    depth: usize,
    recursion_limit: usize,
    depth_limit_hit: bool,
}

impl<'h> Search<'h> {
    fn matches(&mut self, ast: &Ast, cont: Cont<'_, 'h>) -> bool {
        if self.depth == self.recursion_limit {
            // Reported as an error by the driver. The false returned here
            // is a lie that lets the stack unwind.
            self.depth_limit_hit = true;
            return false;
        }
        self.depth += 1;
        let matched = self.matches_inner(ast, cont);
        self.depth -= 1;
        matched
    }

    fn matches_inner(&mut self, ast: &Ast, cont: Cont<'_, 'h>) -> bool {
        let at = self.input.position();
        if self.memo.is_marked(ast.id(), at) {
            return false;
        }
        self.memo.mark(ast.id(), at);

        match *ast.kind() {
            AstKind::AtBeginning => self.input.at_beginning() && cont(self),
            AstKind::AtEnd => self.input.at_end() && cont(self),
            AstKind::Class(ref class) => {
                if self.input.at_end() || !class.contains(self.input.current()) {
                    return false;
                }
                self.consume_one(cont)
            }
            AstKind::NegatedClass(ref class) => {
                if self.input.at_end() || class.contains(self.input.current()) {
                    return false;
                }
                self.consume_one(cont)
            }
            AstKind::Concat(ref children) => self.concat(children, 0, cont),
            AstKind::Alternative(ref children) => self.alternative(children, cont),
            AstKind::Repeat { ref child, min, max } => {
                self.repeat(child, min, max, 0, cont)
            }
            AstKind::CaptureGroup { ref child, index } => {
                let start = self.input.mark();
                self.matches(child, &|s: &mut Search<'h>| {
                    let span = Span { start, end: s.input.mark() };
                    s.captures.set(index, span);
                    cont(s)
                })
            }
            AstKind::Backreference { index } => self.backreference(index, cont),
            AstKind::PositiveLookahead(ref child) => {
                let m = self.input.mark();
                // The probe asserts the child subpattern alone; the rest of
                // the match is evaluated by the continuation afterwards,
                // from the un-advanced position.
                if !self.matches(child, &|_: &mut Search<'h>| true) {
                    return false;
                }
                self.input.restore(m);
                cont(self)
            }
            AstKind::NegativeLookahead(ref child) => {
                let m = self.input.mark();
                if self.matches(child, &|_: &mut Search<'h>| true) {
                    return false;
                }
                self.input.restore(m);
                cont(self)
            }
        }
    }

    /// Consume the byte under the cursor, run the continuation and undo
    /// the consumption on the way out.
    fn consume_one(&mut self, cont: Cont<'_, 'h>) -> bool {
        let m = self.input.mark();
        self.input.advance(1);
        let matched = cont(self);
        self.input.restore(m);
        matched
    }

    fn concat(&mut self, children: &[Ast], index: usize, cont: Cont<'_, 'h>) -> bool {
        match children.get(index) {
            None => cont(self),
            Some(child) => self.matches(child, &|s: &mut Search<'h>| {
                s.concat(children, index + 1, cont)
            }),
        }
    }

    /// Branches share one continuation and are tried in order; the first
    /// that succeeds wins, so preference is leftmost, not longest.
    fn alternative(&mut self, children: &[Ast], cont: Cont<'_, 'h>) -> bool {
        for child in children {
            if self.matches(child, cont) {
                return true;
            }
        }
        false
    }

    /// `count` repetitions have already matched. Greedy: try one more
    /// before settling, and settle only once at least `min` matched.
    fn repeat(
        &mut self,
        child: &Ast,
        min: u32,
        max: Option<u32>,
        count: u32,
        cont: Cont<'_, 'h>,
    ) -> bool {
        if max.map_or(false, |max| count > max) {
            return false;
        }
        let matched = self.matches(child, &|s: &mut Search<'h>| {
            s.repeat(child, min, max, count + 1, cont)
        });
        if !matched && count >= min {
            return cont(self);
        }
        matched
    }

    fn backreference(&mut self, index: u32, cont: Cont<'_, 'h>) -> bool {
        // A group that has captured nothing so far matches the empty
        // string.
        let text = match self.captures.get(index) {
            None => return cont(self),
            Some(span) => self.input.range(span.start, span.end),
        };
        for &byte in text {
            if self.input.at_end() {
                return false;
            }
            if self.input.current() != byte {
                return false;
            }
            self.input.advance(1);
        }
        // A full literal match consumes deterministically; there is no
        // save/restore here.
        cont(self)
    }
}

/// The configuration of a [`Matcher`].
///
/// Every option is unset by default, which lets configurations be
/// combined without explicitly set options being clobbered by defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    policy: Option<Policy>,
    encoding: Option<Encoding>,
    recursion_limit: Option<usize>,
}

impl Config {
    /// Return a new default matcher configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Set which pattern nodes participate in memoisation.
    ///
    /// By default this is [`Policy::All`].
    pub fn policy(mut self, policy: Policy) -> Config {
        self.policy = Some(policy);
        self
    }

    /// Set the representation of the memoisation table.
    ///
    /// Encodings are logically interchangeable: under a fixed policy,
    /// every encoding produces identical match results. By default this
    /// is [`Encoding::Dense`].
    pub fn encoding(mut self, encoding: Encoding) -> Config {
        self.encoding = Some(encoding);
        self
    }

    /// Set the maximum recursion depth of a search.
    ///
    /// A search that exceeds the limit is abandoned with
    /// [`ErrorKind::RecursionLimit`](crate::ErrorKind::RecursionLimit)
    /// rather than reported as "no match". The limit is what keeps
    /// searches finite under [`Policy::None`] when an unbounded
    /// repetition's body can match the empty string.
    ///
    /// By default this is `4096`.
    pub fn recursion_limit(mut self, limit: usize) -> Config {
        self.recursion_limit = Some(limit);
        self
    }

    /// Returns the memoisation policy, taking defaults into account.
    pub fn get_policy(&self) -> Policy {
        self.policy.unwrap_or_default()
    }

    /// Returns the table encoding, taking defaults into account.
    pub fn get_encoding(&self) -> Encoding {
        self.encoding.unwrap_or_default()
    }

    /// Returns the recursion limit, taking defaults into account.
    pub fn get_recursion_limit(&self) -> usize {
        self.recursion_limit.unwrap_or(DEFAULT_RECURSION_LIMIT)
    }

    pub(crate) fn overwrite(self, o: Config) -> Config {
        Config {
            policy: o.policy.or(self.policy),
            encoding: o.encoding.or(self.encoding),
            recursion_limit: o.recursion_limit.or(self.recursion_limit),
        }
    }
}

/// A builder for assembling a [`Matcher`] with a non-default
/// configuration.
#[derive(Clone, Debug)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Builder {
        Builder { config: Config::new() }
    }

    /// Apply the given configuration. Options set in `config` take
    /// precedence over options set previously.
    pub fn configure(&mut self, config: Config) -> &mut Builder {
        self.config = self.config.overwrite(config);
        self
    }

    /// Build a matcher for the given pattern.
    ///
    /// The pattern is validated up front; the static analysis and
    /// memoisation node selection also happen here, once, so that
    /// searches only ever allocate their per-haystack table.
    pub fn build(&self, ast: Ast) -> Result<Matcher, Error> {
        ast::validate(&ast)?;
        let analysis = Analysis::new(&ast);
        let tracked =
            memo::nodes_to_track(&ast, self.config.get_policy(), &analysis);
        let prefilter = Prefilter::from_ast(&ast);
        debug!(
            "matcher built: policy={:?}, encoding={:?}, {} node(s) memoised",
            self.config.get_policy(),
            self.config.get_encoding(),
            tracked.len(),
        );
        Ok(Matcher { config: self.config, ast, tracked, prefilter })
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

/// A compiled matcher: a validated pattern plus everything derived from
/// it ahead of search time.
///
/// Search methods take `&self`, so one matcher can be reused across any
/// number of haystacks (and shared across threads, though each search is
/// strictly sequential).
#[derive(Debug)]
pub struct Matcher {
    config: Config,
    ast: Ast,
    tracked: Vec<NodeID>,
    prefilter: Option<Prefilter>,
}

impl Matcher {
    /// Build a matcher with the default configuration: memoise all nodes,
    /// in a dense table.
    pub fn new(ast: Ast) -> Result<Matcher, Error> {
        Builder::new().build(ast)
    }

    /// Return a builder for assembling a matcher with a non-default
    /// configuration.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Return this matcher's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Return this matcher's pattern.
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Returns true if and only if the pattern matches somewhere in the
    /// haystack.
    pub fn is_match(&self, haystack: &[u8]) -> Result<bool, Error> {
        Ok(self.find(haystack)?.is_some())
    }

    /// Search for the leftmost match of the pattern in the haystack.
    ///
    /// The search tries each start offset in turn, reusing one
    /// memoisation table and one capture store across all of them, and
    /// reports the first match found. `Ok(None)` means every start offset
    /// was exhausted without a match; an error is reported only for a
    /// search abandoned at the recursion limit.
    pub fn find<'h>(&self, haystack: &'h [u8]) -> Result<Option<Match>, Error> {
        let recursion_limit = self.config.get_recursion_limit();
        let mut search = Search {
            input: Input::new(haystack),
            captures: Captures::new(),
            memo: Memo::new(
                &self.tracked,
                self.config.get_encoding(),
                haystack.len(),
            ),
            depth: 0,
            recursion_limit,
            depth_limit_hit: false,
        };
        if let Some(ref prefilter) = self.prefilter {
            match prefilter.find(haystack, 0) {
                None => return Ok(None),
                Some(at) => search.input.set_position(at),
            }
        }
        loop {
            let start = search.input.position();
            let end = Cell::new(0);
            let matched = search.matches(&self.ast, &|s: &mut Search<'h>| {
                end.set(s.input.position());
                true
            });
            if search.depth_limit_hit {
                return Err(Error::recursion_limit(recursion_limit));
            }
            if matched {
                return Ok(Some(Match::new(start, end.get())));
            }
            if search.input.at_end() {
                return Ok(None);
            }
            trace!("no match starting at offset {}, retrying", start);
            match self.prefilter {
                Some(ref prefilter) => {
                    match prefilter.find(haystack, search.input.position() + 1)
                    {
                        None => return Ok(None),
                        Some(at) => search.input.set_position(at),
                    }
                }
                None => search.input.advance(1),
            }
        }
    }
}
