/*!
The memoisation subsystem: which (node, offset) pairs have already been
attempted and failed, so that the backtracking engine can refuse to
re-explore them.

The subsystem splits into two orthogonal choices, both made at
configuration time and never by runtime type inspection:

* A [`Policy`] decides which AST nodes participate in memoisation at all.
  Unselected nodes are always treated as unmarked and are never pruned.
* An [`Encoding`] decides how the table of marks is represented. All
  encodings satisfy the same `get`/`mark` contract and are logically
  interchangeable; an encoding is a performance choice, never a semantics
  choice.

A mark means "this node was attempted at this offset during the current
search and did not produce an overall match". That statement is an
approximation: the outcome of a node at an offset also depends on what has
to match *after* it (and, with backreferences, on what was captured
before), so a mark made under one continuation can suppress a retry under
another that would have succeeded. The approximation is what bounds
pathological backtracking; callers who cannot tolerate it use
[`Policy::None`]. A sound-by-construction alternative would be to reuse
marks only within an identical remaining continuation chain, which prunes
far less; this implementation keeps the original aggressive behavior.
*/

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::analysis::Analysis;
use crate::ast::{Ast, NodeID};
use crate::error::Error;

/// A policy selecting which AST nodes participate in memoisation.
///
/// The default is `All`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Policy {
    /// Memoise nothing. The engine behaves as if there were no table. The
    /// only protection left against non-terminating searches (e.g. an
    /// unbounded repetition whose body matches the empty string) is the
    /// recursion limit.
    None,
    /// Memoise every node in the pattern.
    All,
    /// Memoise only nodes with a statically computed in-degree greater
    /// than 1, i.e. nodes that more than one alternation branch converges
    /// into. These are the points where redundant re-exploration is most
    /// likely.
    HighInDegree,
    /// Memoise only nodes inside a repetition subtree. This targets the
    /// blowup from nested and unbounded repetitions.
    AncestorNodes,
}

impl Default for Policy {
    fn default() -> Policy {
        Policy::All
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Policy, Error> {
        match s {
            "none" => Ok(Policy::None),
            "all" => Ok(Policy::All),
            "high-in-degree" => Ok(Policy::HighInDegree),
            "ancestor-nodes" => Ok(Policy::AncestorNodes),
            _ => Err(Error::unknown_policy(s)),
        }
    }
}

/// The representation used for the table of marks.
///
/// The default is `Dense`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Encoding {
    /// A two-dimensional bitmap indexed by (tracked node, offset). O(1)
    /// access; memory proportional to tracked nodes × haystack length.
    Dense,
    /// A hash set of (tracked node, offset) pairs. No up-front allocation
    /// and less memory when few pairs are marked, at a higher constant
    /// factor per access.
    Sparse,
    /// Per-node sorted runs of marked offsets. Compact when marks cluster
    /// into long contiguous stretches, as they do when a repetition walks
    /// the haystack.
    RunLength,
}

impl Default for Encoding {
    fn default() -> Encoding {
        Encoding::Dense
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Encoding, Error> {
        match s {
            "dense" => Ok(Encoding::Dense),
            "sparse" => Ok(Encoding::Sparse),
            "run-length" => Ok(Encoding::RunLength),
            _ => Err(Error::unknown_encoding(s)),
        }
    }
}

/// Returns the IDs of the nodes the given policy selects for memoisation,
/// in pre-order.
pub(crate) fn nodes_to_track(
    ast: &Ast,
    policy: Policy,
    analysis: &Analysis,
) -> Vec<NodeID> {
    let mut ids = Vec::new();
    match policy {
        Policy::None => {}
        Policy::All => collect(ast, &mut |_| true, &mut ids),
        Policy::HighInDegree => {
            collect(ast, &mut |id| analysis.in_degree(id) > 1, &mut ids)
        }
        Policy::AncestorNodes => {
            collect(ast, &mut |id| analysis.is_ancestor(id), &mut ids)
        }
    }
    ids
}

fn collect(ast: &Ast, want: &mut dyn FnMut(NodeID) -> bool, ids: &mut Vec<NodeID>) {
    if want(ast.id()) {
        ids.push(ast.id());
    }
    for child in ast.children() {
        collect(child, want, ids);
    }
}

/// The capability every table encoding provides. Rows are compact indices
/// assigned to tracked nodes by [`Memo`]; offsets range over
/// `0..=haystack.len()`.
trait Table {
    fn get(&self, row: usize, at: usize) -> bool;
    fn mark(&mut self, row: usize, at: usize);
}

/// The policy-filtered view the engine talks to.
///
/// `Memo` compacts the selected node IDs into row indices and treats every
/// unselected node as permanently unmarked. One `Memo` lives for exactly
/// one top-level search, spanning every retried start position: the
/// redundant work being pruned is shared between nearby start offsets, so
/// resetting the table per start position would forfeit most of the
/// benefit.
pub(crate) struct Memo {
    rows: HashMap<NodeID, usize>,
    table: Box<dyn Table>,
}

impl Memo {
    pub(crate) fn new(
        tracked: &[NodeID],
        encoding: Encoding,
        haystack_len: usize,
    ) -> Memo {
        let rows: HashMap<NodeID, usize> =
            tracked.iter().copied().enumerate().map(|(row, id)| (id, row)).collect();
        // The at-end offset is a real search state, hence the +1.
        let positions = haystack_len + 1;
        let table: Box<dyn Table> = match encoding {
            Encoding::Dense => Box::new(DenseTable::new(rows.len(), positions)),
            Encoding::Sparse => Box::new(SparseTable::new()),
            Encoding::RunLength => Box::new(RunLengthTable::new(rows.len())),
        };
        Memo { rows, table }
    }

    pub(crate) fn is_marked(&self, id: NodeID, at: usize) -> bool {
        match self.rows.get(&id) {
            None => false,
            Some(&row) => self.table.get(row, at),
        }
    }

    pub(crate) fn mark(&mut self, id: NodeID, at: usize) {
        if let Some(&row) = self.rows.get(&id) {
            self.table.mark(row, at);
        }
    }
}

/// A row-major two-dimensional bitmap. Out-of-range reads answer "not
/// marked" and out-of-range marks are dropped.
struct DenseTable {
    positions: usize,
    bits: Vec<bool>,
}

impl DenseTable {
    fn new(rows: usize, positions: usize) -> DenseTable {
        DenseTable { positions, bits: vec![false; rows * positions] }
    }
}

impl Table for DenseTable {
    fn get(&self, row: usize, at: usize) -> bool {
        if at >= self.positions {
            return false;
        }
        self.bits
            .get(row * self.positions + at)
            .copied()
            .unwrap_or(false)
    }

    fn mark(&mut self, row: usize, at: usize) {
        if at >= self.positions {
            return;
        }
        if let Some(bit) = self.bits.get_mut(row * self.positions + at) {
            *bit = true;
        }
    }
}

/// A hash set of marked (row, offset) pairs.
struct SparseTable {
    marked: HashSet<(usize, usize)>,
}

impl SparseTable {
    fn new() -> SparseTable {
        SparseTable { marked: HashSet::new() }
    }
}

impl Table for SparseTable {
    fn get(&self, row: usize, at: usize) -> bool {
        self.marked.contains(&(row, at))
    }

    fn mark(&mut self, row: usize, at: usize) {
        self.marked.insert((row, at));
    }
}

/// A half-open run of marked offsets within one row.
#[derive(Clone, Copy, Debug)]
struct Run {
    start: usize,
    end: usize,
}

/// Per-row run-length encoding: each row keeps its marked offsets as a
/// sorted list of disjoint, non-adjacent runs. Lookup is a binary search;
/// marking extends or merges neighboring runs.
struct RunLengthTable {
    rows: Vec<Vec<Run>>,
}

impl RunLengthTable {
    fn new(rows: usize) -> RunLengthTable {
        RunLengthTable { rows: vec![Vec::new(); rows] }
    }

    /// Locates the run containing `at`, or the insertion point of a new
    /// run if none does.
    fn search(runs: &[Run], at: usize) -> Result<usize, usize> {
        use std::cmp::Ordering;

        runs.binary_search_by(|run| {
            if run.end <= at {
                Ordering::Less
            } else if run.start > at {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
    }
}

impl Table for RunLengthTable {
    fn get(&self, row: usize, at: usize) -> bool {
        match self.rows.get(row) {
            None => false,
            Some(runs) => RunLengthTable::search(runs, at).is_ok(),
        }
    }

    fn mark(&mut self, row: usize, at: usize) {
        let runs = match self.rows.get_mut(row) {
            None => return,
            Some(runs) => runs,
        };
        let i = match RunLengthTable::search(runs, at) {
            Ok(_) => return,
            Err(i) => i,
        };
        let extends_prev = i > 0 && runs[i - 1].end == at;
        let extends_next = i < runs.len() && runs[i].start == at + 1;
        match (extends_prev, extends_next) {
            (true, true) => {
                runs[i - 1].end = runs[i].end;
                runs.remove(i);
            }
            (true, false) => runs[i - 1].end = at + 1,
            (false, true) => runs[i].start = at,
            (false, false) => runs.insert(i, Run { start: at, end: at + 1 }),
        }
    }
}
