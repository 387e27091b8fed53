/// An opaque marker for a cursor position.
///
/// A marker is handed out by [`Input::mark`] and given back to
/// [`Input::restore`] to undo consumption, which is the backtracking undo
/// primitive of the whole engine. Restoring is a pure overwrite of the
/// cursor, so it is O(1) and can be done any number of times in any order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Position(usize);

/// The input to a search: a haystack and a cursor into it.
///
/// The haystack is immutable for the duration of a search. The cursor ranges
/// over `0..=haystack.len()`, where `haystack.len()` is the "at end"
/// position. All operations are O(1) except `range`, which is O(length of
/// the range).
#[derive(Clone, Debug)]
pub(crate) struct Input<'h> {
    haystack: &'h [u8],
    at: usize,
}

impl<'h> Input<'h> {
    pub(crate) fn new(haystack: &'h [u8]) -> Input<'h> {
        Input { haystack, at: 0 }
    }

    pub(crate) fn at_beginning(&self) -> bool {
        self.at == 0
    }

    pub(crate) fn at_end(&self) -> bool {
        self.at == self.haystack.len()
    }

    /// Returns the byte under the cursor.
    ///
    /// Callers must never invoke this when `at_end()` is true.
    pub(crate) fn current(&self) -> u8 {
        self.haystack[self.at]
    }

    /// Advance the cursor by `n` bytes.
    ///
    /// Callers must never advance past the end of the haystack.
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(self.at + n <= self.haystack.len());
        self.at += n;
    }

    pub(crate) fn position(&self) -> usize {
        self.at
    }

    pub(crate) fn set_position(&mut self, at: usize) {
        debug_assert!(at <= self.haystack.len());
        self.at = at;
    }

    pub(crate) fn mark(&self) -> Position {
        Position(self.at)
    }

    pub(crate) fn restore(&mut self, marker: Position) {
        self.at = marker.0;
    }

    /// Returns the haystack bytes between two markers.
    pub(crate) fn range(&self, start: Position, end: Position) -> &'h [u8] {
        &self.haystack[start.0..end.0]
    }
}
