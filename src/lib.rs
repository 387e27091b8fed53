/*!
Backtracking regular expression matching with memoisation.

This crate matches a pattern AST against byte haystacks using a recursive
backtracking search in continuation-passing style. There is no textual
pattern syntax here: patterns are assembled with the factory constructors
on [`Ast`] (a parser front end would target the same constructors), and a
[`Matcher`] runs the search.

The interesting part is the memoisation layer. Backtracking engines are
exponential in the worst case; this engine can record which (pattern node,
haystack offset) pairs have already been attempted and failed, and refuse
to re-explore them. Which nodes participate is chosen by a [`Policy`] and
how the marks are stored is chosen by an [`Encoding`]; their docs spell
out the conditions under which the pruning is an approximation.

# Example: basic searching

```
use regex_backtrack::{Ast, Matcher};

// colou?r
let pattern = Ast::concat(vec![
    Ast::literal("colo"),
    Ast::question(Ast::class("u")),
    Ast::class("r"),
]);
let matcher = Matcher::new(pattern)?;

let m = matcher.find(b"my colour is red")?.expect("a match");
assert_eq!((3, 9), (m.start(), m.end()));
# Ok::<(), regex_backtrack::Error>(())
```

# Example: configuring memoisation

```
use regex_backtrack::{Ast, Config, Encoding, Matcher, Policy};

// (a|aa)+b, a classic blowup shape: without memoisation, a long run of
// 'a's with no final 'b' forces an exponential number of ways to carve
// up the run before the search can give up.
let pattern = Ast::concat(vec![
    Ast::plus(Ast::alternative(vec![
        Ast::literal("a"),
        Ast::literal("aa"),
    ])),
    Ast::class("b"),
]);
let matcher = Matcher::builder()
    .configure(Config::new()
        .policy(Policy::AncestorNodes)
        .encoding(Encoding::RunLength))
    .build(pattern)?;

assert!(!matcher.is_match(b"aaaaaaaaaaaaaaaaaaaaaaaa")?);
# Ok::<(), regex_backtrack::Error>(())
```

# Crate features

* **logging** - Enables log messages (via the `log` crate) describing,
  e.g., which prefilter a matcher was built with and how many nodes are
  memoised.

# Caveats

Two behaviors of the engine are deliberate compatibility quirks rather
than conventional regex semantics, and both are documented where they
live: captures are recorded on every successful pass through a group and
are not undone by backtracking, and memoised failure marks are blind to
what has to match after the marked node. See [`Policy`] and the capture
store documentation in the crate source for the details.
*/

// A macro for logging, which does nothing when the 'logging' feature is
// disabled.
macro_rules! log {
    ($($tt:tt)*) => {
        #[cfg(feature = "logging")]
        {
            $($tt)*
        }
    };
}

macro_rules! debug {
    ($($tt:tt)*) => { log!(log::debug!($($tt)*)) }
}

macro_rules! trace {
    ($($tt:tt)*) => { log!(log::trace!($($tt)*)) }
}

pub use crate::{
    alphabet::{ByteSet, ByteSetIter},
    ast::{Ast, AstKind, NodeID},
    backtrack::{Builder, Config, Match, Matcher},
    error::{Error, ErrorKind},
    memo::{Encoding, Policy},
};

mod alphabet;
mod analysis;
mod ast;
mod backtrack;
mod error;
mod input;
mod memo;
mod prefilter;
