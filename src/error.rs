use std::error;
use std::fmt;

use crate::ast::NodeID;

/// An error that occurred while building a matcher or running a search.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The kind of error that occurred.
#[derive(Clone, Debug)]
pub enum ErrorKind {
    /// An error that occurred because the pattern AST violates one of the
    /// structural invariants assumed by the matching engine, e.g. a capture
    /// group or backreference number outside `1..=9`, or a repetition whose
    /// minimum exceeds its maximum. The offending node is identified by its
    /// ID. This always signals a bug in whatever produced the AST and is
    /// never reported as "no match".
    MalformedAst {
        /// The ID of the offending node.
        id: NodeID,
        /// A description of the violated invariant.
        msg: String,
    },
    /// An error that occurred because a memoisation policy name could not
    /// be recognized.
    UnknownPolicy(String),
    /// An error that occurred because a memoisation table encoding name
    /// could not be recognized.
    UnknownEncoding(String),
    /// An error that occurred because a search exceeded the configured
    /// recursion depth limit. This is a distinct failure mode from "no
    /// match": the search was abandoned, not exhausted.
    RecursionLimit {
        /// The limit that was exceeded.
        limit: usize,
    },
}

impl Error {
    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn malformed_ast(id: NodeID, msg: String) -> Error {
        Error { kind: ErrorKind::MalformedAst { id, msg } }
    }

    pub(crate) fn unknown_policy(name: &str) -> Error {
        Error { kind: ErrorKind::UnknownPolicy(name.to_string()) }
    }

    pub(crate) fn unknown_encoding(name: &str) -> Error {
        Error { kind: ErrorKind::UnknownEncoding(name.to_string()) }
    }

    pub(crate) fn recursion_limit(limit: usize) -> Error {
        Error { kind: ErrorKind::RecursionLimit { limit } }
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::MalformedAst { id, ref msg } => {
                write!(f, "malformed AST node {}: {}", id, msg)
            }
            ErrorKind::UnknownPolicy(ref name) => {
                write!(f, "unrecognized memoisation policy: {:?}", name)
            }
            ErrorKind::UnknownEncoding(ref name) => {
                write!(f, "unrecognized memoisation encoding: {:?}", name)
            }
            ErrorKind::RecursionLimit { limit } => {
                write!(f, "search exceeded the recursion limit of {}", limit)
            }
        }
    }
}
