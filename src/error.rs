use thiserror::Error;

use crate::generate::Operation;
use crate::model::Sort;

pub type Result<T> = std::result::Result<T, Error>;

/// A contract violation at a call site. None of these are recoverable: a
/// malformed call site means the surrounding analysis of that translation
/// unit cannot proceed soundly, so generation of the call site is aborted
/// and no axioms are appended for it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The operation was applied to the wrong number of arguments.
    #[error("{op} expects {expected} arguments, got {found}")]
    ArgumentCount {
        op: Operation,
        expected: &'static str,
        found: usize,
    },

    /// An argument does not satisfy the operation's sort contract.
    #[error("argument {index} of {op} must be {expected}, got {found}")]
    ArgumentSort {
        op: Operation,
        index: usize,
        expected: &'static str,
        found: String,
    },

    /// The requested result sort is incompatible with the operation.
    #[error("{op} cannot produce a result of sort {sort}")]
    ResultSort { op: Operation, sort: Sort },
}
