//! Generation sessions.
//!
//! A [`Generator`] owns everything that is stateful about constraint
//! generation: the fresh-symbol counter and the axiom log. One session serves
//! one verification run; concurrent explorations must each own their own
//! session (there is no internal locking and no global state). Identical call
//! sequences on fresh sessions produce identical axiom sets and identical
//! symbol names.

use std::fmt::Display;

use crate::{
    axioms::{Axiom, AxiomLog},
    error::{Error, Result},
    model::{strings::SymbolicString, terms::Term, Sort, Symbol, SymbolKind},
};

mod code_points;
mod predicates;

pub use code_points::{is_high_surrogate, is_low_surrogate, pair_value};

/// The string-library operations this core translates into axioms.
///
/// Argument order of the predicates follows the SMT-LIB string theory
/// (`str.prefixof`, `str.suffixof`, `str.contains`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Encode a code point into a string of 1-2 UTF-16 code units
    CodePoint,
    /// Decode the code point starting at an index
    CodePointAt,
    /// Decode the code point ending before an index
    CodePointBefore,
    /// Approximate number of code points in an index range
    CodePointCount,
    /// Approximate index reached by advancing a number of code points
    OffsetByCodePoints,
    /// Prefix test, with an optional start offset
    PrefixOf,
    /// Suffix test
    SuffixOf,
    /// Emptiness test
    IsEmpty,
    /// Substring test
    Contains,
}

/// A symbolic argument or result: either a string or a scalar term.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(SymbolicString),
    Term(Term),
}

impl Value {
    pub fn as_string(&self) -> Option<&SymbolicString> {
        match self {
            Value::Str(s) => Some(s),
            Value::Term(_) => None,
        }
    }

    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Value::Str(_) => None,
            Value::Term(t) => Some(t),
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::Str(_) => "a symbolic string".to_string(),
            Value::Term(t) => format!("a term of sort {}", t.sort()),
        }
    }
}

impl From<SymbolicString> for Value {
    fn from(s: SymbolicString) -> Self {
        Value::Str(s)
    }
}

impl From<Term> for Value {
    fn from(t: Term) -> Self {
        Value::Term(t)
    }
}

/// One constraint-generation session.
#[derive(Debug, Default)]
pub struct Generator {
    counter: usize,
    axioms: AxiomLog,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_name(&mut self, kind: SymbolKind, hint: &str) -> String {
        let id = self.counter;
        self.counter += 1;
        format!("{}_{}_{}", kind.prefix(), hint, id)
    }

    /// Creates a symbol distinct from every symbol previously produced in
    /// this session. Distinctness comes from the monotonic counter combined
    /// with the hint; generation is never memoized, so two calls with
    /// identical arguments still yield distinct symbols.
    pub fn fresh_symbol(&mut self, kind: SymbolKind, hint: &str, sort: Sort) -> Symbol {
        Symbol::new(self.fresh_name(kind, hint), sort)
    }

    /// A fresh Boolean flag.
    pub fn fresh_flag(&mut self, hint: &str) -> Symbol {
        self.fresh_symbol(SymbolKind::Flag, hint, Sort::Bool)
    }

    /// A fresh index intended as the bound variable of a guarded-universal
    /// axiom.
    pub fn fresh_univ_index(&mut self, hint: &str) -> Symbol {
        self.fresh_symbol(SymbolKind::UnivIndex, hint, Sort::index_sort())
    }

    /// A fresh existentially intended index (a witness).
    pub fn fresh_exist_index(&mut self, hint: &str) -> Symbol {
        self.fresh_symbol(SymbolKind::ExistIndex, hint, Sort::index_sort())
    }

    /// A fresh result value of the given sort.
    pub fn fresh_value(&mut self, hint: &str, sort: Sort) -> Symbol {
        self.fresh_symbol(SymbolKind::Result, hint, sort)
    }

    /// A fresh uninterpreted function from start positions to witness
    /// indices, for the doubly indexed negative containment encoding.
    pub fn fresh_witness_fn(&mut self, hint: &str) -> Symbol {
        self.fresh_symbol(SymbolKind::ExistIndex, hint, Sort::index_sort())
    }

    /// Creates a fresh symbolic string. Its length is constrained
    /// non-negative immediately, before it can be used as an array bound.
    pub fn fresh_string(&mut self, hint: &str) -> SymbolicString {
        let length = self.fresh_value(&format!("{}_len", hint), Sort::index_sort());
        let content = self.fresh_value(&format!("{}_content", hint), Sort::char_sort());
        let s = SymbolicString::new(Term::Symbol(length), content);
        self.add_axiom(Axiom::Plain(s.len_ge(Term::index(0))));
        s
    }

    pub(crate) fn add_axiom(&mut self, axiom: Axiom) {
        self.axioms.push(axiom);
    }

    /// The axioms generated so far, in generation order.
    pub fn axioms(&self) -> &AxiomLog {
        &self.axioms
    }

    /// Hands the accumulated axiom set off to the solver back end.
    pub fn into_axioms(self) -> Vec<Axiom> {
        self.axioms.into_vec()
    }

    /// Translates one library call site into axioms.
    ///
    /// Validates the argument count, the argument sorts, and the requested
    /// result sort before generating anything: a call site that fails its
    /// contract appends no axioms.
    pub fn apply(&mut self, op: Operation, args: &[Value], result_sort: Sort) -> Result<Value> {
        log::debug!("{}/{} -> {}", op, args.len(), result_sort);
        match op {
            Operation::CodePoint => {
                check_arity(op, args, 1, 1, "exactly 1")?;
                let cp = term_arg(op, args, 0)?.clone();
                // The result is a string; the requested sort names its
                // element sort.
                if result_sort != Sort::char_sort() {
                    return Err(Error::ResultSort {
                        op,
                        sort: result_sort,
                    });
                }
                Ok(Value::Str(self.encode_code_point(&cp)?))
            }
            Operation::CodePointAt => {
                check_arity(op, args, 2, 2, "exactly 2")?;
                let s = string_arg(op, args, 0)?.clone();
                let pos = term_arg(op, args, 1)?.clone();
                Ok(Value::Term(self.code_point_at(&s, &pos, result_sort)?))
            }
            Operation::CodePointBefore => {
                check_arity(op, args, 2, 2, "exactly 2")?;
                let s = string_arg(op, args, 0)?.clone();
                let pos = term_arg(op, args, 1)?.clone();
                Ok(Value::Term(self.code_point_before(&s, &pos, result_sort)?))
            }
            Operation::CodePointCount => {
                check_arity(op, args, 3, 3, "exactly 3")?;
                let s = string_arg(op, args, 0)?.clone();
                let begin = term_arg(op, args, 1)?.clone();
                let end = term_arg(op, args, 2)?.clone();
                Ok(Value::Term(
                    self.code_point_count(&s, &begin, &end, result_sort)?,
                ))
            }
            Operation::OffsetByCodePoints => {
                check_arity(op, args, 3, 3, "exactly 3")?;
                let s = string_arg(op, args, 0)?.clone();
                let index = term_arg(op, args, 1)?.clone();
                let offset = term_arg(op, args, 2)?.clone();
                Ok(Value::Term(
                    self.offset_by_code_points(&s, &index, &offset, result_sort)?,
                ))
            }
            Operation::PrefixOf => {
                check_arity(op, args, 2, 3, "2 or 3")?;
                let prefix = string_arg(op, args, 0)?.clone();
                let s = string_arg(op, args, 1)?.clone();
                let offset = if args.len() == 3 {
                    term_arg(op, args, 2)?.clone()
                } else {
                    Term::index(0)
                };
                Ok(Value::Term(self.prefix_of(&prefix, &s, &offset, result_sort)?))
            }
            Operation::SuffixOf => {
                check_arity(op, args, 2, 2, "exactly 2")?;
                let suffix = string_arg(op, args, 0)?.clone();
                let s = string_arg(op, args, 1)?.clone();
                Ok(Value::Term(self.suffix_of(&suffix, &s, result_sort)?))
            }
            Operation::IsEmpty => {
                check_arity(op, args, 1, 1, "exactly 1")?;
                let s = string_arg(op, args, 0)?.clone();
                Ok(Value::Term(self.is_empty(&s, result_sort)?))
            }
            Operation::Contains => {
                check_arity(op, args, 2, 2, "exactly 2")?;
                let s = string_arg(op, args, 0)?.clone();
                let sub = string_arg(op, args, 1)?.clone();
                Ok(Value::Term(self.contains(&s, &sub, result_sort)?))
            }
        }
    }
}

fn check_arity(
    op: Operation,
    args: &[Value],
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(Error::ArgumentCount {
            op,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn string_arg<'a>(op: Operation, args: &'a [Value], index: usize) -> Result<&'a SymbolicString> {
    match &args[index] {
        Value::Str(s) => Ok(s),
        v => Err(Error::ArgumentSort {
            op,
            index,
            expected: "a symbolic string",
            found: v.describe(),
        }),
    }
}

fn term_arg<'a>(op: Operation, args: &'a [Value], index: usize) -> Result<&'a Term> {
    match &args[index] {
        Value::Term(t) => Ok(t),
        v => Err(Error::ArgumentSort {
            op,
            index,
            expected: "a scalar term",
            found: v.describe(),
        }),
    }
}

/* Pretty Printing */

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::CodePoint => write!(f, "code_point"),
            Operation::CodePointAt => write!(f, "code_point_at"),
            Operation::CodePointBefore => write!(f, "code_point_before"),
            Operation::CodePointCount => write!(f, "code_point_count"),
            Operation::OffsetByCodePoints => write!(f, "offset_by_code_points"),
            Operation::PrefixOf => write!(f, "prefixof"),
            Operation::SuffixOf => write!(f, "suffixof"),
            Operation::IsEmpty => write!(f, "is_empty"),
            Operation::Contains => write!(f, "contains"),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Term(t) => write!(f, "{}", t),
        }
    }
}
