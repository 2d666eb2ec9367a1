//! The symbolic string representation.

use std::fmt::Display;

use super::{terms::Term, Symbol};

/// A string under analysis, represented by its symbolic length and a content
/// accessor mapping indices to UTF-16 code units.
///
/// Symbolic strings are never mutated: every operation produces a new string
/// or scalar value plus axioms relating it to its inputs. Two strings share a
/// content accessor only if they are the same logical string.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicString {
    length: Term,
    content: Symbol,
}

impl SymbolicString {
    /// Creates a string from a length term and a content accessor symbol.
    ///
    /// The caller is responsible for constraining `length` non-negative
    /// before it is used as an array bound; strings created through
    /// [`Generator::fresh_string`](crate::Generator::fresh_string) already
    /// carry that axiom.
    pub fn new(length: Term, content: Symbol) -> Self {
        Self { length, content }
    }

    pub fn length(&self) -> &Term {
        &self.length
    }

    pub fn content(&self) -> &Symbol {
        &self.content
    }

    /// The code unit at the given index.
    pub fn char_at(&self, index: Term) -> Term {
        Term::CharAt {
            content: self.content.clone(),
            index: Box::new(index),
        }
    }

    /// The formula `|self| = n`. Pure builder, no accumulator side effect.
    pub fn len_eq(&self, n: Term) -> Term {
        Term::eq(self.length.clone(), n)
    }

    /// The formula `|self| >= n`. Pure builder, no accumulator side effect.
    pub fn len_ge(&self, n: Term) -> Term {
        Term::ge(self.length.clone(), n)
    }

    /// The formula `|self| > n`. Pure builder, no accumulator side effect.
    pub fn len_gt(&self, n: Term) -> Term {
        Term::gt(self.length.clone(), n)
    }
}

impl Display for SymbolicString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(|{}|)", self.content, self.length)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::Sort;

    use super::*;

    fn string(name: &str) -> SymbolicString {
        let content = Symbol::new(format!("{}_content", name), Sort::char_sort());
        let length = Term::Symbol(Symbol::new(format!("{}_len", name), Sort::index_sort()));
        SymbolicString::new(length, content)
    }

    #[test]
    fn char_at_selects_from_content() {
        let s = string("s");
        let t = s.char_at(Term::index(3));
        match t {
            Term::CharAt { content, index } => {
                assert_eq!(&content, s.content());
                assert_eq!(*index, Term::index(3));
            }
            _ => panic!("expected a selection, got {}", t),
        }
    }

    #[test]
    fn length_builders_are_pure() {
        let s = string("s");
        assert_eq!(
            s.len_eq(Term::index(0)),
            Term::eq(s.length().clone(), Term::index(0))
        );
        assert_eq!(
            s.len_ge(Term::index(2)),
            Term::ge(s.length().clone(), Term::index(2))
        );
        assert_eq!(
            s.len_gt(Term::index(2)),
            Term::gt(s.length().clone(), Term::index(2))
        );
    }

    #[test]
    fn char_at_has_char_sort() {
        let s = string("s");
        assert_eq!(s.char_at(Term::index(0)).sort(), Sort::char_sort());
    }
}
