//! Axiom shapes and the append-only axiom log.
//!
//! Three shapes of axioms occur, represented as a closed variant so that
//! every consumer matches exhaustively:
//! - [`Axiom::Plain`]: an implication or equality between concrete terms.
//! - [`Axiom::Universal`]: a guarded bounded `forall`, the only quantifier
//!   form the downstream solver instantiates automatically.
//! - [`Axiom::NotContains`]: the witnessed negation of containment, which
//!   needs one mismatch witness per candidate start position.

use std::fmt::Display;

use crate::model::{strings::SymbolicString, terms::Term, Symbol};

/// A guarded-universal axiom:
/// `forall var in [0, bound): premise => body`.
///
/// The bound variable is scoped to this axiom only. Universally quantified
/// facts must always be expressed in this shape, never as a raw unrestricted
/// quantifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StringConstraint {
    /// The bound index variable
    pub var: Symbol,
    /// Exclusive upper bound on the index
    pub bound: Term,
    /// Guard under which the body is required to hold
    pub premise: Term,
    /// The quantified fact
    pub body: Term,
}

/// The negative containment axiom:
/// `forall s in [start_lower, start_upper): premise =>
///      exists w in [witness_lower, witness_upper): needle[w] != haystack[s + w]`.
///
/// The existential index is modeled by `witness`, an uninterpreted function
/// from start position to mismatch index: the witness for start position `s`
/// is `witness(s)`. One shared witness symbol across all start positions
/// would conflate witnesses of unrelated positions and is unsound.
#[derive(Debug, Clone, PartialEq)]
pub struct NotContainsConstraint {
    /// Inclusive lower bound on the start position
    pub start_lower: Term,
    /// Exclusive upper bound on the start position
    pub start_upper: Term,
    /// Guard under which a mismatch must exist at every start position
    pub premise: Term,
    /// Inclusive lower bound on the mismatch index
    pub witness_lower: Term,
    /// Exclusive upper bound on the mismatch index
    pub witness_upper: Term,
    /// The string searched in
    pub haystack: SymbolicString,
    /// The string searched for
    pub needle: SymbolicString,
    /// Fresh per axiom; maps each start position to its mismatch index
    pub witness: Symbol,
}

/// A logical formula added to the proof obligation set.
#[derive(Debug, Clone, PartialEq)]
pub enum Axiom {
    /// A concrete (non-quantified) fact
    Plain(Term),
    /// A guarded bounded `forall`
    Universal(StringConstraint),
    /// The doubly indexed negation of containment
    NotContains(NotContainsConstraint),
}

/// The ordered log of generated axioms, the sole output channel to the
/// solver back end. Append-only; the solver reads it once, in full, as a
/// conjunction.
#[derive(Debug, Clone, Default)]
pub struct AxiomLog {
    axioms: Vec<Axiom>,
}

impl AxiomLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an axiom. Order is preserved but carries no logical meaning;
    /// every axiom must be valid standing alone.
    pub fn push(&mut self, axiom: Axiom) {
        log::trace!("axiom: {}", axiom);
        self.axioms.push(axiom);
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Axiom> + '_ {
        self.axioms.iter()
    }

    pub fn as_slice(&self) -> &[Axiom] {
        &self.axioms
    }

    /// Hands the accumulated axioms off, in generation order.
    pub fn into_vec(self) -> Vec<Axiom> {
        self.axioms
    }
}

/* Pretty Printing */

impl Display for StringConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "forall {} in [0, {}). {} => {}",
            self.var, self.bound, self.premise, self.body
        )
    }
}

impl Display for NotContainsConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "forall s in [{}, {}). {} => exists {}(s) in [{}, {}). ({}[{}(s)] != {}[s + {}(s)])",
            self.start_lower,
            self.start_upper,
            self.premise,
            self.witness,
            self.witness_lower,
            self.witness_upper,
            self.needle.content(),
            self.witness,
            self.haystack.content(),
            self.witness
        )
    }
}

impl Display for Axiom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axiom::Plain(t) => write!(f, "{}", t),
            Axiom::Universal(c) => write!(f, "{}", c),
            Axiom::NotContains(c) => write!(f, "{}", c),
        }
    }
}

impl Display for AxiomLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, axiom) in self.axioms.iter().enumerate() {
            writeln!(f, "[{}] {}", i, axiom)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Sort, SymbolKind};

    use super::*;

    #[test]
    fn log_preserves_order() {
        let mut log = AxiomLog::new();
        log.push(Axiom::Plain(Term::Bool(true)));
        log.push(Axiom::Plain(Term::Bool(false)));
        assert_eq!(log.len(), 2);
        let axioms = log.into_vec();
        assert_eq!(axioms[0], Axiom::Plain(Term::Bool(true)));
        assert_eq!(axioms[1], Axiom::Plain(Term::Bool(false)));
    }

    #[test]
    fn universal_displays_bound_and_guard() {
        let var = Symbol::new(
            format!("{}_i_0", SymbolKind::UnivIndex.prefix()),
            Sort::index_sort(),
        );
        let c = StringConstraint {
            var: var.clone(),
            bound: Term::index(3),
            premise: Term::Bool(true),
            body: Term::eq(Term::Symbol(var), Term::index(0)),
        };
        assert_eq!(
            c.to_string(),
            "forall qv_i_0 in [0, 3). true => (qv_i_0 = 0)"
        );
    }
}
