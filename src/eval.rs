//! Concrete evaluation of terms and axioms under a (possibly partial)
//! assignment.
//!
//! Evaluation is three valued: `Some(true)` / `Some(false)` when the
//! assignment determines the value, `None` when it depends on missing
//! bindings (unbound symbols, out-of-range selections, applications of
//! uninterpreted functions). Quantified axioms are checked by bounded
//! instantiation, which is possible exactly because every bound in the
//! system is a term the assignment can evaluate. This is the crate's model
//! checker: the test suite uses it to decide whether a candidate assignment
//! is admitted by a generated axiom set.

use std::fmt::Display;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::{
    axioms::{Axiom, NotContainsConstraint, StringConstraint},
    model::{
        strings::SymbolicString,
        terms::{ArithOp, CmpOp, Term},
        Sort, Symbol,
    },
};

/// UTF-16 code units of one concrete string.
pub type Units = SmallVec<[u16; 8]>;

/// A concrete scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstVal {
    Bool(bool),
    Int(i64),
}

impl ConstVal {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            ConstVal::Bool(b) => Some(b),
            ConstVal::Int(_) => None,
        }
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            ConstVal::Bool(_) => None,
            ConstVal::Int(i) => Some(i),
        }
    }
}

/// An assignment of concrete values to symbols, keyed by symbol name.
/// String content accessors map to code-unit vectors; everything else maps
/// to scalar values.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    strings: IndexMap<String, Units>,
    values: IndexMap<String, ConstVal>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns concrete code units to a string content accessor.
    pub fn set_units(&mut self, content: &Symbol, units: &[u16]) {
        self.strings
            .insert(content.name().to_string(), units.iter().copied().collect());
    }

    /// Assigns a scalar value to a symbol.
    pub fn set_int(&mut self, sym: &Symbol, value: i64) {
        self.values
            .insert(sym.name().to_string(), ConstVal::Int(value));
    }

    /// Assigns a truth value to a symbol.
    pub fn set_bool(&mut self, sym: &Symbol, value: bool) {
        self.values
            .insert(sym.name().to_string(), ConstVal::Bool(value));
    }

    /// Binds a symbolic string to a concrete literal: assigns the UTF-16
    /// encoding of `value` to the content accessor and, if the string's
    /// length is itself a symbol, the unit count to that symbol.
    pub fn bind_string(&mut self, s: &SymbolicString, value: &str) {
        let units: Units = value.encode_utf16().collect();
        if let Term::Symbol(len) = s.length() {
            self.set_int(len, units.len() as i64);
        }
        self.strings.insert(s.content().name().to_string(), units);
    }

    pub fn get(&self, name: &str) -> Option<ConstVal> {
        self.values.get(name).copied()
    }

    pub fn units(&self, name: &str) -> Option<&Units> {
        self.strings.get(name)
    }

    /// The code unit of string `name` at position `index`, if assigned and
    /// in range.
    fn unit(&self, name: &str, index: i64) -> Option<u16> {
        let units = self.units(name)?;
        if index < 0 || index as usize >= units.len() {
            None
        } else {
            Some(units[index as usize])
        }
    }

    /// A copy of this assignment with `sym` bound to `value`, used for
    /// quantifier instantiation.
    fn bind(&self, sym: &Symbol, value: i64) -> Self {
        let mut bound = self.clone();
        bound.set_int(sym, value);
        bound
    }
}

impl Term {
    /// Evaluates this term under the given assignment.
    /// Returns `None` if the value depends on missing bindings.
    pub fn evaluate(&self, env: &Assignment) -> Option<ConstVal> {
        match self {
            Term::Bool(b) => Some(ConstVal::Bool(*b)),
            Term::Const { value, .. } => Some(ConstVal::Int(*value)),
            Term::Symbol(sym) => env.get(sym.name()),
            Term::CharAt { content, index } => {
                let i = index.evaluate(env)?.as_int()?;
                env.unit(content.name(), i).map(|u| ConstVal::Int(u as i64))
            }
            // Uninterpreted; axiom-level checking enumerates the candidates
            // instead of consulting an interpretation.
            Term::App { .. } => None,
            Term::Not(t) => Some(ConstVal::Bool(!t.evaluate(env)?.as_bool()?)),
            Term::And(ts) => ts
                .iter()
                .map(|t| t.evaluate(env).and_then(ConstVal::as_bool))
                .fold(Some(true), and3)
                .map(ConstVal::Bool),
            Term::Or(ts) => ts
                .iter()
                .map(|t| t.evaluate(env).and_then(ConstVal::as_bool))
                .fold(Some(false), or3)
                .map(ConstVal::Bool),
            Term::Implies(p, q) => {
                let p = p.evaluate(env).and_then(ConstVal::as_bool);
                let q = q.evaluate(env).and_then(ConstVal::as_bool);
                imp3(p, q).map(ConstVal::Bool)
            }
            Term::Eq(lhs, rhs) => {
                let eq = match (lhs.evaluate(env)?, rhs.evaluate(env)?) {
                    (ConstVal::Bool(a), ConstVal::Bool(b)) => a == b,
                    (ConstVal::Int(a), ConstVal::Int(b)) => a == b,
                    _ => return None,
                };
                Some(ConstVal::Bool(eq))
            }
            Term::Cmp(op, lhs, rhs) => {
                let a = lhs.evaluate(env)?.as_int()?;
                let b = rhs.evaluate(env)?.as_int()?;
                let res = match op {
                    CmpOp::Le => a <= b,
                    CmpOp::Lt => a < b,
                    CmpOp::Ge => a >= b,
                    CmpOp::Gt => a > b,
                };
                Some(ConstVal::Bool(res))
            }
            Term::Arith(op, lhs, rhs) => {
                let a = lhs.evaluate(env)?.as_int()?;
                let b = rhs.evaluate(env)?.as_int()?;
                let raw = match op {
                    ArithOp::Add => a.checked_add(b)?,
                    ArithOp::Sub => a.checked_sub(b)?,
                    ArithOp::Mul => a.checked_mul(b)?,
                    // Truncation towards zero, as for bit-vector division
                    ArithOp::Div => a.checked_div(b)?,
                    ArithOp::Mod => a.checked_rem(b)?,
                };
                let sort = self.sort();
                if !sort.is_bitvec() {
                    return None;
                }
                Some(ConstVal::Int(sort.normalize(raw)))
            }
            Term::Cast(t, sort) => match (t.evaluate(env)?, sort) {
                (ConstVal::Bool(b), Sort::Bool) => Some(ConstVal::Bool(b)),
                (ConstVal::Bool(b), Sort::BitVec { .. }) => Some(ConstVal::Int(b as i64)),
                (ConstVal::Int(v), Sort::Bool) => Some(ConstVal::Bool(v != 0)),
                (ConstVal::Int(v), Sort::BitVec { .. }) => Some(ConstVal::Int(sort.normalize(v))),
            },
        }
    }
}

impl Axiom {
    /// Checks whether this axiom holds under the given assignment.
    pub fn holds(&self, env: &Assignment) -> Option<bool> {
        match self {
            Axiom::Plain(t) => t.evaluate(env).and_then(ConstVal::as_bool),
            Axiom::Universal(c) => c.holds(env),
            Axiom::NotContains(c) => c.holds(env),
        }
    }
}

impl StringConstraint {
    /// Bounded instantiation: conjoins `premise => body` for every value of
    /// the bound variable in `[0, bound)`.
    pub fn holds(&self, env: &Assignment) -> Option<bool> {
        let bound = self.bound.evaluate(env)?.as_int()?;
        let mut result = Some(true);
        for i in 0..bound.max(0) {
            let local = env.bind(&self.var, i);
            let premise = self.premise.evaluate(&local).and_then(ConstVal::as_bool);
            let body = self.body.evaluate(&local).and_then(ConstVal::as_bool);
            result = and3(result, imp3(premise, body));
            if result == Some(false) {
                break;
            }
        }
        result
    }
}

impl NotContainsConstraint {
    /// Bounded instantiation of the intended semantics: for every start
    /// position in range, if the premise holds some mismatch index must
    /// exist. The witness function is not consulted; its candidates are
    /// enumerated.
    pub fn holds(&self, env: &Assignment) -> Option<bool> {
        let start_lower = self.start_lower.evaluate(env)?.as_int()?;
        let start_upper = self.start_upper.evaluate(env)?.as_int()?;
        let witness_lower = self.witness_lower.evaluate(env)?.as_int()?;
        let witness_upper = self.witness_upper.evaluate(env)?.as_int()?;
        let premise = self.premise.evaluate(env).and_then(ConstVal::as_bool);

        let mut result = Some(true);
        for start in start_lower..start_upper.max(start_lower) {
            let mut mismatch = Some(false);
            for w in witness_lower..witness_upper.max(witness_lower) {
                let needle_unit = env.unit(self.needle.content().name(), w);
                let haystack_unit = env.unit(self.haystack.content().name(), start + w);
                let differs = match (needle_unit, haystack_unit) {
                    (Some(n), Some(h)) => Some(n != h),
                    _ => None,
                };
                mismatch = or3(mismatch, differs);
                if mismatch == Some(true) {
                    break;
                }
            }
            result = and3(result, imp3(premise, mismatch));
            if result == Some(false) {
                break;
            }
        }
        result
    }
}

fn and3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn or3(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn imp3(p: Option<bool>, q: Option<bool>) -> Option<bool> {
    or3(p.map(|b| !b), q)
}

/* Pretty Printing */

impl Display for ConstVal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstVal::Bool(b) => write!(f, "{}", b),
            ConstVal::Int(i) => write!(f, "{}", i),
        }
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (name, units) in self.strings.iter() {
            let text: String = char::decode_utf16(units.iter().copied())
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect();
            write!(f, "{}: \"{}\", ", name, text)?;
        }
        for (name, val) in self.values.iter() {
            write!(f, "{}: {}, ", name, val)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str, sort: Sort) -> Symbol {
        Symbol::new(name.to_string(), sort)
    }

    #[test]
    fn unbound_symbol_is_unknown() {
        let t = Term::Symbol(sym("x", Sort::Bool));
        assert_eq!(t.evaluate(&Assignment::new()), None);
    }

    #[test]
    fn three_valued_connectives_short_circuit() {
        let unknown = Term::Symbol(sym("x", Sort::Bool));
        let and = Term::And(vec![Term::Bool(false), unknown.clone()]);
        assert_eq!(and.evaluate(&Assignment::new()), Some(ConstVal::Bool(false)));
        let or = Term::Or(vec![Term::Bool(true), unknown.clone()]);
        assert_eq!(or.evaluate(&Assignment::new()), Some(ConstVal::Bool(true)));
        let open = Term::And(vec![Term::Bool(true), unknown]);
        assert_eq!(open.evaluate(&Assignment::new()), None);
    }

    #[test]
    fn implication_with_false_premise_is_true() {
        let unknown = Term::Symbol(sym("x", Sort::Bool));
        let t = Term::implies(Term::Bool(false), unknown);
        assert_eq!(t.evaluate(&Assignment::new()), Some(ConstVal::Bool(true)));
    }

    #[test]
    fn char_at_out_of_range_is_unknown() {
        let content = sym("s_content", Sort::char_sort());
        let mut env = Assignment::new();
        env.set_units(&content, &[0x61, 0x62]);
        let in_range = Term::CharAt {
            content: content.clone(),
            index: Box::new(Term::index(1)),
        };
        assert_eq!(in_range.evaluate(&env), Some(ConstVal::Int(0x62)));
        let out_of_range = Term::CharAt {
            content,
            index: Box::new(Term::index(2)),
        };
        assert_eq!(out_of_range.evaluate(&env), None);
    }

    #[test]
    fn division_by_zero_is_unknown() {
        let t = Term::div(Term::index(1), Term::index(0));
        assert_eq!(t.evaluate(&Assignment::new()), None);
    }

    #[test]
    fn arithmetic_truncates_towards_zero() {
        let t = Term::div(Term::index(-7), Term::index(2));
        assert_eq!(t.evaluate(&Assignment::new()), Some(ConstVal::Int(-3)));
        let t = Term::modulo(Term::index(7), Term::index(4));
        assert_eq!(t.evaluate(&Assignment::new()), Some(ConstVal::Int(3)));
    }

    #[test]
    fn cast_adjusts_sorts() {
        let to_byte = Term::Cast(Box::new(Term::Bool(true)), Sort::unsigned(8));
        assert_eq!(
            to_byte.evaluate(&Assignment::new()),
            Some(ConstVal::Int(1))
        );
        let to_bool = Term::Cast(Box::new(Term::index(3)), Sort::Bool);
        assert_eq!(
            to_bool.evaluate(&Assignment::new()),
            Some(ConstVal::Bool(true))
        );
    }

    #[test]
    fn universal_instantiates_over_the_bound() {
        let var = sym("qv_i_0", Sort::index_sort());
        let content = sym("s_content", Sort::char_sort());
        let mut env = Assignment::new();
        env.set_units(&content, &[0x61, 0x61, 0x61]);

        // Every unit below the bound equals 'a'.
        let all_a = StringConstraint {
            var: var.clone(),
            bound: Term::index(3),
            premise: Term::Bool(true),
            body: Term::eq(
                Term::CharAt {
                    content: content.clone(),
                    index: Box::new(Term::Symbol(var.clone())),
                },
                Term::char_unit(0x61),
            ),
        };
        assert_eq!(all_a.holds(&env), Some(true));

        let all_b = StringConstraint {
            var: var.clone(),
            bound: Term::index(3),
            premise: Term::Bool(true),
            body: Term::eq(
                Term::CharAt {
                    content,
                    index: Box::new(Term::Symbol(var)),
                },
                Term::char_unit(0x62),
            ),
        };
        assert_eq!(all_b.holds(&env), Some(false));
    }

    #[test]
    fn empty_universal_holds_vacuously() {
        let var = sym("qv_i_0", Sort::index_sort());
        let c = StringConstraint {
            var,
            bound: Term::index(0),
            premise: Term::Bool(true),
            body: Term::Bool(false),
        };
        assert_eq!(c.holds(&Assignment::new()), Some(true));
    }
}
