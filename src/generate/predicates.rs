//! Axioms for string predicates: prefix, suffix, emptiness and containment
//! tests.
//!
//! Each generator introduces a fresh Boolean flag, asserts axioms that tie
//! the flag to the predicate's semantics in both polarities, and returns the
//! flag cast to the sort the call site requested. Positive polarities are
//! guarded-universal axioms; negative polarities introduce fresh witness
//! indices instead of real existential quantifiers, so the axiom set stays
//! quantifier-alternation-bounded.

use crate::{
    axioms::{Axiom, NotContainsConstraint, StringConstraint},
    error::{Error, Result},
    model::{strings::SymbolicString, terms::Term, Sort},
};

use super::{Generator, Operation};

impl Generator {
    /// Adds axioms stating that the returned value is true exactly when
    /// `prefix` occurs in `s` starting at position `offset`.
    ///
    /// - a1: `flag => |s| >= |prefix| + offset`
    /// - a2: `forall i in [0, |prefix|): flag => s[i + offset] = prefix[i]`
    /// - a3: `!flag => |s| < |prefix| + offset
    ///        \/ (0 <= w < |prefix| /\ s[w + offset] != prefix[w]
    ///            /\ |s| >= |prefix| + offset)`
    pub fn prefix_of(
        &mut self,
        prefix: &SymbolicString,
        s: &SymbolicString,
        offset: &Term,
        result_sort: Sort,
    ) -> Result<Term> {
        check_flag_sort(Operation::PrefixOf, result_sort)?;
        if !offset.sort().is_bitvec() {
            return Err(Error::ArgumentSort {
                op: Operation::PrefixOf,
                index: 2,
                expected: "a bit-vector term",
                found: format!("a term of sort {}", offset.sort()),
            });
        }

        let flag = Term::Symbol(self.fresh_flag("prefixof"));
        let shifted_len = Term::add(prefix.length().clone(), offset.clone());

        self.add_axiom(Axiom::Plain(Term::implies(
            flag.clone(),
            s.len_ge(shifted_len.clone()),
        )));

        let qvar = self.fresh_univ_index("prefixof");
        self.add_axiom(Axiom::Universal(StringConstraint {
            var: qvar.clone(),
            bound: prefix.length().clone(),
            premise: flag.clone(),
            body: Term::eq(
                s.char_at(Term::add(Term::Symbol(qvar.clone()), offset.clone())),
                prefix.char_at(Term::Symbol(qvar)),
            ),
        }));

        let witness = Term::Symbol(self.fresh_exist_index("not_prefixof"));
        let mismatch = Term::and(vec![
            Term::ge(witness.clone(), Term::index(0)),
            prefix.len_gt(witness.clone()),
            Term::neq(
                s.char_at(Term::add(witness.clone(), offset.clone())),
                prefix.char_at(witness),
            ),
        ]);
        // The length bound recurs next to the witness so the witness is
        // scoped to the region where the comparison is defined.
        let negative = Term::or(vec![
            Term::not(s.len_ge(shifted_len.clone())),
            Term::and(vec![mismatch, s.len_ge(shifted_len)]),
        ]);
        self.add_axiom(Axiom::Plain(Term::implies(
            Term::not(flag.clone()),
            negative,
        )));

        Ok(Term::cast(flag, result_sort))
    }

    /// Adds axioms stating that the returned value is true exactly when
    /// `suffix` ends `s`. Aligned from the end of the string:
    ///
    /// - a1: `flag => |s| >= |suffix|`
    /// - a2: `forall i in [0, |suffix|): flag => suffix[i] = s[i + |s| - |suffix|]`
    /// - a3: `!flag => |suffix| > |s|
    ///        \/ (suffix[w] != s[w + |s| - |suffix|] /\ 0 <= w < |suffix|)`
    pub fn suffix_of(
        &mut self,
        suffix: &SymbolicString,
        s: &SymbolicString,
        result_sort: Sort,
    ) -> Result<Term> {
        check_flag_sort(Operation::SuffixOf, result_sort)?;

        let flag = Term::Symbol(self.fresh_flag("suffixof"));
        let shift = Term::sub(s.length().clone(), suffix.length().clone());

        self.add_axiom(Axiom::Plain(Term::implies(
            flag.clone(),
            s.len_ge(suffix.length().clone()),
        )));

        let qvar = self.fresh_univ_index("suffixof");
        self.add_axiom(Axiom::Universal(StringConstraint {
            var: qvar.clone(),
            bound: suffix.length().clone(),
            premise: flag.clone(),
            body: Term::eq(
                suffix.char_at(Term::Symbol(qvar.clone())),
                s.char_at(Term::add(Term::Symbol(qvar), shift.clone())),
            ),
        }));

        let witness = Term::Symbol(self.fresh_exist_index("not_suffixof"));
        let negative = Term::or(vec![
            suffix.len_gt(s.length().clone()),
            Term::and(vec![
                Term::neq(
                    suffix.char_at(witness.clone()),
                    s.char_at(Term::add(witness.clone(), shift)),
                ),
                suffix.len_gt(witness.clone()),
                Term::ge(witness, Term::index(0)),
            ]),
        ]);
        self.add_axiom(Axiom::Plain(Term::implies(
            Term::not(flag.clone()),
            negative,
        )));

        Ok(Term::cast(flag, result_sort))
    }

    /// Adds axioms stating that the returned value is true exactly when `s`
    /// is empty, as two implications:
    ///
    /// - a1: `flag => |s| = 0`
    /// - a2: `|s| = 0 => flag`
    pub fn is_empty(&mut self, s: &SymbolicString, result_sort: Sort) -> Result<Term> {
        check_flag_sort(Operation::IsEmpty, result_sort)?;

        let flag = Term::Symbol(self.fresh_flag("is_empty"));
        self.add_axiom(Axiom::Plain(Term::implies(
            flag.clone(),
            s.len_eq(Term::index(0)),
        )));
        self.add_axiom(Axiom::Plain(Term::implies(
            s.len_eq(Term::index(0)),
            flag.clone(),
        )));
        Ok(Term::cast(flag, result_sort))
    }

    /// Adds axioms stating that the returned value is true exactly when
    /// `sub` occurs in `s`.
    ///
    /// - a1: `flag => |s| >= |sub|`
    /// - a2: `flag => 0 <= startpos <= |s| - |sub|` for a fresh start index
    /// - a3: `forall i in [0, |sub|): flag => sub[i] = s[i + startpos]`
    /// - a4: `forall p in [0, |s| - |sub| + 1):
    ///           (!flag /\ |s| >= |sub|) =>
    ///               exists w(p) in [0, |sub|): sub[w(p)] != s[p + w(p)]`
    ///
    /// The a4 witness varies with the start position: different start
    /// positions generally mismatch at different offsets, so the axiom
    /// carries a fresh uninterpreted witness function instead of one shared
    /// witness symbol.
    pub fn contains(
        &mut self,
        s: &SymbolicString,
        sub: &SymbolicString,
        result_sort: Sort,
    ) -> Result<Term> {
        check_flag_sort(Operation::Contains, result_sort)?;
        log::trace!("contains({}, {})", s, sub);

        let flag = Term::Symbol(self.fresh_flag("contains"));
        self.add_axiom(Axiom::Plain(Term::implies(
            flag.clone(),
            s.len_ge(sub.length().clone()),
        )));

        let startpos = Term::Symbol(self.fresh_exist_index("startpos_contains"));
        let length_diff = Term::sub(s.length().clone(), sub.length().clone());
        self.add_axiom(Axiom::Plain(Term::implies(
            flag.clone(),
            Term::and(vec![
                Term::ge(startpos.clone(), Term::index(0)),
                Term::le(startpos.clone(), length_diff.clone()),
            ]),
        )));

        let qvar = self.fresh_univ_index("contains");
        self.add_axiom(Axiom::Universal(StringConstraint {
            var: qvar.clone(),
            bound: sub.length().clone(),
            premise: flag.clone(),
            body: Term::eq(
                sub.char_at(Term::Symbol(qvar.clone())),
                s.char_at(Term::add(Term::Symbol(qvar), startpos)),
            ),
        }));

        let witness = self.fresh_witness_fn("not_contains");
        self.add_axiom(Axiom::NotContains(NotContainsConstraint {
            start_lower: Term::index(0),
            start_upper: Term::add(Term::index(1), length_diff),
            premise: Term::and(vec![
                Term::not(flag.clone()),
                s.len_ge(sub.length().clone()),
            ]),
            witness_lower: Term::index(0),
            witness_upper: sub.length().clone(),
            haystack: s.clone(),
            needle: sub.clone(),
            witness,
        }));

        Ok(Term::cast(flag, result_sort))
    }
}

fn check_flag_sort(op: Operation, result_sort: Sort) -> Result<()> {
    if !result_sort.holds_boolean() {
        return Err(Error::ResultSort {
            op,
            sort: result_sort,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::eval::Assignment;
    use crate::model::Symbol;

    use super::*;

    /// Binds a concrete string and returns the flag symbol of the term a
    /// predicate generator returned.
    fn flag_symbol(t: &Term) -> Symbol {
        match t {
            Term::Symbol(sym) => sym.clone(),
            Term::Cast(inner, _) => flag_symbol(inner),
            t => panic!("expected a flag, got {}", t),
        }
    }

    fn all_hold(gen: &Generator, env: &Assignment) -> bool {
        gen.axioms().iter().all(|a| a.holds(env) == Some(true))
    }

    fn some_fails(gen: &Generator, env: &Assignment) -> bool {
        gen.axioms().iter().any(|a| a.holds(env) == Some(false))
    }

    #[test]
    fn is_empty_holds_for_empty_string() {
        let mut gen = Generator::new();
        let s = gen.fresh_string("s");
        let flag = gen.is_empty(&s, Sort::Bool).unwrap();
        let flag = flag_symbol(&flag);

        let mut env = Assignment::new();
        env.bind_string(&s, "");
        env.set_bool(&flag, true);
        assert!(all_hold(&gen, &env));

        let mut env = Assignment::new();
        env.bind_string(&s, "");
        env.set_bool(&flag, false);
        assert!(some_fails(&gen, &env));
    }

    #[test]
    fn is_empty_fails_for_nonempty_string() {
        let mut gen = Generator::new();
        let s = gen.fresh_string("s");
        let flag = gen.is_empty(&s, Sort::Bool).unwrap();
        let flag = flag_symbol(&flag);

        let mut env = Assignment::new();
        env.bind_string(&s, "a");
        env.set_bool(&flag, false);
        assert!(all_hold(&gen, &env));

        let mut env = Assignment::new();
        env.bind_string(&s, "a");
        env.set_bool(&flag, true);
        assert!(some_fails(&gen, &env));
    }

    #[test]
    fn prefix_flag_is_cast_to_requested_sort() {
        let mut gen = Generator::new();
        let p = gen.fresh_string("p");
        let s = gen.fresh_string("s");
        let t = gen
            .prefix_of(&p, &s, &Term::index(0), Sort::unsigned(8))
            .unwrap();
        assert_eq!(t.sort(), Sort::unsigned(8));
        assert!(matches!(t, Term::Cast(_, _)));
    }

    #[test]
    fn predicates_reject_signed_result_sorts() {
        let mut gen = Generator::new();
        let s = gen.fresh_string("s");
        let before = gen.axioms().len();
        let err = gen.is_empty(&s, Sort::index_sort()).unwrap_err();
        assert_eq!(
            err,
            Error::ResultSort {
                op: Operation::IsEmpty,
                sort: Sort::index_sort()
            }
        );
        assert_eq!(gen.axioms().len(), before);
    }

    #[test]
    fn prefix_of_with_offset() {
        let mut gen = Generator::new();
        let p = gen.fresh_string("p");
        let s = gen.fresh_string("s");
        let flag = gen.prefix_of(&p, &s, &Term::index(2), Sort::Bool).unwrap();
        let flag = flag_symbol(&flag);

        let mut env = Assignment::new();
        env.bind_string(&p, "ll");
        env.bind_string(&s, "hello");
        env.set_bool(&flag, true);
        assert!(all_hold(&gen, &env));
    }

    #[test]
    fn negative_prefix_needs_a_witness() {
        let mut gen = Generator::new();
        let p = gen.fresh_string("p");
        let s = gen.fresh_string("s");
        let flag = gen.prefix_of(&p, &s, &Term::index(0), Sort::Bool).unwrap();
        let flag = flag_symbol(&flag);
        let witness = Symbol::new("ev_not_prefixof_6".to_string(), Sort::index_sort());
        assert!(gen
            .axioms()
            .iter()
            .any(|a| format!("{}", a).contains(witness.name())));

        // "he" really is a prefix of "hello": no witness value admits the
        // false flag.
        for w in 0..2 {
            let mut env = Assignment::new();
            env.bind_string(&p, "he");
            env.bind_string(&s, "hello");
            env.set_bool(&flag, false);
            env.set_int(&witness, w);
            assert!(some_fails(&gen, &env));
        }

        // "eh" is not: witness 0 exhibits the mismatch.
        let mut env = Assignment::new();
        env.bind_string(&p, "eh");
        env.bind_string(&s, "hello");
        env.set_bool(&flag, false);
        env.set_int(&witness, 0);
        assert!(all_hold(&gen, &env));
    }

    #[test]
    fn suffix_negative_by_length() {
        let mut gen = Generator::new();
        let suf = gen.fresh_string("suf");
        let s = gen.fresh_string("s");
        let flag = gen.suffix_of(&suf, &s, Sort::Bool).unwrap();
        let flag = flag_symbol(&flag);

        // The suffix candidate is longer than the string; the false flag is
        // admissible without any witness binding.
        let mut env = Assignment::new();
        env.bind_string(&suf, "hello world");
        env.bind_string(&s, "lo");
        env.set_bool(&flag, false);
        assert!(all_hold(&gen, &env));
    }
}
