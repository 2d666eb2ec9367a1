//! Axioms for operations dealing with Unicode code points.
//!
//! Strings are sequences of UTF-16 code units; a code point is held by one
//! unit if it is below `0x10000` and by a surrogate pair otherwise. See
//! <https://en.wikipedia.org/wiki/UTF-16> for the encoding.

use crate::{
    axioms::Axiom,
    error::{Error, Result},
    model::{strings::SymbolicString, terms::Term, Sort},
};

use super::{Generator, Operation};

const SUPPLEMENTARY_BASE: i64 = 0x01_0000;
const HIGH_SURROGATE_FIRST: i64 = 0xD800;
const HIGH_SURROGATE_LAST: i64 = 0xDBFF;
const LOW_SURROGATE_FIRST: i64 = 0xDC00;
const LOW_SURROGATE_LAST: i64 = 0xDFFF;
const SURROGATE_OFFSET_DIV: i64 = 0x0400;
const HIGH_SURROGATE_MASK: i64 = 0x0800;

/// The formula stating that `unit` is a high surrogate, i.e. lies in
/// `0xD800..=0xDBFF`. Pure builder.
pub fn is_high_surrogate(unit: &Term) -> Term {
    let sort = unit.sort();
    Term::and(vec![
        Term::ge(unit.clone(), Term::bv(HIGH_SURROGATE_FIRST, sort)),
        Term::le(unit.clone(), Term::bv(HIGH_SURROGATE_LAST, sort)),
    ])
}

/// The formula stating that `unit` is a low surrogate, i.e. lies in
/// `0xDC00..=0xDFFF`. Pure builder; the range is disjoint from the high
/// surrogate range.
pub fn is_low_surrogate(unit: &Term) -> Term {
    let sort = unit.sort();
    Term::and(vec![
        Term::ge(unit.clone(), Term::bv(LOW_SURROGATE_FIRST, sort)),
        Term::le(unit.clone(), Term::bv(LOW_SURROGATE_LAST, sort)),
    ])
}

/// The code point encoded by the surrogate pair `(unit0, unit1)`:
/// `0x10000 + (unit0 mod 0x800) * 0x400 + unit1 mod 0x400`.
/// Both units must already be of sort `sort`. Pure builder.
pub fn pair_value(unit0: Term, unit1: Term, sort: Sort) -> Term {
    let m1 = Term::mul(
        Term::modulo(unit0, Term::bv(HIGH_SURROGATE_MASK, sort)),
        Term::bv(SURROGATE_OFFSET_DIV, sort),
    );
    let m2 = Term::modulo(unit1, Term::bv(SURROGATE_OFFSET_DIV, sort));
    Term::add(
        Term::bv(SUPPLEMENTARY_BASE, sort),
        Term::add(m1, m2),
    )
}

impl Generator {
    /// Adds axioms for the conversion of a code point into a UTF-16 string.
    ///
    /// The result has length 1 with its single unit equal to `cp` when
    /// `cp < 0x10000`, and length 2 holding the surrogate pair otherwise.
    /// Both branches are always asserted, each guarded on `cp < 0x10000`;
    /// for a concrete code point exactly one of them is satisfiable.
    pub fn encode_code_point(&mut self, cp: &Term) -> Result<SymbolicString> {
        let sort = cp.sort();
        if !sort.is_signed_bitvec() {
            return Err(Error::ArgumentSort {
                op: Operation::CodePoint,
                index: 0,
                expected: "a signed bit-vector term",
                found: format!("a term of sort {}", sort),
            });
        }
        log::trace!("encode_code_point({})", cp);

        let res = self.fresh_string("code_point");
        let char_sort = Sort::char_sort();
        let small = Term::lt(cp.clone(), Term::bv(SUPPLEMENTARY_BASE, sort));

        self.add_axiom(Axiom::Plain(Term::implies(
            small.clone(),
            res.len_eq(Term::index(1)),
        )));
        self.add_axiom(Axiom::Plain(Term::implies(
            Term::not(small.clone()),
            res.len_eq(Term::index(2)),
        )));
        self.add_axiom(Axiom::Plain(Term::implies(
            small.clone(),
            Term::eq(
                res.char_at(Term::index(0)),
                Term::cast(cp.clone(), char_sort),
            ),
        )));

        let unit0 = Term::add(
            Term::bv(HIGH_SURROGATE_FIRST, sort),
            Term::div(
                Term::sub(cp.clone(), Term::bv(SUPPLEMENTARY_BASE, sort)),
                Term::bv(SURROGATE_OFFSET_DIV, sort),
            ),
        );
        self.add_axiom(Axiom::Plain(Term::implies(
            Term::not(small.clone()),
            Term::eq(res.char_at(Term::index(0)), Term::cast(unit0, char_sort)),
        )));

        // The second unit reduces the undiminished code point; 0x10000 is a
        // multiple of 0x400, so this equals (cp - 0x10000) mod 0x400.
        let unit1 = Term::add(
            Term::bv(LOW_SURROGATE_FIRST, sort),
            Term::modulo(cp.clone(), Term::bv(SURROGATE_OFFSET_DIV, sort)),
        );
        self.add_axiom(Axiom::Plain(Term::implies(
            Term::not(small),
            Term::eq(res.char_at(Term::index(1)), Term::cast(unit1, char_sort)),
        )));

        Ok(res)
    }

    /// Adds axioms for decoding the code point starting at `pos`.
    ///
    /// If `s[pos]` is a high surrogate followed by a low surrogate the result
    /// is the pair value; otherwise it is `s[pos]` widened to the result
    /// sort. Exactly one of the two implications fires in a concrete model.
    pub fn code_point_at(
        &mut self,
        s: &SymbolicString,
        pos: &Term,
        result_sort: Sort,
    ) -> Result<Term> {
        check_decode_sorts(Operation::CodePointAt, pos, result_sort)?;
        let result = Term::Symbol(self.fresh_value("cp_at", result_sort));

        let unit0 = s.char_at(pos.clone());
        let unit1 = s.char_at(Term::add(pos.clone(), Term::bv(1, pos.sort())));
        let unit0_wide = Term::cast(unit0.clone(), result_sort);
        let unit1_wide = Term::cast(unit1.clone(), result_sort);
        let pair = pair_value(unit0_wide.clone(), unit1_wide, result_sort);
        let is_pair = Term::and(vec![is_high_surrogate(&unit0), is_low_surrogate(&unit1)]);

        self.add_axiom(Axiom::Plain(Term::implies(
            is_pair.clone(),
            Term::eq(result.clone(), pair),
        )));
        self.add_axiom(Axiom::Plain(Term::implies(
            Term::not(is_pair),
            Term::eq(result.clone(), unit0_wide),
        )));
        Ok(result)
    }

    /// Adds axioms for decoding the code point that ends right before `pos`,
    /// inspecting `s[pos-2]` and `s[pos-1]`. The fallback result is the
    /// second unit widened.
    pub fn code_point_before(
        &mut self,
        s: &SymbolicString,
        pos: &Term,
        result_sort: Sort,
    ) -> Result<Term> {
        check_decode_sorts(Operation::CodePointBefore, pos, result_sort)?;
        let result = Term::Symbol(self.fresh_value("cp_before", result_sort));

        let unit0 = s.char_at(Term::sub(pos.clone(), Term::bv(2, pos.sort())));
        let unit1 = s.char_at(Term::sub(pos.clone(), Term::bv(1, pos.sort())));
        let unit0_wide = Term::cast(unit0.clone(), result_sort);
        let unit1_wide = Term::cast(unit1.clone(), result_sort);
        let pair = pair_value(unit0_wide, unit1_wide.clone(), result_sort);
        let is_pair = Term::and(vec![is_high_surrogate(&unit0), is_low_surrogate(&unit1)]);

        self.add_axiom(Axiom::Plain(Term::implies(
            is_pair.clone(),
            Term::eq(result.clone(), pair),
        )));
        self.add_axiom(Axiom::Plain(Term::implies(
            Term::not(is_pair),
            Term::eq(result.clone(), unit1_wide),
        )));
        Ok(result)
    }

    /// Adds approximate bounds on the number of code points in
    /// `[begin, end)`. Exact semantics would need an unbounded scan, so only
    /// `(end - begin) div 2 <= result <= end - begin` is asserted; any value
    /// within the bounds is an accepted witness. The string content is not
    /// inspected.
    pub fn code_point_count(
        &mut self,
        _s: &SymbolicString,
        begin: &Term,
        end: &Term,
        result_sort: Sort,
    ) -> Result<Term> {
        if !result_sort.is_signed_bitvec() {
            return Err(Error::ResultSort {
                op: Operation::CodePointCount,
                sort: result_sort,
            });
        }
        let result = Term::Symbol(self.fresh_value("cp_count", result_sort));
        let length = Term::sub(end.clone(), begin.clone());
        let minimum = Term::div(length.clone(), Term::bv(2, end.sort()));
        self.add_axiom(Axiom::Plain(Term::le(result.clone(), length)));
        self.add_axiom(Axiom::Plain(Term::ge(result.clone(), minimum)));
        Ok(result)
    }

    /// Adds approximate bounds on the index reached by advancing `offset`
    /// code points from `index`:
    /// `index + offset <= result <= index + 2 * offset`. The string content
    /// is not inspected.
    pub fn offset_by_code_points(
        &mut self,
        _s: &SymbolicString,
        index: &Term,
        offset: &Term,
        result_sort: Sort,
    ) -> Result<Term> {
        if !result_sort.is_signed_bitvec() {
            return Err(Error::ResultSort {
                op: Operation::OffsetByCodePoints,
                sort: result_sort,
            });
        }
        let result = Term::Symbol(self.fresh_value("cp_offset", result_sort));
        let minimum = Term::add(index.clone(), offset.clone());
        let maximum = Term::add(
            index.clone(),
            Term::add(offset.clone(), offset.clone()),
        );
        self.add_axiom(Axiom::Plain(Term::le(result.clone(), maximum)));
        self.add_axiom(Axiom::Plain(Term::ge(result.clone(), minimum)));
        Ok(result)
    }
}

fn check_decode_sorts(op: Operation, pos: &Term, result_sort: Sort) -> Result<()> {
    if !result_sort.is_signed_bitvec() {
        return Err(Error::ResultSort {
            op,
            sort: result_sort,
        });
    }
    if !pos.sort().is_bitvec() {
        return Err(Error::ArgumentSort {
            op,
            index: 1,
            expected: "a bit-vector term",
            found: format!("a term of sort {}", pos.sort()),
        });
    }
    Ok(())
}
