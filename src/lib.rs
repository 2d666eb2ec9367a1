mod axioms;
mod error;
mod eval;
mod generate;
mod model;

pub use axioms::{Axiom, AxiomLog, NotContainsConstraint, StringConstraint};
pub use error::{Error, Result};
pub use eval::{Assignment, ConstVal, Units};
pub use generate::{is_high_surrogate, is_low_surrogate, pair_value, Generator, Operation, Value};
pub use model::strings::SymbolicString;
pub use model::terms::{ArithOp, CmpOp, Term};
pub use model::{Sort, Symbol, SymbolKind};
