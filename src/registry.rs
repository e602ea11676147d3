//! Process-wide operator and function tables.
//!
//! Both registries are closed enums backed by lookup tables that are built
//! once, on first use, and never mutated afterwards.

pub mod functions;
pub mod operators;

pub use functions::{Arity, ArityError, Function};
pub use operators::{Associativity, Fixity, Operator, Precedence};
