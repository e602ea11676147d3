//! # Expressive - Abstract Syntax Tree
//!
//! This module defines the tokens and tree nodes of the expression language.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Tree nodes (literals, variables, operations, calls)
//! - **[operators]** - Unary and binary operators carried by the tree
//!
//! ## Quick Start
//!
//! ```text
//! ([a] != 0) && ([b] / [a] > 2)
//! ```
//!
//! parses into an `And` node whose right-hand side is only evaluated when the
//! left-hand side is `true`.
//!
//! ## Literal Forms
//!
//! | Form | Example | Value |
//! |---|---|---|
//! | integer | `42` | `Integer` |
//! | decimal | `1.8` | `Decimal` |
//! | string | `'it\'s'` | `String` |
//! | date | `#1/1/2009#` | `DateTime` |
//! | boolean | `true`, `FALSE` | `Boolean` |
//! | variable | `[unit price]` | looked up at evaluation |
//!
//! ## Numeric Representations
//!
//! Three numeric kinds coexist. Integer literals are `i64`, decimal literals
//! are fixed-point `rust_decimal::Decimal`, and `f64` doubles come from math
//! functions, integer division and host-supplied variables. Only `+` and the
//! comparisons mix decimals with doubles; `-`, `*`, `/` and `%` reject the
//! combination.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{BinOp, UnaryOp};
pub use tokens::{Token, TokenKind};
