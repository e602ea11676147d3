//! # Expressive
//!
//! An embeddable expression language for formulas configured at runtime.
//! Source text is tokenized ([`lexer`]), parsed into a tree with precedence
//! climbing ([`parser`]) and walked by the [`Evaluator`] against a set of
//! case-insensitive [`Variables`].
//!
//! ## Quick Start
//!
//! ```
//! use expressive::{Expression, Value, Variables};
//!
//! let total = Expression::new("[price] * [qty] + 1.5").unwrap();
//! let vars = Variables::new().with("Price", 4).with("qty", 3);
//!
//! assert_eq!(total.evaluate(&vars).unwrap(), Value::Decimal("13.5".parse().unwrap()));
//! ```
//!
//! An [`Expression`] is parsed once and can be evaluated any number of times,
//! from any thread, or in the background with [`Expression::evaluate_async`].
//! Operators and functions live in closed tables in [`registry`].

pub mod ast;
pub mod evaluator;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Expr, Token, TokenKind, UnaryOp};
pub use evaluator::{EvalError, Evaluator};
pub use expression::{EvaluationTask, Expression, ExpressionError};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parser, SyntaxError};
pub use registry::{Arity, ArityError, Function, Operator};
pub use value::{Value, Variables};
