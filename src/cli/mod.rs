//! CLI support for expressive
//!
//! Provides programmatic access to the `expressive` command so other tools
//! can evaluate expressions the same way the binary does.

mod convert;
mod docs;
mod eval;

pub use convert::{json_to_value, json_to_variables, value_to_json};
pub use docs::{get_doc_category, get_docs_overview, DocCategory};
pub use eval::{execute_eval, parse_binding, EvalOptions, EvalResult};

use std::io;

use thiserror::Error;

use crate::ExpressionError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Lexing, parsing or evaluation failed
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// `--var` argument without `NAME=`
    #[error("Invalid variable binding '{0}': expected NAME=VALUE")]
    InvalidVariable(String),

    /// JSON value with no expressive counterpart
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("Unknown category: '{0}'\nRun 'expressive docs' to see available categories.")]
    UnknownCategory(String),
}
