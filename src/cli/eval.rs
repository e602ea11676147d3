//! Evaluate expressions against command-line variables

use super::{json_to_value, json_to_variables, CliError};
use crate::{Expression, Value, Variables};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The expression to evaluate
    pub expression: String,
    /// `NAME=VALUE` bindings, applied after `vars_json`
    pub vars: Vec<String>,
    /// JSON object of variables
    pub vars_json: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of an eval operation
#[derive(Debug)]
pub enum EvalResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Expression evaluated successfully
    Success(Value),
}

/// Split a `NAME=VALUE` binding and convert its value.
///
/// The value is read as JSON when it parses as a scalar and as a raw string
/// otherwise. A value starting with `=` is itself an expression, evaluated
/// whenever the variable is referenced.
pub fn parse_binding(binding: &str) -> Result<(String, Value), CliError> {
    let (name, raw) = binding
        .split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .ok_or_else(|| CliError::InvalidVariable(binding.to_string()))?;
    let name = name.trim().to_string();

    if let Some(source) = raw.strip_prefix('=') {
        let nested = Expression::new(source)?;
        return Ok((name, Value::from(nested)));
    }

    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => json_to_value(json)?,
        Err(_) => Value::String(raw.to_string()),
    };
    Ok((name, value))
}

/// Execute an eval operation
pub fn execute_eval(options: &EvalOptions) -> Result<EvalResult, CliError> {
    let expression = Expression::new(&options.expression)?;
    if options.syntax_only {
        return Ok(EvalResult::SyntaxValid);
    }

    let mut variables = match &options.vars_json {
        Some(json) if !json.trim().is_empty() => json_to_variables(serde_json::from_str(json)?)?,
        _ => Variables::new(),
    };
    for binding in &options.vars {
        let (name, value) = parse_binding(binding)?;
        variables.insert(name, value);
    }

    let value = expression.evaluate(&variables)?;
    Ok(EvalResult::Success(value))
}
