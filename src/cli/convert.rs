//! JSON <-> expressive Value conversion utilities

use chrono::Timelike;

use super::CliError;
use crate::{Value, Variables};

/// Convert serde_json::Value to an expressive Value
///
/// Integers stay integers, every other number becomes a double. JSON has no
/// counterpart for decimals or dates, and `null`, arrays and objects have no
/// expressive counterpart at all.
pub fn json_to_value(v: serde_json::Value) -> Result<Value, CliError> {
    match v {
        serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Value::Integer(i)),
            (None, Some(f)) => Ok(Value::Double(f)),
            (None, None) => Err(CliError::UnsupportedValue(n.to_string())),
        },
        serde_json::Value::String(s) => Ok(Value::String(s)),
        serde_json::Value::Null => Err(CliError::UnsupportedValue("null".to_string())),
        serde_json::Value::Array(_) => Err(CliError::UnsupportedValue("array".to_string())),
        serde_json::Value::Object(_) => Err(CliError::UnsupportedValue("object".to_string())),
    }
}

/// Convert a JSON object into a variable set
pub fn json_to_variables(v: serde_json::Value) -> Result<Variables, CliError> {
    let serde_json::Value::Object(obj) = v else {
        return Err(CliError::UnsupportedValue(
            "variables must be a JSON object".to_string(),
        ));
    };

    let mut variables = Variables::new();
    for (name, value) in obj {
        variables.insert(name, json_to_value(value)?);
    }
    Ok(variables)
}

/// Convert an expressive Value to serde_json::Value
pub fn value_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Decimal(d) => {
            let text = d.normalize().to_string();
            text.parse::<serde_json::Number>()
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::String(text))
        }
        Value::String(s) => serde_json::Value::String(s),
        Value::DateTime(dt) => {
            let text = if dt.time().num_seconds_from_midnight() == 0 {
                dt.date().format("%Y-%m-%d").to_string()
            } else {
                dt.format("%Y-%m-%dT%H:%M:%S").to_string()
            };
            serde_json::Value::String(text)
        }
        Value::Expression(e) => serde_json::Value::String(e.source().to_string()),
    }
}
