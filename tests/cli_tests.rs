#![cfg(feature = "cli")]

use expressive::cli::{
    execute_eval, get_doc_category, get_docs_overview, json_to_variables, parse_binding,
    value_to_json, CliError, DocCategory, EvalOptions, EvalResult,
};
use expressive::{ExpressionError, Function, Operator, Value};
use serde_json::json;

fn run(expression: &str, vars: &[&str], vars_json: Option<&str>) -> Result<Value, CliError> {
    let options = EvalOptions {
        expression: expression.to_string(),
        vars: vars.iter().map(|v| v.to_string()).collect(),
        vars_json: vars_json.map(str::to_string),
        syntax_only: false,
    };
    match execute_eval(&options)? {
        EvalResult::Success(value) => Ok(value),
        EvalResult::SyntaxValid => panic!("Expected an evaluated value"),
    }
}

// ============================================================================
// Eval command
// ============================================================================

#[test]
fn test_eval_with_bindings() {
    assert_eq!(run("[a] * [b]", &["a=6", "b=7"], None).unwrap(), Value::Integer(42));
    assert_eq!(
        run("[greeting] + ', ' + [name]", &["greeting=hello", "name=\"world\""], None).unwrap(),
        Value::from("hello, world")
    );
}

#[test]
fn test_eval_with_json_variables() {
    let result = run("[price] * [qty] > 10", &[], Some(r#"{"Price": 2.5, "qty": 5}"#)).unwrap();
    assert_eq!(result, Value::Boolean(true));
}

#[test]
fn test_eval_with_nested_binding() {
    let result = run("[surface] * [h]", &["surface==[l] * [k]", "h=3", "l=1", "k=2"], None).unwrap();
    assert_eq!(result, Value::Integer(6));
}

#[test]
fn test_blank_stdin_means_no_variables() {
    assert_eq!(run("1 + 1", &[], Some("  \n")).unwrap(), Value::Integer(2));
}

#[test]
fn test_syntax_only() {
    let options = EvalOptions {
        expression: "[anything] mod 2".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(execute_eval(&options), Ok(EvalResult::SyntaxValid)));

    let options = EvalOptions {
        expression: "(1 + 2".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    assert!(matches!(
        execute_eval(&options),
        Err(CliError::Expression(ExpressionError::Syntax(_)))
    ));
}

#[test]
fn test_eval_errors() {
    assert!(matches!(
        run("[a]", &[], None),
        Err(CliError::Expression(ExpressionError::Evaluation(_)))
    ));
    assert!(matches!(run("1", &[], Some("{not json")), Err(CliError::Json(_))));
    assert!(matches!(
        run("1", &[], Some(r#"{"a": [1]}"#)),
        Err(CliError::UnsupportedValue(_))
    ));
    assert!(matches!(run("1", &["oops"], None), Err(CliError::InvalidVariable(_))));
}

#[test]
fn test_error_messages_pass_through() {
    let err = run("1.8 - abs([d])", &["d=0.2"], None).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Operator '-' can't be applied to operands of types 'decimal' and 'double'"
    );
}

#[test]
fn test_nested_binding_must_parse() {
    assert!(matches!(
        parse_binding("x==1 +"),
        Err(CliError::Expression(ExpressionError::Syntax(_)))
    ));
}

// ============================================================================
// JSON conversion
// ============================================================================

#[test]
fn test_json_output() {
    assert_eq!(value_to_json(run("3/6", &[], None).unwrap()), json!(0.5));
    assert_eq!(value_to_json(run("1.8--0.2", &[], None).unwrap()), json!(2));
    assert_eq!(value_to_json(run("'a' + 1", &[], None).unwrap()), json!("a1"));
    assert_eq!(value_to_json(run("#1/31/2009 13:45#", &[], None).unwrap()), json!("2009-01-31T13:45:00"));
    assert_eq!(value_to_json(Value::Double(f64::NAN)), json!(null));
}

#[test]
fn test_json_variables_must_be_object() {
    assert!(matches!(json_to_variables(json!([1, 2])), Err(CliError::UnsupportedValue(_))));
    assert_eq!(json_to_variables(json!({})).unwrap().len(), 0);
}

// ============================================================================
// Docs commands
// ============================================================================

#[test]
fn test_docs_overview_lists_categories() {
    let overview = get_docs_overview();
    for category in ["literals", "operators", "functions", "types"] {
        assert!(overview.contains(category), "Missing category: {}", category);
        assert!(DocCategory::from_name(category).is_some());
    }
}

#[test]
fn test_generated_docs_cover_registries() {
    let functions = get_doc_category("functions").unwrap();
    for function in Function::ALL {
        assert!(functions.contains(function.name()), "Missing function: {}", function.name());
    }

    let operators = get_doc_category("OPS").unwrap();
    for op in Operator::ALL {
        for tag in op.tags() {
            assert!(operators.contains(tag), "Missing operator tag: {}", tag);
        }
    }
}

#[test]
fn test_unknown_doc_category() {
    let err = get_doc_category("nonsense").unwrap_err();
    assert!(matches!(err, CliError::UnknownCategory(ref c) if c == "nonsense"));
    assert!(err.to_string().contains("expressive docs"));
}
