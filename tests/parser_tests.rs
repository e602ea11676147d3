// tests/parser_tests.rs

use expressive::ast::{BinOp, Expr, UnaryOp};
use expressive::lexer::tokenize;
use expressive::parser::{ParseError, Parser, SyntaxError, MAX_DEPTH};
use expressive::{Function, Value};

fn parse(source: &str) -> Result<Expr, ParseError> {
    Parser::new(tokenize(source).unwrap()).parse()
}

fn int(n: i64) -> Expr {
    Expr::Literal(Value::Integer(n))
}

fn var(name: &str) -> Expr {
    Expr::Variable(name.to_string())
}

fn syntax_error(source: &str) -> SyntaxError {
    match parse(source) {
        Err(ParseError::Syntax(e)) => e,
        other => panic!("Expected a syntax error for {:?}, got {:?}", source, other),
    }
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(
        parse("2+2*2").unwrap(),
        Expr::binary(BinOp::Add, int(2), Expr::binary(BinOp::Multiply, int(2), int(2)))
    );
    assert_eq!(
        parse("2*2+2").unwrap(),
        Expr::binary(BinOp::Add, Expr::binary(BinOp::Multiply, int(2), int(2)), int(2))
    );
}

#[test]
fn test_left_associativity() {
    // Should be: Subtract(Subtract(10, 4), 3)
    assert_eq!(
        parse("10 - 4 - 3").unwrap(),
        Expr::binary(BinOp::Subtract, Expr::binary(BinOp::Subtract, int(10), int(4)), int(3))
    );
    assert_eq!(
        parse("8 / 2 / 2").unwrap(),
        Expr::binary(BinOp::Divide, Expr::binary(BinOp::Divide, int(8), int(2)), int(2))
    );
}

#[test]
fn test_parentheses() {
    // Should be: Multiply(Add(1, 2), 3)
    assert_eq!(
        parse("(1 + 2) * 3").unwrap(),
        Expr::binary(BinOp::Multiply, Expr::binary(BinOp::Add, int(1), int(2)), int(3))
    );
    assert_eq!(parse("((([a])))").unwrap(), var("a"));
}

#[test]
fn test_comparison_below_arithmetic() {
    assert_eq!(
        parse("[a] + 1 > [b] * 2").unwrap(),
        Expr::binary(
            BinOp::GreaterThan,
            Expr::binary(BinOp::Add, var("a"), int(1)),
            Expr::binary(BinOp::Multiply, var("b"), int(2))
        )
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(
        parse("[a] || [b] && [c]").unwrap(),
        Expr::binary(BinOp::Or, var("a"), Expr::binary(BinOp::And, var("b"), var("c")))
    );
}

#[test]
fn test_equality_below_relational() {
    assert_eq!(
        parse("[a] < [b] == [c] >= [d]").unwrap(),
        Expr::binary(
            BinOp::Equal,
            Expr::binary(BinOp::LessThan, var("a"), var("b")),
            Expr::binary(BinOp::GreaterEqual, var("c"), var("d"))
        )
    );
}

#[test]
fn test_bitwise_ladder() {
    // | below ^ below & below == below << below +
    assert_eq!(
        parse("1 | 2 ^ 3 & 4 << 1 + 1").unwrap(),
        Expr::binary(
            BinOp::BitwiseOr,
            int(1),
            Expr::binary(
                BinOp::BitwiseXor,
                int(2),
                Expr::binary(
                    BinOp::BitwiseAnd,
                    int(3),
                    Expr::binary(BinOp::LeftShift, int(4), Expr::binary(BinOp::Add, int(1), int(1)))
                )
            )
        )
    );
}

// ============================================================================
// Operator spellings
// ============================================================================

#[test]
fn test_alternate_spellings() {
    assert_eq!(parse("[a] = 1").unwrap(), parse("[a] == 1").unwrap());
    assert_eq!(parse("[a] <> 1").unwrap(), parse("[a] != 1").unwrap());
    assert_eq!(parse("10 mod 3").unwrap(), parse("10 % 3").unwrap());
    assert_eq!(parse("[a] AND [b]").unwrap(), parse("[a] && [b]").unwrap());
    assert_eq!(parse("[a] or [b]").unwrap(), parse("[a] || [b]").unwrap());
    assert_eq!(parse("not [a]").unwrap(), parse("![a]").unwrap());
    assert_eq!(parse("not (1 > 2)").unwrap(), parse("!(1 > 2)").unwrap());
    assert_eq!(parse("NOT(1 > 2)").unwrap(), parse("!(1 > 2)").unwrap());
    assert_eq!(parse("true and not ([a])").unwrap(), parse("true && ![a]").unwrap());
}

// ============================================================================
// Prefix operators
// ============================================================================

#[test]
fn test_minus_after_operand_is_subtraction() {
    assert_eq!(
        parse("[a] - 1").unwrap(),
        Expr::binary(BinOp::Subtract, var("a"), int(1))
    );
    assert_eq!(
        parse("(1) - 1").unwrap(),
        Expr::binary(BinOp::Subtract, int(1), int(1))
    );
}

#[test]
fn test_minus_after_operator_is_negation() {
    let tree = parse("1.8--0.2").unwrap();
    match tree {
        Expr::Binary {
            op: BinOp::Subtract,
            right,
            ..
        } => assert!(matches!(*right, Expr::Unary { op: UnaryOp::Negate, .. })),
        other => panic!("Expected subtraction, got {:?}", other),
    }
}

#[test]
fn test_leading_and_nested_negation() {
    assert_eq!(parse("-1").unwrap(), Expr::unary(UnaryOp::Negate, int(1)));
    assert_eq!(
        parse("- -[a]").unwrap(),
        Expr::unary(UnaryOp::Negate, Expr::unary(UnaryOp::Negate, var("a")))
    );
    assert_eq!(
        parse("abs(-1)").unwrap(),
        Expr::Call {
            function: Function::Abs,
            args: vec![Expr::unary(UnaryOp::Negate, int(1))],
        }
    );
}

#[test]
fn test_unary_binds_tighter_than_multiplication() {
    assert_eq!(
        parse("-2 * 3").unwrap(),
        Expr::binary(BinOp::Multiply, Expr::unary(UnaryOp::Negate, int(2)), int(3))
    );
    assert_eq!(
        parse("!true && false").unwrap(),
        Expr::binary(
            BinOp::And,
            Expr::unary(UnaryOp::Not, Expr::Literal(Value::Boolean(true))),
            Expr::Literal(Value::Boolean(false))
        )
    );
}

#[test]
fn test_unary_plus() {
    assert_eq!(parse("+5").unwrap(), Expr::unary(UnaryOp::Plus, int(5)));
}

// ============================================================================
// Function calls
// ============================================================================

#[test]
fn test_function_names_ignore_case() {
    for source in ["abs(1)", "ABS(1)", "Abs(1)"] {
        assert_eq!(
            parse(source).unwrap(),
            Expr::Call {
                function: Function::Abs,
                args: vec![int(1)],
            }
        );
    }
}

#[test]
fn test_call_arguments_are_full_expressions() {
    assert_eq!(
        parse("max([a] + 1, 2 * 3)").unwrap(),
        Expr::Call {
            function: Function::Max,
            args: vec![
                Expr::binary(BinOp::Add, var("a"), int(1)),
                Expr::binary(BinOp::Multiply, int(2), int(3)),
            ],
        }
    );
}

#[test]
fn test_calls_nest() {
    assert_eq!(
        parse("round(sqrt(2), 2)").unwrap(),
        Expr::Call {
            function: Function::Round,
            args: vec![
                Expr::Call {
                    function: Function::Sqrt,
                    args: vec![int(2)],
                },
                int(2),
            ],
        }
    );
}

#[test]
fn test_arity_is_checked_while_parsing() {
    let err = parse("abs(1,2,4,5)").unwrap_err();
    assert!(matches!(err, ParseError::Arity(_)));
    assert_eq!(err.to_string(), "Abs() takes only 1 argument(s)");

    for source in ["sum()", "count()"] {
        let err = parse(source).unwrap_err();
        assert!(
            err.to_string().contains("expects at least 1"),
            "Unexpected message for {}: {}",
            source,
            err
        );
    }
}

#[test]
fn test_unknown_function() {
    assert_eq!(
        syntax_error("frobnicate(1)"),
        SyntaxError::UnknownFunction {
            name: "frobnicate".to_string(),
            position: 0,
        }
    );
}

// ============================================================================
// Syntax errors
// ============================================================================

#[test]
fn test_parenthesis_mismatch() {
    let err = syntax_error("(a + b) * (4 - 2");
    assert_eq!(err, SyntaxError::ParenthesisMismatch { expected: 2, found: 1 });
    assert!(err.to_string().contains("expected 2, found 1"));

    assert_eq!(
        syntax_error("1 + 2)"),
        SyntaxError::ParenthesisMismatch { expected: 0, found: 1 }
    );
}

#[test]
fn test_unrecognised_token() {
    let err = syntax_error("1 + blarsh + 4");
    assert_eq!(
        err,
        SyntaxError::UnrecognizedToken {
            text: "blarsh".to_string(),
            position: 4,
        }
    );
    assert!(err.to_string().contains("blarsh"));
}

#[test]
fn test_missing_operands() {
    assert!(matches!(syntax_error("1 +"), SyntaxError::MissingOperand { .. }));
    assert!(matches!(syntax_error("(1 *)"), SyntaxError::MissingOperand { .. }));
    assert!(matches!(syntax_error("* 2"), SyntaxError::MissingOperand { .. }));
    assert!(matches!(syntax_error("max(1 -, 2)"), SyntaxError::MissingOperand { .. }));
}

#[test]
fn test_unexpected_tokens() {
    assert_eq!(syntax_error(""), SyntaxError::UnexpectedEnd);
    assert!(matches!(syntax_error("()"), SyntaxError::UnexpectedToken { .. }));
    assert!(matches!(syntax_error("1 2"), SyntaxError::UnexpectedToken { .. }));
    assert!(matches!(syntax_error("max(1,)"), SyntaxError::UnexpectedToken { .. }));
}

#[test]
fn test_literal_nodes() {
    assert_eq!(parse("'true'").unwrap(), Expr::Literal(Value::from("true")));
    assert_eq!(parse("TRUE").unwrap(), Expr::Literal(Value::Boolean(true)));
    assert!(matches!(parse("#01/01/2001#").unwrap(), Expr::Literal(Value::DateTime(_))));
    assert!(matches!(parse("123.456").unwrap(), Expr::Literal(Value::Decimal(_))));
}

#[test]
fn test_parser_adds_missing_eof() {
    let mut tokens = tokenize("1 + 2").unwrap();
    tokens.pop();
    assert_eq!(
        Parser::new(tokens).parse().unwrap(),
        Expr::binary(BinOp::Add, int(1), int(2))
    );
}

// ============================================================================
// Depth limits
// ============================================================================

#[test]
fn test_deep_grouping_is_rejected() {
    let source = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
    assert_eq!(syntax_error(&source), SyntaxError::TooDeep { limit: MAX_DEPTH });

    let source = format!("{}1", "-".repeat(5_000));
    assert_eq!(syntax_error(&source), SyntaxError::TooDeep { limit: MAX_DEPTH });

    let source = format!("{}1{}", "abs(".repeat(5_000), ")".repeat(5_000));
    assert_eq!(syntax_error(&source), SyntaxError::TooDeep { limit: MAX_DEPTH });
}

#[test]
fn test_long_operator_chain_is_rejected() {
    let source = vec!["1"; 50_000].join("+");
    assert_eq!(syntax_error(&source), SyntaxError::TooDeep { limit: MAX_DEPTH });
}

#[test]
fn test_nesting_within_limit_parses() {
    let source = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(parse(&source).unwrap(), int(1));

    let source = vec!["1"; 200].join("+");
    assert!(parse(&source).is_ok());
}
