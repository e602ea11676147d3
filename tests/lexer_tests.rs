// tests/lexer_tests.rs

use expressive::ast::{Token, TokenKind};
use expressive::lexer::{tokenize, LexError, Lexer};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).unwrap().iter().map(|t| t.kind).collect()
}

fn texts(source: &str) -> Vec<String> {
    tokenize(source).unwrap().into_iter().map(|t| t.text).collect()
}

// ============================================================================
// Punctuation and operators
// ============================================================================

#[test]
fn test_punctuation_tokens() {
    let test_cases = vec![
        ("(", TokenKind::LeftParen),
        (")", TokenKind::RightParen),
        (",", TokenKind::Comma),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}

#[test]
fn test_single_char_operators() {
    for input in ["+", "-", "*", "/", "%", "<", ">", "=", "!", "&", "|", "^"] {
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens[0], Token::new(TokenKind::Operator, input, 0), "Failed for input: {}", input);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }
}

#[test]
fn test_two_char_operators() {
    for input in ["==", "!=", "<>", "<=", ">=", "<<", ">>", "&&", "||"] {
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens.len(), 2, "Failed for input: {}", input);
        assert_eq!(tokens[0].text, input);
    }
}

#[test]
fn test_double_minus_is_two_tokens() {
    assert_eq!(texts("1.8--0.2"), vec!["1.8", "-", "-", "0.2", ""]);
}

#[test]
fn test_word_operators_are_identifiers() {
    assert_eq!(
        kinds("not [a] and [b] mod 3"),
        vec![
            TokenKind::Identifier,
            TokenKind::Variable,
            TokenKind::Identifier,
            TokenKind::Variable,
            TokenKind::Identifier,
            TokenKind::Number,
            TokenKind::Eof,
        ]
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    let tokens = tokenize("123456 123.456 .5").unwrap();
    assert_eq!(tokens[0], Token::new(TokenKind::Number, "123456", 0));
    assert_eq!(tokens[1], Token::new(TokenKind::DecimalNumber, "123.456", 7));
    assert_eq!(tokens[2].kind, TokenKind::DecimalNumber);
    assert_eq!(tokens[2].text, "0.5");
}

#[test]
fn test_number_out_of_range() {
    let err = tokenize("99999999999999999999").unwrap_err();
    assert!(matches!(err, LexError::InvalidNumber { position: 0, .. }));
}

#[test]
fn test_string_escapes() {
    let tokens = tokenize(r"'\'hello\''").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].text, "'hello'");

    let tokens = tokenize(r"'hel\nlo'").unwrap();
    assert_eq!(tokens[0].text, "hel\nlo");

    let tokens = tokenize(r"'a\\b\x'").unwrap();
    assert_eq!(tokens[0].text, "a\\bx");
}

#[test]
fn test_string_true_is_not_boolean() {
    let tokens = tokenize("'true'").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].text, "true");
}

#[test]
fn test_unterminated_string() {
    assert_eq!(
        tokenize("1 + 'abc").unwrap_err(),
        LexError::UnterminatedString { position: 4 }
    );
    assert_eq!(
        tokenize(r"'abc\").unwrap_err(),
        LexError::UnterminatedString { position: 0 }
    );
}

#[test]
fn test_dates() {
    let tokens = tokenize("#1/1/2009# #2009-02-28 13:45#").unwrap();
    assert_eq!(tokens[0], Token::new(TokenKind::Date, "1/1/2009", 0));
    assert_eq!(tokens[1].kind, TokenKind::Date);
    assert_eq!(tokens[1].text, "2009-02-28 13:45");
}

#[test]
fn test_invalid_dates() {
    assert!(matches!(
        tokenize("#2/30/2009#").unwrap_err(),
        LexError::InvalidDate { position: 0, .. }
    ));
    assert_eq!(
        tokenize("#1/1/2009").unwrap_err(),
        LexError::UnterminatedDate { position: 0 }
    );
}

#[test]
fn test_variables() {
    let tokens = tokenize("[var1] * [unit price]").unwrap();
    assert_eq!(tokens[0], Token::new(TokenKind::Variable, "var1", 0));
    assert_eq!(tokens[2], Token::new(TokenKind::Variable, "unit price", 9));
    assert_eq!(
        tokenize("[open").unwrap_err(),
        LexError::UnterminatedVariable { position: 0 }
    );
}

#[test]
fn test_booleans() {
    assert_eq!(
        kinds("true False TRUE"),
        vec![TokenKind::Boolean, TokenKind::Boolean, TokenKind::Boolean, TokenKind::Eof]
    );
    assert_eq!(texts("TRUE")[0], "true");
}

// ============================================================================
// Streams
// ============================================================================

#[test]
fn test_empty_input_is_only_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_eq!(kinds("   \t\n"), vec![TokenKind::Eof]);
}

#[test]
fn test_positions_are_char_offsets() {
    let tokens = tokenize("'é' + 1").unwrap();
    assert_eq!(tokens[1].position, 4);
    assert_eq!(tokens[2].position, 6);
}

#[test]
fn test_function_call_tokens() {
    assert_eq!(
        kinds("abs(-1, 2)"),
        vec![
            TokenKind::Identifier,
            TokenKind::LeftParen,
            TokenKind::Operator,
            TokenKind::Number,
            TokenKind::Comma,
            TokenKind::Number,
            TokenKind::RightParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_unexpected_character() {
    assert_eq!(
        tokenize("1 $ 2").unwrap_err(),
        LexError::UnexpectedCharacter { ch: '$', position: 2 }
    );
}
