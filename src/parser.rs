use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    ast::{Expr, Token, TokenKind},
    lexer,
    registry::{
        Associativity, ArityError, Fixity, Operator, Precedence,
        functions,
        operators::{self, match_token},
    },
    value::Value,
};

/// Structural problems found while parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    /// `(` and `)` counts differ; `expected` is the number of `(`
    #[error("mismatched parentheses: expected {expected}, found {found} closing ')'")]
    ParenthesisMismatch { expected: usize, found: usize },

    /// Bare word that is neither a function call nor an operator
    #[error("Unrecognised token '{text}' at position {position}")]
    UnrecognizedToken { text: String, position: usize },

    #[error("Unrecognised function '{name}' at position {position}")]
    UnknownFunction { name: String, position: usize },

    #[error("operator '{operator}' at position {position} is missing an operand")]
    MissingOperand { operator: String, position: usize },

    #[error("unexpected '{text}' at position {position}")]
    UnexpectedToken { text: String, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid literal '{text}' at position {position}")]
    InvalidLiteral { text: String, position: usize },

    /// Nesting or operator chain beyond [`MAX_DEPTH`]
    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Everything [`Parser::parse`] can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A function call with the wrong number of arguments
    #[error(transparent)]
    Arity(#[from] ArityError),
}

/// How an operator written after `previous` is read.
///
/// After an operand (a literal, a variable or `)`) operators are infix;
/// at the start of input and after an operator, `(` or `,` they are prefix.
pub fn fixity_after(previous: Option<&Token>) -> Fixity {
    match previous {
        Some(token) if token.ends_operand() => Fixity::Infix,
        _ => Fixity::Prefix,
    }
}

/// How deeply groups, operators and calls may nest, and how tall the
/// resulting tree may grow.
pub const MAX_DEPTH: usize = 256;

/// A parsed subtree and its height.
type Parsed = (Expr, usize);

/// Precedence-climbing parser over a token sequence.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let end = tokens.last().map_or(0, |t| t.position + t.text.chars().count());
            tokens.push(Token::eof(end));
        }
        Parser {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    fn current(&self) -> &Token {
        // `new` guarantees a trailing Eof and `advance` never moves past it
        &self.tokens[self.position]
    }

    fn previous(&self) -> Option<&Token> {
        self.position.checked_sub(1).map(|i| &self.tokens[i])
    }

    fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.position + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> SyntaxError {
        let token = self.current();
        match token.kind {
            TokenKind::Eof => SyntaxError::UnexpectedEnd,
            TokenKind::Identifier => SyntaxError::UnrecognizedToken {
                text: token.text.clone(),
                position: token.position,
            },
            _ => SyntaxError::UnexpectedToken {
                text: token.text.clone(),
                position: token.position,
            },
        }
    }

    /// Parses the whole token sequence into one tree.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        self.check_parentheses()?;
        let (expr, _) = self.parse_expression(Precedence::Lowest)?;
        if !self.check(TokenKind::Eof) {
            return Err(self.unexpected().into());
        }
        Ok(expr)
    }

    fn check_parentheses(&self) -> Result<(), SyntaxError> {
        let count = |kind| self.tokens.iter().filter(|t| t.kind == kind).count();
        let expected = count(TokenKind::LeftParen);
        let found = count(TokenKind::RightParen);
        if expected != found {
            return Err(SyntaxError::ParenthesisMismatch { expected, found });
        }
        Ok(())
    }

    /// Parses operands joined by infix operators binding at least as tightly
    /// as `min`.
    fn parse_expression(&mut self, min: Precedence) -> Result<Parsed, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(too_deep().into());
        }
        self.depth += 1;
        let result = self.parse_chain(min);
        self.depth -= 1;
        result
    }

    fn parse_chain(&mut self, min: Precedence) -> Result<Parsed, ParseError> {
        let (mut left, mut height) = self.parse_prefix()?;

        while let Some(op) = self.peek_infix() {
            let precedence = op.precedence();
            if precedence < min {
                break;
            }
            let op_token = self.advance();
            let next_min = match op.associativity() {
                Associativity::Left => precedence.tighter(),
                Associativity::Right => precedence,
            };
            let (right, right_height) = self.parse_operand(&op_token, next_min)?;
            height = node_height(height.max(right_height))?;
            left = op
                .build(vec![left, right])
                .ok_or_else(|| missing_operand(&op_token))?;
        }
        Ok((left, height))
    }

    fn peek_infix(&self) -> Option<Operator> {
        let token = self.current();
        match token.kind {
            TokenKind::Operator | TokenKind::Identifier => {
                match_token(&token.text, self.previous()).filter(|op| op.fixity() == Fixity::Infix)
            }
            _ => None,
        }
    }

    /// Parses the operand following `op_token`.
    fn parse_operand(&mut self, op_token: &Token, min: Precedence) -> Result<Parsed, ParseError> {
        if matches!(
            self.current().kind,
            TokenKind::Eof | TokenKind::RightParen | TokenKind::Comma
        ) {
            return Err(missing_operand(op_token).into());
        }
        self.parse_expression(min)
    }

    /// Parses a literal, variable, group, call or prefix operation.
    fn parse_prefix(&mut self) -> Result<Parsed, ParseError> {
        let token = self.current().clone();

        let literal = match token.kind {
            TokenKind::Number => {
                let n = token.text.parse::<i64>().map_err(|_| invalid_literal(&token))?;
                Value::Integer(n)
            }
            TokenKind::DecimalNumber => {
                let d = Decimal::from_str(&token.text).map_err(|_| invalid_literal(&token))?;
                Value::Decimal(d)
            }
            TokenKind::String => Value::String(token.text.clone()),
            TokenKind::Date => {
                let date = lexer::parse_date(&token.text).ok_or_else(|| invalid_literal(&token))?;
                Value::DateTime(date)
            }
            TokenKind::Boolean => Value::Boolean(token.text.eq_ignore_ascii_case("true")),
            TokenKind::Variable => {
                self.advance();
                return Ok((Expr::Variable(token.text), 1));
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RightParen)?;
                return Ok(inner);
            }
            // `not (x)` is the prefix operator, `abs (x)` a call
            TokenKind::Identifier
                if self.peek_kind(1) == TokenKind::LeftParen
                    && (functions::resolve(&token.text).is_some()
                        || operators::lookup(&token.text, Fixity::Prefix).is_none()) =>
            {
                return self.parse_call();
            }
            TokenKind::Identifier | TokenKind::Operator => {
                return match match_token(&token.text, self.previous()) {
                    Some(op) if op.fixity() == Fixity::Prefix => {
                        self.advance();
                        let (operand, height) = self.parse_operand(&token, Precedence::Unary)?;
                        let expr = op
                            .build(vec![operand])
                            .ok_or_else(|| missing_operand(&token))?;
                        Ok((expr, node_height(height)?))
                    }
                    _ if token.kind == TokenKind::Operator || operators::is_operator(&token.text) => {
                        Err(missing_operand(&token).into())
                    }
                    _ => Err(self.unexpected().into()),
                };
            }
            TokenKind::RightParen | TokenKind::Comma | TokenKind::Eof => {
                return Err(self.unexpected().into());
            }
        };
        self.advance();
        Ok((Expr::Literal(literal), 1))
    }

    /// Parses `name(arg, ...)`; the current token is the name.
    fn parse_call(&mut self) -> Result<Parsed, ParseError> {
        let name = self.advance();
        let function = functions::resolve(&name.text).ok_or_else(|| SyntaxError::UnknownFunction {
            name: name.text.clone(),
            position: name.position,
        })?;

        self.expect(TokenKind::LeftParen)?;
        let mut args = Vec::new();
        let mut height = 0;
        if !self.check(TokenKind::RightParen) {
            loop {
                let (arg, arg_height) = self.parse_expression(Precedence::Lowest)?;
                height = height.max(arg_height);
                args.push(arg);
                if !self.check(TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
        }
        self.expect(TokenKind::RightParen)?;

        function.check_arity(args.len())?;
        Ok((Expr::Call { function, args }, node_height(height)?))
    }
}

/// Parses a complete token sequence.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Parser::new(tokens).parse()
}

/// Height of a node whose tallest child is `child` levels high.
fn node_height(child: usize) -> Result<usize, SyntaxError> {
    let height = child + 1;
    if height > MAX_DEPTH {
        return Err(too_deep());
    }
    Ok(height)
}

fn too_deep() -> SyntaxError {
    SyntaxError::TooDeep { limit: MAX_DEPTH }
}

fn missing_operand(op_token: &Token) -> SyntaxError {
    SyntaxError::MissingOperand {
        operator: op_token.text.clone(),
        position: op_token.position,
    }
}

fn invalid_literal(token: &Token) -> SyntaxError {
    SyntaxError::InvalidLiteral {
        text: token.text.clone(),
        position: token.position,
    }
}
