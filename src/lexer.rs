use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ast::{Token, TokenKind};

/// Errors raised while turning source text into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("unterminated date literal starting at position {position}")]
    UnterminatedDate { position: usize },

    #[error("unterminated variable reference starting at position {position}")]
    UnterminatedVariable { position: usize },

    #[error("invalid date literal '#{text}#' at position {position}")]
    InvalidDate { text: String, position: usize },

    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },
}

/// Multi-character operator symbols, matched before single characters.
const TWO_CHAR_OPERATORS: &[&str] = &["==", "!=", "<>", "<=", ">=", "<<", ">>", "&&", "||"];

const ONE_CHAR_OPERATORS: &[char] = &['+', '-', '*', '/', '%', '<', '>', '=', '!', '&', '|', '^'];

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads `'...'`; the opening quote is the current char.
    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '\'' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some(other) => result.push(other),
                        None => return Err(LexError::UnterminatedString { position: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    /// Reads raw text up to `close`; the opening delimiter is the current char.
    fn read_delimited(&mut self, close: char) -> Option<String> {
        self.advance(); // Consume opening delimiter
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == close {
                return Some(result);
            }
            result.push(ch);
        }
        None
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();
        let mut is_decimal = false;
        if self.current_char() == Some('.') {
            number.push('0');
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_decimal
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_decimal = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let invalid = || LexError::InvalidNumber {
            text: number.clone(),
            position: start,
        };
        if is_decimal {
            number.parse::<Decimal>().map_err(|_| invalid())?;
            Ok(Token::new(TokenKind::DecimalNumber, number, start))
        } else {
            number.parse::<i64>().map_err(|_| invalid())?;
            Ok(Token::new(TokenKind::Number, number, start))
        }
    }

    fn read_operator(&mut self) -> Option<Token> {
        let start = self.position;
        if let (Some(a), Some(b)) = (self.current_char(), self.peek_char(1)) {
            let pair: String = [a, b].iter().collect();
            if TWO_CHAR_OPERATORS.contains(&pair.as_str()) {
                self.advance();
                self.advance();
                return Some(Token::new(TokenKind::Operator, pair, start));
            }
        }
        let ch = self.current_char()?;
        if ONE_CHAR_OPERATORS.contains(&ch) {
            self.advance();
            return Some(Token::new(TokenKind::Operator, ch.to_string(), start));
        }
        None
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.position;

        match self.current_char() {
            None => Ok(Token::eof(start)),
            Some('(') => {
                self.advance();
                Ok(Token::new(TokenKind::LeftParen, "(", start))
            }
            Some(')') => {
                self.advance();
                Ok(Token::new(TokenKind::RightParen, ")", start))
            }
            Some(',') => {
                self.advance();
                Ok(Token::new(TokenKind::Comma, ",", start))
            }
            Some('\'') => {
                let text = self.read_string()?;
                Ok(Token::new(TokenKind::String, text, start))
            }
            Some('#') => {
                let text = self
                    .read_delimited('#')
                    .ok_or(LexError::UnterminatedDate { position: start })?;
                if parse_date(&text).is_none() {
                    return Err(LexError::InvalidDate {
                        text,
                        position: start,
                    });
                }
                Ok(Token::new(TokenKind::Date, text, start))
            }
            Some('[') => {
                let name = self
                    .read_delimited(']')
                    .ok_or(LexError::UnterminatedVariable { position: start })?;
                Ok(Token::new(TokenKind::Variable, name, start))
            }
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                if ident.eq_ignore_ascii_case("true") || ident.eq_ignore_ascii_case("false") {
                    Ok(Token::new(TokenKind::Boolean, ident.to_lowercase(), start))
                } else {
                    Ok(Token::new(TokenKind::Identifier, ident, start))
                }
            }
            Some(ch) => self
                .read_operator()
                .ok_or(LexError::UnexpectedCharacter { ch, position: start }),
        }
    }

    /// Consumes the whole input; the result always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Tokenizes `source` in one go.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

static US_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2})/(\d{1,2})/(\d{4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?\s*$")
        .expect("date pattern is valid")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{4})-(\d{1,2})-(\d{1,2})(?:[\sT]+(\d{1,2}):(\d{2})(?::(\d{2}))?)?\s*$")
        .expect("date pattern is valid")
});

/// Parses the contents of a `#...#` literal.
///
/// Accepts `M/D/YYYY` and `YYYY-MM-DD`, each with an optional `H:MM[:SS]`
/// time of day.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let (year, month, day, caps) = if let Some(caps) = US_DATE.captures(text) {
        (caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?, caps)
    } else {
        let caps = ISO_DATE.captures(text)?;
        (caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?, caps)
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let field = |i: usize| caps.get(i).map(|m| m.as_str().parse::<u32>());
    let time = match (field(4), field(5)) {
        (Some(hour), Some(minute)) => {
            let second = field(6).transpose().ok()?.unwrap_or(0);
            NaiveTime::from_hms_opt(hour.ok()?, minute.ok()?, second)?
        }
        _ => NaiveTime::MIN,
    };
    Some(date.and_time(time))
}

#[test]
fn test_booleans_ignore_case() {
    let tokens = tokenize("true FALSE True").unwrap();
    assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Boolean));
    assert_eq!(tokens[1].text, "false");
    assert_eq!(tokens[3].kind, TokenKind::Eof);
}

#[test]
fn test_date_grammar() {
    let date = parse_date("1/1/2009").unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(2009, 1, 1).unwrap().and_time(NaiveTime::MIN));
    assert!(parse_date("2009-02-28 13:45").is_some());
    assert!(parse_date("2/30/2009").is_none());
    assert!(parse_date("13/1/2009").is_none());
    assert!(parse_date("1/1/2009 25:00").is_none());
    assert!(parse_date("yesterday").is_none());
}
