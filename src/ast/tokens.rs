/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Bare word: a function name or a word operator such as `mod`
    ///
    /// # Examples
    /// ```text
    /// abs
    /// Average
    /// mod
    /// ```
    Identifier,

    /// Integer literal made only of digits
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 123456
    /// ```
    Number,

    /// Numeric literal containing a decimal point
    ///
    /// # Examples
    /// ```text
    /// 1.8
    /// .5
    /// ```
    DecimalNumber,

    /// String literal enclosed in single quotes
    ///
    /// The token text holds the contents with escapes already resolved.
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// '\'quoted\''
    /// ```
    String,

    /// Date literal enclosed in hashes
    ///
    /// # Examples
    /// ```text
    /// #1/1/2009#
    /// #2009-01-01 13:30#
    /// ```
    Date,

    /// `true` or `false`, in any letter case
    Boolean,

    /// Symbolic operator
    ///
    /// # Examples
    /// ```text
    /// +   -   ==   <>   &&   <<
    /// ```
    Operator,

    LeftParen,
    RightParen,
    Comma,

    /// Variable reference enclosed in brackets
    ///
    /// The token text holds the name, spaces included.
    ///
    /// # Examples
    /// ```text
    /// [var1]
    /// [unit price]
    /// ```
    Variable,

    /// End of input, always the last token of a sequence
    Eof,
}

/// Smallest lexical unit of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Resolved literal text (see [`TokenKind`] for what each kind stores)
    pub text: String,
    /// Char offset of the first character in the source
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn eof(position: usize) -> Self {
        Token::new(TokenKind::Eof, "", position)
    }

    /// True for tokens after which an operator reads as infix.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number
                | TokenKind::DecimalNumber
                | TokenKind::String
                | TokenKind::Date
                | TokenKind::Boolean
                | TokenKind::Variable
                | TokenKind::RightParen
        )
    }
}
