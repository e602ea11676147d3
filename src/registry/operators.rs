//! Operator registry.
//!
//! Every operator the parser understands is one [`Operator`] variant. A
//! variant declares the text tags it matches, whether it is written before
//! its operand or between two operands, how tightly it binds and which tree
//! node it builds. Adding an operator means adding a variant, its row in
//! [`Operator::tags`] and a branch in [`Operator::build`]; the parser only
//! talks to this module.

use std::{collections::HashMap, sync::LazyLock};

use crate::ast::{BinOp, Expr, Token, UnaryOp};

/// Binding strength, from loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Lowest,
    Or,
    And,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
}

impl Precedence {
    /// The next tighter level (saturating at [`Precedence::Unary`]).
    pub fn tighter(self) -> Self {
        use Precedence::*;
        match self {
            Lowest => Or,
            Or => And,
            And => BitwiseOr,
            BitwiseOr => BitwiseXor,
            BitwiseXor => BitwiseAnd,
            BitwiseAnd => Equality,
            Equality => Relational,
            Relational => Shift,
            Shift => Additive,
            Additive => Multiplicative,
            Multiplicative | Unary => Unary,
        }
    }
}

/// Where an operator stands relative to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    /// Before a single operand: `-x`, `!x`
    Prefix,
    /// Between two operands: `a - b`
    Infix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    UnaryPlus,
    Subtract,
    Negate,
    Multiply,
    Divide,
    Modulus,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    Not,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
}

impl Operator {
    pub const ALL: [Operator; 21] = [
        Operator::Add,
        Operator::UnaryPlus,
        Operator::Subtract,
        Operator::Negate,
        Operator::Multiply,
        Operator::Divide,
        Operator::Modulus,
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::GreaterThan,
        Operator::LessEqual,
        Operator::GreaterEqual,
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::BitwiseAnd,
        Operator::BitwiseOr,
        Operator::BitwiseXor,
        Operator::LeftShift,
        Operator::RightShift,
    ];

    /// Source spellings; word tags match in any letter case.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Operator::Add | Operator::UnaryPlus => &["+"],
            Operator::Subtract | Operator::Negate => &["-"],
            Operator::Multiply => &["*"],
            Operator::Divide => &["/"],
            Operator::Modulus => &["%", "mod"],
            Operator::Equal => &["==", "="],
            Operator::NotEqual => &["!=", "<>"],
            Operator::LessThan => &["<"],
            Operator::GreaterThan => &[">"],
            Operator::LessEqual => &["<="],
            Operator::GreaterEqual => &[">="],
            Operator::And => &["&&", "and"],
            Operator::Or => &["||", "or"],
            Operator::Not => &["!", "not"],
            Operator::BitwiseAnd => &["&"],
            Operator::BitwiseOr => &["|"],
            Operator::BitwiseXor => &["^"],
            Operator::LeftShift => &["<<"],
            Operator::RightShift => &[">>"],
        }
    }

    pub fn fixity(self) -> Fixity {
        match self {
            Operator::UnaryPlus | Operator::Negate | Operator::Not => Fixity::Prefix,
            _ => Fixity::Infix,
        }
    }

    pub fn precedence(self) -> Precedence {
        match self {
            Operator::UnaryPlus | Operator::Negate | Operator::Not => Precedence::Unary,
            Operator::Multiply | Operator::Divide | Operator::Modulus => Precedence::Multiplicative,
            Operator::Add | Operator::Subtract => Precedence::Additive,
            Operator::LeftShift | Operator::RightShift => Precedence::Shift,
            Operator::LessThan
            | Operator::GreaterThan
            | Operator::LessEqual
            | Operator::GreaterEqual => Precedence::Relational,
            Operator::Equal | Operator::NotEqual => Precedence::Equality,
            Operator::BitwiseAnd => Precedence::BitwiseAnd,
            Operator::BitwiseXor => Precedence::BitwiseXor,
            Operator::BitwiseOr => Precedence::BitwiseOr,
            Operator::And => Precedence::And,
            Operator::Or => Precedence::Or,
        }
    }

    pub fn associativity(self) -> Associativity {
        Associativity::Left
    }

    /// Number of operands [`Operator::build`] expects.
    pub fn arity(self) -> usize {
        match self.fixity() {
            Fixity::Prefix => 1,
            Fixity::Infix => 2,
        }
    }

    /// Primary spelling, used in messages.
    pub fn symbol(self) -> &'static str {
        self.tags()[0]
    }

    /// Builds the tree node for this operator from its parsed operands.
    ///
    /// Returns `None` when the operand count does not match [`Operator::arity`].
    pub fn build(self, operands: Vec<Expr>) -> Option<Expr> {
        if operands.len() != self.arity() {
            return None;
        }
        let mut operands = operands.into_iter();
        let first = operands.next()?;

        let op = match self {
            Operator::UnaryPlus => return Some(Expr::unary(UnaryOp::Plus, first)),
            Operator::Negate => return Some(Expr::unary(UnaryOp::Negate, first)),
            Operator::Not => return Some(Expr::unary(UnaryOp::Not, first)),
            Operator::Add => BinOp::Add,
            Operator::Subtract => BinOp::Subtract,
            Operator::Multiply => BinOp::Multiply,
            Operator::Divide => BinOp::Divide,
            Operator::Modulus => BinOp::Modulus,
            Operator::Equal => BinOp::Equal,
            Operator::NotEqual => BinOp::NotEqual,
            Operator::LessThan => BinOp::LessThan,
            Operator::GreaterThan => BinOp::GreaterThan,
            Operator::LessEqual => BinOp::LessEqual,
            Operator::GreaterEqual => BinOp::GreaterEqual,
            Operator::And => BinOp::And,
            Operator::Or => BinOp::Or,
            Operator::BitwiseAnd => BinOp::BitwiseAnd,
            Operator::BitwiseOr => BinOp::BitwiseOr,
            Operator::BitwiseXor => BinOp::BitwiseXor,
            Operator::LeftShift => BinOp::LeftShift,
            Operator::RightShift => BinOp::RightShift,
        };
        Some(Expr::binary(op, first, operands.next()?))
    }
}

type OperatorTable = HashMap<(String, Fixity), Operator>;

static OPERATORS: LazyLock<OperatorTable> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for op in Operator::ALL {
        register(&mut table, op);
    }
    table
});

/// Adds `op` under each of its tags. Only called while building the table.
fn register(table: &mut OperatorTable, op: Operator) {
    for tag in op.tags() {
        table.insert((tag.to_lowercase(), op.fixity()), op);
    }
}

/// Finds the operator spelled `text` with the given fixity.
pub fn lookup(text: &str, fixity: Fixity) -> Option<Operator> {
    OPERATORS.get(&(text.to_lowercase(), fixity)).copied()
}

/// True when `text` is the tag of some operator, whatever its fixity.
pub fn is_operator(text: &str) -> bool {
    lookup(text, Fixity::Prefix).is_some() || lookup(text, Fixity::Infix).is_some()
}

/// Resolves `text` the way the parser would after `previous`.
///
/// `-` after an operand is subtraction; at the start of input, after another
/// operator, `(` or `,` it is negation.
pub fn match_token(text: &str, previous: Option<&Token>) -> Option<Operator> {
    lookup(text, crate::parser::fixity_after(previous))
}
