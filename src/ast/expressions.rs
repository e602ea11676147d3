use crate::{
    ast::{BinOp, UnaryOp},
    registry::functions::Function,
    value::Value,
};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Nodes own their children. A tree is never mutated after the parser returns
/// it, so [`crate::Expression`] shares it between threads behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 1.8
    /// 'text'
    /// #1/1/2009#
    /// true
    /// ```
    Literal(Value),

    /// Variable reference, resolved case-insensitively at evaluation time
    ///
    /// # Example
    /// ```text
    /// [unit price]
    /// ```
    Variable(String),

    /// Prefix operation
    ///
    /// # Examples
    /// ```text
    /// -[a]
    /// !([a] > 2)
    /// ```
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Infix operation (arithmetic, comparison, logical, bitwise)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Function call, already checked against the function's arity
    ///
    /// # Examples
    /// ```text
    /// abs(-1)
    /// average(10, 20, 5, 15)
    /// ```
    Call { function: Function, args: Vec<Expr> },
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
