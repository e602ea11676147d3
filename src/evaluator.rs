use std::{cell::Cell, cmp::Ordering};

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, UnaryOp},
    value::{Value, Variables},
};

/// How many nested expression variables may be resolved inside each other.
pub const MAX_NESTING_DEPTH: usize = 64;

/// How many tree levels one evaluation may descend, nested expression
/// variables included.
pub const MAX_EVALUATION_DEPTH: usize = 512;

/// Errors that can occur while evaluating a tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Reference to a variable missing from the mapping
    #[error("variable '{0}' is not defined")]
    UnresolvedVariable(String),

    /// Operand types the operator does not accept together
    #[error("Operator '{operator}' can't be applied to operands of types '{left}' and '{right}'")]
    TypeMismatch {
        operator: &'static str,
        left: &'static str,
        right: &'static str,
    },

    /// Operand type a prefix or logical operator does not accept
    #[error("Operator '{operator}' can't be applied to an operand of type '{operand}'")]
    InvalidOperand {
        operator: &'static str,
        operand: &'static str,
    },

    /// Function argument of the wrong type or out of range
    #[error("{function}() {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },

    /// Math function called outside its domain
    #[error("{function}() is undefined for {message}")]
    Domain {
        function: &'static str,
        message: String,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow in '{operator}'")]
    Overflow { operator: &'static str },

    /// Nested expression variables that keep referring to each other
    #[error("variable '{name}' nests expressions deeper than {limit} levels")]
    NestingTooDeep { name: String, limit: usize },

    /// Tree descent beyond [`MAX_EVALUATION_DEPTH`]
    #[error("evaluation descends deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Walks a parsed tree against one set of variables.
///
/// Besides the variables it borrows, the evaluator only tracks how deep the
/// current walk is, so one tree can be evaluated by many evaluators at once.
///
/// # Examples
///
/// ```
/// use expressive::{Evaluator, Value, Variables, lexer::tokenize, parser::Parser};
///
/// let tree = Parser::new(tokenize("[a] * 2").unwrap()).parse().unwrap();
/// let vars = Variables::new().with("a", 21);
///
/// let result = Evaluator::new(&vars).evaluate(&tree).unwrap();
/// assert_eq!(result, Value::Integer(42));
/// ```
pub struct Evaluator<'a> {
    variables: &'a Variables,
    depth: Cell<usize>,
    nesting: Cell<usize>,
}

impl<'a> Evaluator<'a> {
    pub fn new(variables: &'a Variables) -> Self {
        Evaluator {
            variables,
            depth: Cell::new(0),
            nesting: Cell::new(0),
        }
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value, EvalError> {
        let depth = self.depth.get();
        if depth >= MAX_EVALUATION_DEPTH {
            return Err(EvalError::TooDeep {
                limit: MAX_EVALUATION_DEPTH,
            });
        }
        self.depth.set(depth + 1);
        let result = self.evaluate_node(expr);
        self.depth.set(depth);
        result
    }

    fn evaluate_node(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(name) => self.resolve(name),
            Expr::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                apply_unary(*op, &value)
            }
            Expr::Binary {
                op: BinOp::And,
                left,
                right,
            } => {
                if !self.eval_condition(BinOp::And, left)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.eval_condition(BinOp::And, right)?))
            }
            Expr::Binary {
                op: BinOp::Or,
                left,
                right,
            } => {
                if self.eval_condition(BinOp::Or, left)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.eval_condition(BinOp::Or, right)?))
            }
            Expr::Binary { op, left, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                apply_binary(*op, &left_val, &right_val)
            }
            Expr::Call { function, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                function.call(&values)
            }
        }
    }

    fn eval_condition(&self, op: BinOp, expr: &Expr) -> Result<bool, EvalError> {
        let value = self.evaluate(expr)?;
        value.as_bool().ok_or_else(|| EvalError::InvalidOperand {
            operator: op.symbol(),
            operand: value.type_name(),
        })
    }

    /// Looks `name` up; nested expressions are re-evaluated on every reference.
    fn resolve(&self, name: &str) -> Result<Value, EvalError> {
        let value = self
            .variables
            .get(name)
            .ok_or_else(|| EvalError::UnresolvedVariable(name.to_string()))?;

        match value {
            Value::Expression(nested) => {
                let nesting = self.nesting.get();
                if nesting >= MAX_NESTING_DEPTH {
                    return Err(EvalError::NestingTooDeep {
                        name: name.to_string(),
                        limit: MAX_NESTING_DEPTH,
                    });
                }
                self.nesting.set(nesting + 1);
                let result = self.evaluate(nested.tree());
                self.nesting.set(nesting);
                result
            }
            other => Ok(other.clone()),
        }
    }
}

/// Evaluates `tree` against `variables`.
pub fn evaluate(tree: &Expr, variables: &Variables) -> Result<Value, EvalError> {
    Evaluator::new(variables).evaluate(tree)
}

/// Two numeric operands brought to one representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NumericPair {
    Integers(i64, i64),
    Decimals(Decimal, Decimal),
    Doubles(f64, f64),
}

fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(f64::NAN)
}

/// Promotion used by `+` and the comparisons: any numeric mix is accepted and
/// a double meeting a decimal becomes a decimal.
pub(crate) fn widen(left: &Value, right: &Value) -> Option<NumericPair> {
    use NumericPair::*;
    match (left, right) {
        (Value::Decimal(a), Value::Double(b)) => Some(match Decimal::from_f64(*b) {
            Some(b) => Decimals(*a, b),
            None => Doubles(decimal_to_f64(*a), *b),
        }),
        (Value::Double(a), Value::Decimal(b)) => Some(match Decimal::from_f64(*a) {
            Some(a) => Decimals(a, *b),
            None => Doubles(*a, decimal_to_f64(*b)),
        }),
        _ => promote(left, right),
    }
}

/// Promotion used by `-`, `*`, `/` and `%`: only integers are promoted, a
/// decimal never meets a double.
pub(crate) fn promote(left: &Value, right: &Value) -> Option<NumericPair> {
    use NumericPair::*;
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(Integers(*a, *b)),
        (Value::Decimal(a), Value::Decimal(b)) => Some(Decimals(*a, *b)),
        (Value::Double(a), Value::Double(b)) => Some(Doubles(*a, *b)),
        (Value::Integer(a), Value::Decimal(b)) => Some(Decimals(Decimal::from(*a), *b)),
        (Value::Decimal(a), Value::Integer(b)) => Some(Decimals(*a, Decimal::from(*b))),
        (Value::Integer(a), Value::Double(b)) => Some(Doubles(*a as f64, *b)),
        (Value::Double(a), Value::Integer(b)) => Some(Doubles(*a, *b as f64)),
        _ => None,
    }
}

fn mismatch(op: BinOp, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch {
        operator: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

pub(crate) fn apply_unary(op: UnaryOp, value: &Value) -> Result<Value, EvalError> {
    let invalid = || EvalError::InvalidOperand {
        operator: op.symbol(),
        operand: value.type_name(),
    };
    match (op, value) {
        (UnaryOp::Negate, Value::Integer(n)) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or(EvalError::Overflow { operator: "-" }),
        (UnaryOp::Negate, Value::Decimal(d)) => Ok(Value::Decimal(-*d)),
        (UnaryOp::Negate, Value::Double(n)) => Ok(Value::Double(-n)),
        (UnaryOp::Plus, v) if v.is_numeric() => Ok(v.clone()),
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        _ => Err(invalid()),
    }
}

pub(crate) fn apply_binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => add(left, right),
        BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Modulus => {
            arithmetic(op, left, right)
        }
        BinOp::Equal
        | BinOp::NotEqual
        | BinOp::LessThan
        | BinOp::GreaterThan
        | BinOp::LessEqual
        | BinOp::GreaterEqual => {
            let ordering = compare(op, left, right)?;
            Ok(Value::Boolean(relation_holds(op, ordering)))
        }
        BinOp::And | BinOp::Or => match (left, right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(if op == BinOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            _ => Err(mismatch(op, left, right)),
        },
        BinOp::BitwiseAnd
        | BinOp::BitwiseOr
        | BinOp::BitwiseXor
        | BinOp::LeftShift
        | BinOp::RightShift => bitwise(op, left, right),
    }
}

/// `+`: concatenation when either side is a string, otherwise widening
/// numeric addition.
pub(crate) fn add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        return Ok(Value::String(format!("{}{}", left, right)));
    }
    let overflow = EvalError::Overflow { operator: "+" };
    match widen(left, right) {
        Some(NumericPair::Integers(a, b)) => a.checked_add(b).map(Value::Integer).ok_or(overflow),
        Some(NumericPair::Decimals(a, b)) => a.checked_add(b).map(Value::Decimal).ok_or(overflow),
        Some(NumericPair::Doubles(a, b)) => Ok(Value::Double(a + b)),
        None => Err(mismatch(BinOp::Add, left, right)),
    }
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let pair = promote(left, right).ok_or_else(|| mismatch(op, left, right))?;
    let overflow = EvalError::Overflow {
        operator: op.symbol(),
    };

    match pair {
        NumericPair::Integers(a, b) => match op {
            BinOp::Subtract => a.checked_sub(b).map(Value::Integer).ok_or(overflow),
            BinOp::Multiply => a.checked_mul(b).map(Value::Integer).ok_or(overflow),
            // Integer division never truncates
            BinOp::Divide => Ok(Value::Double(a as f64 / b as f64)),
            _ if b == 0 => Err(EvalError::DivisionByZero),
            _ => a.checked_rem(b).map(Value::Integer).ok_or(overflow),
        },
        NumericPair::Decimals(a, b) => match op {
            BinOp::Subtract => a.checked_sub(b).map(Value::Decimal).ok_or(overflow),
            BinOp::Multiply => a.checked_mul(b).map(Value::Decimal).ok_or(overflow),
            _ if b.is_zero() => Err(EvalError::DivisionByZero),
            BinOp::Divide => a.checked_div(b).map(Value::Decimal).ok_or(overflow),
            _ => a.checked_rem(b).map(Value::Decimal).ok_or(overflow),
        },
        NumericPair::Doubles(a, b) => Ok(Value::Double(match op {
            BinOp::Subtract => a - b,
            BinOp::Multiply => a * b,
            BinOp::Divide => a / b,
            _ => a % b,
        })),
    }
}

/// Orders two values of one comparable domain.
///
/// `Ok(None)` means the values are comparable in kind but unordered (NaN).
pub(crate) fn compare(op: BinOp, left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => match widen(left, right) {
            Some(NumericPair::Integers(a, b)) => Some(a.cmp(&b)),
            Some(NumericPair::Decimals(a, b)) => Some(a.cmp(&b)),
            Some(NumericPair::Doubles(a, b)) => a.partial_cmp(&b),
            None => return Err(mismatch(op, left, right)),
        },
    };
    Ok(ordering)
}

fn relation_holds(op: BinOp, ordering: Option<Ordering>) -> bool {
    match op {
        BinOp::Equal => ordering == Some(Ordering::Equal),
        BinOp::NotEqual => ordering != Some(Ordering::Equal),
        BinOp::LessThan => ordering == Some(Ordering::Less),
        BinOp::GreaterThan => ordering == Some(Ordering::Greater),
        BinOp::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinOp::GreaterEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => false,
    }
}

fn bitwise(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (Value::Integer(a), Value::Integer(b)) = (left, right) else {
        return Err(mismatch(op, left, right));
    };
    let shift = |f: fn(i64, u32) -> Option<i64>| {
        u32::try_from(*b)
            .ok()
            .and_then(|s| f(*a, s))
            .map(Value::Integer)
            .ok_or(EvalError::Overflow {
                operator: op.symbol(),
            })
    };
    match op {
        BinOp::BitwiseAnd => Ok(Value::Integer(a & b)),
        BinOp::BitwiseOr => Ok(Value::Integer(a | b)),
        BinOp::BitwiseXor => Ok(Value::Integer(a ^ b)),
        BinOp::LeftShift => shift(i64::checked_shl),
        _ => shift(i64::checked_shr),
    }
}
