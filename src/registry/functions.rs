//! Function registry.
//!
//! Functions are resolved by name (any letter case) while parsing. The parser
//! checks the argument count against [`Function::arity`] when it builds the
//! call node; [`Function::call`] then only ever sees a valid count.

use std::{cmp::Ordering, collections::HashMap, fmt, sync::LazyLock};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    ast::BinOp,
    evaluator::{self, EvalError},
    value::Value,
};

/// How many arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    fn requirement(self) -> String {
        match self {
            Arity::Exactly(n) => format!("takes only {}", n),
            Arity::AtLeast(n) => format!("expects at least {}", n),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "{}+", n),
        }
    }
}

/// A call whose argument count breaks the function's [`Arity`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}() {} argument(s)", .function, .arity.requirement())]
pub struct ArityError {
    pub function: &'static str,
    pub arity: Arity,
    pub found: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Abs,
    Acos,
    Asin,
    Atan,
    Average,
    Ceiling,
    Concat,
    Contains,
    Cos,
    Count,
    EndsWith,
    Exp,
    Floor,
    In,
    Length,
    Log,
    Log10,
    Max,
    Min,
    Pow,
    Round,
    Sign,
    Sin,
    Sqrt,
    StartsWith,
    Substring,
    Sum,
    Tan,
    Truncate,
}

impl Function {
    pub const ALL: [Function; 29] = [
        Function::Abs,
        Function::Acos,
        Function::Asin,
        Function::Atan,
        Function::Average,
        Function::Ceiling,
        Function::Concat,
        Function::Contains,
        Function::Cos,
        Function::Count,
        Function::EndsWith,
        Function::Exp,
        Function::Floor,
        Function::In,
        Function::Length,
        Function::Log,
        Function::Log10,
        Function::Max,
        Function::Min,
        Function::Pow,
        Function::Round,
        Function::Sign,
        Function::Sin,
        Function::Sqrt,
        Function::StartsWith,
        Function::Substring,
        Function::Sum,
        Function::Tan,
        Function::Truncate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Function::Abs => "Abs",
            Function::Acos => "Acos",
            Function::Asin => "Asin",
            Function::Atan => "Atan",
            Function::Average => "Average",
            Function::Ceiling => "Ceiling",
            Function::Concat => "Concat",
            Function::Contains => "Contains",
            Function::Cos => "Cos",
            Function::Count => "Count",
            Function::EndsWith => "EndsWith",
            Function::Exp => "Exp",
            Function::Floor => "Floor",
            Function::In => "In",
            Function::Length => "Length",
            Function::Log => "Log",
            Function::Log10 => "Log10",
            Function::Max => "Max",
            Function::Min => "Min",
            Function::Pow => "Pow",
            Function::Round => "Round",
            Function::Sign => "Sign",
            Function::Sin => "Sin",
            Function::Sqrt => "Sqrt",
            Function::StartsWith => "StartsWith",
            Function::Substring => "Substring",
            Function::Sum => "Sum",
            Function::Tan => "Tan",
            Function::Truncate => "Truncate",
        }
    }

    pub fn arity(self) -> Arity {
        use Function::*;
        match self {
            Average | Concat | Count | Max | Min | Sum => Arity::AtLeast(1),
            In => Arity::AtLeast(2),
            Contains | EndsWith | Log | Pow | Round | StartsWith => Arity::Exactly(2),
            Substring => Arity::Exactly(3),
            Abs | Acos | Asin | Atan | Ceiling | Cos | Exp | Floor | Length | Log10 | Sign
            | Sin | Sqrt | Tan | Truncate => Arity::Exactly(1),
        }
    }

    pub fn check_arity(self, count: usize) -> Result<(), ArityError> {
        if self.arity().accepts(count) {
            Ok(())
        } else {
            Err(ArityError {
                function: self.name(),
                arity: self.arity(),
                found: count,
            })
        }
    }

    /// Applies the function to already evaluated arguments.
    pub fn call(self, args: &[Value]) -> Result<Value, EvalError> {
        use Function::*;
        let first = match args.first() {
            Some(first) if self.arity().accepts(args.len()) => first,
            _ => {
                return Err(self.invalid(format!(
                    "expects {} argument(s), got {}",
                    self.arity(),
                    args.len()
                )));
            }
        };

        match self {
            Abs => match first {
                Value::Integer(n) => n
                    .checked_abs()
                    .map(Value::Integer)
                    .ok_or(EvalError::Overflow { operator: "Abs" }),
                Value::Decimal(d) => Ok(Value::Decimal(d.abs())),
                Value::Double(x) => Ok(Value::Double(x.abs())),
                other => Err(self.not_numeric(other)),
            },
            Ceiling => self.round_with(first, Decimal::ceil, f64::ceil),
            Floor => self.round_with(first, Decimal::floor, f64::floor),
            Truncate => self.round_with(first, Decimal::trunc, f64::trunc),
            Round => {
                let digits = match args[1].as_i64() {
                    Some(n @ 0..=28) => n as u32,
                    _ => {
                        return Err(self.invalid(format!(
                            "expects a digit count between 0 and 28, got {}",
                            args[1]
                        )));
                    }
                };
                match first {
                    Value::Integer(n) => Ok(Value::Integer(*n)),
                    Value::Decimal(d) => Ok(Value::Decimal(d.round_dp(digits))),
                    Value::Double(x) => Ok(Value::Double(round_double(*x, digits))),
                    other => Err(self.not_numeric(other)),
                }
            }
            Sign => match first {
                Value::Integer(n) => Ok(Value::Integer(n.signum())),
                Value::Decimal(d) => Ok(Value::Integer(if d.is_zero() {
                    0
                } else if d.is_sign_negative() {
                    -1
                } else {
                    1
                })),
                Value::Double(x) if x.is_nan() => Err(self.domain("NaN")),
                Value::Double(x) => Ok(Value::Integer(if *x == 0.0 {
                    0
                } else if *x < 0.0 {
                    -1
                } else {
                    1
                })),
                other => Err(self.not_numeric(other)),
            },
            Acos | Asin => {
                let x = self.number(first)?;
                if !(-1.0..=1.0).contains(&x) {
                    return Err(self.domain(&x.to_string()));
                }
                Ok(Value::Double(if self == Acos { x.acos() } else { x.asin() }))
            }
            Atan => Ok(Value::Double(self.number(first)?.atan())),
            Cos => Ok(Value::Double(self.number(first)?.cos())),
            Sin => Ok(Value::Double(self.number(first)?.sin())),
            Tan => Ok(Value::Double(self.number(first)?.tan())),
            Exp => Ok(Value::Double(self.number(first)?.exp())),
            Sqrt => {
                let x = self.number(first)?;
                if x < 0.0 {
                    return Err(self.domain(&x.to_string()));
                }
                Ok(Value::Double(x.sqrt()))
            }
            Log10 => {
                let x = self.number(first)?;
                if x <= 0.0 {
                    return Err(self.domain(&x.to_string()));
                }
                Ok(Value::Double(x.log10()))
            }
            Log => {
                let x = self.number(first)?;
                let base = self.number(&args[1])?;
                if x <= 0.0 || base <= 0.0 || base == 1.0 {
                    return Err(self.domain(&format!("{} in base {}", x, base)));
                }
                Ok(Value::Double(x.log(base)))
            }
            Pow => {
                let x = self.number(first)?;
                Ok(Value::Double(x.powf(self.number(&args[1])?)))
            }
            Average => {
                let mut total = 0.0;
                for arg in args {
                    total += self.number(arg)?;
                }
                Ok(Value::Double(total / args.len() as f64))
            }
            Sum => {
                let mut total = Value::Integer(0);
                for arg in args {
                    if !arg.is_numeric() {
                        return Err(self.not_numeric(arg));
                    }
                    total = evaluator::add(&total, arg)?;
                }
                Ok(total)
            }
            Count => Ok(Value::Integer(args.len() as i64)),
            Max => self.extreme(args, Ordering::Greater),
            Min => self.extreme(args, Ordering::Less),
            In => {
                let found = args[1..].iter().any(|candidate| {
                    matches!(
                        evaluator::compare(BinOp::Equal, first, candidate),
                        Ok(Some(Ordering::Equal))
                    )
                });
                Ok(Value::Boolean(found))
            }
            Length => Ok(Value::Integer(self.text(first)?.chars().count() as i64)),
            Concat => Ok(Value::String(args.iter().map(Value::to_string).collect())),
            Contains => Ok(Value::Boolean(self.text(first)?.contains(self.text(&args[1])?))),
            StartsWith => Ok(Value::Boolean(
                self.text(first)?.starts_with(self.text(&args[1])?),
            )),
            EndsWith => Ok(Value::Boolean(self.text(first)?.ends_with(self.text(&args[1])?))),
            Substring => {
                let text = self.text(first)?;
                let (start, length) = match (args[1].as_i64(), args[2].as_i64()) {
                    (Some(s), Some(l)) if s >= 0 && l >= 0 => (s as usize, l as usize),
                    _ => {
                        return Err(self.invalid(format!(
                            "expects a non-negative integer start and length, got {} and {}",
                            args[1], args[2]
                        )));
                    }
                };
                let count = text.chars().count();
                if start.saturating_add(length) > count {
                    return Err(self.invalid(format!(
                        "range {}..{} is outside a string of length {}",
                        start,
                        start.saturating_add(length),
                        count
                    )));
                }
                Ok(Value::String(text.chars().skip(start).take(length).collect()))
            }
        }
    }

    fn invalid(self, message: String) -> EvalError {
        EvalError::InvalidArgument {
            function: self.name(),
            message,
        }
    }

    fn not_numeric(self, value: &Value) -> EvalError {
        self.invalid(format!("expects a numeric argument, got '{}'", value.type_name()))
    }

    fn domain(self, what: &str) -> EvalError {
        EvalError::Domain {
            function: self.name(),
            message: what.to_string(),
        }
    }

    fn number(self, value: &Value) -> Result<f64, EvalError> {
        value.as_f64().ok_or_else(|| self.not_numeric(value))
    }

    fn text(self, value: &Value) -> Result<&str, EvalError> {
        value.as_str().ok_or_else(|| {
            self.invalid(format!("expects a string argument, got '{}'", value.type_name()))
        })
    }

    /// Shared shape of Ceiling/Floor/Truncate: integers pass through, the
    /// other numeric kinds keep their representation.
    fn round_with(
        self,
        value: &Value,
        decimal: fn(&Decimal) -> Decimal,
        double: fn(f64) -> f64,
    ) -> Result<Value, EvalError> {
        match value {
            Value::Integer(n) => Ok(Value::Integer(*n)),
            Value::Decimal(d) => Ok(Value::Decimal(decimal(d))),
            Value::Double(x) => Ok(Value::Double(double(*x))),
            other => Err(self.not_numeric(other)),
        }
    }

    fn extreme(self, args: &[Value], wanted: Ordering) -> Result<Value, EvalError> {
        let mut best = &args[0];
        for arg in &args[1..] {
            let op = if wanted == Ordering::Greater {
                BinOp::GreaterThan
            } else {
                BinOp::LessThan
            };
            if evaluator::compare(op, arg, best)? == Some(wanted) {
                best = arg;
            }
        }
        Ok(best.clone())
    }
}

/// Banker's rounding of a double to `digits` places.
///
/// Values too large to scale keep every digit they have.
fn round_double(x: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let scaled = x * factor;
    if !scaled.is_finite() {
        return x;
    }
    scaled.round_ties_even() / factor
}

static FUNCTIONS: LazyLock<HashMap<String, Function>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for function in Function::ALL {
        register(&mut table, function);
    }
    table
});

/// Adds `function` under its lower-cased name. Only called while building the
/// table.
fn register(table: &mut HashMap<String, Function>, function: Function) {
    table.insert(function.name().to_lowercase(), function);
}

/// Finds a function by name, ignoring letter case.
pub fn resolve(name: &str) -> Option<Function> {
    FUNCTIONS.get(&name.to_lowercase()).copied()
}
