use std::{collections::HashMap, fmt, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::expression::Expression;

/// A runtime value of the expression language.
///
/// # Numeric Representations
///
/// Three numeric kinds are kept apart:
/// - `Integer` for all-digit literals and integer arithmetic
/// - `Decimal` for literals with a decimal point (fixed-point, exact)
/// - `Double` for math function results, integer division and host values
///
/// `+` and the comparison operators widen freely between them, the other
/// arithmetic operators only promote `Integer` (see [`crate::evaluator`]).
///
/// # Nested Expressions
///
/// A variable can be bound to another parsed [`Expression`]. It is evaluated
/// against the same variables every time it is referenced.
///
/// # Examples
///
/// ```
/// use expressive::Value;
/// use rust_decimal::Decimal;
///
/// let integer = Value::Integer(42);
/// let decimal = Value::Decimal(Decimal::new(18, 1)); // 1.8
/// let double = Value::Double(0.5);
/// let string = Value::from("hello");
///
/// assert_eq!(decimal.to_string(), "1.8");
/// assert_eq!(string.type_name(), "string");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),

    /// Fixed-point decimal
    Decimal(Decimal),

    /// IEEE 754 double
    Double(f64),

    /// UTF-8 string
    String(String),

    Boolean(bool),

    /// Calendar date and wall-clock time, no time zone
    DateTime(NaiveDateTime),

    /// Unevaluated sub-expression bound as a variable
    Expression(Arc<Expression>),
}

impl Value {
    /// Human-readable type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::DateTime(_) => "datetime",
            Value::Expression(_) => "expression",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Decimal(_) | Value::Double(_))
    }

    /// Get as double (numeric kinds only)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Decimal(d) => d.to_f64(),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer, without rounding
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Same-kind comparison; see [`crate::evaluator`] for cross-kind equality.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Expression(a), Value::Expression(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Textual form, as used by string concatenation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Double(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::DateTime(dt) if dt.time() == NaiveTime::MIN => {
                write!(f, "{}", dt.format("%-m/%-d/%Y"))
            }
            Value::DateTime(dt) => write!(f, "{}", dt.format("%-m/%-d/%Y %-H:%M:%S")),
            Value::Expression(expr) => f.write_str(expr.source()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::DateTime(d.and_time(NaiveTime::MIN))
    }
}

impl From<Expression> for Value {
    fn from(expr: Expression) -> Self {
        Value::Expression(Arc::new(expr))
    }
}

impl From<Arc<Expression>> for Value {
    fn from(expr: Arc<Expression>) -> Self {
        Value::Expression(expr)
    }
}

/// Variable bindings supplied to one evaluation.
///
/// Names are case-insensitive: `[Var1]` and `[var1]` refer to the same
/// binding.
///
/// # Examples
///
/// ```
/// use expressive::{Value, Variables};
///
/// let mut vars = Variables::new();
/// vars.insert("Price", 10);
/// assert_eq!(vars.get("price"), Some(&Value::Integer(10)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, returning the value it replaced.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(fold(name.as_ref()), value.into())
    }

    /// Builder form of [`Variables::insert`].
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(&fold(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&fold(name))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over bindings; names are reported in their folded form.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn fold(name: &str) -> String {
    name.to_lowercase()
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Variables::new();
        for (k, v) in iter {
            vars.insert(k, v);
        }
        vars
    }
}

impl<K: AsRef<str>, V: Into<Value>> From<HashMap<K, V>> for Variables {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}
