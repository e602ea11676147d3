//! Reference documentation for the expressive CLI

use super::CliError;
use crate::registry::{Fixity, Function, Operator};

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Literals,
    Operators,
    Functions,
    Types,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "literals" | "literal" | "syntax" => Some(Self::Literals),
            "operators" | "ops" => Some(Self::Operators),
            "functions" | "function" | "fns" => Some(Self::Functions),
            "types" | "type" | "coercion" => Some(Self::Types),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"EXPRESSIVE DOCUMENTATION

Expressive evaluates formulas such as `[price] * (1 + [tax rate])` against a
set of named variables.

DOCUMENTATION CATEGORIES

  literals          Numbers, decimals, strings, dates, booleans and variables
  operators         Arithmetic, comparison, logical and bitwise operators
  functions         Built-in functions and their argument counts
  types             Numeric representations and coercion rules

QUICK REFERENCE

  42    1.8         Integer, decimal
  'text'            String
  #1/1/2009#        Date
  [name]            Variable
  abs(-1)           Function call

Run 'expressive doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<String, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Literals) => Ok(LITERALS_DOC.to_string()),
        Some(DocCategory::Operators) => Ok(operators_doc()),
        Some(DocCategory::Functions) => Ok(functions_doc()),
        Some(DocCategory::Types) => Ok(TYPES_DOC.to_string()),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

fn operators_doc() -> String {
    let mut doc = String::from("OPERATORS - Loosest binding first\n\n");
    let mut operators = Operator::ALL.to_vec();
    operators.sort_by_key(|op| op.precedence());

    for op in operators {
        let fixity = match op.fixity() {
            Fixity::Prefix => "prefix",
            Fixity::Infix => "infix",
        };
        doc.push_str(&format!(
            "  {:<14} {:<8} {:<16} {:?}\n",
            op.tags().join(" "),
            fixity,
            format!("{:?}", op),
            op.precedence()
        ));
    }
    doc.push_str(
        "\n  && and || stop evaluating as soon as the left operand decides the result.\n",
    );
    doc
}

fn functions_doc() -> String {
    let mut doc = String::from("FUNCTIONS - Names are case-insensitive\n\n");
    for function in Function::ALL {
        doc.push_str(&format!("  {:<12} {} argument(s)\n", function.name(), function.arity()));
    }
    doc.push_str("\n  '+' after a count means \"at least\".\n");
    doc
}

const LITERALS_DOC: &str = r#"LITERALS

INTEGER
  42
    All-digit literals are 64-bit integers.

DECIMAL
  1.8    .5
    Literals with a decimal point are exact fixed-point decimals.

STRING
  'hello'
    Single quotes. Escapes:
      \'    quote
      \n    newline
      \t    tab
      \x    any other character, taken literally

DATE
  #1/31/2009#    #1/31/2009 13:45#    #2009-01-31#
    Month/day/year or ISO year-month-day, with an optional time of day.

BOOLEAN
  true    FALSE
    Case-insensitive.

VARIABLE
  [var1]    [unit price]
    Looked up by name, ignoring case, when the expression is evaluated.
    A variable bound to another expression is evaluated in its place.
"#;

const TYPES_DOC: &str = r#"TYPES - Numeric representations and coercion

  integer    64-bit signed
  decimal    fixed-point, 28 significant digits
  double     64-bit floating point (math functions, integer division)

ADDITION (+)
  Any two numbers can be added; the result takes the wider kind.
  A double added to a decimal becomes a decimal.
  If either side is a string, both are concatenated as text.

OTHER ARITHMETIC (- * / %)
  Integers are promoted to the other operand's kind.
  A decimal cannot be combined with a double:
    1.8 - abs([d])    fails when [d] holds a double

DIVISION
  integer / integer    always a double: 3/6 = 0.5
  decimal / decimal    decimal

COMPARISON
  Numbers compare across kinds; strings, booleans and dates compare within
  their own kind.
"#;
