use std::{
    fmt, panic,
    str::FromStr,
    sync::Arc,
    thread::{self, JoinHandle},
};

use thiserror::Error;

use crate::{
    ast::Expr,
    evaluator::{self, EvalError},
    lexer::{LexError, tokenize},
    parser::{ParseError, Parser, SyntaxError},
    registry::ArityError,
    value::{Value, Variables},
};

/// Any failure of parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// Malformed literal
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Structural parse failure
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Function called with the wrong number of arguments
    #[error(transparent)]
    Arity(#[from] ArityError),

    /// Runtime failure while walking the tree
    #[error(transparent)]
    Evaluation(#[from] EvalError),
}

impl From<ParseError> for ExpressionError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Syntax(e) => ExpressionError::Syntax(e),
            ParseError::Arity(e) => ExpressionError::Arity(e),
        }
    }
}

/// A parsed expression, ready to be evaluated any number of times.
///
/// Parsing happens in [`Expression::new`], so a constructed expression is
/// always syntactically valid. Clones share the same immutable tree.
///
/// # Examples
///
/// ```
/// use expressive::{Expression, Value, Variables};
///
/// let volume = Expression::new("[surface] * [h]").unwrap();
/// let surface = Expression::new("[l] * [K]").unwrap();
///
/// let vars = Variables::new()
///     .with("surface", surface)
///     .with("h", 3)
///     .with("l", 1)
///     .with("K", 2);
///
/// assert_eq!(volume.evaluate(&vars).unwrap(), Value::Integer(6));
/// ```
#[derive(Debug, Clone)]
pub struct Expression {
    source: Arc<str>,
    tree: Arc<Expr>,
}

impl Expression {
    /// Tokenizes and parses `source`.
    pub fn new(source: &str) -> Result<Self, ExpressionError> {
        let tokens = tokenize(source)?;
        let tree = Parser::new(tokens).parse()?;
        Ok(Expression {
            source: Arc::from(source),
            tree: Arc::new(tree),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Expr {
        &self.tree
    }

    pub fn evaluate(&self, variables: &Variables) -> Result<Value, ExpressionError> {
        Ok(evaluator::evaluate(&self.tree, variables)?)
    }

    /// Evaluates without any variables bound.
    pub fn evaluate_empty(&self) -> Result<Value, ExpressionError> {
        self.evaluate(&Variables::new())
    }

    /// Evaluates on a separate thread and hands the result to `callback`.
    ///
    /// Returns immediately. The callback runs exactly once, on the worker
    /// thread, with the same result [`Expression::evaluate`] would return.
    ///
    /// # Examples
    ///
    /// ```
    /// use expressive::{Expression, Value, Variables};
    /// use std::sync::mpsc;
    ///
    /// let expression = Expression::new("1+3").unwrap();
    /// let (tx, rx) = mpsc::channel();
    ///
    /// expression.evaluate_async(Variables::new(), move |result| {
    ///     tx.send(result).unwrap();
    /// });
    ///
    /// assert_eq!(rx.recv().unwrap(), Ok(Value::Integer(4)));
    /// ```
    pub fn evaluate_async<F>(&self, variables: Variables, callback: F) -> EvaluationTask
    where
        F: FnOnce(Result<Value, ExpressionError>) + Send + 'static,
    {
        let tree = Arc::clone(&self.tree);
        let handle = thread::spawn(move || {
            let result = evaluator::evaluate(&tree, &variables).map_err(ExpressionError::from);
            callback(result.clone());
            result
        });
        EvaluationTask { handle }
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::new(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Handle to an evaluation started by [`Expression::evaluate_async`].
///
/// Dropping the handle detaches the worker; the callback still runs.
#[derive(Debug)]
pub struct EvaluationTask {
    handle: JoinHandle<Result<Value, ExpressionError>>,
}

impl EvaluationTask {
    /// True once the evaluation and its callback have completed.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the evaluation and its callback have completed.
    ///
    /// A panic raised by the callback is resumed on the joining thread.
    pub fn join(self) -> Result<Value, ExpressionError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}
