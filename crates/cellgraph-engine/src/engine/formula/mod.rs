//! Constrained formula evaluation.
//!
//! Formulas are never executed as general-purpose code. Substituted formula
//! text goes through a fixed pipeline: [`lexer`] → [`parser`] (a small
//! expression tree) → [`eval`] (a tree walk over numbers, text and error
//! markers). The grammar covers arithmetic, comparison, concatenation and a
//! handful of functions (`SUM`, `MIN`, `MAX`, `AVERAGE`, `ABS`, `ROUND`, `IF`).

mod eval;
mod lexer;
mod parser;

use thiserror::Error;

use super::value::{ErrorKind, Value};

/// Maximum nesting (parentheses, call arguments, prefix signs, exponents and
/// `%`) a formula may use. Deeper formulas fail with [`FormulaError::TooDeep`].
pub const MAX_DEPTH: usize = 64;

/// Why a formula could not produce a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("parse error at {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    #[error("wrong number of arguments to {0}")]
    WrongArgumentCount(String),

    #[error("unknown name: {0}")]
    UnknownName(String),

    #[error("result is not a finite number")]
    NonFinite,

    #[error("operand is an error value {0}")]
    Propagated(ErrorKind),

    #[error("formula nested too deeply")]
    TooDeep,
}

impl FormulaError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> FormulaError {
        FormulaError::Parse {
            position,
            message: message.into(),
        }
    }

    /// The error marker a cell shows for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::Parse { .. } | FormulaError::TooDeep => ErrorKind::Parse,
            FormulaError::DivisionByZero => ErrorKind::DivisionByZero,
            FormulaError::InvalidOperand(_) | FormulaError::WrongArgumentCount(_) => {
                ErrorKind::Value
            }
            FormulaError::UnknownName(_) => ErrorKind::Name,
            FormulaError::NonFinite => ErrorKind::Number,
            FormulaError::Propagated(kind) => *kind,
        }
    }
}

/// Computes a value from formula text whose references were already
/// replaced by operand values. Implementations must be pure.
pub trait FormulaEvaluator: Send + Sync {
    fn evaluate(&self, text: &str) -> Result<Value, FormulaError>;
}

/// The built-in evaluator: a fixed arithmetic/expression grammar.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArithmeticEvaluator;

impl FormulaEvaluator for ArithmeticEvaluator {
    fn evaluate(&self, text: &str) -> Result<Value, FormulaError> {
        let tokens = lexer::tokenize(text)?;
        let expr = parser::parse(&tokens, text.len())?;
        eval::eval(&expr)
    }
}
