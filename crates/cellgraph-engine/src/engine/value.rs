//! Evaluated cell values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of error markers a cell can evaluate to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The formula text could not be parsed.
    Parse,
    DivisionByZero,
    /// An operand had the wrong type (e.g. arithmetic on non-numeric text).
    Value,
    /// Unknown function or identifier.
    Name,
    /// Non-finite numeric result.
    Number,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Parse,
        ErrorKind::DivisionByZero,
        ErrorKind::Value,
        ErrorKind::Name,
        ErrorKind::Number,
    ];

    /// Spreadsheet-style marker, e.g. `#DIV/0!`.
    pub fn marker(self) -> &'static str {
        match self {
            ErrorKind::Parse => "#ERROR!",
            ErrorKind::DivisionByZero => "#DIV/0!",
            ErrorKind::Value => "#VALUE!",
            ErrorKind::Name => "#NAME?",
            ErrorKind::Number => "#NUM!",
        }
    }

    /// Inverse of [`ErrorKind::marker`] (case-insensitive).
    pub fn from_marker(text: &str) -> Option<ErrorKind> {
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.marker().eq_ignore_ascii_case(text))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// The evaluated value of a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(ErrorKind),
}

impl Value {
    /// The value an empty cell evaluates to.
    pub fn default_for(default_number: f64) -> Value {
        Value::Number(default_number)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render this value as an operand that can be spliced into formula text.
    ///
    /// Negative numbers are parenthesised so `2^A1` stays well-formed,
    /// text becomes a quoted string literal.
    pub fn to_formula_operand(&self) -> String {
        match self {
            Value::Number(n) if *n < 0.0 => format!("({})", format_number(*n)),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for ch in s.chars() {
                    if ch == '"' || ch == '\\' {
                        out.push('\\');
                    }
                    out.push(ch);
                }
                out.push('"');
                out
            }
            Value::Error(kind) => kind.marker().to_string(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0.0)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<ErrorKind> for Value {
    fn from(kind: ErrorKind) -> Self {
        Value::Error(kind)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Error(kind) => f.write_str(kind.marker()),
        }
    }
}

/// Format a number so it parses back to the same `f64`.
/// Integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        ErrorKind::Number.marker().to_string()
    } else if n == 0.0 {
        // Avoids printing "-0".
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}
