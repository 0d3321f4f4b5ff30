//! Formula engine API.
//!
//! The pieces a sheet needs to turn formula text into values:
//!
//! - [`Address`] - Canonical A1-style cell identifiers
//! - [`Value`], [`ErrorKind`] - Evaluated values and error markers
//! - [`AddressTokenizer`], [`PatternTokenizer`] - Find referenced addresses in formula text
//! - [`substitute`] - Splice operand values into formula text
//! - [`FormulaEvaluator`], [`ArithmeticEvaluator`] - Constrained expression evaluation
//! - [`format_number`] - Format numbers for display

mod address;
mod formula;
mod substitute;
mod tokens;
mod value;

pub use address::{Address, AddressError};
pub use formula::{ArithmeticEvaluator, FormulaError, FormulaEvaluator, MAX_DEPTH};
pub use substitute::substitute;
pub use tokens::{AddressToken, AddressTokenizer, PatternTokenizer};
pub use value::{ErrorKind, Value, format_number};
