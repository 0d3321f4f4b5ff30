//! cellgraph - reactive cell graph with formulas and incremental recalculation.
//!
//! Re-exports the sheet model from `cellgraph-core` and the address, value and
//! formula machinery from `cellgraph-engine`.

pub mod demo;

pub use cellgraph_core::{
    Address, CellId, CellSnapshot, CellView, Content, ErrorKind, EventHook, Result, SheetConfig,
    SheetError, SheetEvent, Spreadsheet, Value,
};
pub use cellgraph_engine::engine::{
    AddressError, AddressToken, AddressTokenizer, ArithmeticEvaluator, FormulaError,
    FormulaEvaluator, MAX_DEPTH, PatternTokenizer, format_number, substitute,
};
