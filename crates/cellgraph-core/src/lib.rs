//! cellgraph-core - cell registry with dependency tracking and recalculation.

pub mod config;
pub mod error;
pub mod events;
pub mod sheet;

pub use config::SheetConfig;
pub use error::{Result, SheetError};
pub use events::{EventHook, SheetEvent};
pub use sheet::{CellId, CellSnapshot, CellView, Content, Spreadsheet};

pub use cellgraph_engine::engine::{Address, ErrorKind, Value};
