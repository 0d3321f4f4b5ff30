//! Sheet state and graph maintenance.

mod cell;
mod cycle;
mod eval;
mod inspect;
mod ops;
mod state;

pub use cell::{CellId, CellView, Content};
pub use inspect::CellSnapshot;
pub use state::Spreadsheet;
