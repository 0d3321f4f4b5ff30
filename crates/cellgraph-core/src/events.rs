//! Change notifications emitted by a sheet.
//!
//! A host can install a hook with [`Spreadsheet::with_observer`] to follow
//! edits, graph changes and recalculation without polling. The same events
//! are also written to the `log` facade at debug/trace level.
//!
//! [`Spreadsheet::with_observer`]: crate::Spreadsheet::with_observer

use cellgraph_engine::engine::{Address, Value};

use crate::sheet::Content;

/// Events emitted while a sheet is mutated or evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    /// A cell's content was replaced (emitted only for committed edits).
    ContentChanged {
        address: Address,
        from: Content,
        to: Content,
    },

    /// `from` now references `to`.
    ReferenceAdded { from: Address, to: Address },

    /// `from` no longer references `to`.
    ReferenceRemoved { from: Address, to: Address },

    /// An edit was rejected because it would close a reference cycle.
    CycleRejected { address: Address, path: Vec<Address> },

    /// A cell's value was computed (not emitted for memoized reads).
    Evaluated { address: Address, value: Value },

    /// Recalculation after an edit finished.
    Propagated {
        origin: Address,
        /// Cells whose value was recomputed, including the edited cell.
        recomputed: usize,
        /// Downstream cells skipped because none of their inputs changed value.
        unchanged: usize,
    },
}

/// Callback invoked for every [`SheetEvent`].
pub type EventHook = Box<dyn Fn(&SheetEvent) + Send + Sync>;
