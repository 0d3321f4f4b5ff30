//! Error types for cellgraph core.

use cellgraph_engine::engine::{Address, AddressError};
use thiserror::Error;

/// Errors that can occur while editing or configuring a sheet.
#[derive(Error, Debug)]
pub enum SheetError {
    /// Committing the edit would make a cell depend on itself. `path` walks
    /// the references from the edited cell back to itself.
    #[error("circular reference detected when editing {address}: {}", display_path(.path))]
    CircularReference { address: Address, path: Vec<Address> },

    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

fn display_path(path: &[Address]) -> String {
    path.iter()
        .map(Address::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, SheetError>;
