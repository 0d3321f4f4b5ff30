//! Cell data structures for the sheet arena.
//!
//! - [`Content`] - What a cell holds (empty, a literal value, or a formula)
//! - [`Cell`] - Content plus cached value and both directions of graph edges
//! - [`CellId`] - Stable arena index; edges store ids, never owning handles
//! - [`CellView`] - Read-only handle that resolves ids back to addresses

use std::collections::BTreeSet;

use cellgraph_engine::engine::{Address, Value};
use serde::{Deserialize, Serialize};

use super::Spreadsheet;

/// The raw content of a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Content {
    #[default]
    Empty,
    Literal(Value),
    /// Formula text with the leading marker stripped.
    Formula(String),
}

impl Content {
    pub fn formula(text: impl Into<String>) -> Content {
        Content::Formula(text.into())
    }

    /// Parse user input and create the matching content.
    /// - Empty string or whitespace -> Empty
    /// - Starts with `marker` -> Formula (without the marker)
    /// - Quoted string -> Text (without quotes)
    /// - Valid number -> Number
    /// - Otherwise -> Text
    pub fn from_input(input: &str, marker: char) -> Content {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Content::Empty;
        }

        if let Some(formula) = trimmed.strip_prefix(marker) {
            return Content::Formula(formula.to_string());
        }

        if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
            let text = &trimmed[1..trimmed.len() - 1];
            return Content::Literal(Value::Text(text.to_string()));
        }

        if let Ok(n) = trimmed.parse::<f64>()
            && n.is_finite()
        {
            return Content::Literal(Value::Number(n));
        }

        Content::Literal(Value::Text(trimmed.to_string()))
    }

    /// Get the edit-line text for the content. Feeding it back through
    /// [`Content::from_input`] yields the same content, so text that would
    /// read as a number, a formula or a blank is quoted.
    pub fn to_input_string(&self, marker: char) -> String {
        match self {
            Content::Empty => String::new(),
            Content::Literal(Value::Text(text)) => {
                if Content::from_input(text, marker) == *self {
                    text.clone()
                } else {
                    format!("\"{text}\"")
                }
            }
            Content::Literal(value) => value.to_string(),
            Content::Formula(text) => format!("{marker}{text}"),
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, Content::Formula(_))
    }

    /// Formula text without the marker; `None` unless this is a formula.
    pub fn raw_formula_text(&self) -> Option<&str> {
        match self {
            Content::Formula(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Content::Literal(value)
    }
}

impl From<f64> for Content {
    fn from(n: f64) -> Self {
        Content::Literal(Value::Number(n))
    }
}

impl From<i32> for Content {
    fn from(n: i32) -> Self {
        Content::Literal(Value::from(n))
    }
}

/// Parsed as edit-line input with the default `=` marker.
impl From<&str> for Content {
    fn from(input: &str) -> Self {
        Content::from_input(input, '=')
    }
}

impl From<String> for Content {
    fn from(input: String) -> Self {
        Content::from_input(&input, '=')
    }
}

/// Index of a cell in the sheet arena. Stable for the life of the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// A cell in the sheet arena.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    pub(crate) address: Address,
    pub(crate) content: Content,
    /// Memoized value; `None` means the cell needs (re)computation.
    pub(crate) cached_value: Option<Value>,
    /// Cells this cell's formula reads.
    pub(crate) references: BTreeSet<CellId>,
    /// Cells whose formulas read this cell.
    pub(crate) observers: BTreeSet<CellId>,
}

impl Cell {
    pub(crate) fn new_empty(address: Address) -> Cell {
        Cell {
            address,
            content: Content::Empty,
            cached_value: None,
            references: BTreeSet::new(),
            observers: BTreeSet::new(),
        }
    }
}

/// Read-only view of a cell, borrowed from its sheet.
#[derive(Clone, Copy)]
pub struct CellView<'a> {
    sheet: &'a Spreadsheet,
    id: CellId,
}

impl<'a> CellView<'a> {
    pub(crate) fn new(sheet: &'a Spreadsheet, id: CellId) -> Self {
        CellView { sheet, id }
    }

    fn cell(&self) -> &'a Cell {
        &self.sheet.cells[self.id.index()]
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn address(&self) -> &'a Address {
        &self.cell().address
    }

    pub fn content(&self) -> &'a Content {
        &self.cell().content
    }

    /// The memoized value, if the cell has been evaluated since its last change.
    pub fn cached_value(&self) -> Option<&'a Value> {
        self.cell().cached_value.as_ref()
    }

    pub fn is_formula(&self) -> bool {
        self.cell().content.is_formula()
    }

    pub fn raw_formula_text(&self) -> Option<&'a str> {
        self.cell().content.raw_formula_text()
    }

    /// Addresses this cell's formula depends on.
    pub fn references(&self) -> BTreeSet<Address> {
        self.sheet.addresses_of(&self.cell().references)
    }

    /// Addresses of the cells that depend on this one.
    pub fn observers(&self) -> BTreeSet<Address> {
        self.sheet.addresses_of(&self.cell().observers)
    }
}

impl std::fmt::Debug for CellView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellView")
            .field("address", self.address())
            .field("content", self.content())
            .field("cached_value", &self.cached_value())
            .field("references", &self.references())
            .field("observers", &self.observers())
            .finish()
    }
}
