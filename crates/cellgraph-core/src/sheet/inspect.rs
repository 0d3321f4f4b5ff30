//! Read-only introspection: structural self-checks and serializable snapshots.

use std::collections::{BTreeSet, VecDeque};

use cellgraph_engine::engine::{Address, Value};
use serde::Serialize;

use super::Spreadsheet;
use super::cell::CellId;

/// Plain-data copy of one cell, in a form suitable for dumping or diffing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellSnapshot {
    pub address: Address,
    /// The content as it would be typed on the edit line.
    pub input: String,
    pub value: Option<Value>,
    pub references: BTreeSet<Address>,
    pub observers: BTreeSet<Address>,
}

impl Spreadsheet {
    /// Every cell in sheet order.
    pub fn snapshot(&self) -> Vec<CellSnapshot> {
        let mut cells: Vec<CellSnapshot> = self
            .cells
            .iter()
            .map(|cell| CellSnapshot {
                address: cell.address.clone(),
                input: cell.content.to_input_string(self.config.formula_marker),
                value: cell.cached_value.clone(),
                references: self.addresses_of(&cell.references),
                observers: self.addresses_of(&cell.observers),
            })
            .collect();
        cells.sort_by(|a, b| a.address.cmp(&b.address));
        cells
    }

    /// Check the graph invariants: the address index matches the arena,
    /// every reference has a matching observer edge (and vice versa), formula
    /// references match the formula text and there is no cycle.
    pub fn is_consistent(&self) -> bool {
        self.index_matches()
            && self.edges_symmetric()
            && self.references_match_content()
            && self.is_acyclic()
    }

    fn index_matches(&self) -> bool {
        self.index.len() == self.cells.len()
            && self
                .cells
                .iter()
                .enumerate()
                .all(|(i, cell)| self.index.get(&cell.address) == Some(&CellId(i)))
    }

    fn edges_symmetric(&self) -> bool {
        self.cells.iter().enumerate().all(|(i, cell)| {
            let id = CellId(i);
            cell.references.iter().all(|r| self.cell(*r).observers.contains(&id))
                && cell.observers.iter().all(|o| self.cell(*o).references.contains(&id))
        })
    }

    fn references_match_content(&self) -> bool {
        self.cells.iter().all(|cell| {
            let expected: BTreeSet<Address> = match cell.content.raw_formula_text() {
                Some(text) => self.tokenizer.addresses(text).into_iter().collect(),
                None => BTreeSet::new(),
            };
            expected == self.addresses_of(&cell.references)
        })
    }

    fn is_acyclic(&self) -> bool {
        let mut pending: Vec<usize> = self.cells.iter().map(|c| c.references.len()).collect();
        let mut ready: VecDeque<CellId> = (0..self.cells.len())
            .filter(|i| pending[*i] == 0)
            .map(CellId)
            .collect();
        let mut visited = 0;
        while let Some(id) = ready.pop_front() {
            visited += 1;
            for observer in &self.cell(id).observers {
                pending[observer.index()] -= 1;
                if pending[observer.index()] == 0 {
                    ready.push_back(*observer);
                }
            }
        }
        visited == self.cells.len()
    }
}
