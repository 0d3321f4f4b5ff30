use std::collections::BTreeSet;

use cellgraph_engine::engine::Address;

use super::Spreadsheet;
use super::cell::{CellId, CellView, Content};
use crate::error::{Result, SheetError};
use crate::events::SheetEvent;

impl Spreadsheet {
    /// Replace a cell's content and bring every dependent cell up to date.
    ///
    /// Setting content equal to what the cell already holds is a no-op: no
    /// edges are touched and nothing is recomputed. If the new formula would
    /// create a circular reference the edit is rejected and the sheet is left
    /// exactly as it was (no cells are created either).
    pub fn set(&mut self, address: &str, content: impl Into<Content>) -> Result<CellView<'_>> {
        let address = Address::parse(address)?;
        let content = content.into();
        let existing = self.index.get(&address).copied();

        if let Some(id) = existing
            && self.cell(id).content == content
        {
            log::trace!("{address} unchanged, skipping update");
            return Ok(self.view(id));
        }

        let desired = match content.raw_formula_text() {
            Some(text) => self.tokenizer.addresses(text),
            None => Vec::new(),
        };
        self.validate_references(&address, existing, &desired)?;

        let id = existing.unwrap_or_else(|| self.get_or_create(&address));
        if existing.is_none() && content == Content::Empty {
            return Ok(self.view(id));
        }

        self.sync_references(id, &desired);
        let previous = std::mem::replace(&mut self.cell_mut(id).content, content);
        log::debug!(
            "changing {address} from `{}` to `{}`",
            previous.to_input_string(self.config.formula_marker),
            self.cell(id).content.to_input_string(self.config.formula_marker)
        );
        self.emit(|| SheetEvent::ContentChanged {
            address: address.clone(),
            from: previous,
            to: self.cell(id).content.clone(),
        });

        self.invalidate_and_reevaluate(id);
        Ok(self.view(id))
    }

    /// Set a cell from edit-line input, using the configured formula marker.
    pub fn set_input(&mut self, address: &str, input: &str) -> Result<CellView<'_>> {
        let content = Content::from_input(input, self.config.formula_marker);
        self.set(address, content)
    }

    /// Check every reference the edit would add. Nothing is mutated here, so a
    /// rejection leaves the sheet untouched.
    fn validate_references(
        &self,
        address: &Address,
        existing: Option<CellId>,
        desired: &[Address],
    ) -> Result<()> {
        for target in desired {
            if target == address {
                return Err(self.reject(address, vec![address.clone(), address.clone()]));
            }
            // A cell that does not exist yet has no observers, so only a
            // self-reference could close a cycle through it.
            let (Some(from), Some(to)) = (existing, self.index.get(target).copied()) else {
                continue;
            };
            if self.cell(from).references.contains(&to) {
                continue;
            }
            if let Some(path) = self.would_create_cycle(from, to) {
                let path = path.into_iter().map(|id| self.address(id).clone()).collect();
                return Err(self.reject(address, path));
            }
        }
        Ok(())
    }

    fn reject(&self, address: &Address, path: Vec<Address>) -> SheetError {
        log::debug!(
            "cyclical reference detected when editing {address}: {}",
            path.iter().map(Address::as_str).collect::<Vec<_>>().join(" -> ")
        );
        self.emit(|| SheetEvent::CycleRejected {
            address: address.clone(),
            path: path.clone(),
        });
        SheetError::CircularReference {
            address: address.clone(),
            path,
        }
    }

    /// Make `id`'s references exactly `desired`, keeping observer edges symmetric.
    /// Referenced cells that do not exist yet are created empty.
    fn sync_references(&mut self, id: CellId, desired: &[Address]) {
        let desired_ids: Vec<CellId> = desired.iter().map(|a| self.get_or_create(a)).collect();
        let desired_set: BTreeSet<CellId> = desired_ids.iter().copied().collect();

        let to_remove: Vec<CellId> = self
            .cell(id)
            .references
            .difference(&desired_set)
            .copied()
            .collect();
        for target in to_remove {
            self.remove_reference(id, target);
        }

        for target in desired_ids {
            if !self.cell(id).references.contains(&target) {
                self.add_reference(id, target);
            }
        }
    }

    fn add_reference(&mut self, from: CellId, to: CellId) {
        log::trace!("adding reference {} to {}", self.address(to), self.address(from));
        self.cell_mut(from).references.insert(to);
        self.cell_mut(to).observers.insert(from);
        self.emit(|| SheetEvent::ReferenceAdded {
            from: self.address(from).clone(),
            to: self.address(to).clone(),
        });
    }

    fn remove_reference(&mut self, from: CellId, to: CellId) {
        log::trace!("removing reference {} from {}", self.address(to), self.address(from));
        self.cell_mut(from).references.remove(&to);
        self.cell_mut(to).observers.remove(&from);
        self.emit(|| SheetEvent::ReferenceRemoved {
            from: self.address(from).clone(),
            to: self.address(to).clone(),
        });
    }
}
