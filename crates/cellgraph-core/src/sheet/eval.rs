//! Memoized evaluation and change propagation.
//!
//! Values are cached per cell. After an edit the edited cell and everything
//! that (transitively) observes it are recalculated eagerly, in dependency
//! order, so each affected cell is computed at most once per edit. Cells
//! whose inputs all kept their values are skipped.

use std::collections::VecDeque;

use cellgraph_engine::engine::{Address, Value, substitute};
use rustc_hash::{FxHashMap, FxHashSet};

use super::Spreadsheet;
use super::cell::{CellId, Content};
use crate::error::Result;
use crate::events::SheetEvent;

/// Outcome of one propagation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RecalcReport {
    pub recomputed: usize,
    pub unchanged: usize,
}

impl Spreadsheet {
    /// Drop a cell's memoized value and recompute it and all of its dependents.
    pub fn recalculate(&mut self, address: &str) -> Result<Value> {
        let address = Address::parse(address)?;
        let id = self.get_or_create(&address);
        self.invalidate_and_reevaluate(id);
        Ok(self.evaluate(id))
    }

    /// Return the cell's value, computing it (and any uncached inputs) first.
    ///
    /// Inputs are resolved with an explicit stack rather than recursion, so
    /// long reference chains are fine.
    pub(crate) fn evaluate(&mut self, root: CellId) -> Value {
        if let Some(value) = &self.cell(root).cached_value {
            return value.clone();
        }

        let mut stack = vec![root];
        while let Some(&id) = stack.last() {
            if self.cell(id).cached_value.is_some() {
                stack.pop();
                continue;
            }
            let pending: Vec<CellId> = self
                .cell(id)
                .references
                .iter()
                .filter(|r| self.cell(**r).cached_value.is_none())
                .copied()
                .collect();
            if pending.is_empty() {
                let value = self.compute(id);
                self.store(id, value);
                stack.pop();
            } else {
                stack.extend(pending);
            }
        }

        self.cached_or_default(root)
    }

    /// Compute a cell's value from its content. Every referenced cell must
    /// already hold a cached value.
    fn compute(&self, id: CellId) -> Value {
        let cell = self.cell(id);
        match &cell.content {
            Content::Empty => Value::default_for(self.config.default_value),
            Content::Literal(value) => value.clone(),
            Content::Formula(text) => {
                let tokens = self.tokenizer.tokens(text);
                let substituted = substitute(text, &tokens, |address| self.value_at(address));
                log::trace!("evaluating {}: {substituted}", cell.address);
                self.evaluator
                    .evaluate(&substituted)
                    .unwrap_or_else(|e| {
                        log::debug!("formula in {} failed: {e}", cell.address);
                        Value::Error(e.kind())
                    })
            }
        }
    }

    fn value_at(&self, address: &Address) -> Value {
        match self.index.get(address) {
            Some(id) => self.cached_or_default(*id),
            None => Value::default_for(self.config.default_value),
        }
    }

    fn cached_or_default(&self, id: CellId) -> Value {
        self.cell(id)
            .cached_value
            .clone()
            .unwrap_or_else(|| Value::default_for(self.config.default_value))
    }

    fn store(&mut self, id: CellId, value: Value) {
        log::trace!("{} = {value}", self.address(id));
        self.emit(|| SheetEvent::Evaluated {
            address: self.address(id).clone(),
            value: value.clone(),
        });
        self.cell_mut(id).cached_value = Some(value);
    }

    /// Invalidate `root` and recompute it, then bring every transitive
    /// observer up to date. This is what runs after an edit commits.
    pub(crate) fn invalidate_and_reevaluate(&mut self, root: CellId) -> RecalcReport {
        let order = self.affected_in_dependency_order(root);
        let mut changed: FxHashSet<CellId> = FxHashSet::default();
        let mut report = RecalcReport::default();

        for id in order {
            let stale = id == root
                || self.cell(id).cached_value.is_none()
                || self.cell(id).references.iter().any(|r| changed.contains(r));
            if !stale {
                report.unchanged += 1;
                continue;
            }

            let previous = self.cell_mut(id).cached_value.take();
            let value = self.evaluate(id);
            if previous.as_ref() != Some(&value) {
                changed.insert(id);
            }
            report.recomputed += 1;
        }

        log::debug!(
            "recalculated from {}: {} recomputed, {} unchanged",
            self.address(root),
            report.recomputed,
            report.unchanged
        );
        self.emit(|| SheetEvent::Propagated {
            origin: self.address(root).clone(),
            recomputed: report.recomputed,
            unchanged: report.unchanged,
        });
        report
    }

    /// `root` followed by every cell that transitively observes it, ordered so
    /// each cell comes after all of its affected references.
    fn affected_in_dependency_order(&self, root: CellId) -> Vec<CellId> {
        // Collect the affected subgraph.
        let mut affected: FxHashSet<CellId> = FxHashSet::default();
        let mut queue = VecDeque::from([root]);
        affected.insert(root);
        while let Some(id) = queue.pop_front() {
            for observer in &self.cell(id).observers {
                if affected.insert(*observer) {
                    queue.push_back(*observer);
                }
            }
        }

        // Kahn's algorithm restricted to the affected cells.
        let mut waiting_on: FxHashMap<CellId, usize> = affected
            .iter()
            .map(|id| {
                let inputs = self
                    .cell(*id)
                    .references
                    .iter()
                    .filter(|r| affected.contains(r))
                    .count();
                (*id, inputs)
            })
            .collect();

        let mut order = Vec::with_capacity(affected.len());
        let mut ready = VecDeque::from([root]);
        while let Some(id) = ready.pop_front() {
            order.push(id);
            for observer in &self.cell(id).observers {
                if let Some(count) = waiting_on.get_mut(observer) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(*observer);
                    }
                }
            }
        }
        order
    }
}
