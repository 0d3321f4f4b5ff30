use std::collections::BTreeSet;

use cellgraph_engine::engine::{
    Address, AddressTokenizer, ArithmeticEvaluator, FormulaEvaluator, PatternTokenizer, Value,
};
use rustc_hash::FxHashMap;

use super::cell::{Cell, CellId, CellView};
use crate::config::SheetConfig;
use crate::error::Result;
use crate::events::{EventHook, SheetEvent};

/// A registry of cells addressed by [`Address`], with formulas kept in sync
/// with their inputs.
///
/// Cells live in a single arena and refer to each other by [`CellId`], so the
/// two-way reference/observer edges never form an ownership cycle. Cells are
/// created lazily the first time they are addressed and never removed.
pub struct Spreadsheet {
    /// Cell arena; a `CellId` indexes into it.
    pub(crate) cells: Vec<Cell>,
    /// Address -> arena slot.
    pub(crate) index: FxHashMap<Address, CellId>,
    pub(crate) config: SheetConfig,
    pub(crate) tokenizer: Box<dyn AddressTokenizer>,
    pub(crate) evaluator: Box<dyn FormulaEvaluator>,
    hook: Option<EventHook>,
}

impl Spreadsheet {
    /// Create an empty sheet with the default configuration, the built-in
    /// address tokenizer and the arithmetic formula evaluator.
    pub fn new() -> Self {
        Self::with_config(SheetConfig::default())
    }

    pub fn with_config(config: SheetConfig) -> Self {
        Spreadsheet {
            cells: Vec::new(),
            index: FxHashMap::default(),
            config,
            tokenizer: Box::new(PatternTokenizer),
            evaluator: Box::new(ArithmeticEvaluator),
            hook: None,
        }
    }

    /// Replace the formula evaluator.
    pub fn with_evaluator(mut self, evaluator: impl FormulaEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    /// Replace the address tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: impl AddressTokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    /// Install a callback that receives every [`SheetEvent`].
    pub fn with_observer<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SheetEvent) + Send + Sync + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Look up a cell, creating it empty if it does not exist yet.
    /// Fails only if `address` is not a valid cell address.
    pub fn get(&mut self, address: &str) -> Result<CellView<'_>> {
        let address = Address::parse(address)?;
        let id = self.get_or_create(&address);
        Ok(self.view(id))
    }

    /// Look up a cell without creating it.
    pub fn peek(&self, address: &str) -> Option<CellView<'_>> {
        let address = Address::parse(address).ok()?;
        self.index.get(&address).map(|id| self.view(*id))
    }

    /// The evaluated value of a cell, computing it if it is not memoized.
    pub fn value(&mut self, address: &str) -> Result<Value> {
        let address = Address::parse(address)?;
        let id = self.get_or_create(&address);
        Ok(self.evaluate(id))
    }

    /// Number of cells in the registry (including lazily created ones).
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All known addresses in sheet order.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.cells.iter().map(|c| c.address.clone()).collect();
        addresses.sort();
        addresses
    }

    pub(crate) fn get_or_create(&mut self, address: &Address) -> CellId {
        if let Some(id) = self.index.get(address) {
            return *id;
        }
        let id = CellId(self.cells.len());
        self.cells.push(Cell::new_empty(address.clone()));
        self.index.insert(address.clone(), id);
        log::trace!("created cell {address}");
        id
    }

    pub(crate) fn view(&self, id: CellId) -> CellView<'_> {
        CellView::new(self, id)
    }

    pub(crate) fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.index()]
    }

    pub(crate) fn address(&self, id: CellId) -> &Address {
        &self.cell(id).address
    }

    pub(crate) fn addresses_of(&self, ids: &BTreeSet<CellId>) -> BTreeSet<Address> {
        ids.iter().map(|id| self.address(*id).clone()).collect()
    }

    /// Call the event hook. The event is only built when someone listens.
    pub(crate) fn emit(&self, event: impl FnOnce() -> SheetEvent) {
        if !self.config.emit_events {
            return;
        }
        if let Some(hook) = &self.hook {
            hook(&event());
        }
    }
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Spreadsheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("cells", &self.cells.len())
            .field("config", &self.config)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
