//! Circular reference detection for formula edits.
//!
//! Before an edge `from -> to` ("`from` references `to`") is committed, we
//! check that `to` cannot already reach `from` by following references.
//! The search is a breadth-first walk with an explicit queue, so long
//! reference chains cannot exhaust the call stack, and each cell is enqueued
//! at most once, so shared (diamond) references are not walked twice.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::Spreadsheet;
use super::cell::CellId;

impl Spreadsheet {
    /// Returns the cycle that adding `from -> to` would close, as the path
    /// `[from, to, ..., from]`, or `None` if the edge is safe.
    pub(crate) fn would_create_cycle(&self, from: CellId, to: CellId) -> Option<Vec<CellId>> {
        if from == to {
            return Some(vec![from, to]);
        }
        // Nothing reads `from`, so no path can lead back to it.
        if self.cell(from).observers.is_empty() {
            return None;
        }

        // Each discovered cell maps to the cell it was reached from.
        let mut parent: FxHashMap<CellId, CellId> = FxHashMap::default();
        let mut queue = VecDeque::from([to]);
        parent.insert(to, to);

        while let Some(current) = queue.pop_front() {
            if current == from {
                return Some(self.cycle_path(from, to, &parent));
            }
            for next in &self.cell(current).references {
                if !parent.contains_key(next) {
                    parent.insert(*next, current);
                    queue.push_back(*next);
                }
            }
        }

        None
    }

    fn cycle_path(&self, from: CellId, to: CellId, parent: &FxHashMap<CellId, CellId>) -> Vec<CellId> {
        // Walk back from `from` to `to`, then flip.
        let mut reversed = vec![from];
        let mut at = from;
        while at != to {
            match parent.get(&at) {
                Some(prev) => {
                    at = *prev;
                    reversed.push(at);
                }
                None => break,
            }
        }
        reversed.push(from);
        reversed.reverse();
        reversed
    }
}

#[cfg(test)]
mod tests {
    use crate::Spreadsheet;
    use cellgraph_engine::engine::Address;

    fn id(sheet: &mut Spreadsheet, address: &str) -> super::CellId {
        sheet.get_or_create(&Address::parse(address).unwrap())
    }

    fn names(sheet: &Spreadsheet, path: &[super::CellId]) -> Vec<String> {
        path.iter().map(|id| sheet.address(*id).to_string()).collect()
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut sheet = Spreadsheet::new();
        let a1 = id(&mut sheet, "A1");
        let path = sheet.would_create_cycle(a1, a1).unwrap();
        assert_eq!(names(&sheet, &path), ["A1", "A1"]);
    }

    #[test]
    fn test_indirect_cycle_reports_path() {
        let mut sheet = Spreadsheet::new();
        sheet.set("A1", "=A2").unwrap();
        sheet.set("A2", "=A3").unwrap();
        let a3 = id(&mut sheet, "A3");
        let a1 = id(&mut sheet, "A1");
        let path = sheet.would_create_cycle(a3, a1).unwrap();
        assert_eq!(names(&sheet, &path), ["A3", "A1", "A2", "A3"]);
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut sheet = Spreadsheet::new();
        sheet.set("B1", "=A1").unwrap();
        sheet.set("C1", "=A1").unwrap();
        sheet.set("D1", "=B1+C1").unwrap();
        let e1 = id(&mut sheet, "E1");
        let d1 = id(&mut sheet, "D1");
        assert!(sheet.would_create_cycle(e1, d1).is_none());
        let a1 = id(&mut sheet, "A1");
        assert!(sheet.would_create_cycle(a1, d1).is_some());
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut sheet = Spreadsheet::new();
        for row in 2..=5000 {
            sheet
                .set(&format!("A{row}"), format!("=A{}", row - 1).as_str())
                .unwrap();
        }
        let a1 = id(&mut sheet, "A1");
        let last = id(&mut sheet, "A5000");
        let path = sheet.would_create_cycle(a1, last).unwrap();
        assert_eq!(path.len(), 5001);
        assert!(sheet.would_create_cycle(last, a1).is_none());
    }
}
