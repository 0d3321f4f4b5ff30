//! End-to-end behaviour of a sheet through its public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cellgraph_core::{Content, ErrorKind, SheetConfig, SheetError, SheetEvent, Spreadsheet, Value};
use cellgraph_engine::engine::{ArithmeticEvaluator, FormulaError, FormulaEvaluator, MAX_DEPTH};
use pretty_assertions::assert_eq;

/// Wraps the arithmetic evaluator and counts calls.
#[derive(Clone, Default)]
struct CountingEvaluator {
    calls: Arc<AtomicUsize>,
}

impl CountingEvaluator {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FormulaEvaluator for CountingEvaluator {
    fn evaluate(&self, text: &str) -> Result<Value, FormulaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ArithmeticEvaluator.evaluate(text)
    }
}

fn names(addresses: impl IntoIterator<Item = cellgraph_core::Address>) -> Vec<String> {
    addresses.into_iter().map(|a| a.to_string()).collect()
}

/// A1=1, A2=2, A3 empty, A4=A1+A2+A3, A5=A4*2
fn column_sheet() -> Spreadsheet {
    let mut sheet = Spreadsheet::new();
    sheet.set("A1", 1).unwrap();
    sheet.set("A2", 2).unwrap();
    sheet.get("A3").unwrap();
    sheet.set("A4", "=A1+A2+A3").unwrap();
    sheet.set("A5", "=A4*2").unwrap();
    sheet
}

#[test]
fn test_literal_and_empty_values() {
    let mut sheet = Spreadsheet::new();
    sheet.set("B1", 3.5).unwrap();
    sheet.set("B2", "hello").unwrap();
    assert_eq!(sheet.value("B1").unwrap(), Value::Number(3.5));
    assert_eq!(sheet.value("B2").unwrap(), Value::from("hello"));
    assert_eq!(sheet.value("B3").unwrap(), Value::Number(0.0));
}

#[test]
fn test_formula_values() {
    let mut sheet = column_sheet();
    assert_eq!(sheet.value("A4").unwrap(), Value::Number(3.0));
    assert_eq!(sheet.value("A5").unwrap(), Value::Number(6.0));
}

#[test]
fn test_edit_propagates_through_chain() {
    let mut sheet = column_sheet();
    sheet.set("A1", 10).unwrap();
    assert_eq!(sheet.value("A4").unwrap(), Value::Number(12.0));
    assert_eq!(sheet.value("A5").unwrap(), Value::Number(24.0));

    sheet.set("A3", 30).unwrap();
    assert_eq!(sheet.value("A4").unwrap(), Value::Number(42.0));
    assert_eq!(sheet.value("A5").unwrap(), Value::Number(84.0));
    assert_eq!(sheet.peek("A5").unwrap().raw_formula_text(), Some("A4*2"));
}

#[test]
fn test_cycle_is_rejected_and_prior_edges_kept() {
    let mut sheet = Spreadsheet::new();
    sheet.set("A1", "=A2").unwrap();
    sheet.set("A2", "=A3").unwrap();
    let before = sheet.snapshot();

    let err = sheet.set("A3", "=A1").unwrap_err();
    match &err {
        SheetError::CircularReference { address, path } => {
            assert_eq!(address.as_str(), "A3");
            assert_eq!(names(path.iter().cloned()), ["A3", "A1", "A2", "A3"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        err.to_string(),
        "circular reference detected when editing A3: A3 -> A1 -> A2 -> A3"
    );

    assert_eq!(sheet.snapshot(), before);
    assert_eq!(names(sheet.peek("A1").unwrap().references()), ["A2"]);
    assert_eq!(names(sheet.peek("A2").unwrap().references()), ["A3"]);
    assert_eq!(sheet.peek("A3").unwrap().content(), &Content::Empty);
    assert!(sheet.is_consistent());
}

#[test]
fn test_self_reference_is_rejected() {
    let mut sheet = Spreadsheet::new();
    sheet.set("C3", 5).unwrap();
    let err = sheet.set("C3", "=C3+1").unwrap_err();
    assert!(matches!(err, SheetError::CircularReference { .. }));
    assert_eq!(sheet.value("C3").unwrap(), Value::Number(5.0));
}

#[test]
fn test_changing_references_rewires_edges() {
    let mut sheet = column_sheet();
    sheet.set("A4", "=1+1").unwrap();

    for address in ["A1", "A2", "A3"] {
        assert!(sheet.peek(address).unwrap().observers().is_empty(), "{address}");
    }
    assert!(sheet.peek("A4").unwrap().references().is_empty());
    assert_eq!(sheet.value("A5").unwrap(), Value::Number(4.0));
    assert!(sheet.is_consistent());
}

#[test]
fn test_same_content_twice_is_a_noop() {
    let evaluator = CountingEvaluator::default();
    let mut sheet = Spreadsheet::new().with_evaluator(evaluator.clone());
    sheet.set("A1", 1).unwrap();
    sheet.set("A2", "=A1+1").unwrap();
    sheet.set("A3", "=A2*3").unwrap();
    let calls = evaluator.calls();
    let before = sheet.snapshot();

    sheet.set("A2", "=A1+1").unwrap();
    sheet.set("A1", 1).unwrap();
    assert_eq!(evaluator.calls(), calls);
    assert_eq!(sheet.snapshot(), before);
}

#[test]
fn test_value_is_memoized() {
    let evaluator = CountingEvaluator::default();
    let mut sheet = Spreadsheet::new().with_evaluator(evaluator.clone());
    sheet.set("B1", "=2*21").unwrap();
    let calls = evaluator.calls();

    assert_eq!(sheet.value("B1").unwrap(), Value::Number(42.0));
    assert_eq!(sheet.value("B1").unwrap(), Value::Number(42.0));
    assert_eq!(evaluator.calls(), calls);
}

#[test]
fn test_errors_are_values() {
    let mut sheet = Spreadsheet::new();
    sheet.set("A1", "=1/0").unwrap();
    sheet.set("A2", "=A1+1").unwrap();
    sheet.set("A3", "=1+").unwrap();
    sheet.set("A4", "=A2&\"!\"").unwrap();

    assert_eq!(sheet.value("A1").unwrap(), Value::Error(ErrorKind::DivisionByZero));
    assert_eq!(sheet.value("A2").unwrap(), Value::Error(ErrorKind::DivisionByZero));
    assert_eq!(sheet.value("A3").unwrap(), Value::Error(ErrorKind::Parse));
    assert_eq!(sheet.value("A4").unwrap(), Value::Error(ErrorKind::DivisionByZero));

    sheet.set("A1", 4).unwrap();
    assert_eq!(sheet.value("A4").unwrap(), Value::from("5!"));
}

#[test]
fn test_text_operands_are_quoted() {
    let mut sheet = Spreadsheet::new();
    sheet.set_input("A1", "\"say \"\"hi\"").unwrap();
    sheet.set("A2", "=A1&\" there\"").unwrap();
    sheet.set("B1", "12").unwrap();
    sheet.set("B2", "=B1*2").unwrap();
    assert_eq!(sheet.value("A2").unwrap(), Value::from("say \"\"hi there"));
    assert_eq!(sheet.value("B2").unwrap(), Value::Number(24.0));
}

#[test]
fn test_references_inside_string_literals_are_ignored() {
    let mut sheet = Spreadsheet::new();
    sheet.set("B1", "=\"A1\"&A2").unwrap();
    assert_eq!(names(sheet.peek("B1").unwrap().references()), ["A2"]);
    assert!(sheet.peek("A1").is_none());
}

#[test]
fn test_custom_marker_and_default_value() {
    let config = SheetConfig {
        default_value: 7.0,
        formula_marker: '+',
        ..SheetConfig::default()
    };
    let mut sheet = Spreadsheet::with_config(config);
    sheet.set_input("A2", "+A1*2").unwrap();
    sheet.set_input("A3", "=A1").unwrap();
    assert_eq!(sheet.value("A2").unwrap(), Value::Number(14.0));
    assert_eq!(sheet.value("A3").unwrap(), Value::from("=A1"));
    assert_eq!(sheet.snapshot()[1].input, "+A1*2");
}

#[test]
fn test_events_follow_an_edit() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let mut sheet = Spreadsheet::new().with_observer(move |event| {
        sink.lock().unwrap().push(event.clone());
    });

    sheet.set("A1", 1).unwrap();
    sheet.set("A2", "=A1+1").unwrap();
    events.lock().unwrap().clear();

    sheet.set("A1", 5).unwrap();
    let seen = events.lock().unwrap().clone();
    assert!(matches!(&seen[0], SheetEvent::ContentChanged { address, .. } if address.as_str() == "A1"));
    assert!(seen.contains(&SheetEvent::Evaluated {
        address: "A2".parse().unwrap(),
        value: Value::Number(6.0),
    }));
    assert_eq!(
        seen.last(),
        Some(&SheetEvent::Propagated {
            origin: "A1".parse().unwrap(),
            recomputed: 2,
            unchanged: 0,
        })
    );

    events.lock().unwrap().clear();
    sheet.set("A1", "=A2").unwrap_err();
    let seen = events.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert!(matches!(seen[0], SheetEvent::CycleRejected { .. }));
}

#[test]
fn test_events_can_be_disabled() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = count.clone();
    let config = SheetConfig {
        emit_events: false,
        ..SheetConfig::default()
    };
    let mut sheet = Spreadsheet::with_config(config).with_observer(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    sheet.set("A1", "=1+2").unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_addresses_are_in_sheet_order() {
    let mut sheet = Spreadsheet::new();
    for address in ["B2", "AA1", "A10", "a2", "Z1"] {
        sheet.get(address).unwrap();
    }
    assert_eq!(names(sheet.addresses()), ["A2", "A10", "B2", "Z1", "AA1"]);
}

fn nested(depth: usize, inner: &str) -> String {
    format!("={}{inner}{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_nesting_limit_is_an_error_value() {
    let mut sheet = Spreadsheet::new();
    sheet.set("B1", 2).unwrap();
    sheet.set("C1", nested(MAX_DEPTH - 1, "B1+1").as_str()).unwrap();
    sheet.set("C2", nested(MAX_DEPTH, "1").as_str()).unwrap();
    sheet.set("C3", nested(MAX_DEPTH + 1, "1").as_str()).unwrap();

    assert_eq!(sheet.value("C1").unwrap(), Value::Number(3.0));
    assert_eq!(sheet.value("C2").unwrap(), Value::Number(1.0));
    assert_eq!(sheet.value("C3").unwrap(), Value::Error(ErrorKind::Parse));
    assert_eq!(sheet.value("C3").unwrap().to_string(), "#ERROR!");
}

#[test]
fn test_long_sum_is_not_nesting() {
    let mut sheet = Spreadsheet::new();
    let terms = MAX_DEPTH * 10;
    let formula: Vec<String> = (1..=terms).map(|row| format!("B{row}")).collect();
    for row in 1..=terms {
        sheet.set(&format!("B{row}"), 1).unwrap();
    }
    sheet.set("C1", format!("={}", formula.join("+")).as_str()).unwrap();
    assert_eq!(sheet.value("C1").unwrap(), Value::Number(terms as f64));

    sheet.set("B1", 11).unwrap();
    assert_eq!(sheet.value("C1").unwrap(), Value::Number(terms as f64 + 10.0));
}
