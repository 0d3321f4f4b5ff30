//! Scripted walkthrough used by the `cellgraph-demo` binary.

use std::io::Write;

use anyhow::Result;
use cellgraph_core::{SheetError, Spreadsheet};

const COLUMN: [&str; 5] = ["A1", "A2", "A3", "A4", "A5"];

/// Build the A1..A5 sheet, apply a few edits and show a rejected cycle.
pub fn run(sheet: &mut Spreadsheet, out: &mut impl Write) -> Result<()> {
    sheet.set("A1", 1)?;
    sheet.set("A2", 2)?;
    sheet.get("A3")?;
    sheet.set_input("A4", &formula(sheet, "A1+A2+A3"))?;
    sheet.set_input("A5", &formula(sheet, "A4*2"))?;

    writeln!(out, "Initial spreadsheet:")?;
    print_sheet(sheet, out)?;
    print_column(sheet, out)?;

    for (address, input) in [("A1", "10"), ("A2", "20"), ("A3", "30")] {
        writeln!(out, "Setting {address} to {input}:")?;
        sheet.set_input(address, input)?;
        print_column(sheet, out)?;
    }

    let input = formula(sheet, "1+1");
    writeln!(out, "Setting A4 to \"{input}\":")?;
    sheet.set_input("A4", &input)?;
    print_column(sheet, out)?;

    let input = formula(sheet, "A5");
    writeln!(out, "Setting A4 to \"{input}\":")?;
    match sheet.set_input("A4", &input) {
        Err(err @ SheetError::CircularReference { .. }) => writeln!(out, "  rejected: {err}")?,
        Err(err) => return Err(err.into()),
        Ok(_) => writeln!(out, "  accepted")?,
    }
    print_column(sheet, out)?;

    writeln!(out, "Final spreadsheet:")?;
    print_sheet(sheet, out)?;
    Ok(())
}

fn formula(sheet: &Spreadsheet, text: &str) -> String {
    format!("{}{text}", sheet.config().formula_marker)
}

fn print_sheet(sheet: &Spreadsheet, out: &mut impl Write) -> Result<()> {
    for cell in sheet.snapshot() {
        let value = cell
            .value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "  {:<4} {:<12} = {:<8} references: [{}]  observers: [{}]",
            cell.address.as_str(),
            cell.input,
            value,
            join(cell.references.iter().map(|a| a.as_str())),
            join(cell.observers.iter().map(|a| a.as_str())),
        )?;
    }
    Ok(())
}

fn print_column(sheet: &mut Spreadsheet, out: &mut impl Write) -> Result<()> {
    let mut parts = Vec::with_capacity(COLUMN.len());
    for address in COLUMN {
        let value = sheet.value(address)?;
        let input = sheet
            .peek(address)
            .map(|cell| cell.content().to_input_string(sheet.config().formula_marker))
            .unwrap_or_default();
        parts.push(format!("{address}: `{input}` -> {value}"));
    }
    writeln!(out, "  {}", parts.join(", "))?;
    Ok(())
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}
