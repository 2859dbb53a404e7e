// src/convert/extract.rs

use calamine::{Data, DataType};
use chrono::NaiveDateTime;
use serde_json::{Number, Value};

use crate::error::InputError;
use crate::sheet::is_blank_row;

/// Leading row some exports carry above the real header.
pub const INTERNAL_USE_MARKER: &str = "FOR UTSA INTERNAL USE ONLY";

/// A tab split into field names and data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TabTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

fn is_internal_use_banner(row: &[Data]) -> bool {
    row.first()
        .map(|c| c.to_string().trim().to_uppercase())
        .is_some_and(|text| text.starts_with(INTERNAL_USE_MARKER))
}

fn iso_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn header_name(idx: usize, cell: &Data) -> String {
    match cell_value(cell) {
        Value::Null => format!("Unnamed: {}", idx),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// JSON value of a cell. Blank cells, empty strings and error cells become null.
pub fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::from(*f as i64),
        Data::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(_) => cell
            .as_datetime()
            .map_or(Value::Null, |dt| Value::String(iso_datetime(dt))),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}

/// Drop an optional internal-use banner, then promote the next row to field names.
/// Body rows with no value in any cell are skipped.
pub fn extract_table(tab: &str, grid: &[Vec<Data>]) -> Result<TabTable, InputError> {
    let grid = match grid.first() {
        Some(first) if is_internal_use_banner(first) => &grid[1..],
        _ => grid,
    };
    let Some((header, body)) = grid.split_first() else {
        return Err(InputError::MissingHeader {
            tab: tab.to_string(),
        });
    };

    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, c)| header_name(i, c))
        .collect();
    let rows = body
        .iter()
        .filter(|cells| !is_blank_row(cells))
        .map(|cells| {
            (0..headers.len())
                .map(|i| cells.get(i).map_or(Value::Null, cell_value))
                .collect()
        })
        .collect();

    Ok(TabTable { headers, rows })
}
