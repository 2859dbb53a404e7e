// src/sheet/mod.rs

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, DataType, Reader, Sheets};
use std::{fs::File, io::BufReader, path::Path};
use tracing::debug;

use crate::error::InputError;
use crate::fees::SectionRow;

pub const COURSE: &str = "Course";
pub const ACTUAL_ENROLLMENT: &str = "Actual Enrollment";
pub const COURSE_FEES: &str = "Course Fees";

static EMPTY: Data = Data::Empty;

/// Raw cells of one tab, plus where they sit in the sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    /// 1-based spreadsheet row of `rows[0]`; blank rows above the first used
    /// cell are not part of `rows`.
    pub first_line: usize,
    pub rows: Vec<Vec<Data>>,
}

impl Grid {
    /// A grid whose first row is spreadsheet row 1.
    pub fn from_rows(rows: Vec<Vec<Data>>) -> Self {
        Self {
            first_line: 1,
            rows,
        }
    }
}

/// True when every cell of `row` is blank.
pub fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|c| c.is_empty())
}

/// An open input spreadsheet.
pub struct Workbook {
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let sheets =
            open_workbook_auto(path).with_context(|| format!("opening workbook {:?}", path))?;
        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Every row of `tab` as raw cells, with no header handling.
    pub fn grid(&mut self, tab: &str) -> Result<Grid> {
        let range = self
            .sheets
            .worksheet_range(tab)
            .with_context(|| format!("reading tab '{}'", tab))?;
        let first_line = range.start().map_or(1, |(row, _)| row as usize + 1);
        Ok(Grid {
            first_line,
            rows: range.rows().map(|r| r.to_vec()).collect(),
        })
    }

    /// Read `tab` as scheduling rows. The first row holds the column names.
    pub fn section_rows(&mut self, tab: &str) -> Result<Vec<SectionRow>> {
        let grid = self.grid(tab)?;
        let rows = section_rows_from_grid(tab, &grid)?;
        debug!(tab, rows = rows.len(), "read section rows");
        Ok(rows)
    }
}

/// Text form of a cell; `None` for empty or error cells.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        other => Some(other.to_string()),
    }
}

fn column(tab: &str, header: &[Data], name: &str) -> Result<usize, InputError> {
    header
        .iter()
        .position(|c| c.get_string().map(str::trim) == Some(name))
        .ok_or_else(|| InputError::MissingColumn {
            tab: tab.to_string(),
            column: name.to_string(),
        })
}

fn enrollment(line: usize, cell: &Data) -> Result<Option<u32>, InputError> {
    let invalid = || InputError::InvalidEnrollment {
        line,
        value: cell.to_string(),
    };
    let value = match cell {
        Data::Empty => return Ok(None),
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        Data::String(s) if s.trim().is_empty() => return Ok(None),
        Data::String(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(invalid());
    }
    // whole seats; a fractional count is truncated
    Ok(Some(value.trunc() as u32))
}

/// Convert a raw grid (header first) into typed scheduling rows.
pub fn section_rows_from_grid(tab: &str, grid: &Grid) -> Result<Vec<SectionRow>, InputError> {
    let Some((header, body)) = grid.rows.split_first() else {
        return Err(InputError::MissingHeader {
            tab: tab.to_string(),
        });
    };
    let course_col = column(tab, header, COURSE)?;
    let enrollment_col = column(tab, header, ACTUAL_ENROLLMENT)?;
    let fees_col = column(tab, header, COURSE_FEES)?;

    let mut rows = Vec::with_capacity(body.len());
    for (i, cells) in body.iter().enumerate() {
        let line = grid.first_line + i + 1;
        let cell = |col: usize| cells.get(col).unwrap_or(&EMPTY);

        if is_blank_row(cells) {
            continue;
        }

        rows.push(SectionRow {
            line,
            course: cell_text(cell(course_col)).unwrap_or_default(),
            enrollment: enrollment(line, cell(enrollment_col))?,
            course_fees: cell_text(cell(fees_col)).filter(|s| !s.trim().is_empty()),
        });
    }
    Ok(rows)
}
