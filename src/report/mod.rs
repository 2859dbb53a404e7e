// src/report/mod.rs

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::catalog::FeeCatalog;
use crate::fees::{FeeMap, Summary, TabReport};
use crate::output::write_atomic;

pub const SUMMARY_SHEET: &str = "Summary";
pub const TOTAL_CREDIT_HOURS: &str = "Total Credit Hours";
pub const TOTAL_SEATS: &str = "Total Seats";

const CURRENCY: &str = "$#,##0";
const CURRENCY_WIDTH: f64 = 15.0;

/// `<dir>/<stem>_Results.xlsx` for input `<dir>/<stem>.<ext>`.
pub fn results_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("{}_Results.xlsx", stem))
}

/// `CODE: amount` pairs, comma separated.
pub fn format_fee_map(fees: &FeeMap) -> String {
    fees.iter()
        .map(|(code, amount)| format!("{}: {}", code, amount))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Worksheet row for the `i`th data row; row 0 holds the header.
fn data_row(i: usize) -> Result<u32> {
    u32::try_from(i)
        .ok()
        .and_then(|r| r.checked_add(1))
        .with_context(|| format!("row {} is past the worksheet limit", i))
}

fn write_header(ws: &mut Worksheet, row: u32, names: &[&str]) -> Result<()> {
    for (col, name) in names.iter().enumerate() {
        ws.write_string(row, u16::try_from(col)?, *name)?;
    }
    Ok(())
}

fn write_sections(ws: &mut Worksheet, tab: &TabReport) -> Result<()> {
    write_header(ws, 0, &["Course", "Section_Fees", "CHPC"])?;
    for (i, s) in tab.sections.iter().enumerate() {
        let row = data_row(i)?;
        ws.write_string(row, 0, &s.course)?;
        ws.write_string(row, 1, format_fee_map(&s.fees))?;
        ws.write_number(row, 2, s.chpc as f64)?;
    }
    Ok(())
}

fn write_courses(ws: &mut Worksheet, tab: &TabReport) -> Result<()> {
    write_header(ws, 0, &["Course", "Total_Fees", "CHPC"])?;
    for (i, c) in tab.courses.iter().enumerate() {
        let row = data_row(i)?;
        ws.write_string(row, 0, &c.course)?;
        ws.write_string(row, 1, format_fee_map(&c.fees))?;
        ws.write_number(row, 2, c.chpc as f64)?;
    }
    Ok(())
}

fn write_accumulated(ws: &mut Worksheet, fees: &FeeMap, money: &Format) -> Result<()> {
    write_header(ws, 0, &["Fee Code", "Total Amount"])?;
    ws.set_column_width(1, CURRENCY_WIDTH)?;
    for (i, (code, amount)) in fees.iter().enumerate() {
        let row = data_row(i)?;
        ws.write_string(row, 0, code)?;
        ws.write_number_with_format(row, 1, *amount as f64, money)?;
    }
    Ok(())
}

fn write_summary(
    ws: &mut Worksheet,
    summary: &Summary,
    catalog: &FeeCatalog,
    money: &Format,
) -> Result<()> {
    write_header(
        ws,
        0,
        &["Fee Code", "Fee Name", "Total Amount", "Fee Description"],
    )?;
    ws.set_column_width(2, CURRENCY_WIDTH)?;
    for (i, (code, amount)) in summary.accumulated.iter().enumerate() {
        let row = data_row(i)?;
        let entry = catalog.lookup(code);
        ws.write_string(row, 0, code)?;
        ws.write_string(row, 1, &entry.name)?;
        ws.write_number_with_format(row, 2, *amount as f64, money)?;
        ws.write_string(row, 3, &entry.description)?;
    }

    // metrics table sits two rows below the last fee row
    let fee_rows = summary.accumulated.len();
    write_header(ws, data_row(fee_rows.saturating_add(1))?, &["Metric", "Value"])?;
    let chpc_row = data_row(fee_rows.saturating_add(2))?;
    ws.write_string(chpc_row, 0, TOTAL_CREDIT_HOURS)?;
    ws.write_number(chpc_row, 1, summary.chpc as f64)?;
    let seats_row = data_row(fee_rows.saturating_add(3))?;
    ws.write_string(seats_row, 0, TOTAL_SEATS)?;
    ws.write_number(seats_row, 1, summary.seats as f64)?;
    Ok(())
}

/// Build the results workbook in memory: per-tab sheets in input order, then `Summary`.
pub fn build_report(
    tabs: &[TabReport],
    summary: &Summary,
    catalog: &FeeCatalog,
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let money = Format::new().set_num_format(CURRENCY);

    for tab in tabs {
        let ws = workbook.add_worksheet();
        ws.set_name(format!("{}_Sections", tab.tab))
            .with_context(|| format!("naming sections sheet for '{}'", tab.tab))?;
        write_sections(ws, tab)?;

        let ws = workbook.add_worksheet();
        ws.set_name(format!("{}_Courses", tab.tab))
            .with_context(|| format!("naming courses sheet for '{}'", tab.tab))?;
        write_courses(ws, tab)?;

        let ws = workbook.add_worksheet();
        ws.set_name(format!("{}_Accumulated", tab.tab))
            .with_context(|| format!("naming accumulated sheet for '{}'", tab.tab))?;
        write_accumulated(ws, &tab.accumulated, &money)?;
    }

    let ws = workbook.add_worksheet();
    ws.set_name(SUMMARY_SHEET)?;
    write_summary(ws, summary, catalog, &money)?;

    Ok(workbook.save_to_buffer()?)
}

/// Build the workbook and write it to `path` in one step.
#[instrument(level = "info", skip(path, tabs, summary, catalog), fields(path = %path.display()))]
pub fn write_report(
    path: &Path,
    tabs: &[TabReport],
    summary: &Summary,
    catalog: &FeeCatalog,
) -> Result<()> {
    let bytes = build_report(tabs, summary, catalog)?;
    write_atomic(path, &bytes)?;
    info!(sheets = tabs.len() * 3 + 1, "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FeeCatalogEntry;
    use crate::fees::{process_tab, summarize, SectionRow};
    use calamine::{open_workbook_auto, Data, Reader};
    use tempfile::tempdir;

    fn tabs() -> Vec<TabReport> {
        let fall = process_tab(
            "2021Fall",
            &[
                SectionRow::new(2, "MATH 1214", Some(30), Some("LAB1:2.5,TECH:1")),
                SectionRow::new(3, "CS 3343", Some(10), Some("TECH:4,ZZZ9:1000")),
            ],
        )
        .unwrap();
        let spring = process_tab(
            "2022Spring",
            &[SectionRow::new(2, "MATH 1214", Some(20), Some("LAB1:2.5"))],
        )
        .unwrap();
        vec![fall, spring]
    }

    fn catalog() -> FeeCatalog {
        [
            ("LAB1", "Laboratory Fee", "Lab consumables"),
            ("TECH", "Technology Fee", "Computing"),
        ]
        .into_iter()
        .map(|(c, n, d)| (c.to_string(), FeeCatalogEntry::new(n, d)))
        .collect()
    }

    #[test]
    fn results_name_sits_beside_input() {
        assert_eq!(
            results_path(Path::new("data/MATH.xlsx")),
            PathBuf::from("data/MATH_Results.xlsx")
        );
        assert_eq!(
            results_path(Path::new("BIO.xlsx")),
            PathBuf::from("BIO_Results.xlsx")
        );
    }

    #[test]
    fn fee_map_text() {
        let fees = FeeMap::from([("B".into(), 20), ("A".into(), 15)]);
        assert_eq!(format_fee_map(&fees), "A: 15, B: 20");
        assert_eq!(format_fee_map(&FeeMap::new()), "");
    }

    #[test]
    fn summary_round_trips() -> Result<()> {
        let tabs = tabs();
        let summary = summarize(&tabs);
        let dir = tempdir()?;
        let path = dir.path().join("MATH_Results.xlsx");
        write_report(&path, &tabs, &summary, &catalog())?;

        let mut wb = open_workbook_auto(&path)?;
        assert_eq!(
            wb.sheet_names(),
            vec![
                "2021Fall_Sections",
                "2021Fall_Courses",
                "2021Fall_Accumulated",
                "2022Spring_Sections",
                "2022Spring_Courses",
                "2022Spring_Accumulated",
                "Summary",
            ]
        );

        let range = wb.worksheet_range(SUMMARY_SHEET)?;
        let rows: Vec<&[Data]> = range.rows().collect();
        assert_eq!(
            rows[0],
            &[
                Data::String("Fee Code".into()),
                Data::String("Fee Name".into()),
                Data::String("Total Amount".into()),
                Data::String("Fee Description".into()),
            ][..]
        );

        let mut read_back = FeeMap::new();
        for row in &rows[1..=summary.accumulated.len()] {
            let code = row[0].to_string();
            let amount = match row[2] {
                Data::Float(f) => f as i64,
                Data::Int(i) => i,
                ref other => panic!("unexpected amount cell {other:?}"),
            };
            read_back.insert(code, amount);
        }
        assert_eq!(read_back, summary.accumulated);

        // uncatalogued code still gets a row
        let zzz = rows
            .iter()
            .find(|r| r[0] == Data::String("ZZZ9".into()))
            .expect("ZZZ9 row");
        assert_eq!(zzz[1], Data::String("N/A".into()));
        assert_eq!(zzz[3], Data::String("N/A".into()));

        let metrics = summary.accumulated.len() + 2;
        assert_eq!(rows[metrics][0], Data::String("Metric".into()));
        assert_eq!(rows[metrics + 1][0], Data::String(TOTAL_CREDIT_HOURS.into()));
        assert_eq!(rows[metrics + 1][1], Data::Float(summary.chpc as f64));
        assert_eq!(rows[metrics + 2][0], Data::String(TOTAL_SEATS.into()));
        assert_eq!(rows[metrics + 2][1], Data::Float(60.0));
        Ok(())
    }

    #[test]
    fn accumulated_sheet_matches_tab_totals() -> Result<()> {
        let tabs = tabs();
        let dir = tempdir()?;
        let path = dir.path().join("out.xlsx");
        write_report(&path, &tabs, &summarize(&tabs), &FeeCatalog::default())?;

        let mut wb = open_workbook_auto(&path)?;
        let range = wb.worksheet_range("2022Spring_Accumulated")?;
        let rows: Vec<&[Data]> = range.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], Data::String("LAB1".into()));
        assert_eq!(rows[1][1], Data::Float(50.0));

        let sections = wb.worksheet_range("2021Fall_Sections")?;
        let first: Vec<&[Data]> = sections.rows().collect();
        assert_eq!(first[1][1], Data::String("LAB1: 75, TECH: 30".into()));
        Ok(())
    }

    #[test]
    fn row_index_checked() {
        assert_eq!(data_row(0).unwrap(), 1);
        assert_eq!(data_row(41).unwrap(), 42);
        assert!(data_row(u32::MAX as usize).is_err());
        assert!(data_row(usize::MAX).is_err());
    }

    #[test]
    fn bad_sheet_name_writes_nothing() {
        let mut tabs = tabs();
        tabs[0].tab = "Fall[2021]".into();
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        assert!(write_report(&path, &tabs, &summarize(&tabs), &catalog()).is_err());
        assert!(!path.exists());
    }
}
