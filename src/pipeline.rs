// src/pipeline.rs

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::catalog::{load_catalog, FeeCatalog};
use crate::config::{FeesConfig, InputWorkbook};
use crate::fees::{process_tab, summarize, TabReport};
use crate::report::{results_path, write_report};
use crate::sheet::Workbook;

/// Aggregate one workbook and write `<stem>_Results.xlsx` beside it.
///
/// Every tab is computed before the report is built, so a bad tab leaves no
/// results file behind.
#[instrument(level = "info", skip(input, catalog), fields(path = %input.path.display()))]
pub fn process_workbook(input: &InputWorkbook, catalog: &FeeCatalog) -> Result<PathBuf> {
    let mut workbook = Workbook::open(&input.path)?;

    let mut tabs: Vec<TabReport> = Vec::with_capacity(input.tabs.len());
    for tab in &input.tabs {
        let at = || format!("{:?}, tab '{}'", input.path, tab);
        let rows = workbook.section_rows(tab).with_context(at)?;
        let report = process_tab(tab, &rows).with_context(at)?;
        info!(
            tab = %tab,
            courses = report.courses.len(),
            chpc = report.chpc,
            seats = report.seats,
            "tab aggregated"
        );
        tabs.push(report);
    }
    let summary = summarize(&tabs);

    let out = results_path(&input.path);
    write_report(&out, &tabs, &summary, catalog)?;
    info!(path = %out.display(), "Results saved");
    Ok(out)
}

/// Fetch the fee catalog once, then aggregate every configured workbook.
pub fn run_fees(cfg: &FeesConfig) -> Result<Vec<PathBuf>> {
    let catalog = load_catalog(&cfg.catalog_urls, &cfg.fetch, cfg.catalog_policy)?;
    cfg.inputs
        .iter()
        .map(|input| process_workbook(input, &catalog))
        .collect()
}
