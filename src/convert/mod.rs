// src/convert/mod.rs

use anyhow::{Context, Result};
use std::{
    collections::{BTreeSet, HashSet},
    path::PathBuf,
};
use tracing::{debug, info, instrument};

pub mod extract;
pub mod metadata;
pub mod record;

pub use extract::{extract_table, TabTable, INTERNAL_USE_MARKER};
pub use metadata::Metadata;
pub use record::{records, subject_of, to_ndjson, Record};

use crate::config::ConvertConfig;
use crate::output::write_atomic;
use crate::sheet::Workbook;

/// What a conversion run produced.
#[derive(Debug, Default, PartialEq)]
pub struct ConvertSummary {
    pub tabs_written: Vec<String>,
    pub records: usize,
    pub subjects: BTreeSet<String>,
    pub metadata_path: PathBuf,
}

/// Convert each configured semester tab to `{tab}.ndjson` and write the metadata index.
#[instrument(level = "info", skip(cfg), fields(input = %cfg.input.display()))]
pub fn run(cfg: &ConvertConfig) -> Result<ConvertSummary> {
    let mut workbook = Workbook::open(&cfg.input)?;
    let available: HashSet<String> = workbook.sheet_names().into_iter().collect();

    let mut summary = ConvertSummary::default();
    for tab in &cfg.semesters {
        if cfg.ignore_tabs.contains(tab) || !available.contains(tab) {
            debug!(tab = %tab, "skipping tab");
            continue;
        }

        let grid = workbook.grid(tab)?;
        let table = extract_table(tab, &grid.rows)?;
        let recs = records(&table, tab);
        summary
            .subjects
            .extend(recs.iter().filter_map(|r| r.subject.clone()));
        let count = recs.len();

        let path = cfg.output_dir.join(format!("{}.ndjson", tab));
        let text = to_ndjson(recs).with_context(|| format!("serializing tab '{}'", tab))?;
        write_atomic(&path, text.as_bytes())?;
        info!(tab = %tab, records = count, path = %path.display(), "wrote ndjson");

        summary.records += count;
        summary.tabs_written.push(tab.clone());
    }

    let meta = Metadata::new(&summary.subjects, &cfg.semesters);
    let path = cfg.output_dir.join(&cfg.metadata_file);
    write_atomic(&path, &meta.to_json_bytes()?)?;
    info!(
        subjects = summary.subjects.len(),
        path = %path.display(),
        "wrote metadata"
    );
    summary.metadata_path = path;
    Ok(summary)
}
