use anyhow::Result;
use coursefees::{config::Config, convert, logging};
use std::env;

fn main() -> Result<()> {
    logging::init();

    let cfg = Config::from_optional_path(env::args().nth(1))?;
    let summary = convert::run(&cfg.convert)?;

    println!(
        "Converted '{}' to NDJSON files per tab ({} tabs, {} records) and metadata '{}'",
        cfg.convert.input.display(),
        summary.tabs_written.len(),
        summary.records,
        summary.metadata_path.display()
    );
    Ok(())
}
