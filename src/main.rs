use anyhow::Result;
use coursefees::{config::Config, logging, pipeline};
use std::env;
use tracing::info;

fn main() -> Result<()> {
    logging::init();

    // optional single argument: path to a YAML config
    let cfg = Config::from_optional_path(env::args().nth(1))?;
    info!(
        workbooks = cfg.fees.inputs.len(),
        catalog_urls = cfg.fees.catalog_urls.len(),
        "startup"
    );

    let outputs = pipeline::run_fees(&cfg.fees)?;
    for path in &outputs {
        println!("Results saved to {}", path.display());
    }
    Ok(())
}
