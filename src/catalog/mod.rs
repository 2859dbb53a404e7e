// src/catalog/mod.rs

use anyhow::Result;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use std::{collections::BTreeMap, thread::sleep, time::Duration};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::{CatalogPolicy, FetchOptions};
use crate::error::CatalogError;

pub const NOT_AVAILABLE: &str = "N/A";

/// Name and description of one fee code, as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeCatalogEntry {
    pub name: String,
    pub description: String,
}

impl FeeCatalogEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    fn not_available() -> Self {
        Self::new(NOT_AVAILABLE, NOT_AVAILABLE)
    }
}

/// Fee code → catalog entry, merged over every catalog page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeeCatalog {
    entries: BTreeMap<String, FeeCatalogEntry>,
}

impl FeeCatalog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&FeeCatalogEntry> {
        self.entries.get(code)
    }

    /// The entry for `code`, or ("N/A", "N/A") when the catalog does not list it.
    pub fn lookup(&self, code: &str) -> FeeCatalogEntry {
        self.get(code)
            .cloned()
            .unwrap_or_else(FeeCatalogEntry::not_available)
    }

    /// Merge `other` over `self`; codes already present are replaced.
    pub fn extend(&mut self, other: FeeCatalog) {
        self.entries.extend(other.entries);
    }

    /// Parse one catalog page. The page must contain a `table.sc_sctable`.
    pub fn from_html(url: &str, html: &str) -> Result<Self, CatalogError> {
        let document = Html::parse_document(html);
        let table_sel = Selector::parse("table.sc_sctable").expect("selector should parse");
        let row_sel = Selector::parse("tr").expect("selector should parse");
        let cell_sel = Selector::parse("td").expect("selector should parse");

        let table = document
            .select(&table_sel)
            .next()
            .ok_or_else(|| CatalogError::TableMissing {
                url: url.to_string(),
            })?;

        let mut entries = BTreeMap::new();
        // first row is the column header
        for row in table.select(&row_sel).skip(1) {
            let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
            if cells.len() < 5 {
                continue;
            }
            let code = &cells[1];
            if code.is_empty() {
                continue;
            }
            entries.insert(code.clone(), FeeCatalogEntry::new(&cells[0], &cells[4]));
        }
        Ok(Self { entries })
    }
}

impl FromIterator<(String, FeeCatalogEntry)> for FeeCatalog {
    fn from_iter<T: IntoIterator<Item = (String, FeeCatalogEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn get_text_core(client: &Client, url: &Url) -> Result<String, CatalogError> {
    debug!("Fetching text from {}", url);
    let http = |source| CatalogError::Http {
        url: url.to_string(),
        source,
    };
    client
        .get(url.clone())
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(http)
}

/// Delay before retry number `attempt` (1-based): doubles each time, capped at `u64::MAX`.
fn backoff_ms(initial_backoff_ms: u64, attempt: u32) -> u64 {
    initial_backoff_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
}

fn get_text_with_retry(
    client: &Client,
    url: &Url,
    max_retries: u32,
    initial_backoff_ms: u64,
) -> Result<String, CatalogError> {
    let mut attempts = 0;
    loop {
        match get_text_core(client, url) {
            Ok(t) => return Ok(t),
            Err(e) if attempts < max_retries => {
                attempts += 1;
                let backoff = backoff_ms(initial_backoff_ms, attempts);
                warn!(%url, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                sleep(Duration::from_millis(backoff));
            }
            Err(e) => {
                error!(%url, error = %e, "Exhausted retries");
                return Err(e);
            }
        }
    }
}

/// Fetch and parse every catalog page, later pages overriding earlier ones.
///
/// Any failing page fails the whole fetch; there is no partial catalog.
pub fn fetch_catalog(
    client: &Client,
    urls: &[String],
    opts: &FetchOptions,
) -> Result<FeeCatalog, CatalogError> {
    let mut catalog = FeeCatalog::default();
    for raw in urls {
        let url = Url::parse(raw).map_err(|source| CatalogError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;
        let html = get_text_with_retry(client, &url, opts.max_retries, opts.initial_backoff_ms)?;
        let page = FeeCatalog::from_html(raw, &html)?;
        debug!(%url, entries = page.len(), "parsed fee table");
        catalog.extend(page);
    }
    Ok(catalog)
}

/// Fetch the catalog, applying `policy` when a page cannot be fetched.
#[instrument(level = "info", skip(urls, opts), fields(urls = urls.len()))]
pub fn load_catalog(
    urls: &[String],
    opts: &FetchOptions,
    policy: CatalogPolicy,
) -> Result<FeeCatalog> {
    let client = Client::builder().timeout(opts.timeout()).build()?;
    let fetched = fetch_catalog(&client, urls, opts);
    let catalog = apply_policy(fetched, policy)?;
    info!(entries = catalog.len(), "fee catalog ready");
    Ok(catalog)
}

fn apply_policy(
    fetched: Result<FeeCatalog, CatalogError>,
    policy: CatalogPolicy,
) -> Result<FeeCatalog> {
    match (fetched, policy) {
        (Ok(catalog), _) => Ok(catalog),
        (Err(e), CatalogPolicy::EmptyOnError) => {
            warn!(error = %e, "catalog unavailable; fee names will be N/A");
            Ok(FeeCatalog::default())
        }
        (Err(e), CatalogPolicy::Abort) => Err(e.into()),
    }
}
