// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Catalog pages scraped for fee names and descriptions.
static DEFAULT_CATALOG_URLS: &[&str] = &[
    "https://catalog.utsa.edu/undergraduate/coursefees/",
    "https://catalog.utsa.edu/graduate/coursefees/",
];

static DEFAULT_FEE_TABS: &[&str] = &["2021Fall", "2022Spring", "2022Summer"];

static DEFAULT_SEMESTERS: &[&str] = &[
    "2025Spring",
    "2024Fall",
    "2024Summer",
    "2024Spring",
    "2023Fall",
    "2023Summer",
    "2023Spring",
    "2022Fall",
    "2022Summer",
    "2022Spring",
];

static DEFAULT_IGNORE_TABS: &[&str] = &["Memo", "Data Dictionary and Labels"];

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Top-level configuration shared by both binaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fees: FeesConfig,
    pub convert: ConvertConfig,
}

impl Config {
    /// Load from a YAML file; any omitted field takes its default.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing config {:?}", path))
    }

    /// `Config::load` when a path is given, defaults otherwise.
    pub fn from_optional_path(path: Option<impl AsRef<Path>>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

/// What to do when the fee catalog cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogPolicy {
    /// Fail the run.
    #[default]
    Abort,
    /// Carry on with an empty catalog, so every fee is reported as "N/A".
    EmptyOnError,
}

/// One spreadsheet and the tabs to aggregate from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputWorkbook {
    pub path: PathBuf,
    pub tabs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 2,
            initial_backoff_ms: 500,
        }
    }
}

impl FetchOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Pipeline A settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeesConfig {
    pub inputs: Vec<InputWorkbook>,
    pub catalog_urls: Vec<String>,
    pub catalog_policy: CatalogPolicy,
    pub fetch: FetchOptions,
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            inputs: vec![InputWorkbook {
                path: PathBuf::from("MATH.xlsx"),
                tabs: strings(DEFAULT_FEE_TABS),
            }],
            catalog_urls: strings(DEFAULT_CATALOG_URLS),
            catalog_policy: CatalogPolicy::default(),
            fetch: FetchOptions::default(),
        }
    }
}

/// Pipeline B settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub input: PathBuf,
    /// Tabs to convert, in order. Also written verbatim to the metadata file.
    pub semesters: Vec<String>,
    pub ignore_tabs: Vec<String>,
    pub output_dir: PathBuf,
    pub metadata_file: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("UTSA.xlsx"),
            semesters: strings(DEFAULT_SEMESTERS),
            ignore_tabs: strings(DEFAULT_IGNORE_TABS),
            output_dir: PathBuf::from("."),
            metadata_file: "UTSAFees_metadata.json".to_string(),
        }
    }
}
