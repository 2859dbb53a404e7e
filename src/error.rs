// src/error.rs

use thiserror::Error;

/// Problems with the shape or content of an input spreadsheet.
///
/// `line` is always the 1-based spreadsheet row, so the message can be
/// matched against what a user sees when opening the file.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("tab '{tab}': missing required column '{column}'")]
    MissingColumn { tab: String, column: String },

    #[error("tab '{tab}': no header row")]
    MissingHeader { tab: String },

    #[error("row {line}: malformed fee entry '{entry}' in 'Course Fees': {reason}")]
    MalformedFeeSpec {
        line: usize,
        entry: String,
        reason: String,
    },

    #[error("row {line}: malformed course number in 'Course' value '{course}'")]
    MalformedCourse { line: usize, course: String },

    #[error("row {line}: invalid 'Actual Enrollment' value '{value}'")]
    InvalidEnrollment { line: usize, value: String },
}

/// Failure to build the fee catalog from a catalog page.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("parsing catalog URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("GET {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url}: no fee table (table.sc_sctable) on page")]
    TableMissing { url: String },
}
