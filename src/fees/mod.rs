// src/fees/mod.rs

use std::collections::BTreeMap;

pub mod aggregate;
pub mod chpc;
pub mod section;
pub mod tab;

pub use aggregate::{compute_accumulated_fees, compute_course_fees, merge_into};
pub use chpc::compute_chpc;
pub use section::compute_section_fees;
pub use tab::{process_tab, summarize, CourseTotals, SectionResult, Summary, TabReport};

/// Fee code → whole-dollar amount.
pub type FeeMap = BTreeMap<String, i64>;

/// One scheduling row, with only the columns fee aggregation reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRow {
    /// 1-based row number in the source tab.
    pub line: usize,
    pub course: String,
    pub enrollment: Option<u32>,
    pub course_fees: Option<String>,
}

impl SectionRow {
    pub fn new(
        line: usize,
        course: impl Into<String>,
        enrollment: Option<u32>,
        course_fees: Option<&str>,
    ) -> Self {
        Self {
            line,
            course: course.into(),
            enrollment,
            course_fees: course_fees.map(str::to_string),
        }
    }
}
