// src/fees/tab.rs

use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::{
    compute_accumulated_fees, compute_chpc, compute_course_fees, compute_section_fees, merge_into,
    FeeMap, SectionRow,
};
use crate::error::InputError;

/// Per-row result, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionResult {
    pub course: String,
    pub fees: FeeMap,
    pub chpc: u64,
}

/// All sections of one course, summed.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseTotals {
    pub course: String,
    pub fees: FeeMap,
    pub chpc: u64,
}

/// Everything computed for one tab.
#[derive(Debug, Clone, PartialEq)]
pub struct TabReport {
    pub tab: String,
    pub sections: Vec<SectionResult>,
    /// Sorted by course.
    pub courses: Vec<CourseTotals>,
    pub accumulated: FeeMap,
    pub chpc: u64,
    pub seats: u64,
}

/// Grand totals across tabs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub accumulated: FeeMap,
    pub chpc: u64,
    pub seats: u64,
}

/// Compute section, course and tab totals for one tab's rows.
///
/// The first bad row aborts the tab.
#[instrument(level = "info", skip(rows), fields(rows = rows.len()))]
pub fn process_tab(tab: &str, rows: &[SectionRow]) -> Result<TabReport, InputError> {
    let mut sections = Vec::with_capacity(rows.len());
    for row in rows {
        let fees = compute_section_fees(row)?;
        let chpc = compute_chpc(row)?;
        sections.push(SectionResult {
            course: row.course.clone(),
            fees,
            chpc,
        });
    }

    let mut groups: BTreeMap<&str, (Vec<&FeeMap>, u64)> = BTreeMap::new();
    for s in &sections {
        let group = groups.entry(s.course.as_str()).or_default();
        group.0.push(&s.fees);
        group.1 += s.chpc;
    }

    let courses: Vec<CourseTotals> = groups
        .into_iter()
        .map(|(course, (fees, chpc))| CourseTotals {
            course: course.to_string(),
            fees: compute_course_fees(fees),
            chpc,
        })
        .collect();

    let accumulated = compute_accumulated_fees(courses.iter().map(|c| &c.fees));
    let chpc = courses.iter().map(|c| c.chpc).sum();
    let seats = rows
        .iter()
        .filter_map(|r| r.enrollment)
        .map(u64::from)
        .sum();

    debug!(
        courses = courses.len(),
        fee_codes = accumulated.len(),
        chpc,
        seats,
        "tab totals"
    );

    Ok(TabReport {
        tab: tab.to_string(),
        sections,
        courses,
        accumulated,
        chpc,
        seats,
    })
}

/// Fold tab reports into grand totals.
pub fn summarize(tabs: &[TabReport]) -> Summary {
    tabs.iter().fold(Summary::default(), |mut sum, t| {
        merge_into(&mut sum.accumulated, &t.accumulated);
        sum.chpc += t.chpc;
        sum.seats += t.seats;
        sum
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<SectionRow> {
        vec![
            SectionRow::new(2, "MATH 1214", Some(30), Some("LAB1:2.5,TECH:1")),
            SectionRow::new(3, "CS 3343", Some(10), Some("TECH:4")),
            SectionRow::new(4, "MATH 1214", Some(20), Some("LAB1:2.5")),
            SectionRow::new(5, "MATH 1214", None, Some("LAB1:2.5")),
            SectionRow::new(6, "CS 3343", Some(5), None),
        ]
    }

    #[test]
    fn groups_by_course() {
        let report = process_tab("2021Fall", &rows()).unwrap();

        assert_eq!(report.sections.len(), 5);
        assert_eq!(report.sections[0].fees["LAB1"], 75);
        assert_eq!(report.sections[0].chpc, 120);
        assert!(report.sections[3].fees.is_empty());

        let names: Vec<_> = report.courses.iter().map(|c| c.course.as_str()).collect();
        assert_eq!(names, vec!["CS 3343", "MATH 1214"]);

        let cs = &report.courses[0];
        assert_eq!(cs.fees, FeeMap::from([("TECH".into(), 40)]));
        assert_eq!(cs.chpc, 3 * 15);

        let math = &report.courses[1];
        assert_eq!(
            math.fees,
            FeeMap::from([("LAB1".into(), 125), ("TECH".into(), 30)])
        );
        assert_eq!(math.chpc, 4 * 50);

        assert_eq!(
            report.accumulated,
            FeeMap::from([("LAB1".into(), 125), ("TECH".into(), 70)])
        );
        assert_eq!(report.chpc, 245);
        assert_eq!(report.seats, 65);
    }

    #[test]
    fn bad_row_fails_tab() {
        let mut rows = rows();
        rows.push(SectionRow::new(9, "MATH 12", Some(1), None));
        let err = process_tab("2021Fall", &rows).unwrap_err();
        assert!(matches!(err, InputError::MalformedCourse { line: 9, .. }));
    }

    #[test]
    fn summary_spans_tabs() {
        let a = process_tab("2021Fall", &rows()).unwrap();
        let b = process_tab(
            "2022Spring",
            &[SectionRow::new(2, "BIO 1404", Some(8), Some("MATL:10"))],
        )
        .unwrap();

        let forward = summarize(&[a.clone(), b.clone()]);
        assert_eq!(forward, summarize(&[b, a]));
        assert_eq!(forward.accumulated["LAB1"], 125);
        assert_eq!(forward.accumulated["MATL"], 80);
        assert_eq!(forward.chpc, 245 + 32);
        assert_eq!(forward.seats, 73);
    }
}
