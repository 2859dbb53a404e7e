// src/fees/section.rs

use super::{FeeMap, SectionRow};
use crate::error::InputError;

/// Fee amounts for a single section: each `CODE:rate` entry times enrollment.
///
/// Returns an empty map when the row has no enrollment or no fee spec. A
/// code that appears twice accumulates.
pub fn compute_section_fees(row: &SectionRow) -> Result<FeeMap, InputError> {
    let mut fees = FeeMap::new();
    let (Some(spec), Some(enrollment)) = (row.course_fees.as_deref(), row.enrollment) else {
        return Ok(fees);
    };
    if spec.trim().is_empty() {
        return Ok(fees);
    }

    for entry in spec.split(',') {
        let (code, rate) = parse_entry(row.line, entry)?;
        *fees.entry(code.to_string()).or_insert(0) += dollars(rate, enrollment);
    }
    Ok(fees)
}

fn parse_entry(line: usize, entry: &str) -> Result<(&str, f64), InputError> {
    let malformed = |reason: &str| InputError::MalformedFeeSpec {
        line,
        entry: entry.to_string(),
        reason: reason.to_string(),
    };

    let (code, rate) = entry
        .trim()
        .split_once(':')
        .ok_or_else(|| malformed("expected CODE:AMOUNT"))?;
    let code = code.trim();
    if code.is_empty() {
        return Err(malformed("empty fee code"));
    }
    let rate: f64 = rate
        .trim()
        .parse()
        .map_err(|_| malformed("amount is not a number"))?;
    if !rate.is_finite() {
        return Err(malformed("amount is not finite"));
    }
    Ok((code, rate))
}

/// Round half to even, so 2.5 → 2 and 3.5 → 4.
fn dollars(rate: f64, enrollment: u32) -> i64 {
    (rate * f64::from(enrollment)).round_ties_even() as i64
}
