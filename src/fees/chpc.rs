// src/fees/chpc.rs

use super::SectionRow;
use crate::error::InputError;

/// Credit-hour proxy for one section: the 4th character of the course
/// number, read as a digit, times enrollment.
///
/// The digit is positional: "MATH 1214" gives 4. Course numbers shorter than
/// four characters, or with a non-digit there, are rejected rather than
/// guessed at. A row without enrollment contributes 0 once its course number
/// has been validated.
pub fn compute_chpc(row: &SectionRow) -> Result<u64, InputError> {
    let malformed = || InputError::MalformedCourse {
        line: row.line,
        course: row.course.clone(),
    };

    let digit = row
        .course
        .split(' ')
        .nth(1)
        .and_then(|number| number.chars().nth(3))
        .and_then(|c| c.to_digit(10))
        .ok_or_else(malformed)?;

    Ok(u64::from(digit) * u64::from(row.enrollment.unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chpc(course: &str, enrollment: Option<u32>) -> Result<u64, InputError> {
        compute_chpc(&SectionRow::new(12, course, enrollment, None))
    }

    #[test]
    fn fourth_character_times_enrollment() {
        assert_eq!(chpc("MATH 1214", Some(30)).unwrap(), 120);
        assert_eq!(chpc("CS 3343", Some(10)).unwrap(), 30);
        assert_eq!(chpc("BIO 2003L", Some(11)).unwrap(), 33);
    }

    #[test]
    fn missing_enrollment_is_zero() {
        assert_eq!(chpc("MATH 1214", None).unwrap(), 0);
    }

    #[test]
    fn malformed_course_numbers() {
        for course in ["MATH", "MATH 121", "MATH 121X", "", "MATH  1214"] {
            let err = chpc(course, Some(1)).unwrap_err();
            assert_eq!(
                err,
                InputError::MalformedCourse {
                    line: 12,
                    course: course.to_string()
                },
                "course {course:?}"
            );
        }
    }

    #[test]
    fn invalid_course_checked_even_without_enrollment() {
        assert!(chpc("MATH 12", None).is_err());
    }
}
