// src/fees/aggregate.rs

use super::FeeMap;

/// Add every amount in `from` onto `into`.
pub fn merge_into(into: &mut FeeMap, from: &FeeMap) {
    for (code, amount) in from {
        *into.entry(code.clone()).or_insert(0) += amount;
    }
}

/// Element-wise sum of the section fee maps belonging to one course.
pub fn compute_course_fees<'a, I>(sections: I) -> FeeMap
where
    I: IntoIterator<Item = &'a FeeMap>,
{
    sections.into_iter().fold(FeeMap::new(), |mut total, fees| {
        merge_into(&mut total, fees);
        total
    })
}

/// Element-wise sum over course totals, giving a tab-level or summary total.
pub fn compute_accumulated_fees<'a, I>(courses: I) -> FeeMap
where
    I: IntoIterator<Item = &'a FeeMap>,
{
    compute_course_fees(courses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fees(pairs: &[(&str, i64)]) -> FeeMap {
        pairs.iter().map(|(c, a)| (c.to_string(), *a)).collect()
    }

    #[test]
    fn sums_per_code() {
        let sections = [fees(&[("A", 15), ("B", 20)]), fees(&[("A", 5)]), FeeMap::new()];
        assert_eq!(
            compute_course_fees(&sections),
            fees(&[("A", 20), ("B", 20)])
        );
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(compute_course_fees(&Vec::<FeeMap>::new()).is_empty());
    }

    #[test]
    fn order_does_not_matter() {
        let courses = vec![
            fees(&[("LAB1", 100), ("TECH", 3)]),
            fees(&[("TECH", 7)]),
            fees(&[("MATL", 40), ("LAB1", 1)]),
        ];
        let forward = compute_accumulated_fees(&courses);

        let mut reversed = courses.clone();
        reversed.reverse();
        assert_eq!(compute_accumulated_fees(&reversed), forward);

        // grouping: (c0 + c1) + c2 == c0 + (c1 + c2)
        let left = compute_accumulated_fees(&[compute_course_fees(&courses[..2]), courses[2].clone()]);
        let right = compute_accumulated_fees(&[courses[0].clone(), compute_course_fees(&courses[1..])]);
        assert_eq!(left, forward);
        assert_eq!(right, forward);
        assert_eq!(forward, fees(&[("LAB1", 101), ("MATL", 40), ("TECH", 10)]));
    }
}
