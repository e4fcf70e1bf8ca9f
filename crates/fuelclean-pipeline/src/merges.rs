//! Presentation-merge derivation
//!
//! Merges never travel through the transform stages; they are recomputed from
//! finalized cell values by the two grouping rules here. Both helpers work on
//! a column slice of key texts and return inclusive index ranges relative to
//! that slice.

/// Maximal runs of identical adjacent non-blank values, at least `min_len`
/// long
pub fn equal_runs(values: &[String], min_len: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0;
    while start < values.len() {
        let anchor = values[start].trim();
        if anchor.is_empty() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end + 1 < values.len() && values[end + 1].trim() == anchor {
            end += 1;
        }
        if end - start + 1 >= min_len {
            runs.push((start, end));
        }
        start = end + 1;
    }
    runs
}

/// Merge-down-through-blanks: each non-blank value starts a run extending
/// through the immediately following blank values, up to the next non-blank
/// value or the end of the slice. Runs of length 1 are not reported.
pub fn blank_fill_runs(values: &[String]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0;
    while start < values.len() {
        if values[start].trim().is_empty() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end + 1 < values.len() && values[end + 1].trim().is_empty() {
            end += 1;
        }
        if end > start {
            runs.push((start, end));
        }
        start = end + 1;
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn equal_runs_groups_adjacent_identical_values() {
        let runs = equal_runs(&texts(&["UNOPS", "UNOPS", "UNOPS", "UNHCR", "UNHCR", "X"]), 2);
        assert_eq!(runs, vec![(0, 2), (3, 4)]);
    }

    #[test]
    fn equal_runs_skips_singletons_and_blanks() {
        let runs = equal_runs(&texts(&["A", "", "", "B", "B"]), 2);
        assert_eq!(runs, vec![(3, 4)]);
    }

    #[test]
    fn blank_fill_extends_through_blanks_only() {
        let runs = blank_fill_runs(&texts(&["site-1", "", "", "site-2", "site-3", ""]));
        assert_eq!(runs, vec![(0, 2), (4, 5)]);
    }

    #[test]
    fn blank_fill_ignores_leading_blanks() {
        let runs = blank_fill_runs(&texts(&["", "", "x", ""]));
        assert_eq!(runs, vec![(2, 3)]);
    }
}
