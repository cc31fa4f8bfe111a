//! Page-range parsing and formatting
//!
//! User-entered selections look like "1, 3, 5-8". Parsing is strict: a
//! malformed token fails the whole input instead of contributing a partial
//! selection, so callers never apply an edit the user did not ask for.

use crate::error::PdfToolsError;
use std::collections::BTreeSet;

/// Parse a range string like "1-3, 5, 8-10" into sorted unique page numbers.
///
/// Whitespace-only input parses to an empty selection. Anything else must be
/// a comma-separated list of positive integers or inclusive "a-b" ranges;
/// empty entries ("1,,3"), dangling hyphens ("5-"), non-numeric tokens, and
/// inverted ranges are errors.
pub fn parse_ranges(input: &str) -> Result<Vec<u32>, PdfToolsError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut pages = BTreeSet::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(PdfToolsError::InvalidRange(
                "Empty entry in page list".into(),
            ));
        }

        if let Some((start, end)) = part.split_once('-') {
            // Range like "1-3"
            let start: u32 = start.trim().parse().map_err(|_| {
                PdfToolsError::InvalidRange(format!("Invalid range start: {:?}", start.trim()))
            })?;
            let end: u32 = end.trim().parse().map_err(|_| {
                PdfToolsError::InvalidRange(format!("Invalid range end: {:?}", end.trim()))
            })?;

            if start > end {
                return Err(PdfToolsError::InvalidRange(format!(
                    "Start {} > end {}",
                    start, end
                )));
            }

            for page in start..=end {
                pages.insert(page);
            }
        } else {
            // Single page like "5"
            let page: u32 = part.parse().map_err(|_| {
                PdfToolsError::InvalidRange(format!("Invalid page number: {:?}", part))
            })?;
            pages.insert(page);
        }
    }

    Ok(pages.into_iter().collect())
}

/// Format a sorted page list back into range syntax, collapsing runs:
/// `[1, 2, 3, 5, 8, 9, 10]` becomes `"1-3, 5, 8-10"`.
pub fn format_ranges(pages: &[u32]) -> String {
    let mut parts = Vec::new();
    let mut i = 0;

    while i < pages.len() {
        let start = pages[i];
        let mut end = start;
        while i + 1 < pages.len() && pages[i + 1] == end + 1 {
            i += 1;
            end = pages[i];
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{}-{}", start, end));
        }
        i += 1;
    }

    parts.join(", ")
}

/// Drop page numbers outside `[1, page_count]`.
///
/// Used by deletion, where out-of-range entries are ignored rather than
/// rejected. Extraction does its own strict bounds check instead.
pub fn clamp_to_page_count(pages: &[u32], page_count: u32) -> Vec<u32> {
    pages
        .iter()
        .copied()
        .filter(|&p| p >= 1 && p <= page_count)
        .collect()
}

/// Bounds-aware validation for UI display.
///
/// Returns `None` when the input parses and every page fits the document,
/// otherwise a message describing the first problem.
pub fn validate_ranges(input: &str, page_count: u32) -> Option<String> {
    let pages = match parse_ranges(input) {
        Ok(pages) => pages,
        Err(e) => return Some(e.to_string()),
    };

    for page in pages {
        if page == 0 {
            return Some("Page numbers start at 1".to_string());
        }
        if page > page_count {
            return Some(format!(
                "Page {} exceeds document length {}",
                page, page_count
            ));
        }
    }

    None
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    proptest! {
        /// Parsed output is always sorted and free of duplicates.
        #[test]
        fn output_sorted_and_unique(input in "[0-9, -]{0,40}") {
            if let Ok(pages) = parse_ranges(&input) {
                let mut sorted = pages.clone();
                sorted.sort_unstable();
                sorted.dedup();
                prop_assert_eq!(pages, sorted);
            }
        }

        /// Formatting a parsed selection and reparsing it gives the same set.
        #[test]
        fn format_parse_round_trip(
            pages in prop::collection::btree_set(1u32..500, 0..40)
        ) {
            let pages: Vec<u32> = pages.into_iter().collect();
            let formatted = format_ranges(&pages);
            let reparsed = parse_ranges(&formatted).unwrap();
            prop_assert_eq!(reparsed, pages);
        }

        /// Parsing never panics, whatever the input.
        #[test]
        fn never_panics(input in ".{0,60}") {
            let _ = parse_ranges(&input);
        }

        /// Token order never affects the parsed set.
        #[test]
        fn order_independent(a in 1u32..=20, b in 1u32..=20, c in 1u32..=20) {
            let r1 = parse_ranges(&format!("{}, {}, {}", a, b, c)).unwrap();
            let r2 = parse_ranges(&format!("{}, {}, {}", c, a, b)).unwrap();
            prop_assert_eq!(r1, r2);
        }

        /// Clamped output is a subset of [1, n].
        #[test]
        fn clamp_stays_in_bounds(
            pages in prop::collection::vec(0u32..200, 0..30),
            n in 1u32..100
        ) {
            let clamped = clamp_to_page_count(&pages, n);
            for p in &clamped {
                prop_assert!(*p >= 1 && *p <= n);
            }
            let original: BTreeSet<u32> = pages.into_iter().collect();
            for p in &clamped {
                prop_assert!(original.contains(p));
            }
        }
    }
}
