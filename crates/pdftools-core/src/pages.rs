//! In-document page edits: deletion and reordering.

use crate::error::PdfToolsError;
use crate::merge::{get_page_references, update_page_tree};
use lopdf::Document;
use std::collections::HashSet;

/// Remove the given 1-indexed pages from a document.
///
/// Page numbers outside `[1, page_count]` are ignored. Removing every page
/// is an error; an effectively empty removal set returns the input
/// unchanged.
pub fn remove_pages(bytes: &[u8], pages: &[u32]) -> Result<Vec<u8>, PdfToolsError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| PdfToolsError::Parse(e.to_string()))?;
    let page_count = doc.get_pages().len() as u32;

    let mut to_delete: Vec<u32> = pages
        .iter()
        .copied()
        .filter(|&p| p >= 1 && p <= page_count)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    if to_delete.is_empty() {
        return Ok(bytes.to_vec());
    }
    if to_delete.len() as u32 == page_count {
        return Err(PdfToolsError::Operation(
            "Cannot remove every page of a document".into(),
        ));
    }

    // Deleting from the back keeps the remaining page numbers stable.
    to_delete.sort_unstable();
    to_delete.reverse();
    for page_num in to_delete {
        doc.delete_pages(&[page_num]);
    }

    doc.prune_objects();
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfToolsError::Operation(format!("Save failed: {}", e)))?;
    Ok(buffer)
}

/// Rearrange pages into `order`, a permutation of `1..=page_count` giving
/// the new sequence in terms of current page numbers.
pub fn reorder_pages(bytes: &[u8], order: &[u32]) -> Result<Vec<u8>, PdfToolsError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| PdfToolsError::Parse(e.to_string()))?;
    let page_refs = get_page_references(&doc);
    let page_count = page_refs.len() as u32;

    if order.len() as u32 != page_count {
        return Err(PdfToolsError::Operation(format!(
            "Order lists {} pages but document has {}",
            order.len(),
            page_count
        )));
    }

    let mut seen = vec![false; page_refs.len()];
    for &page in order {
        if page < 1 || page > page_count {
            return Err(PdfToolsError::Operation(format!(
                "Page {} out of range 1..={}",
                page, page_count
            )));
        }
        if seen[(page - 1) as usize] {
            return Err(PdfToolsError::Operation(format!(
                "Page {} appears more than once",
                page
            )));
        }
        seen[(page - 1) as usize] = true;
    }

    let new_refs = order
        .iter()
        .map(|&p| page_refs[(p - 1) as usize])
        .collect::<Vec<_>>();

    update_page_tree(&mut doc, new_refs)?;
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfToolsError::Operation(format!("Save failed: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testpdf::{build_test_pdf, page_markers};
    use pretty_assertions::assert_eq;

    #[test]
    fn remove_drops_named_pages_in_order() {
        let pdf = build_test_pdf(5, "Doc");

        let result = remove_pages(&pdf, &[2, 4]).unwrap();

        assert_eq!(
            page_markers(&result),
            vec!["Doc-Page-1", "Doc-Page-3", "Doc-Page-5"]
        );
    }

    #[test]
    fn remove_ignores_out_of_range_pages() {
        let pdf = build_test_pdf(3, "Doc");

        let result = remove_pages(&pdf, &[0, 2, 17]).unwrap();

        assert_eq!(page_markers(&result), vec!["Doc-Page-1", "Doc-Page-3"]);
    }

    #[test]
    fn remove_nothing_returns_input_unchanged() {
        let pdf = build_test_pdf(3, "Doc");
        assert_eq!(remove_pages(&pdf, &[]).unwrap(), pdf);
        assert_eq!(remove_pages(&pdf, &[9, 10]).unwrap(), pdf);
    }

    #[test]
    fn remove_all_pages_fails() {
        let pdf = build_test_pdf(3, "Doc");
        assert!(remove_pages(&pdf, &[1, 2, 3]).is_err());
    }

    #[test]
    fn remove_duplicate_entries_count_once() {
        let pdf = build_test_pdf(3, "Doc");

        let result = remove_pages(&pdf, &[2, 2, 2]).unwrap();

        assert_eq!(page_markers(&result), vec!["Doc-Page-1", "Doc-Page-3"]);
    }

    #[test]
    fn reorder_reverses_pages() {
        let pdf = build_test_pdf(3, "Doc");

        let result = reorder_pages(&pdf, &[3, 2, 1]).unwrap();

        assert_eq!(
            page_markers(&result),
            vec!["Doc-Page-3", "Doc-Page-2", "Doc-Page-1"]
        );
    }

    #[test]
    fn reorder_identity_keeps_order() {
        let pdf = build_test_pdf(3, "Doc");

        let result = reorder_pages(&pdf, &[1, 2, 3]).unwrap();

        assert_eq!(
            page_markers(&result),
            vec!["Doc-Page-1", "Doc-Page-2", "Doc-Page-3"]
        );
    }

    #[test]
    fn reorder_rejects_wrong_length() {
        let pdf = build_test_pdf(3, "Doc");
        assert!(reorder_pages(&pdf, &[1, 2]).is_err());
        assert!(reorder_pages(&pdf, &[1, 2, 3, 3]).is_err());
    }

    #[test]
    fn reorder_rejects_duplicates_and_out_of_range() {
        let pdf = build_test_pdf(3, "Doc");
        assert!(reorder_pages(&pdf, &[1, 1, 2]).is_err());
        assert!(reorder_pages(&pdf, &[1, 2, 4]).is_err());
        assert!(reorder_pages(&pdf, &[0, 1, 2]).is_err());
    }
}
