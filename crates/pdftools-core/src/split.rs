//! Page extraction
//!
//! Builds a new document holding only the requested pages. Unlike deletion,
//! extraction is strict: every requested page must exist.

use crate::error::PdfToolsError;
use lopdf::Document;
use std::collections::HashSet;

/// Extract the given 1-indexed pages into a new document, in original order.
pub fn extract_pages(bytes: &[u8], pages: &[u32]) -> Result<Vec<u8>, PdfToolsError> {
    if pages.is_empty() {
        return Err(PdfToolsError::InvalidRange("No pages specified".into()));
    }
    if pages.contains(&0) {
        return Err(PdfToolsError::InvalidRange(
            "Page numbers must be >= 1".into(),
        ));
    }

    let doc = Document::load_mem(bytes).map_err(|e| PdfToolsError::Parse(e.to_string()))?;
    let page_count = doc.get_pages().len() as u32;

    for &page in pages {
        if page > page_count {
            return Err(PdfToolsError::InvalidRange(format!(
                "Page {} does not exist (document has {} pages)",
                page, page_count
            )));
        }
    }

    let mut new_doc = doc.clone();

    let keep: HashSet<u32> = pages.iter().copied().collect();
    let mut to_delete: Vec<u32> = (1..=page_count).filter(|p| !keep.contains(p)).collect();

    // Deleting from the back keeps the remaining page numbers stable.
    to_delete.reverse();
    for page_num in to_delete {
        new_doc.delete_pages(&[page_num]);
    }

    new_doc.prune_objects();
    new_doc.compress();

    let mut buffer = Vec::new();
    new_doc
        .save_to(&mut buffer)
        .map_err(|e| PdfToolsError::Operation(format!("Save failed: {}", e)))?;
    Ok(buffer)
}

/// Split a document into one single-page document per page.
pub fn split_to_pages(bytes: &[u8]) -> Result<Vec<Vec<u8>>, PdfToolsError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfToolsError::Parse(e.to_string()))?;
    let page_count = doc.get_pages().len() as u32;

    (1..=page_count)
        .map(|page| extract_pages(bytes, &[page]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testpdf::{build_test_pdf, page_markers};
    use pretty_assertions::assert_eq;

    #[test]
    fn extract_empty_selection_fails() {
        let pdf = build_test_pdf(5, "Doc");
        assert!(extract_pages(&pdf, &[]).is_err());
    }

    #[test]
    fn extract_single_page() {
        let pdf = build_test_pdf(5, "Doc");

        let result = extract_pages(&pdf, &[3]).unwrap();

        assert_eq!(page_markers(&result), vec!["Doc-Page-3"]);
    }

    #[test]
    fn extract_keeps_original_order() {
        let pdf = build_test_pdf(5, "Doc");

        let result = extract_pages(&pdf, &[1, 3, 5]).unwrap();

        assert_eq!(
            page_markers(&result),
            vec!["Doc-Page-1", "Doc-Page-3", "Doc-Page-5"]
        );
    }

    #[test]
    fn extract_contiguous_range() {
        let pdf = build_test_pdf(10, "Doc");

        let result = extract_pages(&pdf, &[2, 3, 4, 5]).unwrap();

        assert_eq!(
            page_markers(&result),
            vec!["Doc-Page-2", "Doc-Page-3", "Doc-Page-4", "Doc-Page-5"]
        );
    }

    #[test]
    fn extract_rejects_out_of_range_page() {
        let pdf = build_test_pdf(5, "Doc");
        assert!(extract_pages(&pdf, &[10]).is_err());
    }

    #[test]
    fn extract_rejects_page_zero() {
        let pdf = build_test_pdf(5, "Doc");
        assert!(extract_pages(&pdf, &[0]).is_err());
    }

    #[test]
    fn split_produces_one_document_per_page() {
        let pdf = build_test_pdf(3, "Doc");

        let parts = split_to_pages(&pdf).unwrap();

        assert_eq!(parts.len(), 3);
        for (i, part) in parts.iter().enumerate() {
            assert_eq!(page_markers(part), vec![format!("Doc-Page-{}", i + 1)]);
        }
    }
}
