//! PDF page manipulation
//!
//! This crate provides server-side PDF editing using lopdf:
//! page removal, reordering, extraction, splitting, positional merge,
//! preview rasterization, and download packaging.

pub mod document;
pub mod error;
pub mod export;
pub mod merge;
pub mod page_info;
pub mod pages;
pub mod preview;
pub mod ranges;
pub mod split;
pub mod workflow;

#[cfg(test)]
pub mod testpdf;

pub use document::{
    inspect, inspect_with_geometry, quick_check, DocumentHandle, DocumentInfo, UploadLimits,
};
pub use error::PdfToolsError;
pub use export::{pdf_artifact, zip_artifact, DownloadArtifact};
pub use merge::{insert_document, merge_documents, merge_with_insertions, Insertion};
pub use page_info::{PageInfo, PageOrientation};
pub use pages::{remove_pages, reorder_pages};
pub use preview::{render_previews, PagePreview, PreviewOptions};
pub use ranges::{clamp_to_page_count, format_ranges, parse_ranges, validate_ranges};
pub use split::{extract_pages, split_to_pages};
pub use workflow::{MergeWorkflow, PlannedInsertion, WorkflowSummary};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, PdfToolsError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| PdfToolsError::Parse(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
