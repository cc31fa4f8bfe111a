//! Download packaging
//!
//! Results leave the system as [`DownloadArtifact`]s: named byte buffers
//! with base64/data-URL accessors for clients that embed downloads inline.
//! Filenames carry a unix timestamp so repeated exports never collide.

use crate::error::PdfToolsError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::Serialize;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A named, downloadable result.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadArtifact {
    pub filename: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl DownloadArtifact {
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URL suitable for an inline download link.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }

    /// Payload size in whole kilobytes, floored to 1 KB minimum.
    pub fn size_kb(&self) -> u64 {
        (self.bytes.len() as u64 / 1024).max(1)
    }
}

/// Package a PDF as `{stem}_{timestamp}.pdf`.
pub fn pdf_artifact(stem: &str, bytes: Vec<u8>) -> DownloadArtifact {
    DownloadArtifact {
        filename: format!("{}_{}.pdf", file_stem(stem), Utc::now().timestamp()),
        mime_type: "application/pdf".to_string(),
        bytes,
    }
}

/// Package single-page documents as `{stem}_pages_{timestamp}.zip`
/// containing `page_1.pdf`, `page_2.pdf`, ... in order.
pub fn zip_artifact(stem: &str, pages: Vec<Vec<u8>>) -> Result<DownloadArtifact, PdfToolsError> {
    if pages.is_empty() {
        return Err(PdfToolsError::Export("No pages to package".into()));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (i, page) in pages.iter().enumerate() {
        writer
            .start_file(format!("page_{}.pdf", i + 1), options)
            .map_err(|e| PdfToolsError::Export(format!("ZIP entry failed: {}", e)))?;
        writer
            .write_all(page)
            .map_err(|e| PdfToolsError::Export(format!("ZIP write failed: {}", e)))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| PdfToolsError::Export(format!("ZIP finalize failed: {}", e)))?;

    Ok(DownloadArtifact {
        filename: format!("{}_pages_{}.zip", file_stem(stem), Utc::now().timestamp()),
        mime_type: "application/zip".to_string(),
        bytes: cursor.into_inner(),
    })
}

/// Strip a trailing `.pdf` so uploaded names make clean stems.
fn file_stem(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.len() > 4 && trimmed.to_ascii_lowercase().ends_with(".pdf") {
        &trimmed[..trimmed.len() - 4]
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testpdf::build_test_pdf;
    use pretty_assertions::assert_eq;

    #[test]
    fn pdf_artifact_names_with_timestamp() {
        let artifact = pdf_artifact("report.pdf", vec![1, 2, 3]);

        assert!(artifact.filename.starts_with("report_"));
        assert!(artifact.filename.ends_with(".pdf"));
        assert_eq!(artifact.mime_type, "application/pdf");
    }

    #[test]
    fn data_url_round_trips() {
        let artifact = pdf_artifact("doc", b"%PDF-1.7".to_vec());

        let url = artifact.data_url();
        assert!(url.starts_with("data:application/pdf;base64,"));

        let payload = url.rsplit(',').next().unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn size_floors_at_one_kb() {
        let artifact = pdf_artifact("doc", vec![0; 10]);
        assert_eq!(artifact.size_kb(), 1);

        let artifact = pdf_artifact("doc", vec![0; 3 * 1024]);
        assert_eq!(artifact.size_kb(), 3);
    }

    #[test]
    fn zip_holds_one_entry_per_page() {
        let pages = vec![
            build_test_pdf(1, "A"),
            build_test_pdf(1, "B"),
            build_test_pdf(1, "C"),
        ];

        let artifact = zip_artifact("split.pdf", pages).unwrap();
        assert!(artifact.filename.ends_with(".zip"));

        let mut archive = zip::ZipArchive::new(Cursor::new(artifact.bytes)).unwrap();
        assert_eq!(archive.len(), 3);
        assert_eq!(archive.by_index(0).unwrap().name(), "page_1.pdf");
        assert_eq!(archive.by_index(2).unwrap().name(), "page_3.pdf");
    }

    #[test]
    fn zip_of_nothing_fails() {
        assert!(zip_artifact("split", vec![]).is_err());
    }

    #[test]
    fn stem_strips_pdf_extension_only() {
        assert_eq!(file_stem("report.pdf"), "report");
        assert_eq!(file_stem("report.PDF"), "report");
        assert_eq!(file_stem("notes.txt"), "notes.txt");
        assert_eq!(file_stem("plain"), "plain");
    }
}
