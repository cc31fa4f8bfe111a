//! Upload validation and document handles
//!
//! Every uploaded buffer passes through [`inspect`] before any operation
//! touches it; the resulting [`DocumentInfo`] is what the UI shows next to
//! the file name. A [`DocumentHandle`] is immutable once built and replaced
//! wholesale when an edit produces a new document.

use crate::error::PdfToolsError;
use crate::page_info::PageInfo;
use lopdf::Document;
use serde::Serialize;

/// Metadata extracted while validating an upload.
#[derive(Debug, Clone, Serialize, Default)]
pub struct DocumentInfo {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string from the header (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    /// Document title from the Info dictionary, if present
    pub title: Option<String>,
    /// Document author from the Info dictionary, if present
    pub author: Option<String>,
}

/// An uploaded document: name, raw bytes, and validated metadata.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    pub name: String,
    pub bytes: Vec<u8>,
    pub info: DocumentInfo,
}

impl DocumentHandle {
    /// Validate `bytes` and build a handle for them.
    pub fn load(name: &str, bytes: Vec<u8>) -> Result<Self, PdfToolsError> {
        let info = inspect(&bytes)?;
        Ok(Self {
            name: name.to_string(),
            bytes,
            info,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.info.page_count
    }
}

/// Upload constraints enforced before a file enters a session.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Maximum number of files per operation
    pub max_files: usize,
    /// Maximum size of a single file in bytes
    pub max_file_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_bytes: 50 * 1024 * 1024,
        }
    }
}

impl UploadLimits {
    /// Check the `index`-th upload (0-based) named `name` against the limits.
    pub fn admit(&self, index: usize, name: &str, bytes: &[u8]) -> Result<(), PdfToolsError> {
        if index >= self.max_files {
            return Err(PdfToolsError::Operation(format!(
                "Too many files: at most {} allowed",
                self.max_files
            )));
        }
        if bytes.len() > self.max_file_bytes {
            return Err(PdfToolsError::Operation(format!(
                "{} is too large: {} bytes exceeds the {} byte limit",
                name,
                bytes.len(),
                self.max_file_bytes
            )));
        }
        Ok(())
    }
}

/// Validate a PDF buffer and extract its metadata.
pub fn inspect(bytes: &[u8]) -> Result<DocumentInfo, PdfToolsError> {
    let document = load_validated(bytes)?;
    build_info(&document, bytes)
}

/// Validate a PDF buffer and extract both its metadata and per-page
/// geometry from a single parse.
pub fn inspect_with_geometry(
    bytes: &[u8],
) -> Result<(DocumentInfo, Vec<PageInfo>), PdfToolsError> {
    let document = load_validated(bytes)?;
    let info = build_info(&document, bytes)?;
    let pages = PageInfo::all_from_document(&document)?;
    Ok((info, pages))
}

/// Header checks plus the full lopdf parse.
fn load_validated(bytes: &[u8]) -> Result<Document, PdfToolsError> {
    if bytes.len() < 8 {
        return Err(PdfToolsError::Parse(
            "File too small to be a valid PDF".into(),
        ));
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(PdfToolsError::Parse(
            "Not a valid PDF file (missing %PDF- header)".into(),
        ));
    }

    Document::load_mem(bytes).map_err(|e| PdfToolsError::Parse(e.to_string()))
}

fn build_info(document: &Document, bytes: &[u8]) -> Result<DocumentInfo, PdfToolsError> {
    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(PdfToolsError::Parse("PDF has no pages".into()));
    }

    let (title, author) = info_dict_metadata(document);

    Ok(DocumentInfo {
        page_count,
        version: header_version(bytes),
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
        title,
        author,
    })
}

/// Cheap header/trailer probe without a full parse, for large files.
pub fn quick_check(bytes: &[u8]) -> Result<(), PdfToolsError> {
    if bytes.len() < 8 {
        return Err(PdfToolsError::Parse(
            "File too small to be a valid PDF".into(),
        ));
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(PdfToolsError::Parse(
            "Not a valid PDF file (missing %PDF- header)".into(),
        ));
    }

    let tail = if bytes.len() > 1024 {
        &bytes[bytes.len() - 1024..]
    } else {
        bytes
    };
    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err(PdfToolsError::Parse(
            "PDF appears truncated (missing %%EOF marker)".into(),
        ));
    }

    Ok(())
}

/// Extract the version digits from a `%PDF-1.7` header.
fn header_version(bytes: &[u8]) -> String {
    if bytes.len() >= 8 {
        if let Ok(version) = std::str::from_utf8(&bytes[5..8]) {
            return version.trim().to_string();
        }
    }
    "1.4".to_string()
}

/// Pull Title and Author out of the trailer's Info dictionary.
fn info_dict_metadata(document: &Document) -> (Option<String>, Option<String>) {
    let info_dict = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
        .and_then(|id| document.objects.get(&id))
        .and_then(|obj| obj.as_dict().ok());

    let Some(info_dict) = info_dict else {
        return (None, None);
    };

    let field = |key: &[u8]| {
        info_dict
            .get(key)
            .ok()
            .and_then(|obj| obj.as_str().ok())
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .filter(|s| !s.is_empty())
    };

    (field(b"Title"), field(b"Author"))
}
