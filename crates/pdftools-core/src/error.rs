use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfToolsError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error("Preview rendering failed: {0}")]
    Preview(String),

    #[error("Export failed: {0}")]
    Export(String),
}
