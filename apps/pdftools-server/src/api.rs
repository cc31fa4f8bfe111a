//! API handlers for the pdftools server
//!
//! Provides REST endpoints for:
//! - Upload inspection
//! - Page removal, reordering, extraction
//! - Merge, positional insertion, consolidation
//! - Per-page splitting and preview rendering
//!
//! Uploaded documents arrive base64-encoded; results go back the same way,
//! wrapped in a download artifact with a timestamped filename.

use axum::{extract::State, Json};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

use pdftools_core::{
    extract_pages, get_page_count, insert_document, inspect_with_geometry, merge_documents,
    parse_ranges, pdf_artifact, remove_pages, render_previews, reorder_pages, split_to_pages,
    zip_artifact, DownloadArtifact, MergeWorkflow, PageInfo, PreviewOptions,
};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pdftools-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// A base64-encoded uploaded file
#[derive(Deserialize, Clone)]
pub struct FileUpload {
    /// Original filename, used for artifact naming
    #[serde(default = "default_name")]
    pub name: String,

    /// Base64-encoded file contents
    pub data: String,
}

fn default_name() -> String {
    "document.pdf".to_string()
}

/// Decode an upload and enforce the server's limits on it.
fn decode_upload(
    state: &AppState,
    index: usize,
    upload: &FileUpload,
) -> Result<Vec<u8>, ServerError> {
    let bytes = STANDARD.decode(&upload.data).map_err(|e| {
        ServerError::InvalidRequest(format!("{} is not valid base64: {}", upload.name, e))
    })?;

    state.limits.admit(index, &upload.name, &bytes).map_err(|e| {
        ServerError::UploadLimit(e.to_string())
    })?;

    Ok(bytes)
}

/// Downloadable result payload
#[derive(Serialize)]
pub struct ArtifactResponse {
    pub success: bool,
    pub filename: String,
    pub mime_type: String,
    /// Base64-encoded file contents
    pub data: String,
    /// Inline `data:` URL for browser downloads
    pub data_url: String,
    pub size_kb: u64,
    /// Page count for PDF artifacts
    pub page_count: Option<u32>,
}

impl ArtifactResponse {
    fn from_artifact(artifact: DownloadArtifact, page_count: Option<u32>) -> Self {
        Self {
            success: true,
            data: artifact.base64(),
            data_url: artifact.data_url(),
            size_kb: artifact.size_kb(),
            filename: artifact.filename,
            mime_type: artifact.mime_type,
            page_count,
        }
    }

    fn from_pdf(stem: &str, bytes: Vec<u8>) -> Result<Self, ServerError> {
        let page_count = get_page_count(&bytes)?;
        Ok(Self::from_artifact(
            pdf_artifact(stem, bytes),
            Some(page_count),
        ))
    }
}

/// Inspect request body
#[derive(Deserialize)]
pub struct InspectRequest {
    pub files: Vec<FileUpload>,
}

/// Per-document inspection result
#[derive(Serialize)]
pub struct InspectedDocument {
    pub name: String,
    pub page_count: u32,
    pub version: String,
    pub encrypted: bool,
    pub size_bytes: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub pages: Vec<PageInfo>,
}

/// Inspect response
#[derive(Serialize)]
pub struct InspectResponse {
    pub success: bool,
    pub documents: Vec<InspectedDocument>,
}

/// Handler: POST /api/inspect
pub async fn handle_inspect(
    State(state): State<AppState>,
    Json(req): Json<InspectRequest>,
) -> Result<Json<InspectResponse>, ServerError> {
    info!("Inspect request: {} file(s)", req.files.len());

    let mut documents = Vec::with_capacity(req.files.len());
    for (i, upload) in req.files.iter().enumerate() {
        let bytes = decode_upload(&state, i, upload)?;
        let (info, pages) = inspect_with_geometry(&bytes)?;

        documents.push(InspectedDocument {
            name: upload.name.clone(),
            page_count: info.page_count,
            version: info.version,
            encrypted: info.encrypted,
            size_bytes: info.size_bytes,
            title: info.title,
            author: info.author,
            pages,
        });
    }

    Ok(Json(InspectResponse {
        success: true,
        documents,
    }))
}

/// Merge request body
#[derive(Deserialize)]
pub struct MergeRequest {
    /// Documents to concatenate, in order
    pub files: Vec<FileUpload>,
}

/// Handler: POST /api/merge
pub async fn handle_merge(
    State(state): State<AppState>,
    Json(req): Json<MergeRequest>,
) -> Result<Json<ArtifactResponse>, ServerError> {
    info!("Merge request: {} file(s)", req.files.len());

    if req.files.is_empty() {
        return Err(ServerError::InvalidRequest("No files to merge".into()));
    }

    let mut documents = Vec::with_capacity(req.files.len());
    for (i, upload) in req.files.iter().enumerate() {
        documents.push(decode_upload(&state, i, upload)?);
    }

    let merged = merge_documents(documents)?;
    Ok(Json(ArtifactResponse::from_pdf("merged", merged)?))
}

/// Insert request body
#[derive(Deserialize)]
pub struct InsertRequest {
    pub base: FileUpload,
    pub insert: FileUpload,
    /// 1-indexed base page after which the pages go; 0 prepends
    pub after_page: u32,
}

/// Handler: POST /api/insert
pub async fn handle_insert(
    State(state): State<AppState>,
    Json(req): Json<InsertRequest>,
) -> Result<Json<ArtifactResponse>, ServerError> {
    info!(
        "Insert request: {} into {} after page {}",
        req.insert.name, req.base.name, req.after_page
    );

    let base = decode_upload(&state, 0, &req.base)?;
    let insert = decode_upload(&state, 1, &req.insert)?;

    let result = insert_document(&base, &insert, req.after_page)?;
    Ok(Json(ArtifactResponse::from_pdf(&req.base.name, result)?))
}

/// Consolidation request body: the full base + removals + insertions flow
#[derive(Deserialize)]
pub struct ConsolidateRequest {
    pub base: FileUpload,

    /// Range string of base pages to drop, e.g. "2, 5-7"
    #[serde(default)]
    pub remove_pages: String,

    #[serde(default)]
    pub insertions: Vec<InsertionUpload>,
}

/// One insertion within a consolidation request
#[derive(Deserialize)]
pub struct InsertionUpload {
    pub file: FileUpload,
    /// 1-indexed post-removal base page after which the pages go; 0 prepends
    pub after_page: u32,
    /// Range string of pages to drop from this document before insertion
    #[serde(default)]
    pub remove_pages: String,
}

/// Consolidation response: artifact plus the workflow summary
#[derive(Serialize)]
pub struct ConsolidateResponse {
    #[serde(flatten)]
    pub artifact: ArtifactResponse,
    pub base_pages: u32,
    pub pages_after_removal: u32,
    pub insertion_count: usize,
}

/// Handler: POST /api/consolidate
pub async fn handle_consolidate(
    State(state): State<AppState>,
    Json(req): Json<ConsolidateRequest>,
) -> Result<Json<ConsolidateResponse>, ServerError> {
    info!(
        "Consolidate request: base={}, removals={:?}, {} insertion(s)",
        req.base.name,
        req.remove_pages,
        req.insertions.len()
    );

    let base = decode_upload(&state, 0, &req.base)?;

    let mut workflow = MergeWorkflow::with_limits(state.limits);
    workflow.set_base(&req.base.name, base)?;
    if !req.remove_pages.trim().is_empty() {
        workflow.set_removals(&req.remove_pages)?;
    }
    for (i, insertion) in req.insertions.iter().enumerate() {
        let bytes = decode_upload(&state, 1 + i, &insertion.file)?;
        workflow.add_insertion(&insertion.file.name, bytes, insertion.after_page)?;
        if !insertion.remove_pages.trim().is_empty() {
            workflow.set_insertion_removals(i, &insertion.remove_pages)?;
        }
    }

    let summary = workflow.summary()?;
    debug!(?summary, "Executing consolidation");
    let result = workflow.execute()?;

    Ok(Json(ConsolidateResponse {
        artifact: ArtifactResponse::from_pdf("consolidated_report", result)?,
        base_pages: summary.base_pages,
        pages_after_removal: summary.pages_after_removal,
        insertion_count: summary.insertion_count,
    }))
}

/// Remove-pages request body
#[derive(Deserialize)]
pub struct RemovePagesRequest {
    pub file: FileUpload,
    /// Range string of pages to drop, e.g. "2, 5-7"
    pub pages: String,
}

/// Handler: POST /api/remove-pages
pub async fn handle_remove_pages(
    State(state): State<AppState>,
    Json(req): Json<RemovePagesRequest>,
) -> Result<Json<ArtifactResponse>, ServerError> {
    info!("Remove request: {} pages {:?}", req.file.name, req.pages);

    let bytes = decode_upload(&state, 0, &req.file)?;
    let pages = parse_ranges(&req.pages)?;

    let result = remove_pages(&bytes, &pages)?;
    Ok(Json(ArtifactResponse::from_pdf(&req.file.name, result)?))
}

/// Extract request body
#[derive(Deserialize)]
pub struct ExtractRequest {
    pub file: FileUpload,
    /// Range string of pages to keep, e.g. "1-3, 8"
    pub pages: String,
}

/// Handler: POST /api/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<ArtifactResponse>, ServerError> {
    info!("Extract request: {} pages {:?}", req.file.name, req.pages);

    let bytes = decode_upload(&state, 0, &req.file)?;
    let pages = parse_ranges(&req.pages)?;

    let result = extract_pages(&bytes, &pages)?;
    Ok(Json(ArtifactResponse::from_pdf(&req.file.name, result)?))
}

/// Reorder request body
#[derive(Deserialize)]
pub struct ReorderRequest {
    pub file: FileUpload,
    /// Permutation of 1..=page_count giving the new page sequence
    pub order: Vec<u32>,
}

/// Handler: POST /api/reorder
pub async fn handle_reorder(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<ArtifactResponse>, ServerError> {
    info!("Reorder request: {} order {:?}", req.file.name, req.order);

    let bytes = decode_upload(&state, 0, &req.file)?;

    let result = reorder_pages(&bytes, &req.order)?;
    Ok(Json(ArtifactResponse::from_pdf(&req.file.name, result)?))
}

/// Split request body
#[derive(Deserialize)]
pub struct SplitRequest {
    pub file: FileUpload,
}

/// Handler: POST /api/split
pub async fn handle_split(
    State(state): State<AppState>,
    Json(req): Json<SplitRequest>,
) -> Result<Json<ArtifactResponse>, ServerError> {
    info!("Split request: {}", req.file.name);

    let bytes = decode_upload(&state, 0, &req.file)?;

    let parts = split_to_pages(&bytes)?;
    let part_count = parts.len() as u32;
    let artifact = zip_artifact(&req.file.name, parts)?;

    Ok(Json(ArtifactResponse::from_artifact(
        artifact,
        Some(part_count),
    )))
}

/// Preview request body
#[derive(Deserialize)]
pub struct PreviewRequest {
    pub file: FileUpload,

    /// Pages past this index are not rendered
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Zoom factor applied to page dimensions
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_max_pages() -> u32 {
    10
}

fn default_scale() -> f32 {
    1.2
}

/// Upper bound on the preview render scale. A US Letter page at this
/// scale is already a 2448x3168 bitmap.
const MAX_PREVIEW_SCALE: f32 = 4.0;

/// One preview image in the response
#[derive(Serialize)]
pub struct PreviewImage {
    pub page_num: u32,
    pub width: u32,
    pub height: u32,
    pub placeholder: bool,
    /// Base64-encoded PNG
    pub data: String,
    pub mime_type: &'static str,
}

/// Preview response
#[derive(Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub page_count: u32,
    pub previews: Vec<PreviewImage>,
}

/// Handler: POST /api/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ServerError> {
    info!(
        "Preview request: {} (max_pages={}, scale={})",
        req.file.name, req.max_pages, req.scale
    );

    if !req.scale.is_finite() || req.scale <= 0.0 {
        return Err(ServerError::InvalidRequest(
            "Scale must be positive".into(),
        ));
    }
    if req.scale > MAX_PREVIEW_SCALE {
        return Err(ServerError::InvalidRequest(format!(
            "Scale must be at most {}",
            MAX_PREVIEW_SCALE
        )));
    }

    let bytes = decode_upload(&state, 0, &req.file)?;
    let page_count = get_page_count(&bytes)?;

    let options = PreviewOptions {
        max_pages: req.max_pages,
        scale: req.scale,
    };
    let previews = render_previews(&bytes, &options)?
        .into_iter()
        .map(|p| PreviewImage {
            page_num: p.page_num,
            width: p.width,
            height: p.height,
            placeholder: p.placeholder,
            data: STANDARD.encode(&p.png),
            mime_type: "image/png",
        })
        .collect();

    Ok(Json(PreviewResponse {
        success: true,
        page_count,
        previews,
    }))
}
