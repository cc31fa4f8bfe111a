//! Page preview rasterization
//!
//! Renders the first pages of a document to PNG via PDFium. The library is
//! bound at runtime; when no PDFium is available, or a page fails to render,
//! the page gets a light-gray placeholder bitmap sized from its MediaBox so
//! previews degrade instead of failing the whole request.

use crate::error::PdfToolsError;
use crate::page_info::PageInfo;
use image::{DynamicImage, Rgb, RgbImage};
use lopdf::Document;
use pdfium_render::prelude::*;
use serde::Serialize;
use std::io::Cursor;
use tracing::warn;

const PLACEHOLDER_GRAY: [u8; 3] = [211, 211, 211];

/// Preview rendering parameters.
#[derive(Debug, Clone, Copy)]
pub struct PreviewOptions {
    /// Pages past this index are not rendered
    pub max_pages: u32,
    /// Zoom factor applied to page dimensions
    pub scale: f32,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max_pages: 10,
            scale: 1.2,
        }
    }
}

/// One rendered (or placeholder) page image.
#[derive(Debug, Clone, Serialize)]
pub struct PagePreview {
    /// Page number (1-indexed)
    pub page_num: u32,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// PNG-encoded image data
    #[serde(skip)]
    pub png: Vec<u8>,
    /// True when this is a placeholder rather than real page content
    pub placeholder: bool,
}

/// Render the first `options.max_pages` pages of a document to PNG.
pub fn render_previews(
    bytes: &[u8],
    options: &PreviewOptions,
) -> Result<Vec<PagePreview>, PdfToolsError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfToolsError::Parse(e.to_string()))?;
    let infos = PageInfo::all_from_document(&doc)?;
    let render_count = (infos.len() as u32).min(options.max_pages) as usize;

    let pdfium = match create_pdfium() {
        Ok(pdfium) => Some(pdfium),
        Err(e) => {
            warn!("PDFium unavailable, serving placeholder previews: {}", e);
            None
        }
    };

    let mut previews = Vec::with_capacity(render_count);

    if let Some(pdfium) = pdfium {
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| PdfToolsError::Preview(format!("Failed to open document: {}", e)))?;

        for info in infos.iter().take(render_count) {
            match render_page(&document, info.page_num, options.scale) {
                Ok(preview) => previews.push(preview),
                Err(e) => {
                    warn!("Page {} failed to render: {}", info.page_num, e);
                    previews.push(placeholder_preview(info, options.scale)?);
                }
            }
        }
    } else {
        for info in infos.iter().take(render_count) {
            previews.push(placeholder_preview(info, options.scale)?);
        }
    }

    Ok(previews)
}

/// PDFium is not thread-safe, so each call binds a fresh instance.
fn create_pdfium() -> Result<Pdfium, PdfToolsError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| PdfToolsError::Preview(format!("Failed to initialize PDFium: {}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn render_page(
    document: &PdfDocument,
    page_num: u32,
    scale: f32,
) -> Result<PagePreview, PdfToolsError> {
    let page = document
        .pages()
        .get((page_num - 1) as u16)
        .map_err(|e| PdfToolsError::Preview(format!("Failed to get page {}: {}", page_num, e)))?;

    let config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap = page
        .render_with_config(&config)
        .map_err(|e| PdfToolsError::Preview(format!("Failed to render page {}: {}", page_num, e)))?;

    let dynamic_image = bitmap.as_image();
    let width = dynamic_image.width();
    let height = dynamic_image.height();

    Ok(PagePreview {
        page_num,
        width,
        height,
        png: encode_png(&dynamic_image, page_num)?,
        placeholder: false,
    })
}

/// Flat light-gray bitmap at the page's scaled dimensions.
fn placeholder_preview(info: &PageInfo, scale: f32) -> Result<PagePreview, PdfToolsError> {
    let width = ((info.width * scale) as u32).max(1);
    let height = ((info.height * scale) as u32).max(1);

    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb(PLACEHOLDER_GRAY),
    ));

    Ok(PagePreview {
        page_num: info.page_num,
        width,
        height,
        png: encode_png(&image, info.page_num)?,
        placeholder: true,
    })
}

fn encode_png(image: &DynamicImage, page_num: u32) -> Result<Vec<u8>, PdfToolsError> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| {
            PdfToolsError::Preview(format!("Failed to encode page {} as PNG: {}", page_num, e))
        })?;
    Ok(png)
}
