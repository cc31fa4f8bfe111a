//! Per-page geometry
//!
//! The previewer sizes placeholder bitmaps from this, and the inspect
//! endpoint reports it per page.

use crate::error::PdfToolsError;
use lopdf::{Dictionary, Document, Object};
use serde::Serialize;

/// Geometry of a single page.
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    /// Page number (1-indexed)
    pub page_num: u32,
    /// Width in points (1 point = 1/72 inch)
    pub width: f32,
    /// Height in points
    pub height: f32,
    /// Rotation in degrees (0, 90, 180, 270)
    pub rotation: i32,
    pub orientation: PageOrientation,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    Portrait,
    Landscape,
    Square,
}

impl PageInfo {
    pub fn from_document(doc: &Document, page_num: u32) -> Result<Self, PdfToolsError> {
        let pages = doc.get_pages();
        let page_id = pages
            .get(&page_num)
            .ok_or_else(|| PdfToolsError::Operation(format!("Page {} not found", page_num)))?;

        let page_dict = doc
            .objects
            .get(page_id)
            .ok_or_else(|| {
                PdfToolsError::Operation(format!("Page {} object not found", page_num))
            })?
            .as_dict()
            .map_err(|_| {
                PdfToolsError::Operation(format!("Page {} is not a dictionary", page_num))
            })?;

        let media_box = media_box(doc, page_dict)?;
        let width = (media_box[2] - media_box[0]) as f32;
        let height = (media_box[3] - media_box[1]) as f32;
        let rotation = rotation(doc, page_dict);

        // A 90/270 rotation swaps the visual axes.
        let (effective_width, effective_height) = if rotation == 90 || rotation == 270 {
            (height, width)
        } else {
            (width, height)
        };

        let orientation = if (effective_width - effective_height).abs() < 1.0 {
            PageOrientation::Square
        } else if effective_width > effective_height {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        };

        Ok(Self {
            page_num,
            width,
            height,
            rotation,
            orientation,
        })
    }

    /// Geometry for every page, in page order.
    pub fn all_from_document(doc: &Document) -> Result<Vec<Self>, PdfToolsError> {
        (1..=doc.get_pages().len() as u32)
            .map(|page_num| Self::from_document(doc, page_num))
            .collect()
    }
}

/// Look up `key` on the page, falling back to its Parent node.
///
/// Covers the common single-level tree; deeper inheritance chains fall
/// through to the caller's default.
fn inherited<'a>(doc: &'a Document, page_dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    if let Ok(value) = page_dict.get(key) {
        return Some(value);
    }

    let parent_dict = page_dict
        .get(b"Parent")
        .ok()?
        .as_reference()
        .ok()
        .and_then(|id| doc.objects.get(&id))?
        .as_dict()
        .ok()?;
    parent_dict.get(key).ok()
}

/// MediaBox with Parent inheritance, defaulting to US Letter.
fn media_box(doc: &Document, page_dict: &Dictionary) -> Result<[f64; 4], PdfToolsError> {
    match inherited(doc, page_dict, b"MediaBox").and_then(|obj| obj.as_array().ok()) {
        Some(array) => parse_box_array(array),
        None => Ok([0.0, 0.0, 612.0, 792.0]),
    }
}

fn parse_box_array(array: &[Object]) -> Result<[f64; 4], PdfToolsError> {
    if array.len() != 4 {
        return Err(PdfToolsError::Parse("MediaBox must have 4 elements".into()));
    }

    let mut result = [0.0; 4];
    for (i, obj) in array.iter().enumerate() {
        result[i] = match obj {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => *n as f64,
            _ => {
                return Err(PdfToolsError::Parse(format!(
                    "MediaBox element {} is not a number",
                    i
                )))
            }
        };
    }

    Ok(result)
}

/// Rotate with Parent inheritance, normalized to 0/90/180/270.
fn rotation(doc: &Document, page_dict: &Dictionary) -> i32 {
    inherited(doc, page_dict, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .map(|angle| normalize_rotation(angle as i32))
        .unwrap_or(0)
}

fn normalize_rotation(angle: i32) -> i32 {
    let normalized = angle % 360;
    if normalized < 0 {
        normalized + 360
    } else {
        normalized
    }
}
