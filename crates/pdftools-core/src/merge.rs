//! Document combination
//!
//! Two entry points: [`merge_documents`] concatenates whole documents in
//! order, and [`merge_with_insertions`] splices other documents into a base
//! document at page anchors. Both import foreign objects by offsetting their
//! IDs past the destination's `max_id` and rewriting every reference.

use crate::error::PdfToolsError;
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;

/// A document to splice into a base document.
#[derive(Debug, Clone)]
pub struct Insertion {
    pub bytes: Vec<u8>,
    /// 1-indexed page of the base after which the pages go; 0 prepends.
    pub after_page: u32,
}

/// Concatenate documents in the given order.
pub fn merge_documents(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfToolsError> {
    if documents.is_empty() {
        return Err(PdfToolsError::Operation("No documents to merge".into()));
    }

    let mut documents = documents;
    if documents.len() == 1 {
        return Ok(documents.remove(0));
    }

    let mut loaded = Vec::new();
    for (i, bytes) in documents.iter().enumerate() {
        let doc = Document::load_mem(bytes)
            .map_err(|e| PdfToolsError::Parse(format!("Failed to load document {}: {}", i, e)))?;
        loaded.push(doc);
    }

    let mut dest = loaded.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut dest_page_refs = get_page_references(&dest);

    for source in loaded {
        let source_refs = import_objects(&mut dest, source, &mut dest_max_id);
        dest_page_refs.extend(source_refs);
    }

    finalize(dest, dest_page_refs, dest_max_id)
}

/// Splice each insertion's pages into `base` after its anchor page.
///
/// Insertions are applied in ascending anchor order; ties keep their input
/// order. Anchors past the end of the base document are clamped to the last
/// page, so stale anchors append rather than fail.
pub fn merge_with_insertions(
    base: &[u8],
    insertions: Vec<Insertion>,
) -> Result<Vec<u8>, PdfToolsError> {
    if insertions.is_empty() {
        return Ok(base.to_vec());
    }

    let mut dest = Document::load_mem(base)
        .map_err(|e| PdfToolsError::Parse(format!("Failed to load base document: {}", e)))?;
    let mut dest_max_id = dest.max_id;
    let base_refs = get_page_references(&dest);
    let base_count = base_refs.len() as u32;

    let mut insertions = insertions;
    insertions.sort_by_key(|ins| ins.after_page);

    // Anchor -> inserted page runs, in application order.
    let mut spliced: BTreeMap<u32, Vec<Vec<ObjectId>>> = BTreeMap::new();
    for (i, insertion) in insertions.into_iter().enumerate() {
        let source = Document::load_mem(&insertion.bytes).map_err(|e| {
            PdfToolsError::Parse(format!("Failed to load insertion {}: {}", i, e))
        })?;
        let source_refs = import_objects(&mut dest, source, &mut dest_max_id);
        let anchor = insertion.after_page.min(base_count);
        spliced.entry(anchor).or_default().push(source_refs);
    }

    let mut final_refs = Vec::new();
    if let Some(runs) = spliced.get(&0) {
        for run in runs {
            final_refs.extend(run);
        }
    }
    for (i, page_ref) in base_refs.iter().enumerate() {
        final_refs.push(*page_ref);
        if let Some(runs) = spliced.get(&(i as u32 + 1)) {
            for run in runs {
                final_refs.extend(run);
            }
        }
    }

    finalize(dest, final_refs, dest_max_id)
}

/// Splice a single document into `base` after `after_page`.
pub fn insert_document(
    base: &[u8],
    insert: &[u8],
    after_page: u32,
) -> Result<Vec<u8>, PdfToolsError> {
    merge_with_insertions(
        base,
        vec![Insertion {
            bytes: insert.to_vec(),
            after_page,
        }],
    )
}

/// Move a source document's objects into `dest` with offset IDs and return
/// the source's page references in the destination's ID space.
fn import_objects(dest: &mut Document, source: Document, dest_max_id: &mut u32) -> Vec<ObjectId> {
    let source_refs = get_page_references(&source);
    let id_offset = *dest_max_id;

    for (old_id, object) in source.objects.into_iter() {
        let new_id = (old_id.0 + id_offset, old_id.1);
        dest.objects.insert(new_id, remap_object_refs(object, id_offset));
    }

    *dest_max_id = (source.max_id + id_offset).max(*dest_max_id);

    source_refs
        .into_iter()
        .map(|id| (id.0 + id_offset, id.1))
        .collect()
}

/// Page object references in page order.
pub(crate) fn get_page_references(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Recursively shift every reference inside an object by `offset`.
pub(crate) fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Rewrite the root Pages node to hold exactly `page_refs`, in order, and
/// point every listed page's Parent back at it.
pub(crate) fn update_page_tree(
    doc: &mut Document,
    page_refs: Vec<ObjectId>,
) -> Result<(), PdfToolsError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .map_err(|_| PdfToolsError::Operation("No Root in trailer".into()))?
        .as_reference()
        .map_err(|_| PdfToolsError::Operation("Root is not a reference".into()))?;

    let pages_id = doc
        .objects
        .get(&catalog_id)
        .ok_or_else(|| PdfToolsError::Operation("Catalog not found".into()))?
        .as_dict()
        .map_err(|_| PdfToolsError::Operation("Invalid catalog".into()))?
        .get(b"Pages")
        .map_err(|_| PdfToolsError::Operation("No Pages in catalog".into()))?
        .as_reference()
        .map_err(|_| PdfToolsError::Operation("Pages is not a reference".into()))?;

    if let Some(Object::Dictionary(pages_dict)) = doc.objects.get_mut(&pages_id) {
        let kids = page_refs
            .iter()
            .map(|&id| Object::Reference(id))
            .collect::<Vec<_>>();
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Count", Object::Integer(page_refs.len() as i64));
    } else {
        return Err(PdfToolsError::Operation("Invalid pages dictionary".into()));
    }

    // Imported pages still point at their old Pages node.
    for page_ref in &page_refs {
        if let Some(Object::Dictionary(page_dict)) = doc.objects.get_mut(page_ref) {
            page_dict.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(())
}

/// Install the page list, drop unreachable objects, compress, serialize.
fn finalize(
    mut dest: Document,
    page_refs: Vec<ObjectId>,
    max_id: u32,
) -> Result<Vec<u8>, PdfToolsError> {
    update_page_tree(&mut dest, page_refs)?;
    dest.max_id = max_id;
    dest.prune_objects();
    dest.compress();

    let mut buffer = Vec::new();
    dest.save_to(&mut buffer)
        .map_err(|e| PdfToolsError::Operation(format!("Failed to save merged PDF: {}", e)))?;
    Ok(buffer)
}
