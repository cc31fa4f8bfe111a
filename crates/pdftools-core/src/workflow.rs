//! Consolidation workflow
//!
//! Holds the state of a multi-step merge: a base document, an optional set
//! of pages to remove from it, and documents to splice in at page anchors.
//! Nothing is mutated until [`MergeWorkflow::execute`], which produces a
//! fresh document and leaves the inputs untouched.

use crate::document::{DocumentHandle, UploadLimits};
use crate::error::PdfToolsError;
use crate::merge::{merge_with_insertions, Insertion};
use crate::pages::remove_pages;
use crate::ranges::{clamp_to_page_count, parse_ranges};
use serde::Serialize;
use tracing::info;

/// A document queued for insertion into the base.
#[derive(Debug, Clone)]
pub struct PlannedInsertion {
    pub document: DocumentHandle,
    /// 1-indexed base page after which the pages go; 0 prepends.
    pub after_page: u32,
    /// Pages to drop from this document before it is spliced in.
    pub removals: Vec<u32>,
}

impl PlannedInsertion {
    fn effective_pages(&self) -> u32 {
        self.document.page_count() - self.removals.len() as u32
    }
}

/// Staged state of a consolidation run.
#[derive(Debug, Default)]
pub struct MergeWorkflow {
    limits: UploadLimits,
    base: Option<DocumentHandle>,
    removals: Vec<u32>,
    insertions: Vec<PlannedInsertion>,
}

/// What [`MergeWorkflow::execute`] will produce, for UI display.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummary {
    pub base_pages: u32,
    pub pages_after_removal: u32,
    pub insertion_count: usize,
    pub inserted_pages: u32,
    pub total_pages: u32,
}

impl MergeWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// A workflow that admits uploads against `limits` instead of the
    /// defaults.
    pub fn with_limits(limits: UploadLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Set the base document, replacing any previous one and clearing the
    /// removal set that referred to it.
    pub fn set_base(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), PdfToolsError> {
        self.limits.admit(0, name, &bytes)?;
        let handle = DocumentHandle::load(name, bytes)?;
        info!(name = %handle.name, pages = handle.page_count(), "Base document set");
        self.base = Some(handle);
        self.removals.clear();
        Ok(())
    }

    /// Parse and stage a removal selection against the base document.
    ///
    /// Out-of-range pages are dropped; removing every base page is rejected
    /// here rather than at execute time.
    pub fn set_removals(&mut self, input: &str) -> Result<(), PdfToolsError> {
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| PdfToolsError::Operation("No base document loaded".into()))?;

        let pages = clamp_to_page_count(&parse_ranges(input)?, base.page_count());
        if pages.len() as u32 == base.page_count() {
            return Err(PdfToolsError::Operation(
                "Cannot remove every page of the base document".into(),
            ));
        }

        self.removals = pages;
        Ok(())
    }

    /// Queue a document to be spliced in after `after_page` of the base.
    pub fn add_insertion(
        &mut self,
        name: &str,
        bytes: Vec<u8>,
        after_page: u32,
    ) -> Result<(), PdfToolsError> {
        if self.base.is_none() {
            return Err(PdfToolsError::Operation("No base document loaded".into()));
        }

        self.limits.admit(1 + self.insertions.len(), name, &bytes)?;
        let document = DocumentHandle::load(name, bytes)?;
        info!(
            name = %document.name,
            pages = document.page_count(),
            after_page,
            "Insertion queued"
        );
        self.insertions.push(PlannedInsertion {
            document,
            after_page,
            removals: Vec::new(),
        });
        Ok(())
    }

    /// Parse and stage a removal selection against the `index`-th insertion.
    pub fn set_insertion_removals(
        &mut self,
        index: usize,
        input: &str,
    ) -> Result<(), PdfToolsError> {
        let insertion = self.insertions.get_mut(index).ok_or_else(|| {
            PdfToolsError::Operation("Insertion index out of bounds".into())
        })?;

        let page_count = insertion.document.page_count();
        let pages = clamp_to_page_count(&parse_ranges(input)?, page_count);
        if pages.len() as u32 == page_count {
            return Err(PdfToolsError::Operation(format!(
                "Cannot remove every page of {}",
                insertion.document.name
            )));
        }

        insertion.removals = pages;
        Ok(())
    }

    pub fn remove_insertion(&mut self, index: usize) -> Result<(), PdfToolsError> {
        if index >= self.insertions.len() {
            return Err(PdfToolsError::Operation(
                "Insertion index out of bounds".into(),
            ));
        }
        self.insertions.remove(index);
        Ok(())
    }

    pub fn can_execute(&self) -> bool {
        self.base.is_some()
    }

    pub fn summary(&self) -> Result<WorkflowSummary, PdfToolsError> {
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| PdfToolsError::Operation("No base document loaded".into()))?;

        let base_pages = base.page_count();
        let pages_after_removal = base_pages - self.removals.len() as u32;
        let inserted_pages = self
            .insertions
            .iter()
            .map(|ins| ins.effective_pages())
            .sum::<u32>();

        Ok(WorkflowSummary {
            base_pages,
            pages_after_removal,
            insertion_count: self.insertions.len(),
            inserted_pages,
            total_pages: pages_after_removal + inserted_pages,
        })
    }

    /// Run removal then insertion and return the consolidated document.
    ///
    /// Anchors are interpreted against post-removal page numbers; anchors
    /// past the shortened document are clamped to its last page.
    pub fn execute(&self) -> Result<Vec<u8>, PdfToolsError> {
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| PdfToolsError::Operation("No base document loaded".into()))?;

        let trimmed = if self.removals.is_empty() {
            base.bytes.clone()
        } else {
            remove_pages(&base.bytes, &self.removals)?
        };

        if self.insertions.is_empty() {
            return Ok(trimmed);
        }

        let mut insertions = Vec::with_capacity(self.insertions.len());
        for planned in &self.insertions {
            let bytes = if planned.removals.is_empty() {
                planned.document.bytes.clone()
            } else {
                remove_pages(&planned.document.bytes, &planned.removals)?
            };
            insertions.push(Insertion {
                bytes,
                after_page: planned.after_page,
            });
        }

        merge_with_insertions(&trimmed, insertions)
    }
}
