//! Render-ready snapshots of navigator state

use crate::models::{Annotation, AnnotationId, CollectionId};
use std::collections::BTreeSet;
use std::ops::Range;

/// What the reviewer-facing UI should show
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewView {
    /// Collection selection screen
    Selection(SelectionView),
    /// Waiting for the annotation list
    Loading,
    /// Selected collections have nothing left to verify
    NoAnnotations,
    /// One annotation of the current frame
    Reviewing(FrameView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionView {
    pub selected_collections: BTreeSet<CollectionId>,
    pub tracking_first: bool,
    pub exclude_tracking: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub annotation: Annotation,
    /// Cursor into the annotation list
    pub index: usize,
    /// Length of the annotation list
    pub size: usize,
    /// Index range of the frame the cursor is in
    pub frame: Range<usize>,
    pub ignored: Vec<AnnotationId>,
    pub annotating: bool,
}

impl FrameView {
    /// 1-based position within the current frame
    pub fn position_in_frame(&self) -> usize {
        self.index - self.frame.start + 1
    }

    pub fn frame_len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_ignored(&self, annotation_id: AnnotationId) -> bool {
        self.ignored.contains(&annotation_id)
    }
}
