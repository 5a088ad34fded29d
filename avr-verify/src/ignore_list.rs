//! Per-frame ignore list
//!
//! Annotation ids the reviewer excluded from the current verification. Both
//! operations are idempotent. Scope is the current frame: the navigator
//! clears the list whenever the cursor crosses a frame boundary.

use crate::models::{Annotation, AnnotationId};
use serde::{Deserialize, Serialize};

/// Insertion-ordered set of annotation ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnoreList(Vec<AnnotationId>);

impl IgnoreList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add the annotation unless its id is already present
    ///
    /// Returns `true` if the list changed.
    pub fn populate(&mut self, annotation: &Annotation) -> bool {
        if self.contains(annotation.id) {
            return false;
        }
        self.0.push(annotation.id);
        true
    }

    /// Drop every entry with this id; absent ids are a no-op
    ///
    /// Returns `true` if the list changed.
    pub fn remove(&mut self, annotation_id: AnnotationId) -> bool {
        let before = self.0.len();
        self.0.retain(|id| *id != annotation_id);
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, annotation_id: AnnotationId) -> bool {
        self.0.contains(&annotation_id)
    }

    pub fn ids(&self) -> &[AnnotationId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<AnnotationId> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = AnnotationId>>(iter: I) -> Self {
        let mut list = IgnoreList::new();
        for id in iter {
            if !list.contains(id) {
                list.0.push(id);
            }
        }
        list
    }
}
