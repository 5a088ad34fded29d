//! Navigator session state (the persisted part)
//!
//! Mirrors the durable key/value store one field per key. The annotation list
//! itself is not persisted: it is re-fetched whenever a session (re)starts.

use crate::ignore_list::IgnoreList;
use crate::models::CollectionId;
use avr_common::ReviewPhase;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Persisted key names
pub mod keys {
    pub const SELECTION_MOUNTED: &str = "selectionMounted";
    pub const SELECTED_ANNOTATION_COLLECTIONS: &str = "selectedAnnotationCollections";
    pub const SELECTED_TRACKING_FIRST: &str = "selectedTrackingFirst";
    pub const EXCLUDE_TRACKING: &str = "excludeTracking";
    pub const IGNORED_ANNOTATIONS: &str = "ignoredAnnotations";
    pub const CUR_INDEX: &str = "curIndex";
    pub const TOTAL_ANNOTATIONS: &str = "totalAnnotations";
    pub const NO_ANNOTATIONS: &str = "noAnnotations";

    pub const ALL: [&str; 8] = [
        SELECTION_MOUNTED,
        SELECTED_ANNOTATION_COLLECTIONS,
        SELECTED_TRACKING_FIRST,
        EXCLUDE_TRACKING,
        IGNORED_ANNOTATIONS,
        CUR_INDEX,
        TOTAL_ANNOTATIONS,
        NO_ANNOTATIONS,
    ];
}

/// Durable session state
///
/// `Default` is the zero state: selection screen mounted, nothing selected,
/// cursor at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub selection_mounted: bool,
    pub selected_annotation_collections: BTreeSet<CollectionId>,
    pub selected_tracking_first: bool,
    pub exclude_tracking: bool,
    pub ignored_annotations: IgnoreList,
    #[serde(rename = "curIndex")]
    pub cur_index: usize,
    pub total_annotations: usize,
    pub no_annotations: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            selection_mounted: true,
            selected_annotation_collections: BTreeSet::new(),
            selected_tracking_first: false,
            exclude_tracking: false,
            ignored_annotations: IgnoreList::new(),
            cur_index: 0,
            total_annotations: 0,
            no_annotations: false,
        }
    }
}

impl SessionState {
    /// Phase implied by the persisted flags, before any annotations are loaded
    ///
    /// A session that was mid-review comes back as `Loading`: the annotation
    /// list must be re-fetched before it can be rendered.
    pub fn initial_phase(&self) -> ReviewPhase {
        if self.selection_mounted {
            ReviewPhase::Selecting
        } else if self.no_annotations {
            ReviewPhase::NoAnnotations
        } else {
            ReviewPhase::Loading
        }
    }
}
