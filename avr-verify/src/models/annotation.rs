//! Server-owned annotation records and the request/response shapes around them
//!
//! Records are immutable snapshots: the navigator reads them and never writes
//! them back. The server spells fields in camelCase; the lowercase column
//! names (`videoid`, `timeinvideo`, ...) are accepted as well.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type AnnotationId = i64;
pub type VideoId = i64;
pub type CollectionId = i64;
pub type ConceptId = i64;

/// Box corners in video pixel coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub x1: f64,
    #[serde(default)]
    pub y1: f64,
    #[serde(default)]
    pub x2: f64,
    #[serde(default)]
    pub y2: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// One annotation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,

    #[serde(alias = "videoid")]
    pub video_id: VideoId,

    /// Seconds from the start of the video
    #[serde(alias = "timeinvideo")]
    pub time_in_video: f64,

    #[serde(alias = "conceptid")]
    pub concept_id: ConceptId,

    #[serde(flatten)]
    pub bounding_box: BoundingBox,

    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default, alias = "videowidth")]
    pub video_width: Option<f64>,

    #[serde(default, alias = "videoheight")]
    pub video_height: Option<f64>,

    #[serde(default, alias = "userid")]
    pub user_id: Option<i64>,

    /// Fields this crate does not interpret, kept for the renderer
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Annotation {
    /// Minimal record; used by tests and fixtures
    pub fn new(id: AnnotationId, video_id: VideoId, time_in_video: f64, concept_id: ConceptId) -> Self {
        Self {
            id,
            video_id,
            time_in_video,
            concept_id,
            bounding_box: BoundingBox::default(),
            filename: None,
            video_width: None,
            video_height: None,
            user_id: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Annotation collection as listed on the selection screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationCollection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Video collection as listed on the selection screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCollection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Filter for `listAnnotations`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationQuery {
    pub collections: Vec<CollectionId>,
    pub exclude_tracking: bool,
    pub tracking_first: bool,
}

impl AnnotationQuery {
    pub fn new(collections: &BTreeSet<CollectionId>, exclude_tracking: bool, tracking_first: bool) -> Self {
        Self {
            collections: collections.iter().copied().collect(),
            exclude_tracking,
            tracking_first,
        }
    }
}

/// Body of `POST /annotations/verifyFrame`
///
/// `frame_number` is `timeInVideo * FPS`, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameCommit {
    pub video_id: VideoId,
    pub frame_number: f64,
}
