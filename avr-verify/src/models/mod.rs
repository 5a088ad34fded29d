//! Data model for annotation review

pub mod annotation;
pub mod session;

pub use annotation::{
    Annotation, AnnotationCollection, AnnotationId, AnnotationQuery, BoundingBox, CollectionId,
    ConceptId, FrameCommit, VideoCollection, VideoId,
};
pub use session::{keys, SessionState};
