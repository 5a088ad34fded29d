//! Verification Gateway
//!
//! The boundary to the annotation backend. The navigator only sees the
//! `VerificationGateway` trait; `HttpGateway` is the production transport.

pub mod http;

pub use http::HttpGateway;

use crate::models::{Annotation, AnnotationCollection, AnnotationQuery, FrameCommit, VideoCollection};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Gateway errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// Transport failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be constructed from the given settings
    #[error("Gateway configuration error: {0}")]
    Config(String),
}

/// Backend operations the navigator depends on
#[async_trait]
pub trait VerificationGateway: Send + Sync {
    /// Annotation collections for the selection screen
    async fn list_collections(&self) -> Result<Vec<AnnotationCollection>, GatewayError>;

    /// Video collections for the selection screen
    async fn list_video_collections(&self) -> Result<Vec<VideoCollection>, GatewayError>;

    /// Unverified annotations in the selected collections
    ///
    /// Results must arrive ordered by `(video_id, time_in_video)`.
    async fn list_annotations(&self, query: &AnnotationQuery) -> Result<Vec<Annotation>, GatewayError>;

    /// Record that a frame has been verified
    ///
    /// Called at most once per confirm; never retried automatically.
    async fn commit_frame_verified(&self, commit: &FrameCommit) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G: VerificationGateway + ?Sized> VerificationGateway for Arc<G> {
    async fn list_collections(&self) -> Result<Vec<AnnotationCollection>, GatewayError> {
        (**self).list_collections().await
    }

    async fn list_video_collections(&self) -> Result<Vec<VideoCollection>, GatewayError> {
        (**self).list_video_collections().await
    }

    async fn list_annotations(&self, query: &AnnotationQuery) -> Result<Vec<Annotation>, GatewayError> {
        (**self).list_annotations(query).await
    }

    async fn commit_frame_verified(&self, commit: &FrameCommit) -> Result<(), GatewayError> {
        (**self).commit_frame_verified(commit).await
    }
}
