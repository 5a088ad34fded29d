//! Scripted VerificationGateway
//!
//! Annotation fetches pop queued responses; once the queue is down to one
//! entry that entry keeps being returned. Commits succeed unless a failure
//! has been queued. Clones share the same script and call log.

use async_trait::async_trait;
use avr_verify::gateway::{GatewayError, VerificationGateway};
use avr_verify::models::{
    Annotation, AnnotationCollection, AnnotationQuery, FrameCommit, VideoCollection,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type AnnotationResponse = Result<Vec<Annotation>, GatewayError>;

#[derive(Default)]
struct Script {
    collections: Vec<AnnotationCollection>,
    annotation_responses: VecDeque<AnnotationResponse>,
    commit_failures: VecDeque<GatewayError>,
    queries: Vec<AnnotationQuery>,
    commits: Vec<FrameCommit>,
}

#[derive(Clone, Default)]
pub struct FakeGateway {
    script: Arc<Mutex<Script>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway whose annotation fetches always return `annotations`
    pub fn with_annotations(annotations: Vec<Annotation>) -> Self {
        let gateway = Self::new();
        gateway.push_annotations(Ok(annotations));
        gateway
    }

    pub fn push_annotations(&self, response: AnnotationResponse) {
        self.script
            .lock()
            .unwrap()
            .annotation_responses
            .push_back(response);
    }

    pub fn fail_next_commit(&self, error: GatewayError) {
        self.script.lock().unwrap().commit_failures.push_back(error);
    }

    pub fn set_collections(&self, collections: Vec<AnnotationCollection>) {
        self.script.lock().unwrap().collections = collections;
    }

    pub fn queries(&self) -> Vec<AnnotationQuery> {
        self.script.lock().unwrap().queries.clone()
    }

    pub fn commits(&self) -> Vec<FrameCommit> {
        self.script.lock().unwrap().commits.clone()
    }
}

#[async_trait]
impl VerificationGateway for FakeGateway {
    async fn list_collections(&self) -> Result<Vec<AnnotationCollection>, GatewayError> {
        Ok(self.script.lock().unwrap().collections.clone())
    }

    async fn list_video_collections(&self) -> Result<Vec<VideoCollection>, GatewayError> {
        Ok(Vec::new())
    }

    async fn list_annotations(&self, query: &AnnotationQuery) -> AnnotationResponse {
        let mut script = self.script.lock().unwrap();
        script.queries.push(query.clone());

        if script.annotation_responses.len() > 1 {
            script
                .annotation_responses
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        } else {
            script
                .annotation_responses
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    async fn commit_frame_verified(&self, commit: &FrameCommit) -> Result<(), GatewayError> {
        let mut script = self.script.lock().unwrap();
        if let Some(error) = script.commit_failures.pop_front() {
            return Err(error);
        }
        script.commits.push(*commit);
        Ok(())
    }
}
