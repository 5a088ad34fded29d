//! Test helpers for avr-verify integration tests
//!
//! - FakeGateway: scripted VerificationGateway that records every call
//! - FailingStore: SessionStore whose saves can be made to fail
//! - Annotation fixtures

#![allow(dead_code)]

pub mod failing_store;
pub mod fake_gateway;

pub use failing_store::FailingStore;
pub use fake_gateway::FakeGateway;

use avr_verify::models::Annotation;

/// Annotation at `time` seconds in `video`, id taken from the caller
pub fn annotation(id: i64, video: i64, time: f64) -> Annotation {
    Annotation::new(id, video, time, 1)
}

/// Three annotations in two frames: {0, 1} at frame 30 and {2} at frame 150
pub fn two_frame_set() -> Vec<Annotation> {
    vec![
        annotation(1, 1, 1.0),
        annotation(2, 1, 1.01),
        annotation(3, 1, 5.0),
    ]
}

/// `count` annotations, each in its own frame of video 1
pub fn one_per_frame(count: usize) -> Vec<Annotation> {
    (0..count)
        .map(|i| annotation(i as i64 + 1, 1, i as f64))
        .collect()
}
