//! Event types for the review event system
//!
//! Provides the navigator phase type, the ReviewEvent enum and the EventBus
//! used to fan events out to UI listeners and loggers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// Navigator phase
///
/// `Selecting → Loading → {NoAnnotations | Reviewing} → Finished → Selecting`.
/// `annotating` suspends the automatic frame-advance prompt without leaving
/// `Reviewing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ReviewPhase {
    /// Collection selection screen is active
    Selecting,
    /// Annotation list requested, not yet received
    Loading,
    /// Last fetch for the selected collections returned nothing
    NoAnnotations,
    /// Reviewer is paging through annotations
    Reviewing { annotating: bool },
    /// End of the annotation list reached; reset follows immediately
    Finished,
}

impl ReviewPhase {
    pub fn is_reviewing(&self) -> bool {
        matches!(self, ReviewPhase::Reviewing { .. })
    }
}

impl fmt::Display for ReviewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewPhase::Selecting => write!(f, "selecting"),
            ReviewPhase::Loading => write!(f, "loading"),
            ReviewPhase::NoAnnotations => write!(f, "no-annotations"),
            ReviewPhase::Reviewing { annotating: false } => write!(f, "reviewing"),
            ReviewPhase::Reviewing { annotating: true } => write!(f, "reviewing (annotating)"),
            ReviewPhase::Finished => write!(f, "finished"),
        }
    }
}

/// Review event types
///
/// Events are broadcast via EventBus and are serializable so a UI bridge can
/// forward them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReviewEvent {
    /// Navigator moved between phases
    PhaseChanged {
        old_phase: ReviewPhase,
        new_phase: ReviewPhase,
        timestamp: DateTime<Utc>,
    },

    /// A prompt was resolved and work is about to start (loading indicator)
    Loading { timestamp: DateTime<Utc> },

    /// Backend acknowledged a frame verification
    FrameVerified {
        video_id: i64,
        frame_number: f64,
        timestamp: DateTime<Utc>,
    },

    /// Cursor shifted because the annotation set changed size between loads
    IndexReconciled {
        previous_index: usize,
        new_index: usize,
        previous_total: usize,
        new_total: usize,
        timestamp: DateTime<Utc>,
    },

    /// Reviewer reached the end of the annotation list
    SessionFinished {
        total: usize,
        timestamp: DateTime<Utc>,
    },

    /// An annotation fetch resolved after the selection changed; result dropped
    StaleResultDiscarded { timestamp: DateTime<Utc> },
}

/// Broadcast channel for review events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ReviewEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ReviewEvent,
    ) -> Result<usize, broadcast::error::SendError<ReviewEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ReviewEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
