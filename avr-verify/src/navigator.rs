//! Annotation Review Navigator
//!
//! Stateful traversal of a server-supplied annotation list, one frame at a
//! time:
//!
//! ```text
//! Selecting → Loading → { NoAnnotations | Reviewing } → Finished → Selecting
//! ```
//!
//! Every state change is written through the `SessionStore` before it becomes
//! visible in memory, so a reload resumes exactly where the reviewer stopped.
//! Gateway failures leave the navigator where it was; retry is manual.

use crate::error::{NavigatorError, Result};
use crate::frames::{frame_number, frame_position, frame_range, is_last_in_frame};
use crate::gateway::{GatewayError, VerificationGateway};
use crate::models::{
    Annotation, AnnotationCollection, AnnotationId, AnnotationQuery, CollectionId, FrameCommit,
    SessionState, VideoCollection, VideoId,
};
use crate::prompt::{PromptResponse, Question, ReviewPrompt};
use crate::session_store::SessionStore;
use crate::view::{FrameView, ReviewView, SelectionView};
use avr_common::{EventBus, ReviewEvent, ReviewPhase};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pending annotation fetch issued by `begin_review`
///
/// Applying it after the selection changed discards the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub query: AnnotationQuery,
}

/// Result of starting a review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Reviewing { total: usize },
    NoAnnotations,
    /// Selection changed while the fetch was in flight; result dropped
    Stale,
}

/// Result of resuming a persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// Nothing to resume (selection screen or empty-result screen)
    Idle,
    NoAnnotations,
    Reviewing {
        index: usize,
        total: usize,
        /// Persisted index before reconciliation, if it moved
        reconciled_from: Option<usize>,
    },
}

/// Result of an advance request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdvanceOutcome {
    /// Moved within the same frame; no prompt, no commit
    Moved { index: usize },
    /// Frame committed and cursor moved to the next frame
    FrameVerified {
        video_id: VideoId,
        frame_number: f64,
        index: usize,
    },
    /// Reviewer chose to add annotations; cursor unchanged
    Annotating,
    /// Prompt dismissed; nothing changed
    Dismissed,
    /// End of list confirmed; session reset to the selection screen
    Finished,
    /// Cursor was already past the end; session reset to the selection screen
    Recovered,
}

/// Shift the cursor by however much the list shrank (or grew) between loads
///
/// Assumes removed records were ahead of the cursor. Clamped at 0.
pub fn reconcile_index(index: usize, previous_total: usize, new_total: usize) -> usize {
    let shift = previous_total as i64 - new_total as i64;
    (index as i64 - shift).max(0) as usize
}

/// The review state machine
pub struct Navigator {
    store: Arc<dyn SessionStore>,
    gateway: Arc<dyn VerificationGateway>,
    prompt: Arc<dyn ReviewPrompt>,
    events: EventBus,
    state: SessionState,
    phase: ReviewPhase,
    annotations: Vec<Annotation>,
}

impl Navigator {
    /// Load persisted state and derive the starting phase
    ///
    /// A session that was mid-review starts in `Loading`; call `resume` to
    /// re-fetch its annotations.
    pub async fn open(
        store: impl SessionStore + 'static,
        gateway: impl VerificationGateway + 'static,
        prompt: impl ReviewPrompt + 'static,
        events: EventBus,
    ) -> Result<Self> {
        let state = store.load().await?;
        let phase = state.initial_phase();

        info!(
            phase = %phase,
            index = state.cur_index,
            total = state.total_annotations,
            "Review session loaded"
        );

        Ok(Self {
            store: Arc::new(store),
            gateway: Arc::new(gateway),
            prompt: Arc::new(prompt),
            events,
            state,
            phase,
            annotations: Vec::new(),
        })
    }

    pub fn phase(&self) -> ReviewPhase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn index(&self) -> usize {
        self.state.cur_index
    }

    pub fn current_annotation(&self) -> Option<&Annotation> {
        self.annotations.get(self.state.cur_index)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ------------------------------------------------------------------
    // Selection screen
    // ------------------------------------------------------------------

    pub async fn list_collections(&self) -> Result<Vec<AnnotationCollection>> {
        self.gateway.list_collections().await.map_err(|e| {
            warn!(error = %e, "Failed to list annotation collections");
            NavigatorError::Network(e)
        })
    }

    pub async fn list_video_collections(&self) -> Result<Vec<VideoCollection>> {
        self.gateway.list_video_collections().await.map_err(|e| {
            warn!(error = %e, "Failed to list video collections");
            NavigatorError::Network(e)
        })
    }

    /// Add the collection to the selection, or remove it if already selected
    pub async fn toggle_collection(&mut self, collection_id: CollectionId) -> Result<()> {
        self.require_selecting("toggle collection")?;

        let mut next = self.state.clone();
        if !next.selected_annotation_collections.remove(&collection_id) {
            next.selected_annotation_collections.insert(collection_id);
        }
        self.commit(next).await
    }

    pub async fn set_tracking_first(&mut self, enabled: bool) -> Result<()> {
        self.require_selecting("change review order")?;

        let mut next = self.state.clone();
        next.selected_tracking_first = enabled;
        self.commit(next).await
    }

    pub async fn set_exclude_tracking(&mut self, enabled: bool) -> Result<()> {
        self.require_selecting("change tracking filter")?;

        let mut next = self.state.clone();
        next.exclude_tracking = enabled;
        self.commit(next).await
    }

    // ------------------------------------------------------------------
    // Starting and resuming
    // ------------------------------------------------------------------

    /// Fetch the selected collections and enter `Reviewing` or `NoAnnotations`
    pub async fn start_review(&mut self) -> Result<StartOutcome> {
        let ticket = self.begin_review()?;
        let result = self.fetch(&ticket.query).await;
        self.apply_review(ticket, result).await
    }

    /// First half of `start_review`: enter `Loading` and describe the fetch
    pub fn begin_review(&mut self) -> Result<FetchTicket> {
        self.require_selecting("start review")?;

        let query = self.current_query();
        debug!(collections = ?query.collections, "Starting review");
        self.set_phase(ReviewPhase::Loading);

        Ok(FetchTicket { query })
    }

    /// Second half of `start_review`: apply a fetch result
    ///
    /// Results for a selection that has since changed, or that arrive when
    /// the navigator is no longer loading, are discarded.
    pub async fn apply_review(
        &mut self,
        ticket: FetchTicket,
        result: std::result::Result<Vec<Annotation>, GatewayError>,
    ) -> Result<StartOutcome> {
        if self.phase != ReviewPhase::Loading || ticket.query != self.current_query() {
            debug!(collections = ?ticket.query.collections, "Discarding stale annotation fetch");
            self.events.emit_lossy(ReviewEvent::StaleResultDiscarded {
                timestamp: Utc::now(),
            });
            return Ok(StartOutcome::Stale);
        }

        let annotations = match result {
            Ok(annotations) => annotations,
            Err(e) => {
                warn!(error = %e, "Failed to fetch annotations");
                self.set_phase(ReviewPhase::Selecting);
                return Err(NavigatorError::Network(e));
            }
        };

        let mut next = self.state.clone();
        next.selection_mounted = false;

        if annotations.is_empty() {
            next.no_annotations = true;
            if let Err(e) = self.commit(next).await {
                self.set_phase(ReviewPhase::Selecting);
                return Err(e);
            }
            info!(collections = ?ticket.query.collections, "No annotations to verify");
            self.annotations.clear();
            self.set_phase(ReviewPhase::NoAnnotations);
            return Ok(StartOutcome::NoAnnotations);
        }

        let total = annotations.len();
        next.no_annotations = false;
        next.total_annotations = total;
        if let Err(e) = self.commit(next).await {
            self.set_phase(ReviewPhase::Selecting);
            return Err(e);
        }

        info!(total, index = self.state.cur_index, "Review started");
        self.annotations = annotations;
        self.set_phase(ReviewPhase::Reviewing { annotating: false });

        Ok(StartOutcome::Reviewing { total })
    }

    /// Re-fetch annotations for a persisted mid-review session
    ///
    /// If the list changed size since it was persisted, the cursor is shifted
    /// by the difference (see `reconcile_index`). On a gateway failure the
    /// navigator stays in `Loading` and `resume` may be called again.
    pub async fn resume(&mut self) -> Result<ResumeOutcome> {
        if self.phase != ReviewPhase::Loading {
            return Ok(ResumeOutcome::Idle);
        }

        let query = self.current_query();
        let annotations = self.fetch(&query).await.map_err(|e| {
            warn!(error = %e, "Failed to re-fetch annotations for persisted session");
            NavigatorError::Network(e)
        })?;

        let mut next = self.state.clone();

        if annotations.is_empty() {
            next.no_annotations = true;
            next.total_annotations = 0;
            self.commit(next).await?;
            self.annotations.clear();
            self.set_phase(ReviewPhase::NoAnnotations);
            return Ok(ResumeOutcome::NoAnnotations);
        }

        let previous_index = self.state.cur_index;
        let previous_total = self.state.total_annotations;
        let total = annotations.len();

        if previous_total != 0 && previous_total != total {
            next.cur_index = reconcile_index(previous_index, previous_total, total);
        }
        next.total_annotations = total;
        self.commit(next).await?;

        let reconciled_from = if self.state.cur_index != previous_index {
            info!(
                previous_index,
                index = self.state.cur_index,
                previous_total,
                total,
                "Annotation set changed since last load, cursor reconciled"
            );
            self.events.emit_lossy(ReviewEvent::IndexReconciled {
                previous_index,
                new_index: self.state.cur_index,
                previous_total,
                new_total: total,
                timestamp: Utc::now(),
            });
            Some(previous_index)
        } else {
            None
        };

        self.annotations = annotations;
        self.set_phase(ReviewPhase::Reviewing { annotating: false });

        Ok(ResumeOutcome::Reviewing {
            index: self.state.cur_index,
            total,
            reconciled_from,
        })
    }

    // ------------------------------------------------------------------
    // Reviewing
    // ------------------------------------------------------------------

    /// Snapshot for the UI
    ///
    /// If the cursor is past the end of a non-empty list the session is reset
    /// to the selection screen instead.
    pub async fn render(&mut self) -> Result<ReviewView> {
        if self.phase.is_reviewing() && self.cursor_past_end() {
            self.recover_past_end().await?;
        }

        Ok(match self.phase {
            ReviewPhase::Selecting | ReviewPhase::Finished => ReviewView::Selection(SelectionView {
                selected_collections: self.state.selected_annotation_collections.clone(),
                tracking_first: self.state.selected_tracking_first,
                exclude_tracking: self.state.exclude_tracking,
            }),
            ReviewPhase::Loading => ReviewView::Loading,
            ReviewPhase::NoAnnotations => ReviewView::NoAnnotations,
            ReviewPhase::Reviewing { annotating } => match self.current_annotation() {
                Some(annotation) => ReviewView::Reviewing(FrameView {
                    annotation: annotation.clone(),
                    index: self.state.cur_index,
                    size: self.annotations.len(),
                    frame: frame_range(&self.annotations, self.state.cur_index),
                    ignored: self.state.ignored_annotations.ids().to_vec(),
                    annotating,
                }),
                None => ReviewView::Loading,
            },
        })
    }

    /// Move to the next annotation
    ///
    /// Within a frame the cursor moves silently. At a frame boundary the
    /// reviewer is asked whether the frame is done: confirming commits the
    /// frame and moves on, declining switches to annotating.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome> {
        let ReviewPhase::Reviewing { .. } = self.phase else {
            return Err(NavigatorError::InvalidState(format!(
                "cannot advance while {}",
                self.phase
            )));
        };

        if self.cursor_past_end() {
            self.recover_past_end().await?;
            return Ok(AdvanceOutcome::Recovered);
        }

        let index = self.state.cur_index;
        let size = self.annotations.len();

        if !is_last_in_frame(&self.annotations, index) {
            let mut next = self.state.clone();
            next.cur_index = index + 1;
            self.commit(next).await?;
            debug!(index = index + 1, "Advanced within frame");
            return Ok(AdvanceOutcome::Moved { index: index + 1 });
        }

        let current = self.annotations[index].clone();
        let question = Question::FinishedWithFrame {
            index,
            size,
            video_id: current.video_id,
            frame_number: frame_number(current.time_in_video),
        };

        match self.prompt.ask(question).await {
            PromptResponse::Dismissed => {
                debug!(index, "Frame prompt dismissed");
                Ok(AdvanceOutcome::Dismissed)
            }
            PromptResponse::Decline => {
                self.emit_loading();
                self.set_phase(ReviewPhase::Reviewing { annotating: true });
                Ok(AdvanceOutcome::Annotating)
            }
            PromptResponse::Confirm => {
                self.emit_loading();
                if index + 1 == size {
                    self.finish().await?;
                    return Ok(AdvanceOutcome::Finished);
                }
                self.verify_and_advance(&current).await
            }
        }
    }

    async fn verify_and_advance(&mut self, current: &Annotation) -> Result<AdvanceOutcome> {
        let commit = FrameCommit {
            video_id: current.video_id,
            frame_number: frame_position(current.time_in_video),
        };

        if let Err(e) = self.gateway.commit_frame_verified(&commit).await {
            warn!(
                video_id = commit.video_id,
                frame_number = commit.frame_number,
                error = %e,
                "Frame verification failed, not advancing"
            );
            return Err(NavigatorError::Network(e));
        }

        let mut next = self.state.clone();
        next.ignored_annotations.clear();
        next.cur_index += 1;
        self.commit(next).await?;

        info!(
            video_id = commit.video_id,
            frame_number = commit.frame_number,
            index = self.state.cur_index,
            "Frame verified"
        );
        self.events.emit_lossy(ReviewEvent::FrameVerified {
            video_id: commit.video_id,
            frame_number: commit.frame_number,
            timestamp: Utc::now(),
        });
        self.set_phase(ReviewPhase::Reviewing { annotating: false });

        Ok(AdvanceOutcome::FrameVerified {
            video_id: commit.video_id,
            frame_number: commit.frame_number,
            index: self.state.cur_index,
        })
    }

    /// Exclude an annotation from the current frame's verification
    pub async fn ignore(&mut self, annotation: &Annotation) -> Result<()> {
        self.require_reviewing("ignore annotation")?;

        let mut next = self.state.clone();
        next.ignored_annotations.populate(annotation);
        self.commit(next).await
    }

    /// Exclude the annotation under the cursor
    pub async fn ignore_current(&mut self) -> Result<()> {
        let annotation = self
            .current_annotation()
            .cloned()
            .ok_or_else(|| NavigatorError::InvalidState("no current annotation".to_string()))?;
        self.ignore(&annotation).await
    }

    pub async fn unignore(&mut self, annotation_id: AnnotationId) -> Result<()> {
        self.require_reviewing("unignore annotation")?;

        let mut next = self.state.clone();
        next.ignored_annotations.remove(annotation_id);
        self.commit(next).await
    }

    pub async fn clear_ignored(&mut self) -> Result<()> {
        let mut next = self.state.clone();
        next.ignored_annotations.clear();
        self.commit(next).await
    }

    // ------------------------------------------------------------------
    // Leaving a session
    // ------------------------------------------------------------------

    /// Reviewer-initiated return to the selection screen
    ///
    /// From `NoAnnotations` this clears the selection too. From an active
    /// session it abandons the session: cursor and toggles reset, but the
    /// selected collections and the ignore list are kept (use
    /// `clear_ignored` to drop them).
    pub async fn return_to_selection(&mut self) -> Result<()> {
        let mut next = self.state.clone();
        next.selection_mounted = true;
        next.no_annotations = false;
        next.cur_index = 0;
        next.selected_tracking_first = false;
        next.exclude_tracking = false;

        match self.phase {
            ReviewPhase::Selecting => return Ok(()),
            ReviewPhase::NoAnnotations => {
                next.selected_annotation_collections.clear();
            }
            ReviewPhase::Loading | ReviewPhase::Reviewing { .. } | ReviewPhase::Finished => {
                info!(index = self.state.cur_index, "Review session abandoned");
            }
        }

        self.commit(next).await?;
        self.annotations.clear();
        self.set_phase(ReviewPhase::Selecting);
        Ok(())
    }

    /// Full reset to the zero state (selection screen, nothing selected)
    pub async fn reset_session(&mut self) -> Result<()> {
        self.commit(SessionState::default()).await?;
        self.annotations.clear();
        self.set_phase(ReviewPhase::Selecting);
        debug!("Review session reset");
        Ok(())
    }

    /// End of list: persist the zero state, then pass through `Finished`
    ///
    /// If the save fails the navigator stays in `Reviewing` with the list
    /// loaded, so the reviewer can retry.
    async fn finish(&mut self) -> Result<()> {
        let total = self.annotations.len();
        self.commit(SessionState::default()).await?;

        self.set_phase(ReviewPhase::Finished);
        info!(total, "Finished verifying annotations");
        self.events.emit_lossy(ReviewEvent::SessionFinished {
            total,
            timestamp: Utc::now(),
        });

        self.annotations.clear();
        self.set_phase(ReviewPhase::Selecting);
        Ok(())
    }

    async fn recover_past_end(&mut self) -> Result<()> {
        warn!(
            index = self.state.cur_index,
            total = self.annotations.len(),
            "Cursor past end of annotation list, resetting session"
        );
        self.finish().await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Persist `next`, then make it current
    async fn commit(&mut self, next: SessionState) -> Result<()> {
        self.store.save(&next).await?;
        self.state = next;
        Ok(())
    }

    async fn fetch(&self, query: &AnnotationQuery) -> std::result::Result<Vec<Annotation>, GatewayError> {
        if query.collections.is_empty() {
            return Ok(Vec::new());
        }
        self.gateway.list_annotations(query).await
    }

    fn current_query(&self) -> AnnotationQuery {
        AnnotationQuery::new(
            &self.state.selected_annotation_collections,
            self.state.exclude_tracking,
            self.state.selected_tracking_first,
        )
    }

    fn cursor_past_end(&self) -> bool {
        !self.annotations.is_empty() && self.state.cur_index >= self.annotations.len()
    }

    fn set_phase(&mut self, new_phase: ReviewPhase) {
        if self.phase == new_phase {
            return;
        }
        let old_phase = self.phase;
        self.phase = new_phase;
        debug!(old = %old_phase, new = %new_phase, "Phase changed");
        self.events.emit_lossy(ReviewEvent::PhaseChanged {
            old_phase,
            new_phase,
            timestamp: Utc::now(),
        });
    }

    fn emit_loading(&self) {
        self.events.emit_lossy(ReviewEvent::Loading {
            timestamp: Utc::now(),
        });
    }

    fn require_selecting(&self, action: &str) -> Result<()> {
        if self.phase == ReviewPhase::Selecting {
            Ok(())
        } else {
            Err(NavigatorError::InvalidState(format!(
                "cannot {} while {}",
                action, self.phase
            )))
        }
    }

    fn require_reviewing(&self, action: &str) -> Result<()> {
        if self.phase.is_reviewing() {
            Ok(())
        } else {
            Err(NavigatorError::InvalidState(format!(
                "cannot {} while {}",
                action, self.phase
            )))
        }
    }
}
