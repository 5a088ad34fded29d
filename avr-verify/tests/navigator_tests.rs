//! Navigator state machine integration tests
//!
//! Drive the navigator through whole review sessions with a scripted prompt,
//! a fake gateway and an in-memory session store.

mod helpers;

use avr_common::config::SessionConfig;
use avr_common::{EventBus, ReviewEvent, ReviewPhase};
use avr_verify::db::open_session_store;
use avr_verify::frames::FPS;
use avr_verify::gateway::GatewayError;
use avr_verify::models::{AnnotationQuery, SessionState};
use avr_verify::prompt::{PromptResponse, Question};
use avr_verify::{
    AdvanceOutcome, MemorySessionStore, Navigator, NavigatorError, ResumeOutcome, ReviewView,
    ScriptedPrompt, StartOutcome,
};
use helpers::{annotation, one_per_frame, two_frame_set, FailingStore, FakeGateway};
use std::collections::BTreeSet;
use tempfile::TempDir;

struct Harness {
    store: MemorySessionStore,
    gateway: FakeGateway,
    prompt: ScriptedPrompt,
    events: EventBus,
}

impl Harness {
    fn new(gateway: FakeGateway) -> Self {
        Self::with_store(MemorySessionStore::new(), gateway)
    }

    fn with_store(store: MemorySessionStore, gateway: FakeGateway) -> Self {
        Self {
            store,
            gateway,
            prompt: ScriptedPrompt::default(),
            events: EventBus::default(),
        }
    }

    async fn open(&self) -> Navigator {
        Navigator::open(
            self.store.clone(),
            self.gateway.clone(),
            self.prompt.clone(),
            self.events.clone(),
        )
        .await
        .unwrap()
    }

    /// Open a navigator, select collection 4 and start reviewing
    async fn reviewing(&self) -> Navigator {
        let mut nav = self.open().await;
        nav.toggle_collection(4).await.unwrap();
        assert!(matches!(
            nav.start_review().await.unwrap(),
            StartOutcome::Reviewing { .. }
        ));
        nav
    }
}

/// Persisted state of a session that was mid-review when the process stopped
fn mid_review_state(index: usize, total: usize) -> SessionState {
    SessionState {
        selection_mounted: false,
        selected_annotation_collections: [4].into_iter().collect(),
        cur_index: index,
        total_annotations: total,
        ..SessionState::default()
    }
}

// ============================================================================
// Frame traversal
// ============================================================================

#[tokio::test]
async fn test_same_frame_advances_silently_then_prompts_at_boundary() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    h.prompt.push(PromptResponse::Confirm).await;
    let mut nav = h.reviewing().await;

    // 1.0s and 1.01s are both frame 30
    assert_eq!(nav.advance().await.unwrap(), AdvanceOutcome::Moved { index: 1 });
    assert!(h.prompt.asked().await.is_empty());
    assert!(h.gateway.commits().is_empty());

    let outcome = nav.advance().await.unwrap();
    assert!(matches!(
        outcome,
        AdvanceOutcome::FrameVerified {
            video_id: 1,
            index: 2,
            ..
        }
    ));

    assert_eq!(
        h.prompt.asked().await,
        vec![Question::FinishedWithFrame {
            index: 1,
            size: 3,
            video_id: 1,
            frame_number: 30,
        }]
    );

    // Commit carries the unrounded frame position of the current annotation
    let commits = h.gateway.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].video_id, 1);
    assert!((commits[0].frame_number - 1.01 * FPS).abs() < 1e-9);

    assert_eq!(nav.index(), 2);
    assert_eq!(h.store.snapshot().await.cur_index, 2);
}

#[tokio::test]
async fn test_confirm_on_last_annotation_finishes_without_commit() {
    let h = Harness::new(FakeGateway::with_annotations(one_per_frame(1)));
    h.prompt.push(PromptResponse::Confirm).await;
    let mut rx = h.events.subscribe();
    let mut nav = h.reviewing().await;

    assert_eq!(nav.advance().await.unwrap(), AdvanceOutcome::Finished);

    assert!(h.gateway.commits().is_empty());
    assert_eq!(nav.phase(), ReviewPhase::Selecting);
    assert!(nav.annotations().is_empty());
    assert_eq!(h.store.snapshot().await, SessionState::default());

    let mut finished = false;
    while let Ok(event) = rx.try_recv() {
        if let ReviewEvent::SessionFinished { total, .. } = event {
            assert_eq!(total, 1);
            finished = true;
        }
    }
    assert!(finished);
}

#[tokio::test]
async fn test_full_session_walkthrough() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    h.prompt.push(PromptResponse::Confirm).await;
    h.prompt.push(PromptResponse::Confirm).await;
    let mut nav = h.reviewing().await;

    assert_eq!(nav.advance().await.unwrap(), AdvanceOutcome::Moved { index: 1 });
    assert!(matches!(
        nav.advance().await.unwrap(),
        AdvanceOutcome::FrameVerified { index: 2, .. }
    ));
    assert_eq!(nav.advance().await.unwrap(), AdvanceOutcome::Finished);

    assert_eq!(h.gateway.commits().len(), 1);
    assert_eq!(h.store.snapshot().await, SessionState::default());
}

// ============================================================================
// Ignore list
// ============================================================================

#[tokio::test]
async fn test_ignore_list_cleared_after_confirmed_boundary() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    h.prompt.push(PromptResponse::Confirm).await;
    let mut nav = h.reviewing().await;

    nav.ignore_current().await.unwrap();
    nav.advance().await.unwrap();
    nav.ignore_current().await.unwrap();
    nav.ignore_current().await.unwrap();
    assert_eq!(nav.state().ignored_annotations.ids(), &[1, 2]);
    assert_eq!(h.store.snapshot().await.ignored_annotations.ids(), &[1, 2]);

    nav.advance().await.unwrap();

    assert!(nav.state().ignored_annotations.is_empty());
    assert!(h.store.snapshot().await.ignored_annotations.is_empty());
}

#[tokio::test]
async fn test_unignore_and_clear() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    let mut nav = h.reviewing().await;

    nav.ignore(&annotation(1, 1, 1.0)).await.unwrap();
    nav.ignore(&annotation(2, 1, 1.01)).await.unwrap();

    nav.unignore(1).await.unwrap();
    nav.unignore(99).await.unwrap();
    assert_eq!(nav.state().ignored_annotations.ids(), &[2]);

    nav.clear_ignored().await.unwrap();
    assert!(h.store.snapshot().await.ignored_annotations.is_empty());
}

#[tokio::test]
async fn test_ignore_outside_review_is_rejected() {
    let h = Harness::new(FakeGateway::new());
    let mut nav = h.open().await;

    let result = nav.ignore(&annotation(1, 1, 1.0)).await;
    assert!(matches!(result, Err(NavigatorError::InvalidState(_))));
}

// ============================================================================
// Prompt resolutions and failures
// ============================================================================

#[tokio::test]
async fn test_gateway_failure_leaves_state_unchanged() {
    let h = Harness::new(FakeGateway::with_annotations(one_per_frame(2)));
    h.prompt.push(PromptResponse::Confirm).await;
    h.prompt.push(PromptResponse::Confirm).await;
    h.gateway
        .fail_next_commit(GatewayError::Network("connection reset".to_string()));
    let mut nav = h.reviewing().await;
    nav.ignore_current().await.unwrap();

    let before = nav.state().clone();
    let saves = h.store.save_count();

    let result = nav.advance().await;
    assert!(matches!(
        result,
        Err(NavigatorError::Network(GatewayError::Network(_)))
    ));
    assert_eq!(nav.state(), &before);
    assert_eq!(h.store.save_count(), saves);
    assert_eq!(nav.phase(), ReviewPhase::Reviewing { annotating: false });

    // Manual retry
    assert!(matches!(
        nav.advance().await.unwrap(),
        AdvanceOutcome::FrameVerified { index: 1, .. }
    ));
    assert_eq!(h.gateway.commits().len(), 1);
}

#[tokio::test]
async fn test_decline_switches_to_annotating() {
    let h = Harness::new(FakeGateway::with_annotations(one_per_frame(2)));
    h.prompt.push(PromptResponse::Decline).await;
    h.prompt.push(PromptResponse::Confirm).await;
    let mut nav = h.reviewing().await;
    let mut rx = h.events.subscribe();

    assert_eq!(nav.advance().await.unwrap(), AdvanceOutcome::Annotating);
    assert_eq!(nav.phase(), ReviewPhase::Reviewing { annotating: true });
    assert_eq!(nav.index(), 0);
    assert!(h.gateway.commits().is_empty());

    // Loading indicator precedes the phase change
    assert!(matches!(rx.try_recv(), Ok(ReviewEvent::Loading { .. })));
    assert!(matches!(
        rx.try_recv(),
        Ok(ReviewEvent::PhaseChanged {
            new_phase: ReviewPhase::Reviewing { annotating: true },
            ..
        })
    ));

    match nav.render().await.unwrap() {
        ReviewView::Reviewing(frame) => assert!(frame.annotating),
        other => panic!("unexpected view: {:?}", other),
    }

    assert!(matches!(
        nav.advance().await.unwrap(),
        AdvanceOutcome::FrameVerified { index: 1, .. }
    ));
    assert_eq!(nav.phase(), ReviewPhase::Reviewing { annotating: false });
}

#[tokio::test]
async fn test_dismissed_prompt_changes_nothing() {
    let h = Harness::new(FakeGateway::with_annotations(one_per_frame(2)));
    let mut nav = h.reviewing().await;
    let mut rx = h.events.subscribe();
    let before = nav.state().clone();
    let saves = h.store.save_count();

    assert_eq!(nav.advance().await.unwrap(), AdvanceOutcome::Dismissed);

    assert_eq!(nav.state(), &before);
    assert_eq!(h.store.save_count(), saves);
    assert_eq!(nav.phase(), ReviewPhase::Reviewing { annotating: false });
    assert!(rx.try_recv().is_err());
}

// ============================================================================
// Start, stale results, empty results
// ============================================================================

#[tokio::test]
async fn test_start_forwards_selection_to_gateway() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    let mut nav = h.open().await;

    nav.set_tracking_first(true).await.unwrap();
    nav.set_exclude_tracking(true).await.unwrap();
    nav.toggle_collection(9).await.unwrap();
    nav.toggle_collection(3).await.unwrap();

    assert_eq!(
        nav.start_review().await.unwrap(),
        StartOutcome::Reviewing { total: 3 }
    );
    assert_eq!(
        h.gateway.queries(),
        vec![AnnotationQuery {
            collections: vec![3, 9],
            exclude_tracking: true,
            tracking_first: true,
        }]
    );

    let persisted = h.store.snapshot().await;
    assert!(!persisted.selection_mounted);
    assert!(!persisted.no_annotations);
    assert_eq!(persisted.total_annotations, 3);
    assert_eq!(persisted.cur_index, 0);
}

#[tokio::test]
async fn test_toggle_twice_deselects() {
    let h = Harness::new(FakeGateway::new());
    let mut nav = h.open().await;

    nav.toggle_collection(5).await.unwrap();
    nav.toggle_collection(5).await.unwrap();

    assert!(nav.state().selected_annotation_collections.is_empty());
}

#[tokio::test]
async fn test_selection_editing_rejected_while_reviewing() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    let mut nav = h.reviewing().await;

    let result = nav.toggle_collection(8).await;
    assert!(matches!(result, Err(NavigatorError::InvalidState(_))));
    assert_eq!(
        nav.state().selected_annotation_collections,
        BTreeSet::from([4])
    );
}

#[tokio::test]
async fn test_empty_result_then_reset_clears_collections() {
    let h = Harness::new(FakeGateway::with_annotations(Vec::new()));
    let mut nav = h.open().await;
    nav.toggle_collection(4).await.unwrap();

    assert_eq!(
        nav.start_review().await.unwrap(),
        StartOutcome::NoAnnotations
    );
    assert_eq!(nav.phase(), ReviewPhase::NoAnnotations);
    assert_eq!(nav.render().await.unwrap(), ReviewView::NoAnnotations);

    let persisted = h.store.snapshot().await;
    assert!(persisted.no_annotations);
    assert!(!persisted.selection_mounted);

    nav.return_to_selection().await.unwrap();

    assert_eq!(nav.phase(), ReviewPhase::Selecting);
    assert!(h
        .store
        .snapshot()
        .await
        .selected_annotation_collections
        .is_empty());
    match nav.render().await.unwrap() {
        ReviewView::Selection(selection) => assert!(selection.selected_collections.is_empty()),
        other => panic!("unexpected view: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_selection_skips_fetch() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    let mut nav = h.open().await;

    assert_eq!(
        nav.start_review().await.unwrap(),
        StartOutcome::NoAnnotations
    );
    assert!(h.gateway.queries().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_returns_to_selection() {
    let gateway = FakeGateway::new();
    gateway.push_annotations(Err(GatewayError::Api(500, "boom".to_string())));
    let h = Harness::new(gateway);
    let mut nav = h.open().await;
    nav.toggle_collection(4).await.unwrap();

    let result = nav.start_review().await;

    assert!(matches!(
        result,
        Err(NavigatorError::Network(GatewayError::Api(500, _)))
    ));
    assert_eq!(nav.phase(), ReviewPhase::Selecting);
    assert!(h.store.snapshot().await.selection_mounted);
}

#[tokio::test]
async fn test_stale_fetch_result_is_discarded() {
    let h = Harness::new(FakeGateway::new());
    let mut nav = h.open().await;
    let mut rx = h.events.subscribe();

    nav.toggle_collection(4).await.unwrap();
    let first = nav.begin_review().unwrap();

    // Reviewer goes back and changes the selection before the fetch resolves
    nav.return_to_selection().await.unwrap();
    nav.toggle_collection(5).await.unwrap();
    let second = nav.begin_review().unwrap();

    assert_eq!(
        nav.apply_review(first, Ok(two_frame_set())).await.unwrap(),
        StartOutcome::Stale
    );
    assert_eq!(nav.phase(), ReviewPhase::Loading);
    assert_eq!(h.store.snapshot().await.total_annotations, 0);

    assert_eq!(
        nav.apply_review(second, Ok(one_per_frame(2))).await.unwrap(),
        StartOutcome::Reviewing { total: 2 }
    );

    let mut discarded = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, ReviewEvent::StaleResultDiscarded { .. }) {
            discarded += 1;
        }
    }
    assert_eq!(discarded, 1);
}

#[tokio::test]
async fn test_result_after_leaving_loading_is_discarded() {
    let h = Harness::new(FakeGateway::new());
    let mut nav = h.open().await;
    nav.toggle_collection(4).await.unwrap();

    let ticket = nav.begin_review().unwrap();
    nav.return_to_selection().await.unwrap();

    assert_eq!(
        nav.apply_review(ticket, Ok(two_frame_set())).await.unwrap(),
        StartOutcome::Stale
    );
    assert_eq!(nav.phase(), ReviewPhase::Selecting);
    assert!(nav.annotations().is_empty());
}

// ============================================================================
// Resume and reconciliation
// ============================================================================

#[tokio::test]
async fn test_resume_reconciles_shrunken_set() {
    let store = MemorySessionStore::with_state(mid_review_state(5, 10));
    let h = Harness::with_store(store, FakeGateway::with_annotations(one_per_frame(8)));
    let mut rx = h.events.subscribe();
    let mut nav = h.open().await;
    assert_eq!(nav.phase(), ReviewPhase::Loading);

    assert_eq!(
        nav.resume().await.unwrap(),
        ResumeOutcome::Reviewing {
            index: 3,
            total: 8,
            reconciled_from: Some(5),
        }
    );

    let persisted = h.store.snapshot().await;
    assert_eq!(persisted.cur_index, 3);
    assert_eq!(persisted.total_annotations, 8);
    assert_eq!(h.gateway.queries()[0].collections, vec![4]);

    let mut reconciled = false;
    while let Ok(event) = rx.try_recv() {
        if let ReviewEvent::IndexReconciled {
            previous_index,
            new_index,
            ..
        } = event
        {
            assert_eq!((previous_index, new_index), (5, 3));
            reconciled = true;
        }
    }
    assert!(reconciled);
}

#[tokio::test]
async fn test_resume_unchanged_set_keeps_index() {
    let store = MemorySessionStore::with_state(mid_review_state(2, 4));
    let h = Harness::with_store(store, FakeGateway::with_annotations(one_per_frame(4)));
    let mut nav = h.open().await;

    assert_eq!(
        nav.resume().await.unwrap(),
        ResumeOutcome::Reviewing {
            index: 2,
            total: 4,
            reconciled_from: None,
        }
    );
    assert_eq!(nav.current_annotation().map(|a| a.id), Some(3));
}

#[tokio::test]
async fn test_resume_network_failure_stays_loading() {
    let gateway = FakeGateway::new();
    gateway.push_annotations(Err(GatewayError::Network("timeout".to_string())));
    gateway.push_annotations(Ok(one_per_frame(4)));
    let store = MemorySessionStore::with_state(mid_review_state(1, 4));
    let h = Harness::with_store(store, gateway);
    let mut nav = h.open().await;

    assert!(matches!(
        nav.resume().await,
        Err(NavigatorError::Network(_))
    ));
    assert_eq!(nav.phase(), ReviewPhase::Loading);
    assert_eq!(nav.render().await.unwrap(), ReviewView::Loading);

    assert!(matches!(
        nav.resume().await.unwrap(),
        ResumeOutcome::Reviewing { index: 1, .. }
    ));
}

#[tokio::test]
async fn test_resume_when_selecting_is_idle() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    let mut nav = h.open().await;

    assert_eq!(nav.resume().await.unwrap(), ResumeOutcome::Idle);
    assert!(h.gateway.queries().is_empty());
}

#[tokio::test]
async fn test_render_past_end_resets_to_zero_state() {
    let mut state = mid_review_state(3, 3);
    state.ignored_annotations = [1].into_iter().collect();
    state.selected_tracking_first = true;
    let store = MemorySessionStore::with_state(state);
    let h = Harness::with_store(store, FakeGateway::with_annotations(one_per_frame(3)));
    let mut nav = h.open().await;
    nav.resume().await.unwrap();

    let view = nav.render().await.unwrap();

    assert!(matches!(view, ReviewView::Selection(_)));
    assert_eq!(nav.phase(), ReviewPhase::Selecting);
    assert!(nav.annotations().is_empty());
    assert_eq!(h.store.snapshot().await, SessionState::default());
}

#[tokio::test]
async fn test_advance_past_end_recovers() {
    let store = MemorySessionStore::with_state(mid_review_state(5, 5));
    let h = Harness::with_store(store, FakeGateway::with_annotations(one_per_frame(5)));
    let mut nav = h.open().await;
    nav.resume().await.unwrap();

    assert_eq!(nav.advance().await.unwrap(), AdvanceOutcome::Recovered);
    assert_eq!(h.store.snapshot().await, SessionState::default());
    assert!(h.prompt.asked().await.is_empty());
}

// ============================================================================
// Leaving a session and persistence
// ============================================================================

#[tokio::test]
async fn test_abandon_keeps_collections_and_ignore_list() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    let mut nav = h.open().await;
    nav.set_tracking_first(true).await.unwrap();
    nav.toggle_collection(4).await.unwrap();
    nav.start_review().await.unwrap();
    nav.ignore_current().await.unwrap();
    nav.advance().await.unwrap();

    nav.return_to_selection().await.unwrap();

    let persisted = h.store.snapshot().await;
    assert_eq!(nav.phase(), ReviewPhase::Selecting);
    assert!(persisted.selection_mounted);
    assert_eq!(persisted.cur_index, 0);
    assert!(!persisted.selected_tracking_first);
    assert_eq!(persisted.selected_annotation_collections, BTreeSet::from([4]));
    assert_eq!(persisted.ignored_annotations.ids(), &[1]);
}

#[tokio::test]
async fn test_every_mutation_is_persisted() {
    let h = Harness::new(FakeGateway::with_annotations(two_frame_set()));
    let mut nav = h.open().await;
    assert_eq!(h.store.save_count(), 0);

    nav.toggle_collection(4).await.unwrap();
    assert_eq!(h.store.save_count(), 1);
    nav.set_exclude_tracking(true).await.unwrap();
    assert_eq!(h.store.save_count(), 2);
    nav.start_review().await.unwrap();
    assert_eq!(h.store.save_count(), 3);
    nav.ignore_current().await.unwrap();
    assert_eq!(h.store.save_count(), 4);
    nav.advance().await.unwrap();
    assert_eq!(h.store.save_count(), 5);

    assert_eq!(&h.store.snapshot().await, nav.state());
}

#[tokio::test]
async fn test_session_survives_restart_with_sqlite_store() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("avr.db");
    let gateway = FakeGateway::with_annotations(two_frame_set());

    {
        let store = open_session_store(&db_path, &SessionConfig::default())
            .await
            .unwrap();
        let mut nav = Navigator::open(
            store,
            gateway.clone(),
            ScriptedPrompt::default(),
            EventBus::default(),
        )
        .await
        .unwrap();
        nav.toggle_collection(4).await.unwrap();
        nav.start_review().await.unwrap();
        nav.advance().await.unwrap();
        assert_eq!(nav.index(), 1);
    }

    let store = open_session_store(&db_path, &SessionConfig::default())
        .await
        .unwrap();
    let mut nav = Navigator::open(
        store,
        gateway,
        ScriptedPrompt::default(),
        EventBus::default(),
    )
    .await
    .unwrap();

    assert_eq!(nav.phase(), ReviewPhase::Loading);
    assert_eq!(
        nav.resume().await.unwrap(),
        ResumeOutcome::Reviewing {
            index: 1,
            total: 3,
            reconciled_from: None,
        }
    );
}

// ============================================================================
// Persistence failures
// ============================================================================

async fn open_with_failing_store(
    store: &FailingStore,
    gateway: &FakeGateway,
    prompt: &ScriptedPrompt,
) -> Navigator {
    Navigator::open(
        store.clone(),
        gateway.clone(),
        prompt.clone(),
        EventBus::default(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_failed_save_on_finish_keeps_session_reviewing() {
    let store = FailingStore::new(MemorySessionStore::new());
    let gateway = FakeGateway::with_annotations(one_per_frame(1));
    let prompt = ScriptedPrompt::new([PromptResponse::Confirm, PromptResponse::Confirm]);
    let mut nav = open_with_failing_store(&store, &gateway, &prompt).await;
    nav.toggle_collection(4).await.unwrap();
    nav.start_review().await.unwrap();

    store.set_failing(true);
    assert!(matches!(
        nav.advance().await,
        Err(NavigatorError::Store(_))
    ));

    assert_eq!(nav.phase(), ReviewPhase::Reviewing { annotating: false });
    assert_eq!(nav.annotations().len(), 1);
    assert!(!store.inner().snapshot().await.selection_mounted);
    assert!(matches!(nav.render().await.unwrap(), ReviewView::Reviewing(_)));

    // Storage back: the same confirm now finishes cleanly
    store.set_failing(false);
    assert_eq!(nav.advance().await.unwrap(), AdvanceOutcome::Finished);
    assert_eq!(nav.phase(), ReviewPhase::Selecting);
    assert!(nav.annotations().is_empty());
    assert_eq!(store.inner().snapshot().await, SessionState::default());

    nav.toggle_collection(5).await.unwrap();
}

#[tokio::test]
async fn test_failed_save_in_render_guard_can_be_retried() {
    let store = FailingStore::new(MemorySessionStore::with_state(mid_review_state(3, 3)));
    let gateway = FakeGateway::with_annotations(one_per_frame(3));
    let mut nav = open_with_failing_store(&store, &gateway, &ScriptedPrompt::default()).await;
    nav.resume().await.unwrap();

    store.set_failing(true);
    assert!(matches!(nav.render().await, Err(NavigatorError::Store(_))));
    assert!(nav.phase().is_reviewing());
    assert_eq!(store.inner().snapshot().await.cur_index, 3);

    store.set_failing(false);
    assert!(matches!(nav.render().await.unwrap(), ReviewView::Selection(_)));
    assert_eq!(nav.phase(), ReviewPhase::Selecting);
    assert_eq!(store.inner().snapshot().await, SessionState::default());
}

#[tokio::test]
async fn test_failed_save_leaves_memory_unchanged() {
    let store = FailingStore::new(MemorySessionStore::new());
    let gateway = FakeGateway::with_annotations(two_frame_set());
    let mut nav = open_with_failing_store(&store, &gateway, &ScriptedPrompt::default()).await;
    nav.toggle_collection(4).await.unwrap();
    nav.start_review().await.unwrap();

    store.set_failing(true);
    let before = nav.state().clone();

    assert!(matches!(nav.advance().await, Err(NavigatorError::Store(_))));
    assert!(matches!(nav.ignore_current().await, Err(NavigatorError::Store(_))));
    assert!(matches!(
        nav.return_to_selection().await,
        Err(NavigatorError::Store(_))
    ));

    assert_eq!(nav.state(), &before);
    assert_eq!(nav.index(), 0);
    assert!(nav.phase().is_reviewing());
}
