//! Integration tests for the state & history engine.
//!
//! Exercises cross-crate interactions between cutline-core,
//! cutline-timeline and cutline-session.

use std::cell::RefCell;
use std::rc::Rc;

use cutline_core::{Canvas, CanvasRatio, CutlineError};
use cutline_session::{EditorSession, PersistenceSink, SessionConfig};
use cutline_timeline::{
    EditorState, History, MediaItem, MediaKind, ProjectSnapshot, TimelineClip, ops,
};

// ── Helpers ────────────────────────────────────────────────────

fn canvas_size(ratio: CanvasRatio) -> (f32, f32) {
    let (w, h) = ratio.base_size();
    (w as f32, h as f32)
}

fn video_item(name: &str) -> MediaItem {
    let mut item = MediaItem::new(MediaKind::Video, format!("media/{name}.mp4"), name);
    item.attach_duration(30.0);
    item
}

fn state_with_media() -> (EditorState, uuid::Uuid) {
    let item = video_item("source");
    let id = item.id;
    let state = EditorState {
        clips: Vec::new(),
        media_items: vec![item],
        selected_clip_id: None,
    };
    (state, id)
}

#[derive(Default, Clone)]
struct RecordingSink {
    submissions: Rc<RefCell<Vec<ProjectSnapshot>>>,
}

impl PersistenceSink for RecordingSink {
    fn submit(&mut self, snapshot: ProjectSnapshot) {
        self.submissions.borrow_mut().push(snapshot);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cutline_session=debug")
        .with_test_writer()
        .try_init();
}

// ── History semantics ──────────────────────────────────────────

#[test]
fn add_then_undo_then_redo_scenario() {
    let (state, media_id) = state_with_media();
    let mut history = History::default();
    history.push(&state, "Initial state", 0.0);

    let canvas = Canvas::default();
    let outcome = ops::add_clip(&state, media_id, 0.0, 5.0, canvas.size()).unwrap();
    let state = outcome.state;
    history.push(&state, &outcome.description, 1.0);

    assert_eq!(history.len(), 2); // initial + add
    assert!(history.can_undo());

    let undone = history.undo().unwrap().to_state();
    assert_eq!(undone.clips.len(), 0);
    assert!(!history.can_undo());
    assert!(history.can_redo());

    let redone = history.redo().unwrap().to_state();
    assert_eq!(redone, state); // bit-for-bit identical to pre-undo
}

#[test]
fn capacity_eviction_is_fifo() {
    let (state, _) = state_with_media();
    let mut history = History::new(5);
    for i in 0..12 {
        history.push(&state, &format!("edit {i}"), i as f64);
    }
    assert_eq!(history.len(), 5);

    let mut oldest = None;
    while let Some(entry) = history.undo() {
        oldest = Some(entry.description);
    }
    assert_eq!(oldest.as_deref(), Some("edit 7"));
}

#[test]
fn push_after_undo_discards_redo_branch() {
    let (state, _) = state_with_media();
    let mut history = History::default();
    history.push(&state, "A", 0.0);
    history.push(&state, "B", 1.0);
    history.push(&state, "C", 2.0);

    history.undo();
    history.undo();
    history.push(&state, "D", 3.0);

    assert_eq!(history.len(), 2); // [A, D]
    assert!(!history.can_redo());
}

// ── Clip operations ────────────────────────────────────────────

#[test]
fn split_partitions_with_no_gap_or_overlap() {
    let (state, media_id) = state_with_media();
    let canvas = Canvas::default();
    let state = ops::add_clip(&state, media_id, 2.0, 12.0, canvas.size())
        .unwrap()
        .state;
    let id = state.clips[0].id;

    let split = ops::split_clip(&state, id, 7.0).unwrap().state;
    assert_eq!(split.clips.len(), 2);
    assert_eq!(split.clips[0].start, 2.0);
    assert_eq!(split.clips[0].end, 7.0);
    assert_eq!(split.clips[1].start, 7.0);
    assert_eq!(split.clips[1].end, 12.0);

    // Boundary and out-of-range splits leave the clip count unchanged.
    for t in [2.0, 12.0, 0.0, 20.0] {
        assert!(ops::split_clip(&state, id, t).is_none());
    }
}

#[test]
fn delete_of_unknown_id_is_silent() {
    let (state, _) = state_with_media();
    assert!(ops::delete_clip(&state, uuid::Uuid::new_v4()).is_none());
}

// ── Canvas ratio switching ─────────────────────────────────────

#[test]
fn ratio_switch_preserves_center_fraction_and_clamps() {
    let (state, media_id) = state_with_media();
    let (wide_w, wide_h) = canvas_size(CanvasRatio::Widescreen);
    let canvas = Canvas::new(CanvasRatio::Widescreen);
    let mut state = ops::add_clip(&state, media_id, 0.0, 5.0, canvas.size())
        .unwrap()
        .state;

    // A slightly off-center 200x160 box on a 1920x1080 canvas.
    {
        let spatial = state.clips[0].spatial.as_mut().unwrap();
        spatial.x = 860.0;
        spatial.y = 460.0;
        spatial.width = 200.0;
        spatial.height = 160.0;
    }

    let (vert_w, vert_h) = canvas_size(CanvasRatio::Vertical);
    let vertical = ops::change_ratio(
        &state,
        glam::Vec2::new(wide_w, wide_h),
        glam::Vec2::new(vert_w, vert_h),
        "9:16",
    )
    .state;

    let spatial = vertical.clips[0].spatial.as_ref().unwrap();
    let old_cx = (860.0 + 100.0) / wide_w;
    let new_cx = (spatial.x + 100.0) / vert_w;
    assert!((old_cx - new_cx).abs() < 1e-5);
    assert!(spatial.x >= 0.0 && spatial.x <= vert_w - 200.0);
    assert!(spatial.y >= 0.0 && spatial.y <= vert_h - 160.0);
}

#[test]
fn ratio_round_trip_is_bijective_up_to_rounding() {
    let (state, media_id) = state_with_media();
    let canvas = Canvas::new(CanvasRatio::Widescreen);
    let state = ops::add_clip(&state, media_id, 0.0, 5.0, canvas.size())
        .unwrap()
        .state;

    let (wide_w, wide_h) = canvas_size(CanvasRatio::Widescreen);
    let (sq_w, sq_h) = canvas_size(CanvasRatio::Square);
    let wide = glam::Vec2::new(wide_w, wide_h);
    let square = glam::Vec2::new(sq_w, sq_h);

    let original = state.clips[0].spatial.clone().unwrap();
    let there = ops::change_ratio(&state, wide, square, "1:1").state;
    let back = ops::change_ratio(&there, square, wide, "16:9").state;

    let restored = back.clips[0].spatial.as_ref().unwrap();
    let orig_center = (
        (original.x + original.width / 2.0) / wide_w,
        (original.y + original.height / 2.0) / wide_h,
    );
    let back_center = (
        (restored.x + restored.width / 2.0) / wide_w,
        (restored.y + restored.height / 2.0) / wide_h,
    );
    assert!((orig_center.0 - back_center.0).abs() < 1e-5);
    assert!((orig_center.1 - back_center.1).abs() < 1e-5);
}

// ── Session: end-to-end editing with autosave ──────────────────

#[test]
fn session_burst_of_edits_saves_exactly_once() {
    init_tracing();
    let sink = RecordingSink::default();
    let submissions = sink.submissions.clone();
    let mut session = EditorSession::new(sink, SessionConfig::default(), None, 0.0);

    let item = video_item("clip");
    let media_id = item.id;
    session.import_media(item, 2.0);
    assert!(session.add_clip(media_id, 0.0, 5.0, 2.1));
    let clip_id = session.clips()[0].id;
    for i in 0..8 {
        session.move_clip(clip_id, i as f64 * 0.5, 2.2 + i as f64 * 0.05);
        session.update(2.2 + i as f64 * 0.05);
    }
    assert!(submissions.borrow().is_empty());

    session.update(6.0); // debounce expired
    assert_eq!(submissions.borrow().len(), 1);

    // Changes during the in-flight save never double-submit.
    session.move_clip(clip_id, 10.0, 6.1);
    session.update(6.1);
    session.update(12.0);
    assert_eq!(submissions.borrow().len(), 1);

    // After completion the still-dirty state re-arms and saves again.
    session.save_finished(Ok(()));
    session.update(12.1);
    session.update(15.2);
    assert_eq!(submissions.borrow().len(), 2);
}

#[test]
fn session_failed_autosave_is_retried() {
    init_tracing();
    let sink = RecordingSink::default();
    let submissions = sink.submissions.clone();
    let mut session = EditorSession::new(sink, SessionConfig::default(), None, 0.0);

    let item = video_item("clip");
    let media_id = item.id;
    session.import_media(item, 2.0);
    assert!(session.add_clip(media_id, 0.0, 5.0, 2.1));
    session.update(2.1);
    session.update(5.2);
    assert_eq!(submissions.borrow().len(), 1);

    session.save_finished(Err(CutlineError::Persist("backend offline".into())));
    session.update(6.0);
    session.update(9.1);
    assert_eq!(submissions.borrow().len(), 2);
}

// ── Persistence roundtrip through a session ────────────────────

#[test]
fn project_survives_save_and_reload() {
    let sink = RecordingSink::default();
    let mut session = EditorSession::new(sink, SessionConfig::default(), None, 0.0);

    let item = video_item("intro");
    let media_id = item.id;
    session.import_media(item, 0.1);
    session.add_clip(media_id, 0.0, 10.0, 0.2);
    let clip_id = session.clips()[0].id;
    session.split_clip(clip_id, 4.0, 0.3);
    session.rename_project("Roundtrip");
    session.seek(2.5);

    let bytes = session.snapshot(1.0).to_json().unwrap();
    let loaded = ProjectSnapshot::from_json(&bytes).unwrap();

    let sink = RecordingSink::default();
    let submissions = sink.submissions.clone();
    let reloaded = EditorSession::new(sink, SessionConfig::default(), Some(loaded), 100.0);

    assert_eq!(reloaded.project_name(), "Roundtrip");
    assert_eq!(reloaded.clips().len(), 2);
    assert_eq!(reloaded.current_time(), 2.5);
    assert_eq!(reloaded.duration(), 10.0);
    let clips: Vec<&TimelineClip> = reloaded.clips().iter().collect();
    assert_eq!(clips[0].end, clips[1].start);

    // And a reload is not an edit: no autosave ever fires untouched.
    let mut reloaded = reloaded;
    for i in 0..80 {
        reloaded.update(100.0 + i as f64 * 0.1);
    }
    assert!(submissions.borrow().is_empty());
}

#[test]
fn corrupt_snapshot_is_a_fatal_load_error() {
    let err = ProjectSnapshot::from_json(b"{\"version\":1}").unwrap_err();
    assert!(matches!(err, CutlineError::Serialization(_)));

    let err = ProjectSnapshot::from_json(b"not json").unwrap_err();
    assert!(matches!(err, CutlineError::Serialization(_)));
}

// ── Restore sequencing ─────────────────────────────────────────

#[test]
fn undo_is_phased_and_excludes_playhead() {
    let sink = RecordingSink::default();
    let mut session = EditorSession::new(sink, SessionConfig::default(), None, 0.0);

    let item = video_item("clip");
    let media_id = item.id;
    session.import_media(item, 0.1);
    session.add_clip(media_id, 0.0, 5.0, 0.2);
    session.seek(3.0);

    assert!(session.undo());
    assert!(session.is_restoring());
    assert_eq!(session.selected_clip_id(), None); // torn down synchronously
    session.settle();
    session.settle();
    assert!(!session.is_restoring());

    // The playhead did not jump: playback position is not part of history.
    assert_eq!(session.current_time(), 3.0);
    assert!(session.clips().is_empty());
}
