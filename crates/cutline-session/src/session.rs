//! The editing session: intents in, state and history out.
//!
//! `EditorSession` owns the authoritative [`EditorState`] and routes every
//! discrete intent from the input surface through the pure operations in
//! `cutline_timeline::ops`, recording each transition in history and letting
//! the autosave scheduler observe the result. The renderer gets read-only
//! accessors plus a force-refresh callback for off-model changes.

use tracing::{debug, warn};
use uuid::Uuid;

use cutline_core::{Canvas, CanvasRatio, Result};
use cutline_timeline::snapshot::{EditorSettings, PlayState, TimelineSettings};
use cutline_timeline::{
    CropArea, EditOutcome, EditorState, History, HistoryEntry, MediaItem, MediaStyle,
    ProjectSnapshot, SNAPSHOT_VERSION, TextStyle, TimelineClip, fingerprint, ops,
};

use crate::autosave::{AutosaveConfig, AutosaveScheduler, PersistenceSink};
use crate::playback::PlaybackClock;

/// Rendered playhead width in timeline pixels; divided by the zoom scale it
/// yields the end-of-content guard band in seconds.
const PLAYHEAD_WIDTH_PX: f64 = 4.0;

/// Session tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub history_capacity: usize,
    /// Debounce for gestural edits (drag, resize), seconds.
    pub gesture_debounce: f64,
    pub autosave: AutosaveConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            gesture_debounce: 0.3,
            autosave: AutosaveConfig::default(),
        }
    }
}

/// Where a restore (undo/redo application) currently stands.
///
/// Restoring is a phased sequence, not an instantaneous swap: the selection
/// is cleared synchronously so manipulation handles tear down, the model is
/// applied once the host reports the renderer settled, and the restored
/// selection is reapplied one settle later so handles rebuild against the
/// new data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RestorePhase {
    ApplyModel,
    ApplySelection,
}

#[derive(Debug)]
struct RestoreSequence {
    entry: HistoryEntry,
    phase: RestorePhase,
}

/// A live editing session. One per open project; nothing here is global.
pub struct EditorSession<S: PersistenceSink> {
    state: EditorState,
    history: History,
    canvas: Canvas,
    project_name: String,
    created_at: u64,
    /// Timeline zoom, pixels per second.
    timeline_scale: f64,
    clock: PlaybackClock,
    autosave: AutosaveScheduler<S>,
    clipboard: Option<TimelineClip>,
    restore: Option<RestoreSequence>,
    refresh: Option<Box<dyn FnMut()>>,
    config: SessionConfig,
}

impl<S: PersistenceSink> EditorSession<S> {
    /// Start a session, optionally from a previously persisted snapshot.
    ///
    /// The loaded state seeds a single "Initial state" history entry and the
    /// autosave baseline, and the scheduler's warm-up window starts now — so
    /// loading is never observed as a user edit.
    pub fn new(sink: S, config: SessionConfig, initial: Option<ProjectSnapshot>, now: f64) -> Self {
        let (state, canvas, project_name, created_at, timeline_scale, clock) = match initial {
            Some(snapshot) => {
                debug!(project = %snapshot.project_name, clips = snapshot.clips.len(), "loading project");
                (
                    snapshot.to_state(),
                    snapshot.canvas,
                    snapshot.project_name,
                    snapshot.created_at,
                    snapshot.timeline.scale,
                    PlaybackClock::at_time(snapshot.timeline.current_time),
                )
            }
            None => (
                EditorState::default(),
                Canvas::default(),
                "Untitled Project".to_string(),
                now as u64,
                100.0,
                PlaybackClock::new(),
            ),
        };

        let mut history = History::new(config.history_capacity);
        history.push(&state, "Initial state", now);

        let mut autosave = AutosaveScheduler::new(sink, config.autosave, now);
        autosave.prime(fingerprint(&state, &canvas, &project_name));

        Self {
            state,
            history,
            canvas,
            project_name,
            created_at,
            timeline_scale,
            clock,
            autosave,
            clipboard: None,
            restore: None,
            refresh: None,
            config,
        }
    }

    // ── Renderer interface (read-only) ──────────────────────────

    pub fn clips(&self) -> &[TimelineClip] {
        &self.state.clips
    }

    pub fn media_items(&self) -> &[MediaItem] {
        &self.state.media_items
    }

    pub fn selected_clip_id(&self) -> Option<Uuid> {
        self.state.selected_clip_id
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn duration(&self) -> f64 {
        self.state.duration()
    }

    /// Install the renderer's force-refresh callback, invoked after changes
    /// the renderer cannot derive from state alone (async media metadata).
    pub fn set_refresh_callback(&mut self, callback: Box<dyn FnMut()>) {
        self.refresh = Some(callback);
    }

    fn force_refresh(&mut self) {
        if let Some(refresh) = self.refresh.as_mut() {
            refresh();
        }
    }

    // ── History plumbing ────────────────────────────────────────

    fn apply(&mut self, outcome: EditOutcome, now: f64) {
        self.state = outcome.state;
        self.history.push(&self.state, &outcome.description, now);
    }

    fn apply_debounced(&mut self, outcome: EditOutcome, now: f64) {
        self.state = outcome.state;
        self.history
            .push_debounced(&self.state, &outcome.description, self.config.gesture_debounce, now);
    }

    /// Commit any in-progress gesture as one history step (pointer-up).
    pub fn end_gesture(&mut self) -> bool {
        self.history.flush()
    }

    pub fn can_undo(&self) -> bool {
        self.restore.is_none() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.restore.is_none() && self.history.can_redo()
    }

    /// Whether an undo/redo restore sequence is still in flight.
    pub fn is_restoring(&self) -> bool {
        self.restore.is_some()
    }

    /// Label of the edit an undo would revert ("Undo Move clip", ...).
    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    /// Step history backwards. Phase one happens synchronously (selection
    /// teardown); the host must call [`settle`] twice to finish applying.
    ///
    /// [`settle`]: EditorSession::settle
    pub fn undo(&mut self) -> bool {
        if self.restore.is_some() {
            return false;
        }
        // A pending gesture belongs to the pre-undo timeline; commit it so
        // the undo target is well-defined.
        self.history.flush();
        match self.history.undo() {
            Some(entry) => {
                self.begin_restore(entry);
                true
            }
            None => false,
        }
    }

    /// Step history forwards. Same phased application as [`undo`].
    ///
    /// [`undo`]: EditorSession::undo
    pub fn redo(&mut self) -> bool {
        if self.restore.is_some() {
            return false;
        }
        // A pending gesture supersedes the undone future; committing it
        // truncates the redo branch before stepping forward.
        self.history.flush();
        match self.history.redo() {
            Some(entry) => {
                self.begin_restore(entry);
                true
            }
            None => false,
        }
    }

    fn begin_restore(&mut self, entry: HistoryEntry) {
        debug!(target_entry = %entry.description, "restoring history entry");
        // Tear down any active manipulation handle before the model moves.
        self.state.selected_clip_id = None;
        self.restore = Some(RestoreSequence {
            entry,
            phase: RestorePhase::ApplyModel,
        });
    }

    /// Advance the restore sequence one phase. The host calls this once the
    /// renderer has settled after the previous phase.
    pub fn settle(&mut self) {
        let Some(sequence) = self.restore.as_mut() else {
            return;
        };
        match sequence.phase {
            RestorePhase::ApplyModel => {
                self.state.clips = sequence.entry.clips.clone();
                self.state.media_items = sequence.entry.media_items.clone();
                sequence.phase = RestorePhase::ApplySelection;
            }
            RestorePhase::ApplySelection => {
                self.state.selected_clip_id = sequence.entry.selected_clip_id;
                self.restore = None;
            }
        }
    }

    // ── Input surface: discrete intents ─────────────────────────

    /// Import a media item into the library.
    pub fn import_media(&mut self, item: MediaItem, now: f64) {
        let outcome = ops::add_media_item(&self.state, item);
        self.apply(outcome, now);
    }

    /// Attach asynchronously probed duration to a media item. Off-model
    /// metadata arrival: no history entry, but the renderer is refreshed.
    pub fn attach_media_duration(&mut self, media_id: Uuid, duration: f64) {
        if let Some(item) = self.state.media_item_mut(media_id) {
            item.attach_duration(duration);
            self.force_refresh();
        }
    }

    /// Attach asynchronously decoded dimensions to a media item.
    pub fn attach_media_dimensions(&mut self, media_id: Uuid, width: u32, height: u32) {
        if let Some(item) = self.state.media_item_mut(media_id) {
            item.attach_dimensions(width, height);
            self.force_refresh();
        }
    }

    pub fn add_clip(&mut self, media_id: Uuid, start: f64, end: f64, now: f64) -> bool {
        match ops::add_clip(&self.state, media_id, start, end, self.canvas.size()) {
            Some(outcome) => {
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    pub fn delete_clip(&mut self, id: Uuid, now: f64) -> bool {
        match ops::delete_clip(&self.state, id) {
            Some(outcome) => {
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    /// Split a clip at the current playhead position.
    pub fn split_clip_at_playhead(&mut self, id: Uuid, now: f64) -> bool {
        self.split_clip(id, self.clock.current_time(), now)
    }

    pub fn split_clip(&mut self, id: Uuid, at: f64, now: f64) -> bool {
        match ops::split_clip(&self.state, id, at) {
            Some(outcome) => {
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    /// Final (committed) timeline move.
    pub fn move_clip(&mut self, id: Uuid, new_start: f64, now: f64) -> bool {
        match ops::move_clip(&self.state, id, new_start) {
            Some(outcome) => {
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    /// Gestural timeline move: intermediate drag frames share one debounced
    /// history step; call [`end_gesture`] on pointer-up.
    ///
    /// [`end_gesture`]: EditorSession::end_gesture
    pub fn move_clip_live(&mut self, id: Uuid, new_start: f64, now: f64) -> bool {
        match ops::move_clip(&self.state, id, new_start) {
            Some(outcome) => {
                self.apply_debounced(outcome, now);
                true
            }
            None => false,
        }
    }

    pub fn resize_clip(&mut self, id: Uuid, new_start: f64, new_end: f64, now: f64) -> bool {
        match ops::resize_clip(&self.state, id, new_start, new_end) {
            Some(outcome) => {
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    /// Gestural trim; debounced like [`move_clip_live`].
    ///
    /// [`move_clip_live`]: EditorSession::move_clip_live
    pub fn resize_clip_live(&mut self, id: Uuid, new_start: f64, new_end: f64, now: f64) -> bool {
        match ops::resize_clip(&self.state, id, new_start, new_end) {
            Some(outcome) => {
                self.apply_debounced(outcome, now);
                true
            }
            None => false,
        }
    }

    pub fn move_clip_spatial(&mut self, id: Uuid, x: f32, y: f32, now: f64) -> bool {
        match ops::move_clip_spatial(&self.state, id, x, y, self.canvas.size()) {
            Some(outcome) => {
                self.apply_debounced(outcome, now);
                true
            }
            None => false,
        }
    }

    pub fn resize_clip_spatial(
        &mut self,
        id: Uuid,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        now: f64,
    ) -> bool {
        match ops::resize_clip_spatial(&self.state, id, x, y, width, height, self.canvas.size()) {
            Some(outcome) => {
                self.apply_debounced(outcome, now);
                true
            }
            None => false,
        }
    }

    /// Copy a clip to the session clipboard. No state change, no history.
    pub fn copy_clip(&mut self, id: Uuid) -> bool {
        match self.state.clip(id) {
            Some(clip) => {
                self.clipboard = Some(clip.clone());
                true
            }
            None => false,
        }
    }

    /// Paste the clipboard clip on the top layer and select it.
    pub fn paste_clip(&mut self, now: f64) -> bool {
        match self.clipboard.clone() {
            Some(source) => {
                let outcome = ops::paste_clip(&self.state, &source);
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    /// Rewrite track indices through an explicit old -> new map.
    ///
    /// Skipped entirely while an undo/redo restore is in flight: remapping
    /// against a half-applied model would corrupt the restore.
    pub fn remap_tracks(&mut self, map: &[(usize, usize)], now: f64) -> bool {
        if self.restore.is_some() {
            warn!("track remap ignored during history restore");
            return false;
        }
        match ops::remap_tracks(&self.state, map) {
            Some(outcome) => {
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    /// Switch the output aspect ratio, re-anchoring every spatial clip.
    /// One atomic edit: a single history entry covers all clips.
    pub fn set_ratio(&mut self, ratio: CanvasRatio, now: f64) -> bool {
        if ratio == self.canvas.ratio {
            return false;
        }
        let old_size = self.canvas.size();
        self.canvas.set_ratio(ratio);
        let outcome = ops::change_ratio(&self.state, old_size, self.canvas.size(), ratio.label());
        self.apply(outcome, now);
        true
    }

    pub fn update_text_style(&mut self, id: Uuid, style: TextStyle, now: f64) -> bool {
        match ops::update_text_style(&self.state, id, style) {
            Some(outcome) => {
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    pub fn update_media_style(&mut self, id: Uuid, style: MediaStyle, now: f64) -> bool {
        match ops::update_media_style(&self.state, id, style) {
            Some(outcome) => {
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    pub fn update_crop(&mut self, id: Uuid, crop: Option<CropArea>, now: f64) -> bool {
        match ops::update_crop(&self.state, id, crop) {
            Some(outcome) => {
                self.apply(outcome, now);
                true
            }
            None => false,
        }
    }

    /// Select a clip (or clear with `None`). Selection is not its own
    /// history entry; it rides along in the next committed snapshot.
    pub fn select_clip(&mut self, id: Option<Uuid>) {
        self.state.selected_clip_id = match id {
            Some(id) if self.state.clip(id).is_some() => Some(id),
            _ => None,
        };
    }

    pub fn rename_project(&mut self, name: impl Into<String>) {
        self.project_name = name.into();
    }

    pub fn set_timeline_scale(&mut self, scale: f64) {
        self.timeline_scale = scale.max(1.0);
    }

    // ── Playback ────────────────────────────────────────────────

    fn playhead_guard(&self) -> f64 {
        PLAYHEAD_WIDTH_PX / self.timeline_scale
    }

    pub fn toggle_play(&mut self) {
        let duration = self.state.duration();
        let guard = self.playhead_guard();
        self.clock.toggle(duration, guard);
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn seek(&mut self, time: f64) {
        let duration = self.state.duration();
        self.clock.seek(time, duration);
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Build the persisted form of the current session.
    pub fn snapshot(&self, now: f64) -> ProjectSnapshot {
        ProjectSnapshot {
            version: SNAPSHOT_VERSION,
            project_name: self.project_name.clone(),
            created_at: self.created_at,
            modified_at: now as u64,
            canvas: self.canvas.clone(),
            timeline: TimelineSettings {
                scale: self.timeline_scale,
                current_time: self.clock.current_time(),
                duration: self.state.duration(),
            },
            editor: EditorSettings {
                selected_clip_id: self.state.selected_clip_id,
                play_state: if self.clock.is_playing() {
                    PlayState::Playing
                } else {
                    PlayState::Paused
                },
            },
            media: self.state.media_items.clone(),
            clips: self.state.clips.clone(),
        }
    }

    /// Manual save (keyboard shortcut): bypasses the debounce but still
    /// refuses while a save is in flight. Returns whether a save was
    /// submitted; the outcome arrives via [`save_finished`].
    ///
    /// [`save_finished`]: EditorSession::save_finished
    pub fn save_now(&mut self, now: f64) -> bool {
        let print = fingerprint(&self.state, &self.canvas, &self.project_name);
        let snapshot = self.snapshot(now);
        self.autosave.begin_save(snapshot, print)
    }

    /// Report completion of the in-flight save (from the host's sink).
    pub fn save_finished(&mut self, result: Result<()>) {
        self.autosave.save_finished(result);
    }

    /// Drive the session's virtual timers. The host calls this from its
    /// frame loop: commits due debounced history entries, lets the autosave
    /// scheduler observe and fire, and advances playback.
    pub fn update(&mut self, now: f64) {
        self.history.tick(now);

        let duration = self.state.duration();
        let guard = self.playhead_guard();
        self.clock.tick(duration, guard);

        let print = fingerprint(&self.state, &self.canvas, &self.project_name);
        self.autosave.observe(&print, now);
        if self.autosave.should_save(&print, now) {
            let snapshot = self.snapshot(now);
            self.autosave.begin_save(snapshot, print);
        }
    }
}
