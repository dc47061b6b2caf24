//! Bounded, linear undo/redo history over state snapshots.
//!
//! Unlike command-pattern undo, history here is a stack of full snapshots of
//! the editable state: restoring never depends on operations being exactly
//! invertible, and every entry is unaliased with the live model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip::TimelineClip;
use crate::media::MediaItem;
use crate::state::EditorState;

/// Default maximum history depth.
pub const DEFAULT_CAPACITY: usize = 50;

/// An immutable snapshot of the editable state.
///
/// Playback position is deliberately excluded: undo/redo must not move the
/// playhead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub clips: Vec<TimelineClip>,
    pub media_items: Vec<MediaItem>,
    pub selected_clip_id: Option<Uuid>,
    /// Human-readable label ("Split clip", "Change ratio", ...).
    pub description: String,
    /// Commit time, seconds on the host clock.
    pub timestamp: f64,
}

impl HistoryEntry {
    fn capture(state: &EditorState, description: &str, timestamp: f64) -> Self {
        Self {
            clips: state.clips.clone(),
            media_items: state.media_items.clone(),
            selected_clip_id: state.selected_clip_id,
            description: description.to_string(),
            timestamp,
        }
    }

    /// Rebuild an [`EditorState`] from this entry (fresh clones).
    pub fn to_state(&self) -> EditorState {
        EditorState {
            clips: self.clips.clone(),
            media_items: self.media_items.clone(),
            selected_clip_id: self.selected_clip_id,
        }
    }
}

#[derive(Debug)]
struct PendingEntry {
    entry: HistoryEntry,
    deadline: f64,
}

/// Undo/redo stack with branch-on-write semantics and debounced commits.
///
/// Timers are virtual: callers pass the current time (seconds) into every
/// time-sensitive method, which keeps the stack deterministic and free of
/// runtime dependencies.
#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Index of the current entry. Only meaningful when `entries` is
    /// non-empty.
    index: usize,
    capacity: usize,
    pending: Option<PendingEntry>,
}

impl History {
    /// Create an empty history with the given maximum depth.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            capacity: capacity.max(1),
            pending: None,
        }
    }

    /// Commit a snapshot of `state`.
    ///
    /// Any entries after the current index are discarded first — making a
    /// new edit after undoing erases the undone future. Past capacity, the
    /// oldest entry is evicted (permanently unrecoverable).
    pub fn push(&mut self, state: &EditorState, description: &str, now: f64) {
        // A direct commit supersedes an in-progress gesture; commit the
        // gesture first so its step is not lost.
        self.flush();
        self.commit(HistoryEntry::capture(state, description, now));
    }

    /// Buffer a snapshot, committing it only after `delay` seconds without
    /// another `push_debounced` call. Used for continuous gestures so every
    /// intermediate frame is not a separate undo step.
    pub fn push_debounced(
        &mut self,
        state: &EditorState,
        description: &str,
        delay: f64,
        now: f64,
    ) {
        self.pending = Some(PendingEntry {
            entry: HistoryEntry::capture(state, description, now),
            deadline: now + delay,
        });
    }

    /// Advance virtual time: commits a pending debounced entry once its
    /// deadline has passed. Returns whether a commit happened.
    pub fn tick(&mut self, now: f64) -> bool {
        if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            self.flush()
        } else {
            false
        }
    }

    /// Immediately commit any pending debounced entry (gesture end).
    /// Returns whether a commit happened.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                self.commit(pending.entry);
                true
            }
            None => false,
        }
    }

    fn commit(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(entry);
        self.index = self.entries.len() - 1;

        if self.entries.len() > self.capacity {
            self.entries.remove(0);
            self.index -= 1;
        }
    }

    /// Step back one entry. Returns a fresh copy of the entry now current,
    /// or `None` at the stack boundary (a no-op, not an error).
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Step forward one entry. Returns a fresh copy of the entry now
    /// current, or `None` at the stack boundary.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.index < self.entries.len() - 1
    }

    /// Empty the stack and cancel any pending debounce. Project (re)load
    /// only.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
        self.pending = None;
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Description of the edit an `undo()` would revert, for UI
    /// affordances ("Undo Split clip").
    pub fn undo_description(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.entries[self.index].description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use glam::Vec2;

    fn state_with_clips(n: usize) -> EditorState {
        let item = MediaItem::new(MediaKind::Video, "v.mp4", "V");
        let clips = (0..n)
            .map(|i| {
                crate::clip::TimelineClip::from_media(
                    &item,
                    i as f64 * 5.0,
                    i as f64 * 5.0 + 5.0,
                    Vec2::new(1920.0, 1080.0),
                )
            })
            .collect();
        EditorState {
            clips,
            media_items: vec![item],
            selected_clip_id: None,
        }
    }

    #[test]
    fn test_push_undo_redo_round_trip() {
        let mut history = History::default();
        let empty = state_with_clips(0);
        let one = state_with_clips(1);

        history.push(&empty, "Initial state", 0.0);
        history.push(&one, "Add clip", 1.0);
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let undone = history.undo().unwrap();
        assert_eq!(undone.clips.len(), 0);
        assert!(!history.can_undo());
        assert!(history.can_redo());

        let redone = history.redo().unwrap();
        assert_eq!(redone.to_state(), one);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_boundary_is_noop() {
        let mut history = History::default();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        history.push(&state_with_clips(0), "Initial state", 0.0);
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_new_push_discards_redo_branch() {
        let mut history = History::default();
        history.push(&state_with_clips(0), "A", 0.0);
        history.push(&state_with_clips(1), "B", 1.0);
        history.push(&state_with_clips(2), "C", 2.0);

        history.undo();
        history.undo(); // back at A
        history.push(&state_with_clips(3), "D", 3.0);

        assert_eq!(history.len(), 2); // [A, D]
        assert!(!history.can_redo());
        assert_eq!(history.undo().unwrap().description, "A");
    }

    #[test]
    fn test_capacity_evicts_oldest_first() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.push(&state_with_clips(i), &format!("edit {i}"), i as f64);
        }
        assert_eq!(history.len(), 3);
        // Walk to the bottom: the oldest surviving entry is "edit 2".
        let mut last = None;
        while let Some(entry) = history.undo() {
            last = Some(entry);
        }
        assert_eq!(last.unwrap().description, "edit 2");
    }

    #[test]
    fn test_debounce_commits_once_after_delay() {
        let mut history = History::default();
        history.push(&state_with_clips(0), "Initial state", 0.0);

        // Rapid gesture updates; only the last one should commit.
        for i in 0..10 {
            history.push_debounced(&state_with_clips(1), "Move clip", 0.3, i as f64 * 0.01);
        }
        assert_eq!(history.len(), 1);
        assert!(!history.tick(0.2)); // not yet due
        assert!(history.tick(0.5));
        assert_eq!(history.len(), 2);
        assert!(!history.tick(1.0)); // nothing pending anymore
    }

    #[test]
    fn test_flush_commits_pending() {
        let mut history = History::default();
        history.push(&state_with_clips(0), "Initial state", 0.0);
        history.push_debounced(&state_with_clips(1), "Resize clip", 0.3, 0.1);

        assert!(history.flush());
        assert_eq!(history.len(), 2);
        assert!(!history.flush());
    }

    #[test]
    fn test_direct_push_flushes_pending_first() {
        let mut history = History::default();
        history.push(&state_with_clips(0), "Initial state", 0.0);
        history.push_debounced(&state_with_clips(1), "Move clip", 0.3, 0.1);
        history.push(&state_with_clips(2), "Delete clip", 0.2);

        assert_eq!(history.len(), 3);
        assert_eq!(history.undo().unwrap().description, "Move clip");
    }

    #[test]
    fn test_clear_cancels_pending() {
        let mut history = History::default();
        history.push(&state_with_clips(0), "Initial state", 0.0);
        history.push_debounced(&state_with_clips(1), "Move clip", 0.3, 0.1);
        history.clear();

        assert!(history.is_empty());
        assert!(!history.tick(10.0));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_entries_are_unaliased_with_live_state() {
        let mut history = History::default();
        let mut state = state_with_clips(1);
        history.push(&state, "Initial state", 0.0);

        // Mutate the live state after the push; the entry must not follow.
        state.clips[0].start = 99.0;
        history.push(&state, "Move clip", 1.0);
        let restored = history.undo().unwrap();
        assert_eq!(restored.clips[0].start, 0.0);
    }
}
