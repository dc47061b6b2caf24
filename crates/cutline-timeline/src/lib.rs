//! Cutline Timeline - entity model, clip operations and history.
//!
//! The authoritative editing state lives in [`EditorState`]; every
//! user-facing edit is a pure function in [`ops`] producing a new state plus
//! a history description, and [`History`] keeps bounded undo/redo snapshots
//! of the result. [`snapshot`] defines the versioned persisted form.

pub mod clip;
pub mod history;
pub mod media;
pub mod ops;
pub mod snapshot;
pub mod state;

pub use clip::{CropArea, MediaStyle, SpatialProps, TextStyle, TimelineClip};
pub use history::{History, HistoryEntry};
pub use media::{MediaItem, MediaKind};
pub use ops::EditOutcome;
pub use snapshot::{
    EditorSettings, PlayState, ProjectSnapshot, SNAPSHOT_VERSION, TimelineSettings, fingerprint,
};
pub use state::EditorState;
