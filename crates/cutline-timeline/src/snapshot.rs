//! Project persistence with versioning and migration.
//!
//! The snapshot is the wire/disk contract with the host's persistence sink:
//! JSON with a schema version field, reference-only media records (no binary
//! payloads), and a migration path so older files stay loadable.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use cutline_core::{Canvas, CutlineError, Result};

use crate::clip::TimelineClip;
use crate::media::MediaItem;
use crate::state::EditorState;

/// Current schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Top-level fields a snapshot cannot be loaded without. A file missing any
/// of these is structurally corrupt: fatal, no partial recovery.
const REQUIRED_FIELDS: [&str; 3] = ["canvas", "media", "clips"];

/// Whether playback was running when the project was saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Playing,
    Paused,
}

/// Timeline view settings carried in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSettings {
    /// Zoom scale, pixels per second in the host UI.
    pub scale: f64,
    /// Playhead position at save time, seconds.
    pub current_time: f64,
    /// Content duration at save time, seconds.
    pub duration: f64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            scale: 100.0,
            current_time: 0.0,
            duration: 0.0,
        }
    }
}

/// Editor-facing settings carried in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    pub selected_clip_id: Option<Uuid>,
    pub play_state: PlayState,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            selected_clip_id: None,
            play_state: PlayState::Paused,
        }
    }
}

/// The persisted form of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Schema version for migration.
    pub version: u32,
    pub project_name: String,
    /// Unix seconds.
    pub created_at: u64,
    /// Unix seconds.
    pub modified_at: u64,
    pub canvas: Canvas,
    pub timeline: TimelineSettings,
    pub editor: EditorSettings,
    /// Library records, binary-bearing fields reduced to locators.
    pub media: Vec<MediaItem>,
    pub clips: Vec<TimelineClip>,
}

impl ProjectSnapshot {
    /// A fresh, empty project.
    pub fn empty(project_name: impl Into<String>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            project_name: project_name.into(),
            created_at: 0,
            modified_at: 0,
            canvas: Canvas::default(),
            timeline: TimelineSettings::default(),
            editor: EditorSettings::default(),
            media: Vec::new(),
            clips: Vec::new(),
        }
    }

    /// Rebuild the editable state this snapshot describes.
    pub fn to_state(&self) -> EditorState {
        EditorState {
            clips: self.clips.clone(),
            media_items: self.media.clone(),
            selected_clip_id: self.editor.selected_clip_id,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            CutlineError::Serialization(format!("failed to serialize project: {e}"))
        })
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    ///
    /// Structural corruption (missing required top-level fields) and files
    /// newer than this build are fatal errors; there is no partial recovery
    /// of a corrupt snapshot.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| CutlineError::Serialization(format!("invalid JSON: {e}")))?;

        for field in REQUIRED_FIELDS {
            if raw.get(field).is_none() {
                return Err(CutlineError::Serialization(format!(
                    "snapshot is missing required field `{field}`"
                )));
            }
        }

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > SNAPSHOT_VERSION {
            return Err(CutlineError::Serialization(format!(
                "snapshot version {version} is newer than supported version {SNAPSHOT_VERSION}"
            )));
        }

        let migrated = migrate(raw, version)?;
        serde_json::from_value(migrated)
            .map_err(|e| CutlineError::Serialization(format!("failed to parse snapshot: {e}")))
    }

    /// Save the snapshot to a file path.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Load a snapshot from a file path.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Apply sequential migrations from `from_version` to [`SNAPSHOT_VERSION`].
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < SNAPSHOT_VERSION {
        match version {
            0 => {
                // v0 -> v1: pre-versioned files lacked the version field and
                // the timeline/editor sections.
                let object = data.as_object_mut().ok_or_else(|| {
                    CutlineError::Serialization("snapshot root is not an object".into())
                })?;
                object.insert("version".into(), json!(1));
                object
                    .entry("project_name")
                    .or_insert_with(|| json!("Untitled Project"));
                object.entry("created_at").or_insert(json!(0));
                object.entry("modified_at").or_insert(json!(0));
                // Materialize the v1 shape literally; migrations are frozen
                // even if the live defaults later change.
                object.entry("timeline").or_insert_with(|| {
                    json!({ "scale": 100.0, "current_time": 0.0, "duration": 0.0 })
                });
                object.entry("editor").or_insert_with(|| {
                    json!({ "selected_clip_id": null, "play_state": "paused" })
                });
                version = 1;
            }
            _ => {
                return Err(CutlineError::Serialization(format!(
                    "no migration path from version {version}"
                )));
            }
        }
    }

    Ok(data)
}

/// Stable fingerprint of the save-worthy fields, used by the autosave
/// scheduler to decide whether anything new needs persisting.
///
/// Volatile view-only state (playhead position, play state, zoom) is
/// deliberately excluded so scrubbing and playback never look like edits.
pub fn fingerprint(state: &EditorState, canvas: &Canvas, project_name: &str) -> String {
    // Clips and media are fully save-worthy; keys are ordered by field
    // declaration so the serialization is stable for identical states.
    serde_json::to_string(&json!({
        "name": project_name,
        "ratio": canvas.ratio.label(),
        "clips": state.clips,
        "media": state.media_items,
    }))
    .unwrap_or_default()
}
