//! The authoritative editing state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clip::TimelineClip;
use crate::media::{MediaItem, MediaKind};

/// Everything the user can edit and undo: clips, the media library, and the
/// current selection.
///
/// Owned exclusively by the session; the renderer and persistence layers
/// only ever see shared references or clones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub clips: Vec<TimelineClip>,
    pub media_items: Vec<MediaItem>,
    pub selected_clip_id: Option<Uuid>,
}

impl EditorState {
    /// Find a clip by id.
    pub fn clip(&self, id: Uuid) -> Option<&TimelineClip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Find a clip mutably by id.
    pub fn clip_mut(&mut self, id: Uuid) -> Option<&mut TimelineClip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// Find a media item by id.
    pub fn media_item(&self, id: Uuid) -> Option<&MediaItem> {
        self.media_items.iter().find(|m| m.id == id)
    }

    /// Find a media item mutably by id.
    pub fn media_item_mut(&mut self, id: Uuid) -> Option<&mut MediaItem> {
        self.media_items.iter_mut().find(|m| m.id == id)
    }

    /// Content duration: the latest clip end, or 0 for an empty timeline.
    pub fn duration(&self) -> f64 {
        self.clips.iter().map(|c| c.end).fold(0.0, f64::max)
    }

    /// The currently selected clip, if the selection resolves.
    pub fn selected_clip(&self) -> Option<&TimelineClip> {
        self.selected_clip_id.and_then(|id| self.clip(id))
    }

    /// Check referential validity: every non-text clip's `media_id` must
    /// resolve to a media item.
    pub fn is_valid(&self) -> bool {
        self.clips
            .iter()
            .filter(|c| c.kind != MediaKind::Text)
            .all(|c| self.media_item(c.media_id).is_some())
    }
}
