//! Clip operations: every user-facing edit as a pure state transition.
//!
//! Each operation takes the current [`EditorState`] and returns
//! `Some(EditOutcome)` with the next state plus a history description, or
//! `None` for an invalid operation. Invalid operations are silent no-ops by
//! design: they routinely arise from races between rapid input and async
//! state settling, and must never surface as errors.

use glam::Vec2;
use uuid::Uuid;

use cutline_core::remap_position;

use crate::clip::{CropArea, MediaStyle, TextStyle, TimelineClip};
use crate::media::MediaItem;
use crate::state::EditorState;

/// Shortest clip the resize operation will produce, seconds.
const MIN_CLIP_DURATION: f64 = 0.1;

/// Result of a successful operation: the next state and a label for the
/// history entry.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub state: EditorState,
    pub description: String,
}

impl EditOutcome {
    fn new(state: EditorState, description: impl Into<String>) -> Self {
        Self {
            state,
            description: description.into(),
        }
    }
}

/// Import a media item into the library.
pub fn add_media_item(state: &EditorState, item: MediaItem) -> EditOutcome {
    let mut next = state.clone();
    let description = format!("Import {}", item.name);
    next.media_items.push(item);
    EditOutcome::new(next, description)
}

/// Place a new clip for `media_id` spanning `[start, end)`.
///
/// The clip lands on track 0 (top layer), shifting every existing clip
/// down one layer, and is selected; visual clips are centered in the
/// canvas base size. Unknown media or an empty span is a no-op.
pub fn add_clip(
    state: &EditorState,
    media_id: Uuid,
    start: f64,
    end: f64,
    canvas: Vec2,
) -> Option<EditOutcome> {
    if end <= start {
        return None;
    }
    let item = state.media_item(media_id)?;
    let clip = TimelineClip::from_media(item, start, end, canvas);
    let description = format!("Add {}", clip.name);

    let mut next = state.clone();
    for existing in &mut next.clips {
        existing.track_index += 1;
    }
    next.selected_clip_id = Some(clip.id);
    next.clips.push(clip);
    Some(EditOutcome::new(next, description))
}

/// Remove a clip by id. An absent id is a no-op (defensive against racing
/// deletes); deleting the selected clip clears the selection.
pub fn delete_clip(state: &EditorState, id: Uuid) -> Option<EditOutcome> {
    let clip = state.clip(id)?;
    let description = format!("Delete {}", clip.name);

    let mut next = state.clone();
    next.clips.retain(|c| c.id != id);
    if next.selected_clip_id == Some(id) {
        next.selected_clip_id = None;
    }
    Some(EditOutcome::new(next, description))
}

/// Split a clip at timeline time `t`, strictly inside `[start, end)`.
///
/// The clip is replaced by two fresh-id clips partitioning its range with
/// no gap or overlap, each inheriting style; source trims are adjusted
/// proportionally for trimmable media. Splitting at a boundary or outside
/// the range is a no-op.
pub fn split_clip(state: &EditorState, id: Uuid, t: f64) -> Option<EditOutcome> {
    let clip = state.clip(id)?;
    if t <= clip.start || t >= clip.end {
        return None;
    }

    let fraction = (t - clip.start) / clip.duration();
    let source_split = clip.trim_start + fraction * (clip.trim_end - clip.trim_start);

    let mut left = clip.duplicate();
    left.end = t;
    let mut right = clip.duplicate();
    right.start = t;
    if clip.kind.is_trimmable() {
        left.trim_end = source_split;
        right.trim_start = source_split;
    }

    let description = format!("Split {}", clip.name);
    let was_selected = state.selected_clip_id == Some(id);
    let left_id = left.id;

    let mut next = state.clone();
    let index = next.clips.iter().position(|c| c.id == id)?;
    next.clips.splice(index..=index, [left, right]);
    if was_selected {
        next.selected_clip_id = Some(left_id);
    }
    Some(EditOutcome::new(next, description))
}

/// Shift a clip along the timeline, preserving its duration. The clip is
/// clamped so it never starts before zero.
pub fn move_clip(state: &EditorState, id: Uuid, new_start: f64) -> Option<EditOutcome> {
    let clip = state.clip(id)?;
    let duration = clip.duration();
    let new_start = new_start.max(0.0);
    let description = format!("Move {}", clip.name);

    let mut next = state.clone();
    let clip = next.clip_mut(id)?;
    clip.start = new_start;
    clip.end = new_start + duration;
    Some(EditOutcome::new(next, description))
}

/// Trim a clip's timeline in/out points.
///
/// Preserves `end > start` (rejecting spans shorter than a small minimum)
/// and shifts the source window by the same deltas for trimmable media.
pub fn resize_clip(
    state: &EditorState,
    id: Uuid,
    new_start: f64,
    new_end: f64,
) -> Option<EditOutcome> {
    if new_start < 0.0 || new_end - new_start < MIN_CLIP_DURATION {
        return None;
    }
    let clip = state.clip(id)?;
    let delta_start = new_start - clip.start;
    let delta_end = new_end - clip.end;
    let description = format!("Trim {}", clip.name);

    let mut next = state.clone();
    let clip = next.clip_mut(id)?;
    clip.start = new_start;
    clip.end = new_end;
    if clip.kind.is_trimmable() {
        clip.trim_start += delta_start;
        clip.trim_end += delta_end;
    }
    Some(EditOutcome::new(next, description))
}

/// Move a clip on the canvas. The bounding box is clamped inside the canvas
/// base size; clips without spatial fields (pure audio) are a no-op.
pub fn move_clip_spatial(
    state: &EditorState,
    id: Uuid,
    x: f32,
    y: f32,
    canvas: Vec2,
) -> Option<EditOutcome> {
    let clip = state.clip(id)?;
    clip.spatial.as_ref()?;
    let description = format!("Move {}", clip.name);

    let mut next = state.clone();
    let spatial = next.clip_mut(id)?.spatial.as_mut()?;
    spatial.x = x;
    spatial.y = y;
    spatial.clamp_to(canvas);
    Some(EditOutcome::new(next, description))
}

/// Resize a clip on the canvas. Requires a positive size; the resulting box
/// is clamped inside the canvas base size.
pub fn resize_clip_spatial(
    state: &EditorState,
    id: Uuid,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    canvas: Vec2,
) -> Option<EditOutcome> {
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let clip = state.clip(id)?;
    clip.spatial.as_ref()?;
    let description = format!("Resize {}", clip.name);

    let mut next = state.clone();
    let spatial = next.clip_mut(id)?.spatial.as_mut()?;
    spatial.x = x;
    spatial.y = y;
    spatial.width = width.min(canvas.x);
    spatial.height = height.min(canvas.y);
    spatial.clamp_to(canvas);
    Some(EditOutcome::new(next, description))
}

/// Insert a full clone of `source` with a fresh id on track 0, shifting all
/// existing clips down one layer, and select the paste. Mirrors the
/// "add always on top" placement.
pub fn paste_clip(state: &EditorState, source: &TimelineClip) -> EditOutcome {
    let mut pasted = source.duplicate();
    pasted.track_index = 0;
    let description = format!("Paste {}", pasted.name);

    let mut next = state.clone();
    for clip in &mut next.clips {
        clip.track_index += 1;
    }
    next.selected_clip_id = Some(pasted.id);
    next.clips.push(pasted);
    EditOutcome::new(next, description)
}

/// Rewrite every clip's track index through an explicit old -> new map;
/// unmapped indices are left unchanged. A map that changes nothing is a
/// no-op.
///
/// Callers must skip this entirely while an undo/redo restore is in flight.
pub fn remap_tracks(state: &EditorState, map: &[(usize, usize)]) -> Option<EditOutcome> {
    let mut next = state.clone();
    let mut changed = false;
    for clip in &mut next.clips {
        if let Some((_, new_index)) = map.iter().find(|(old, _)| *old == clip.track_index) {
            if clip.track_index != *new_index {
                clip.track_index = *new_index;
                changed = true;
            }
        }
    }
    changed.then(|| EditOutcome::new(next, "Reorder tracks"))
}

/// Re-anchor every spatial clip when the output ratio changes, preserving
/// each clip's center fraction of the canvas and clamping into the new
/// frame. One atomic outcome: the caller records a single history entry.
pub fn change_ratio(
    state: &EditorState,
    old_canvas: Vec2,
    new_canvas: Vec2,
    label: &str,
) -> EditOutcome {
    let mut next = state.clone();
    for clip in &mut next.clips {
        if let Some(spatial) = clip.spatial.as_mut() {
            let pos = remap_position(spatial.position(), spatial.size(), old_canvas, new_canvas);
            spatial.x = pos.x;
            spatial.y = pos.y;
        }
    }
    EditOutcome::new(next, format!("Change ratio to {label}"))
}

/// Replace a text clip's style block.
pub fn update_text_style(state: &EditorState, id: Uuid, style: TextStyle) -> Option<EditOutcome> {
    let clip = state.clip(id)?;
    clip.text_style.as_ref()?;
    let description = format!("Edit text {}", clip.name);

    let mut next = state.clone();
    next.clip_mut(id)?.text_style = Some(style);
    Some(EditOutcome::new(next, description))
}

/// Replace a video/image clip's adjustment block.
pub fn update_media_style(state: &EditorState, id: Uuid, style: MediaStyle) -> Option<EditOutcome> {
    let clip = state.clip(id)?;
    clip.media_style.as_ref()?;
    let description = format!("Adjust {}", clip.name);

    let mut next = state.clone();
    next.clip_mut(id)?.media_style = Some(style);
    Some(EditOutcome::new(next, description))
}

/// Set or clear a clip's crop window.
pub fn update_crop(state: &EditorState, id: Uuid, crop: Option<CropArea>) -> Option<EditOutcome> {
    let clip = state.clip(id)?;
    let description = format!("Crop {}", clip.name);

    let mut next = state.clone();
    next.clip_mut(id)?.crop = crop;
    Some(EditOutcome::new(next, description))
}
