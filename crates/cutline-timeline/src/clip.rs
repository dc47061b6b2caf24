//! Timeline clip types.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::media::{MediaItem, MediaKind};

/// Spatial placement of a visual clip in canvas base coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialProps {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    pub scale: f32,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub opacity: f32,
}

impl SpatialProps {
    /// Place a clip of the given size centered in a canvas.
    pub fn centered(size: Vec2, canvas: Vec2) -> Self {
        Self {
            x: (canvas.x - size.x) * 0.5,
            y: (canvas.y - size.y) * 0.5,
            width: size.x,
            height: size.y,
            rotation: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Clamp the bounding box inside a canvas of the given size.
    pub fn clamp_to(&mut self, canvas: Vec2) {
        self.x = self.x.clamp(0.0, (canvas.x - self.width).max(0.0));
        self.y = self.y.clamp(0.0, (canvas.y - self.height).max(0.0));
    }
}

/// Styling for text clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub content: String,
    pub font_family: String,
    pub font_size: f32,
    pub color: String,
    pub bold: bool,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: "Text".to_string(),
            font_family: "sans-serif".to_string(),
            font_size: 64.0,
            color: "#ffffff".to_string(),
            bold: false,
            italic: false,
        }
    }
}

/// Adjustments applied to video/image clips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStyle {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    /// Corner radius in canvas pixels.
    pub corner_radius: f32,
    /// Playback volume for clips with audio, 0.0 to 1.0.
    pub volume: f32,
}

impl Default for MediaStyle {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            corner_radius: 0.0,
            volume: 1.0,
        }
    }
}

/// A crop window in source-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A placement of one media asset on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineClip {
    /// Unique clip ID.
    pub id: Uuid,
    /// Weak reference to the backing [`MediaItem`] (lookup only).
    pub media_id: Uuid,
    pub kind: MediaKind,
    /// Display name in the timeline.
    pub name: String,
    /// Timeline in point, seconds. Invariant: `end > start`.
    pub start: f64,
    /// Timeline out point, seconds.
    pub end: f64,
    /// Source-media in point, seconds (video/audio only).
    pub trim_start: f64,
    /// Source-media out point, seconds (video/audio only).
    pub trim_end: f64,
    /// Layer index; lower = higher visual layer.
    pub track_index: usize,
    /// Canvas placement. `None` for pure audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial: Option<SpatialProps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style: Option<TextStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_style: Option<MediaStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropArea>,
}

impl TimelineClip {
    /// Create a clip for a media item, spanning `[start, end)` on track 0.
    ///
    /// Visual kinds get a centered spatial block sized from the item's
    /// natural dimensions (or a default); trimmable kinds get a source
    /// window covering `[0, end - start)`.
    pub fn from_media(item: &MediaItem, start: f64, end: f64, canvas: Vec2) -> Self {
        let duration = end - start;
        let spatial = item.kind.is_visual().then(|| {
            let natural = match (item.width, item.height) {
                (Some(w), Some(h)) => Vec2::new(w as f32, h as f32),
                _ => Vec2::new(640.0, 360.0),
            };
            let mut props = SpatialProps::centered(natural, canvas);
            props.clamp_to(canvas);
            props
        });

        Self {
            id: Uuid::new_v4(),
            media_id: item.id,
            kind: item.kind,
            name: item.name.clone(),
            start,
            end,
            trim_start: 0.0,
            trim_end: if item.kind.is_trimmable() { duration } else { 0.0 },
            track_index: 0,
            spatial,
            text_style: (item.kind == MediaKind::Text).then(TextStyle::default),
            media_style: matches!(item.kind, MediaKind::Video | MediaKind::Image)
                .then(MediaStyle::default),
            crop: None,
        }
    }

    /// Timeline duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the clip is under the playhead at `time`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Clone with a fresh identity, for paste.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy
    }
}
