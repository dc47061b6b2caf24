//! Media library records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of media asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
    Text,
}

impl MediaKind {
    /// Whether clips of this kind occupy space on the canvas.
    pub const fn is_visual(self) -> bool {
        !matches!(self, MediaKind::Audio)
    }

    /// Whether clips of this kind carry source in/out trim points.
    pub const fn is_trimmable(self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Audio)
    }
}

/// A library asset: imported once, referenced by any number of clips.
///
/// Created on import; mutated only to attach metadata that arrives
/// asynchronously (probed durations, decoded dimensions). Never deleted
/// while a clip still references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Unique, stable asset ID.
    pub id: Uuid,
    pub kind: MediaKind,
    /// Content locator (file path, blob URL, remote URL).
    pub url: String,
    /// Display name in the library.
    pub name: String,
    /// Source duration in seconds (video/audio, once probed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Natural pixel width (image/video, once decoded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Natural pixel height (image/video, once decoded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Preview image locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl MediaItem {
    /// Create a new media item with no probed metadata yet.
    pub fn new(kind: MediaKind, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            url: url.into(),
            name: name.into(),
            duration: None,
            width: None,
            height: None,
            thumbnail: None,
        }
    }

    /// The sentinel asset backing text clips, which have no real source.
    pub fn text_placeholder() -> Self {
        Self::new(MediaKind::Text, "", "Text")
    }

    /// Attach a probed duration (seconds). Async metadata arrival.
    pub fn attach_duration(&mut self, duration: f64) {
        self.duration = Some(duration);
    }

    /// Attach decoded natural dimensions. Async metadata arrival.
    pub fn attach_dimensions(&mut self, width: u32, height: u32) {
        self.width = Some(width);
        self.height = Some(height);
    }
}
