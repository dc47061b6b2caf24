//! Canvas ratios and the ratio-switch coordinate remapping.
//!
//! Every clip's spatial fields are expressed in the fixed base pixel frame
//! of the current output ratio, independent of on-screen zoom. Switching
//! ratio re-anchors each clip so its *center fraction* of the canvas is
//! preserved, then clamps the result back inside the new frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Output aspect ratio of the project canvas.
///
/// The serialized names ("16:9", ...) are part of the persisted snapshot
/// contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanvasRatio {
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "9:16")]
    Vertical,
    #[serde(rename = "1:1")]
    Square,
}

impl CanvasRatio {
    /// Base pixel size of the coordinate frame for this ratio.
    ///
    /// This table is part of the persisted contract: all clip `x,y,width,
    /// height` values are expressed in this frame.
    pub const fn base_size(self) -> (u32, u32) {
        match self {
            CanvasRatio::Widescreen => (1920, 1080),
            CanvasRatio::Vertical => (1080, 1920),
            CanvasRatio::Square => (1080, 1080),
        }
    }

    /// Display label, identical to the serialized form.
    pub const fn label(self) -> &'static str {
        match self {
            CanvasRatio::Widescreen => "16:9",
            CanvasRatio::Vertical => "9:16",
            CanvasRatio::Square => "1:1",
        }
    }
}

impl Default for CanvasRatio {
    fn default() -> Self {
        CanvasRatio::Widescreen
    }
}

/// The live canvas record: base size, background, and the ratio that
/// determined the size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub ratio: CanvasRatio,
}

impl Canvas {
    /// Create a canvas at the base size of the given ratio.
    pub fn new(ratio: CanvasRatio) -> Self {
        let (width, height) = ratio.base_size();
        Self {
            width,
            height,
            background_color: "#000000".to_string(),
            ratio,
        }
    }

    /// Switch to a new ratio, updating the base size from the table.
    pub fn set_ratio(&mut self, ratio: CanvasRatio) {
        let (width, height) = ratio.base_size();
        self.width = width;
        self.height = height;
        self.ratio = ratio;
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasRatio::default())
    }
}

/// Remap a clip's top-left position from one base canvas size to another.
///
/// The clip's center is taken as a fraction of the old canvas, re-anchored
/// at the same fraction of the new canvas, and the top-left recomputed from
/// the unchanged width/height. The result is clamped into
/// `[0, Wn - w] x [0, Hn - h]` so no clip ends up outside the new frame
/// (a degenerate range, clip larger than the canvas, clamps to 0).
pub fn remap_position(
    position: Vec2,
    size: Vec2,
    old_canvas: Vec2,
    new_canvas: Vec2,
) -> Vec2 {
    let center_fraction = (position + size * 0.5) / old_canvas;
    let new_center = center_fraction * new_canvas;
    let unclamped = new_center - size * 0.5;

    Vec2::new(
        unclamped.x.clamp(0.0, (new_canvas.x - size.x).max(0.0)),
        unclamped.y.clamp(0.0, (new_canvas.y - size.y).max(0.0)),
    )
}
