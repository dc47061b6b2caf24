//! Cutline Core - Foundation types for the editing engine
//!
//! This crate provides the fundamental types used throughout Cutline:
//! - Error types shared by all engine crates
//! - Canvas ratios, their base pixel sizes, and the ratio-switch
//!   coordinate remapping

pub mod canvas;
pub mod error;

pub use canvas::{Canvas, CanvasRatio, remap_position};
pub use error::{CutlineError, Result};
