//! Incremental rendering cache and decoration compositor for text views.

/// Caret blink phase tracking.
pub mod caret;
/// View configuration loading and defaults.
pub mod config;
/// Shared defaults and environment keys.
pub mod constants;
/// Per-frame decoration compilation.
pub mod decorations;
#[cfg(test)]
mod env;
/// Theme and configuration error types.
pub mod error;
/// Frame orchestration and painting.
pub mod frame;
/// Generation-stamped cache map.
pub mod generation;
/// Highlight and row geometry.
pub mod geometry;
/// Shaped layout cache.
pub mod layout_cache;
/// Display model types and traits.
pub mod model;
/// Text shaping seam.
pub mod shaping;
/// Style values, cache and cascade.
pub mod style;
/// UTF-16 column translation.
pub mod text_index;

pub use caret::CaretBlink;
pub use config::ViewConfig;
pub use decorations::{constrain_range_to_rows, FrameDecorations, HighlightSpan};
pub use error::{ConfigError, StyleError};
pub use frame::{FrameRenderer, FrameStats, HitTarget, PaintSurface, Viewport};
pub use layout_cache::{GutterLabel, LayoutCache};
pub use model::{
    Decoration, DecorationKind, DecorationProperties, DisplayModel, Marker, Point, RowFilter,
    ScopeId, ScopeNames, ScreenLine, ScreenRange, Tag,
};
pub use shaping::{FontMetrics, ShapedLine, TextShaper};
pub use style::{ClassPath, Rgba, StyleCache, StyleResolver, StyleSheet};
