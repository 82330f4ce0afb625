//! Defaults and environment keys shared by the core and the GUI crate.

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;
/// Line height as a multiple of the font size.
pub const DEFAULT_LINE_HEIGHT_FACTOR: f32 = 1.5;
/// Full caret blink period; the caret toggles every half period.
pub const DEFAULT_CARET_BLINK_MS: u64 = 800;
/// Opacity the gutter layer is composited with.
pub const DEFAULT_GUTTER_OPACITY: f32 = 0.6;

/// Caret width in logical pixels.
pub const CARET_WIDTH: f32 = 2.0;
/// Vertical margin kept around a revealed range when autoscrolling.
pub const AUTOSCROLL_MARGIN: f32 = 50.0;

pub const FONT_SIZE_ENV: &str = "ROWPAINT_FONT_SIZE";
pub const LINE_HEIGHT_FACTOR_ENV: &str = "ROWPAINT_LINE_HEIGHT_FACTOR";
pub const CARET_BLINK_MS_ENV: &str = "ROWPAINT_CARET_BLINK_MS";
pub const GUTTER_OPACITY_ENV: &str = "ROWPAINT_GUTTER_OPACITY";
pub const PERF_LOG_ENV: &str = "ROWPAINT_PERF_LOG";
