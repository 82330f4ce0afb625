//! Shared fakes for renderer integration tests.

#![allow(dead_code)]

use rowpaint_core::frame::{PaintSurface, Viewport};
use rowpaint_core::geometry::{Pos, Rect};
use rowpaint_core::model::{Decoration, DisplayModel, ScopeId, ScopeNames, ScreenLine};
use rowpaint_core::shaping::{
    FontMetrics, MonospaceLine, MonospaceShaper, ShapedLine, StyledRun, TextShaper,
};
use rowpaint_core::style::{Rgba, StyleSheet};
use rowpaint_core::{FrameRenderer, ViewConfig};
use std::ops::Range;
use std::sync::Arc;

/// Cell width of the test shaper; rows are 21 px tall (14 px * 1.5).
pub(crate) const CELL: f32 = 8.0;
pub(crate) const LINE_HEIGHT: f32 = 21.0;

pub(crate) fn hex(color: &str) -> Rgba {
    Rgba::from_hex(color).expect("hex color")
}

/// In-memory display model.
#[derive(Default)]
pub(crate) struct FakeModel {
    pub lines: Vec<ScreenLine>,
    /// Buffer row per screen row; identity when empty.
    pub buffer_rows: Vec<usize>,
    pub decorations: Vec<Decoration>,
    pub scopes: Vec<String>,
}

impl FakeModel {
    pub(crate) fn plain(texts: &[&str]) -> Self {
        Self {
            lines: texts.iter().map(|text| ScreenLine::plain(*text)).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn numbered(count: usize) -> Self {
        Self {
            lines: (0..count)
                .map(|row| ScreenLine::plain(format!("line {}", row)))
                .collect(),
            ..Self::default()
        }
    }
}

impl ScopeNames for FakeModel {
    fn class_name(&self, scope: ScopeId) -> &str {
        self.scopes
            .get(scope.0 as usize)
            .map_or("", String::as_str)
    }
}

impl DisplayModel for FakeModel {
    fn screen_line_count(&self) -> usize {
        self.lines.len()
    }

    fn screen_lines(&self, rows: Range<usize>) -> Vec<ScreenLine> {
        self.lines[rows].to_vec()
    }

    fn decorations_for_rows(&self, rows: Range<usize>) -> Vec<Decoration> {
        self.decorations
            .iter()
            .filter(|d| d.marker.range.end.row >= rows.start && d.marker.range.start.row < rows.end)
            .cloned()
            .collect()
    }

    fn buffer_row_for_screen_row(&self, row: usize) -> usize {
        self.buffer_rows.get(row).copied().unwrap_or(row)
    }
}

/// Monospace shaper that counts shaping calls.
#[derive(Default)]
pub(crate) struct CountingShaper {
    inner: MonospaceShaper,
    pub lines: usize,
    pub labels: usize,
}

impl TextShaper for CountingShaper {
    type Line = MonospaceLine;

    fn shape_line(&mut self, text: &str, runs: &[StyledRun]) -> MonospaceLine {
        self.lines += 1;
        self.inner.shape_line(text, runs)
    }

    fn shape_label(&mut self, text: &str) -> MonospaceLine {
        self.labels += 1;
        self.inner.shape_label(text)
    }

    fn font_metrics(&self) -> FontMetrics {
        self.inner.font_metrics()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    Fill {
        rect: Rect,
        color: Rgba,
    },
    Line {
        from: Pos,
        to: Pos,
        width: f32,
        color: Rgba,
    },
    Text {
        text: String,
        baseline: Pos,
        color: Option<Rgba>,
        /// Colors baked in at shaping time, one per styled run.
        run_colors: Vec<Rgba>,
        layout: usize,
    },
    PushLayer,
    PopLayer {
        opacity: f32,
    },
}

/// Surface recording every paint call in order.
#[derive(Default)]
pub(crate) struct RecordingSurface {
    pub ops: Vec<Op>,
}

impl RecordingSurface {
    pub(crate) fn fills_with(&self, color: Rgba) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Fill { rect, color: c } if *c == color => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn texts(&self) -> Vec<(String, Pos, Option<Rgba>)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text {
                    text,
                    baseline,
                    color,
                    ..
                } => Some((text.clone(), *baseline, *color)),
                _ => None,
            })
            .collect()
    }

    /// Layout address of the first text op drawing `text` with its own colors.
    pub(crate) fn line_layout(&self, text: &str) -> Option<usize> {
        self.ops.iter().find_map(|op| match op {
            Op::Text {
                text: t,
                color: None,
                layout,
                ..
            } if t == text => Some(*layout),
            _ => None,
        })
    }

    /// Index of the first op matching `pred`.
    pub(crate) fn position(&self, pred: impl Fn(&Op) -> bool) -> Option<usize> {
        self.ops.iter().position(pred)
    }
}

impl PaintSurface<MonospaceLine> for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.ops.push(Op::Fill { rect, color });
    }

    fn draw_line(&mut self, from: Pos, to: Pos, width: f32, color: Rgba) {
        self.ops.push(Op::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn draw_text(&mut self, layout: &Arc<MonospaceLine>, baseline: Pos, color: Option<Rgba>) {
        self.ops.push(Op::Text {
            text: layout.text().to_string(),
            baseline,
            color,
            run_colors: layout.runs().iter().map(|run| run.color).collect(),
            layout: Arc::as_ptr(layout) as usize,
        });
    }

    fn push_layer(&mut self) {
        self.ops.push(Op::PushLayer);
    }

    fn pop_layer(&mut self, opacity: f32) {
        self.ops.push(Op::PopLayer { opacity });
    }
}

pub(crate) const BACKGROUND: &str = "#000000";
pub(crate) const TEXT: &str = "#ffffff";
pub(crate) const GUTTER_TEXT: &str = "#808080";
pub(crate) const GUTTER_CURRENT: &str = "#111111";
pub(crate) const LINE_CURRENT: &str = "#222222";
pub(crate) const SELECTION: &str = "#333333";
pub(crate) const BRACKET_BORDER: &str = "#ff00ff";
pub(crate) const CURSOR: &str = "#00ff00";
pub(crate) const KEYWORD: &str = "#ff0000";

pub(crate) fn test_theme() -> StyleSheet {
    let mut sheet = StyleSheet::new();
    sheet
        .rule(
            "atom-text-editor",
            &[("background-color", BACKGROUND), ("color", TEXT)],
        )
        .expect("root rule")
        .rule(".gutter .line-number", &[("color", GUTTER_TEXT)])
        .expect("gutter rule")
        .rule(
            ".gutter .line-number.cursor-line",
            &[("background-color", GUTTER_CURRENT)],
        )
        .expect("gutter current rule")
        .rule(".line.cursor-line", &[("background-color", LINE_CURRENT)])
        .expect("line rule")
        .rule(
            ".highlights .highlight.selection .region",
            &[("background-color", SELECTION)],
        )
        .expect("selection rule")
        .rule(
            ".highlights .highlight.bracket .region",
            &[
                ("border-bottom-style", "solid"),
                ("border-bottom-color", BRACKET_BORDER),
            ],
        )
        .expect("bracket rule")
        .rule(".cursor", &[("border-left-color", CURSOR)])
        .expect("cursor rule")
        .rule(".syntax--keyword", &[("color", KEYWORD)])
        .expect("keyword rule");
    sheet
}

pub(crate) fn renderer() -> FrameRenderer<CountingShaper> {
    FrameRenderer::new(
        CountingShaper::default(),
        Box::new(test_theme()),
        ViewConfig::default(),
    )
}

/// Viewport showing `rows` full rows from `first_row`.
pub(crate) fn viewport_at(first_row: usize, rows: usize) -> Viewport {
    Viewport::new(
        first_row as f32 * LINE_HEIGHT,
        800.0,
        rows as f32 * LINE_HEIGHT,
    )
}
