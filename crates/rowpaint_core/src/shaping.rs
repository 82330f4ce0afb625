//! Shaping seam between the caches and a concrete text backend.
//!
//! The layout cache only needs to build a shaped line from text plus styled
//! runs; painting and hit-testing go through [`ShapedLine`]. Everything is
//! byte-addressed here and translated to UTF-16 columns via
//! [`text_index`](crate::text_index).

use crate::model::{ScopeNames, ScreenLine, Tag};
use crate::style::{ClassPath, FontStyle, FontWeight, Rgba, StyleCache, StyleProperty};
use crate::text_index;
use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Vertical and horizontal metrics of the editor font, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub font_size: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Advance of one cell (`"m"` for proportional fonts).
    pub char_width: f32,
}

/// Result of a shaper hit test.
///
/// `byte` is the start of the grapheme under `x`; `trailing` is the number
/// of codepoints to advance when `x` lies past the grapheme's midpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitIndex {
    pub byte: usize,
    pub trailing: usize,
}

/// Text attributes for one byte range of a screen line.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledRun {
    pub bytes: Range<usize>,
    pub color: Rgba,
    pub weight: FontWeight,
    pub style: FontStyle,
}

/// A shaped, immutable line layout.
pub trait ShapedLine {
    fn text(&self) -> &str;

    fn width(&self) -> f32;

    /// Leading x of the grapheme containing `byte`; `width()` at the end.
    fn x_for_byte(&self, byte: usize) -> f32;

    fn hit_test(&self, x: f32) -> HitIndex;

    fn x_for_column(&self, column: usize) -> f32 {
        self.x_for_byte(text_index::column_to_byte(self.text(), column))
    }

    /// Nearest UTF-16 column boundary to `x`.
    fn column_at_x(&self, x: f32) -> usize {
        let hit = self.hit_test(x);
        text_index::resolve_hit(self.text(), hit.byte, hit.trailing)
    }
}

/// Text backend producing shaped lines.
pub trait TextShaper {
    type Line: ShapedLine;

    /// Shape a screen line with colors and font attributes baked in.
    fn shape_line(&mut self, text: &str, runs: &[StyledRun]) -> Self::Line;

    /// Shape a gutter label; its color is supplied when drawn.
    fn shape_label(&mut self, text: &str) -> Self::Line;

    fn font_metrics(&self) -> FontMetrics;
}

/// Class path seed for every screen line.
pub const LINE_CLASS: &str = "line";

/// Convert a screen line's tags to styled byte runs.
///
/// A run is cut at every open or close tag and resolved for the classes
/// open at that point. Text after the last tag keeps the base line style.
pub fn styled_runs(line: &ScreenLine, styles: &mut StyleCache, scopes: &dyn ScopeNames) -> Vec<StyledRun> {
    let mut runs = Vec::new();
    let mut path = ClassPath::new([LINE_CLASS]);
    let mut column = 0usize;
    let mut last_column = 0usize;
    let mut emit = |path: &ClassPath, from: usize, to: usize, runs: &mut Vec<StyledRun>| {
        if from >= to {
            return;
        }
        let start = text_index::column_to_byte(&line.text, from);
        let end = text_index::column_to_byte(&line.text, to);
        if start >= end {
            return;
        }
        runs.push(StyledRun {
            bytes: start..end,
            color: styles.color(path, StyleProperty::Color),
            weight: styles.font_weight(path),
            style: styles.font_style(path),
        });
    };

    for tag in &line.tags {
        match *tag {
            Tag::Advance(len) => column += len,
            Tag::Open(scope) => {
                emit(&path, last_column, column, &mut runs);
                last_column = column;
                path.push(scopes.class_name(scope));
            }
            Tag::Close(_) => {
                emit(&path, last_column, column, &mut runs);
                last_column = column;
                // Unbalanced closes never pop the line seed.
                if path.len() > 1 {
                    path.pop();
                }
            }
        }
    }
    let total = text_index::utf16_len(&line.text);
    emit(&path, last_column, total, &mut runs);
    runs
}

/// Fixed-advance shaper: one cell per terminal column of each grapheme.
///
/// Used headless and in tests; wide graphemes take two cells.
#[derive(Clone, Debug)]
pub struct MonospaceShaper {
    metrics: FontMetrics,
}

impl MonospaceShaper {
    pub fn new(metrics: FontMetrics) -> Self {
        Self { metrics }
    }

    /// 8 px cells, 14 px font.
    pub fn with_cell_width(char_width: f32) -> Self {
        Self::new(FontMetrics {
            font_size: 14.0,
            ascent: 11.0,
            descent: 3.0,
            char_width,
        })
    }
}

impl Default for MonospaceShaper {
    fn default() -> Self {
        Self::with_cell_width(8.0)
    }
}

impl TextShaper for MonospaceShaper {
    type Line = MonospaceLine;

    fn shape_line(&mut self, text: &str, runs: &[StyledRun]) -> MonospaceLine {
        MonospaceLine::new(text, runs.to_vec(), self.metrics.char_width)
    }

    fn shape_label(&mut self, text: &str) -> MonospaceLine {
        MonospaceLine::new(text, Vec::new(), self.metrics.char_width)
    }

    fn font_metrics(&self) -> FontMetrics {
        self.metrics
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cluster {
    byte: usize,
    chars: usize,
    x: f32,
    width: f32,
}

/// Line shaped by [`MonospaceShaper`].
#[derive(Clone, Debug, PartialEq)]
pub struct MonospaceLine {
    text: String,
    runs: Vec<StyledRun>,
    clusters: Vec<Cluster>,
    width: f32,
}

impl MonospaceLine {
    fn new(text: &str, runs: Vec<StyledRun>, char_width: f32) -> Self {
        let mut x = 0.0;
        let clusters = text
            .grapheme_indices(true)
            .map(|(byte, grapheme)| {
                let width = grapheme.width().max(1) as f32 * char_width;
                let cluster = Cluster {
                    byte,
                    chars: grapheme.chars().count(),
                    x,
                    width,
                };
                x += width;
                cluster
            })
            .collect();
        Self {
            text: text.to_string(),
            runs,
            clusters,
            width: x,
        }
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }
}

impl ShapedLine for MonospaceLine {
    fn text(&self) -> &str {
        &self.text
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn x_for_byte(&self, byte: usize) -> f32 {
        if byte >= self.text.len() {
            return self.width;
        }
        match self.clusters.binary_search_by(|c| c.byte.cmp(&byte)) {
            Ok(idx) => self.clusters[idx].x,
            Err(0) => 0.0,
            Err(idx) => self.clusters[idx - 1].x,
        }
    }

    fn hit_test(&self, x: f32) -> HitIndex {
        if x <= 0.0 {
            return HitIndex::default();
        }
        let idx = self
            .clusters
            .partition_point(|c| c.x + c.width <= x)
            .min(self.clusters.len().saturating_sub(1));
        let Some(cluster) = self.clusters.get(idx) else {
            return HitIndex::default();
        };
        let trailing = if x >= cluster.x + cluster.width / 2.0 {
            cluster.chars
        } else {
            0
        };
        HitIndex {
            byte: cluster.byte,
            trailing,
        }
    }
}
