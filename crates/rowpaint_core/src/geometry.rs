//! Pixel geometry for frame painting.

use crate::model::ScreenRange;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pos {
    pub x: f32,
    pub y: f32,
}

impl Pos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= self.x && pos.x < self.right() && pos.y >= self.y && pos.y < self.bottom()
    }
}

/// Horizontal extent of a highlight on one screen row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowSpan {
    pub row: usize,
    pub x_start: f32,
    pub x_end: f32,
}

impl RowSpan {
    /// Rectangle of this span with rows `line_height` tall; `origin` is the
    /// pixel position of row 0, column 0.
    pub fn rect(&self, line_height: f32, origin: Pos) -> Rect {
        Rect::new(
            origin.x + self.x_start,
            origin.y + self.row as f32 * line_height,
            self.x_end - self.x_start,
            line_height,
        )
    }
}

/// Split a highlight into one span per covered row.
///
/// `x_at(row, column)` maps a position to its x offset in the row's layout;
/// it is only called for the start row and for a last row with a non-zero
/// end column. `right_edge` is the width of the text area.
pub fn highlight_row_spans<F>(range: ScreenRange, right_edge: f32, mut x_at: F) -> Vec<RowSpan>
where
    F: FnMut(usize, usize) -> f32,
{
    let ScreenRange { start, end } = range;
    let x_start = x_at(start.row, start.column);
    if start.row == end.row {
        return vec![RowSpan {
            row: start.row,
            x_start,
            x_end: x_at(end.row, end.column),
        }];
    }
    let mut spans = Vec::with_capacity(end.row - start.row + 1);
    spans.push(RowSpan {
        row: start.row,
        x_start,
        x_end: right_edge,
    });
    spans.extend((start.row + 1..end.row).map(|row| RowSpan {
        row,
        x_start: 0.0,
        x_end: right_edge,
    }));
    if end.column > 0 {
        spans.push(RowSpan {
            row: end.row,
            x_start: 0.0,
            x_end: x_at(end.row, end.column),
        });
    }
    spans
}
