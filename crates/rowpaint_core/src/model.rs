//! Types consumed from the external display model.
//!
//! The display model owns the document, the wrapped screen lines and the
//! decoration markers. The renderer only reads these values for the rows it
//! is about to paint.

use std::cmp::Ordering;
use std::ops::Range;

/// Screen position. `column` counts UTF-16 code units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Normalized screen range (`start <= end`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScreenRange {
    pub start: Point,
    pub end: Point,
}

impl ScreenRange {
    /// Build a range from two points in either order.
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_single_row(&self) -> bool {
        self.start.row == self.end.row
    }
}

/// Identifier of a semantic span (syntax scope) inside a screen line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// Markup tag of a screen line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Advance through `n` UTF-16 code units of text.
    Advance(usize),
    /// Open a semantic span.
    Open(ScopeId),
    /// Close the innermost open span.
    Close(ScopeId),
}

/// One wrapped line as produced by the display model.
///
/// Equality and hashing cover text and tags only, so two lines with the same
/// content share one cached layout regardless of where they came from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScreenLine {
    pub text: String,
    pub tags: Vec<Tag>,
}

impl ScreenLine {
    pub fn new(text: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            text: text.into(),
            tags,
        }
    }

    /// A line with no markup besides one advance over the whole text.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = crate::text_index::utf16_len(&text);
        let tags = if len == 0 {
            Vec::new()
        } else {
            vec![Tag::Advance(len)]
        };
        Self { text, tags }
    }
}

/// Document range with a head/tail orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Marker {
    pub range: ScreenRange,
    /// `true` when the head sits at `range.start`.
    pub reversed: bool,
}

impl Marker {
    pub fn new(range: ScreenRange, reversed: bool) -> Self {
        Self { range, reversed }
    }

    /// Zero-width marker, e.g. a bare cursor.
    pub fn at(point: Point) -> Self {
        Self {
            range: ScreenRange::new(point, point),
            reversed: false,
        }
    }

    /// Build from tail and head, deriving orientation.
    pub fn from_tail_head(tail: Point, head: Point) -> Self {
        Self {
            range: ScreenRange::new(tail, head),
            reversed: head < tail,
        }
    }

    pub fn head(&self) -> Point {
        if self.reversed {
            self.range.start
        } else {
            self.range.end
        }
    }

    pub fn tail(&self) -> Point {
        if self.reversed {
            self.range.end
        } else {
            self.range.start
        }
    }
}

/// Row filters shared by line and line-number decorations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub only_head: bool,
    pub only_empty: bool,
    pub only_non_empty: bool,
    pub omit_empty_last_row: bool,
}

/// What a decoration paints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecorationKind {
    /// Adds a class to the text line background.
    Line(RowFilter),
    /// Adds a class to the gutter row.
    LineNumber(RowFilter),
    /// Paints the marker range as a highlight region.
    Highlight,
    /// Paints a caret at the marker head.
    Cursor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecorationProperties {
    pub kind: DecorationKind,
    pub class: String,
}

impl DecorationProperties {
    pub fn new(kind: DecorationKind, class: impl Into<String>) -> Self {
        Self {
            kind,
            class: class.into(),
        }
    }
}

/// A marker together with every decoration attached to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoration {
    pub marker: Marker,
    pub properties: Vec<DecorationProperties>,
}

impl Decoration {
    pub fn new(marker: Marker, properties: Vec<DecorationProperties>) -> Self {
        Self { marker, properties }
    }
}

/// Maps scope ids found in [`Tag`]s to class names.
pub trait ScopeNames {
    /// Space-separated class names for `scope`, e.g. `"syntax--keyword"`.
    fn class_name(&self, scope: ScopeId) -> &str;
}

/// Read-only view of the external document/display model.
pub trait DisplayModel: ScopeNames {
    fn screen_line_count(&self) -> usize;

    /// Screen lines for `rows`; `rows` is always within the line count.
    fn screen_lines(&self, rows: Range<usize>) -> Vec<ScreenLine>;

    fn screen_line(&self, row: usize) -> ScreenLine {
        self.screen_lines(row..row + 1)
            .into_iter()
            .next()
            .unwrap_or_default()
    }

    /// Every decoration intersecting `rows`.
    fn decorations_for_rows(&self, rows: Range<usize>) -> Vec<Decoration>;

    /// Buffer row a screen row was wrapped from.
    fn buffer_row_for_screen_row(&self, row: usize) -> usize;
}
