//! Rope-backed demo document exposing wrapped screen lines.
//!
//! Screen rows are fixed-width chunks of buffer lines. The document also
//! owns the cursor (in screen coordinates) and derives the decorations the
//! renderer paints: selection, cursor line, matching brackets and find
//! results.

use ropey::Rope;
use rowpaint_core::model::{
    Decoration, DecorationKind, DecorationProperties, DisplayModel, Marker, Point, RowFilter,
    ScopeId, ScopeNames, ScreenLine, ScreenRange, Tag,
};
use rowpaint_core::text_index;
use std::ops::Range;

/// Class names of the scopes the tokenizer emits, indexed by [`ScopeId`].
pub const SCOPE_NAMES: [&str; 5] = [
    "syntax--keyword",
    "syntax--string",
    "syntax--comment",
    "syntax--constant syntax--numeric",
    "syntax--entity syntax--name syntax--function",
];

const KEYWORD: u32 = 0;
const STRING: u32 = 1;
const COMMENT: u32 = 2;
const NUMBER: u32 = 3;
const FUNCTION: u32 = 4;

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "return", "self", "Self", "static",
    "struct", "trait", "true", "type", "use", "where", "while",
];

/// A token as a char range of its buffer line.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Token {
    chars: Range<usize>,
    scope: u32,
}

fn tokenize(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let start = i;
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            tokens.push(Token {
                chars: start..chars.len(),
                scope: COMMENT,
            });
            break;
        } else if c == '"' {
            i += 1;
            while i < chars.len() && chars[i] != '"' {
                if chars[i] == '\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(chars.len());
            tokens.push(Token {
                chars: start..i,
                scope: STRING,
            });
        } else if c.is_ascii_digit() {
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '.')
            {
                i += 1;
            }
            tokens.push(Token {
                chars: start..i,
                scope: NUMBER,
            });
        } else if c.is_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if KEYWORDS.contains(&word.as_str()) {
                tokens.push(Token {
                    chars: start..i,
                    scope: KEYWORD,
                });
            } else if chars.get(i) == Some(&'(') {
                tokens.push(Token {
                    chars: start..i,
                    scope: FUNCTION,
                });
            }
        } else {
            i += 1;
        }
    }
    tokens
}

fn utf16_units(chars: &[char]) -> usize {
    chars.iter().map(|c| c.len_utf16()).sum()
}

/// Tags for the `window` chars of a tokenized line.
fn tags_for(chars: &[char], tokens: &[Token], window: Range<usize>) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut at = window.start;
    let advance = |tags: &mut Vec<Tag>, from: usize, to: usize| {
        if to > from {
            tags.push(Tag::Advance(utf16_units(&chars[from..to])));
        }
    };
    for token in tokens {
        let start = token.chars.start.max(window.start);
        let end = token.chars.end.min(window.end);
        if start >= end {
            continue;
        }
        advance(&mut tags, at, start);
        tags.push(Tag::Open(ScopeId(token.scope)));
        advance(&mut tags, start, end);
        tags.push(Tag::Close(ScopeId(token.scope)));
        at = end;
    }
    advance(&mut tags, at, window.end);
    tags
}

fn matching_bracket(chars: &[char], at: usize) -> Option<usize> {
    let (open, close, forward) = match chars.get(at)? {
        '(' => ('(', ')', true),
        '[' => ('[', ']', true),
        '{' => ('{', '}', true),
        ')' => ('(', ')', false),
        ']' => ('[', ']', false),
        '}' => ('{', '}', false),
        _ => return None,
    };
    let mut depth = 0usize;
    let indices: Box<dyn Iterator<Item = usize>> = if forward {
        Box::new(at..chars.len())
    } else {
        Box::new((0..=at).rev())
    };
    for idx in indices {
        let c = chars[idx];
        if c == open || c == close {
            let opening = (c == open) == forward;
            if opening {
                depth += 1;
            } else {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
        }
    }
    None
}

/// Cursor motions understood by [`RopeDocument::move_cursor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    RowStart,
    RowEnd,
    DocumentStart,
    DocumentEnd,
}

/// One wrapped row: a char range of a buffer line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ScreenRow {
    buffer_row: usize,
    start: usize,
    end: usize,
}

pub struct RopeDocument {
    rope: Rope,
    wrap_column: Option<usize>,
    rows: Vec<ScreenRow>,
    tail: Point,
    head: Point,
    find: Option<String>,
}

impl RopeDocument {
    pub fn new(text: &str) -> Self {
        let mut doc = Self {
            rope: Rope::from_str(text),
            wrap_column: None,
            rows: Vec::new(),
            tail: Point::default(),
            head: Point::default(),
            find: None,
        };
        doc.rewrap();
        doc
    }

    /// Soft-wrap buffer lines every `column` chars; `None` disables wrapping.
    pub fn set_wrap_column(&mut self, column: Option<usize>) {
        self.wrap_column = column.filter(|c| *c > 0);
        self.rewrap();
        self.tail = self.clamp(self.tail);
        self.head = self.clamp(self.head);
    }

    pub fn wrap_column(&self) -> Option<usize> {
        self.wrap_column
    }

    /// Term highlighted as find results; empty disables.
    pub fn set_find(&mut self, term: Option<String>) {
        self.find = term.filter(|t| !t.is_empty());
    }

    pub fn buffer_line_count(&self) -> usize {
        self.rope.len_lines().max(1)
    }

    fn buffer_line(&self, row: usize) -> String {
        if row >= self.rope.len_lines() {
            return String::new();
        }
        let line = self.rope.line(row).to_string();
        line.trim_end_matches(['\n', '\r']).to_string()
    }

    fn rewrap(&mut self) {
        self.rows.clear();
        for buffer_row in 0..self.buffer_line_count() {
            let len = self.buffer_line(buffer_row).chars().count();
            match self.wrap_column {
                Some(width) if len > width => {
                    let mut start = 0;
                    while start < len {
                        let end = (start + width).min(len);
                        self.rows.push(ScreenRow {
                            buffer_row,
                            start,
                            end,
                        });
                        start = end;
                    }
                }
                _ => self.rows.push(ScreenRow {
                    buffer_row,
                    start: 0,
                    end: len,
                }),
            }
        }
    }

    fn row_text(&self, row: usize) -> String {
        let Some(screen) = self.rows.get(row) else {
            return String::new();
        };
        self.buffer_line(screen.buffer_row)
            .chars()
            .skip(screen.start)
            .take(screen.end - screen.start)
            .collect()
    }

    /// Snap `point` onto an existing row and a code point boundary.
    fn clamp(&self, point: Point) -> Point {
        let row = point.row.min(self.rows.len().saturating_sub(1));
        let text = self.row_text(row);
        let char_index = text_index::column_to_char(&text, point.column);
        Point::new(row, text_index::char_to_column(&text, char_index))
    }

    pub fn cursor(&self) -> Point {
        self.head
    }

    pub fn selection(&self) -> ScreenRange {
        ScreenRange::new(self.tail, self.head)
    }

    /// Place the cursor; `extend` keeps the selection tail.
    pub fn set_cursor(&mut self, point: Point, extend: bool) {
        self.head = self.clamp(point);
        if !extend {
            self.tail = self.head;
        }
    }

    pub fn move_cursor(&mut self, motion: Motion, extend: bool) {
        let Point { row, column } = self.head;
        let text = self.row_text(row);
        let row_end = text_index::utf16_len(&text);
        let last_row = self.rows.len().saturating_sub(1);
        let target = match motion {
            Motion::Left if column > 0 => {
                let char_index = text_index::column_to_char(&text, column);
                Point::new(row, text_index::char_to_column(&text, char_index.saturating_sub(1)))
            }
            Motion::Left if row > 0 => {
                let previous = self.row_text(row - 1);
                Point::new(row - 1, text_index::utf16_len(&previous))
            }
            Motion::Left => self.head,
            Motion::Right if column < row_end => {
                let char_index = text_index::column_to_char(&text, column);
                Point::new(row, text_index::char_to_column(&text, char_index + 1))
            }
            Motion::Right if row < last_row => Point::new(row + 1, 0),
            Motion::Right => self.head,
            Motion::Up if row > 0 => Point::new(row - 1, column),
            Motion::Up => Point::new(0, 0),
            Motion::Down if row < last_row => Point::new(row + 1, column),
            Motion::Down => Point::new(last_row, usize::MAX),
            Motion::RowStart => Point::new(row, 0),
            Motion::RowEnd => Point::new(row, row_end),
            Motion::DocumentStart => Point::new(0, 0),
            Motion::DocumentEnd => Point::new(last_row, usize::MAX),
        };
        self.set_cursor(target, extend);
    }

    /// Move the cursor `delta` rows, keeping its column where possible.
    pub fn move_rows(&mut self, delta: isize, extend: bool) {
        let last_row = self.rows.len().saturating_sub(1) as isize;
        let row = (self.head.row as isize + delta).clamp(0, last_row) as usize;
        self.set_cursor(Point::new(row, self.head.column), extend);
    }

    pub fn select_all(&mut self) {
        self.tail = Point::default();
        self.move_cursor(Motion::DocumentEnd, true);
    }

    /// Screen position of a char offset in a buffer line.
    fn screen_point(&self, buffer_row: usize, char_index: usize) -> Option<Point> {
        let first = self.rows.partition_point(|r| r.buffer_row < buffer_row);
        let rows = &self.rows[first..];
        let last = rows.partition_point(|r| r.buffer_row == buffer_row);
        let (offset, screen) = rows[..last]
            .iter()
            .enumerate()
            .find(|(idx, r)| char_index < r.end || *idx + 1 == last)?;
        let text = self.row_text(first + offset);
        let local = char_index.saturating_sub(screen.start);
        Some(Point::new(first + offset, text_index::char_to_column(&text, local)))
    }

    fn char_range(&self, buffer_row: usize, chars: Range<usize>) -> Option<ScreenRange> {
        let start = self.screen_point(buffer_row, chars.start)?;
        let end = self.screen_point(buffer_row, chars.end)?;
        Some(ScreenRange::new(start, end))
    }

    fn bracket_decorations(&self) -> Vec<Decoration> {
        let Some(screen) = self.rows.get(self.head.row) else {
            return Vec::new();
        };
        let text = self.row_text(self.head.row);
        let head = screen.start + text_index::column_to_char(&text, self.head.column);
        let line: Vec<char> = self.buffer_line(screen.buffer_row).chars().collect();
        let candidates = [Some(head), head.checked_sub(1)];
        let Some((at, other)) = candidates
            .into_iter()
            .flatten()
            .find_map(|at| matching_bracket(&line, at).map(|other| (at, other)))
        else {
            return Vec::new();
        };
        [at, other]
            .into_iter()
            .filter_map(|c| self.char_range(screen.buffer_row, c..c + 1))
            .map(|range| highlight(range, "bracket-matcher"))
            .collect()
    }

    fn find_decorations(&self, rows: Range<usize>) -> Vec<Decoration> {
        let Some(term) = self.find.as_deref() else {
            return Vec::new();
        };
        let term_chars = term.chars().count();
        let mut buffer_rows: Vec<usize> = self.rows[rows].iter().map(|r| r.buffer_row).collect();
        buffer_rows.dedup();
        let mut decorations = Vec::new();
        for buffer_row in buffer_rows {
            let line = self.buffer_line(buffer_row);
            for (byte, _) in line.match_indices(term) {
                let start = line[..byte].chars().count();
                if let Some(range) = self.char_range(buffer_row, start..start + term_chars) {
                    decorations.push(highlight(range, "find-result"));
                }
            }
        }
        decorations
    }
}

fn highlight(range: ScreenRange, class: &str) -> Decoration {
    Decoration::new(
        Marker::new(range, false),
        vec![DecorationProperties::new(DecorationKind::Highlight, class)],
    )
}

fn intersects(range: ScreenRange, rows: &Range<usize>) -> bool {
    range.end.row >= rows.start && range.start.row < rows.end
}

impl ScopeNames for RopeDocument {
    fn class_name(&self, scope: ScopeId) -> &str {
        SCOPE_NAMES.get(scope.0 as usize).copied().unwrap_or("")
    }
}

impl DisplayModel for RopeDocument {
    fn screen_line_count(&self) -> usize {
        self.rows.len()
    }

    fn screen_lines(&self, rows: Range<usize>) -> Vec<ScreenLine> {
        let mut lines = Vec::with_capacity(rows.len());
        let mut cached: Option<(usize, Vec<char>, Vec<Token>)> = None;
        for screen in &self.rows[rows] {
            if cached.as_ref().map(|(row, _, _)| *row) != Some(screen.buffer_row) {
                let line = self.buffer_line(screen.buffer_row);
                let tokens = tokenize(&line);
                cached = Some((screen.buffer_row, line.chars().collect(), tokens));
            }
            let Some((_, chars, tokens)) = cached.as_ref() else {
                continue;
            };
            let text: String = chars[screen.start..screen.end].iter().collect();
            lines.push(ScreenLine::new(
                text,
                tags_for(chars, tokens, screen.start..screen.end),
            ));
        }
        lines
    }

    fn decorations_for_rows(&self, rows: Range<usize>) -> Vec<Decoration> {
        let cursor = Decoration::new(
            Marker::from_tail_head(self.tail, self.head),
            vec![
                DecorationProperties::new(DecorationKind::Highlight, "selection"),
                DecorationProperties::new(DecorationKind::Cursor, "cursor"),
                DecorationProperties::new(
                    DecorationKind::Line(RowFilter {
                        only_empty: true,
                        ..RowFilter::default()
                    }),
                    "cursor-line",
                ),
                DecorationProperties::new(
                    DecorationKind::LineNumber(RowFilter::default()),
                    "cursor-line",
                ),
            ],
        );
        let mut decorations = self.find_decorations(rows.clone());
        decorations.extend(self.bracket_decorations());
        decorations.push(cursor);
        decorations.retain(|d| intersects(d.marker.range, &rows));
        decorations
    }

    fn buffer_row_for_screen_row(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, |r| r.buffer_row)
    }
}
