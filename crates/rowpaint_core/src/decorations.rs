//! Compiles marker decorations into per-row paint metadata for one frame.

use crate::model::{Decoration, DecorationKind, Marker, Point, RowFilter, ScreenRange};
use std::ops::Range;

/// A highlight range already clipped to the frame's rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightSpan {
    pub range: ScreenRange,
    pub class: String,
}

/// Paint metadata for the rows of one frame.
///
/// `line_classes` and `gutter_classes` are indexed relative to
/// `rows.start`; each entry is a space-joined class list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameDecorations {
    pub rows: Range<usize>,
    pub line_classes: Vec<String>,
    pub gutter_classes: Vec<String>,
    pub highlights: Vec<HighlightSpan>,
    pub cursors: Vec<Point>,
}

impl FrameDecorations {
    pub fn new(rows: Range<usize>) -> Self {
        let count = rows.len();
        Self {
            rows,
            line_classes: vec![String::new(); count],
            gutter_classes: vec![String::new(); count],
            highlights: Vec::new(),
            cursors: Vec::new(),
        }
    }

    /// Compile `decorations` for `rows`, in iteration order.
    pub fn parse(rows: Range<usize>, decorations: &[Decoration]) -> Self {
        let mut frame = Self::new(rows);
        for decoration in decorations {
            frame.add_decoration(decoration);
        }
        frame
    }

    pub fn add_decoration(&mut self, decoration: &Decoration) {
        let marker = &decoration.marker;
        for properties in &decoration.properties {
            match properties.kind {
                DecorationKind::Line(filter) => {
                    for row in self.filtered_rows(marker, filter) {
                        let idx = row - self.rows.start;
                        add_class(&mut self.line_classes[idx], &properties.class);
                    }
                }
                DecorationKind::LineNumber(filter) => {
                    for row in self.filtered_rows(marker, filter) {
                        let idx = row - self.rows.start;
                        add_class(&mut self.gutter_classes[idx], &properties.class);
                    }
                }
                DecorationKind::Highlight => {
                    let range = constrain_range_to_rows(marker.range, self.rows.clone());
                    if range.is_empty() {
                        continue;
                    }
                    self.highlights.push(HighlightSpan {
                        range,
                        class: properties.class.clone(),
                    });
                }
                DecorationKind::Cursor => {
                    let head = marker.head();
                    if self.rows.contains(&head.row) {
                        self.cursors.push(head);
                    }
                }
            }
        }
    }

    /// Frame rows a line or line-number decoration applies to.
    fn filtered_rows(&self, marker: &Marker, filter: RowFilter) -> Range<usize> {
        let range = marker.range;
        let mut omit_last_row = false;
        if range.is_empty() {
            if filter.only_non_empty {
                return 0..0;
            }
        } else {
            if filter.only_empty {
                return 0..0;
            }
            if filter.omit_empty_last_row {
                omit_last_row = range.end.column == 0;
            }
        }

        let (mut first, mut last) = (range.start.row, range.end.row);
        if filter.only_head {
            if marker.reversed {
                last = first;
            } else {
                first = last;
            }
        }
        // Half-open end; the omitted row is the range's own end row.
        let mut end = last + 1;
        if omit_last_row && (first..end).contains(&range.end.row) {
            end = end.min(range.end.row);
        }
        let start = first.max(self.rows.start);
        let end = end.min(self.rows.end);
        if start >= end {
            0..0
        } else {
            start..end
        }
    }

    pub fn line_classes_for(&self, row: usize) -> &str {
        row.checked_sub(self.rows.start)
            .and_then(|idx| self.line_classes.get(idx))
            .map_or("", String::as_str)
    }

    pub fn gutter_classes_for(&self, row: usize) -> &str {
        row.checked_sub(self.rows.start)
            .and_then(|idx| self.gutter_classes.get(idx))
            .map_or("", String::as_str)
    }
}

/// Clip `range` to `rows`.
///
/// A start before `rows.start` moves to column 0 of the first row; an end at
/// or past `rows.end` moves to column 0 of `rows.end`. A range entirely
/// outside the rows becomes the empty default range.
pub fn constrain_range_to_rows(range: ScreenRange, rows: Range<usize>) -> ScreenRange {
    if range.end.row < rows.start || range.start.row >= rows.end {
        return ScreenRange::default();
    }
    let mut clipped = range;
    if clipped.start.row < rows.start {
        clipped.start = Point::new(rows.start, 0);
    }
    if clipped.end.row >= rows.end {
        clipped.end = Point::new(rows.end, 0);
    }
    clipped
}

/// Append `class` to a space-separated class list.
pub fn add_class(classes: &mut String, class: &str) {
    if !classes.is_empty() {
        classes.push(' ');
    }
    classes.push_str(class);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DecorationProperties;

    fn range(start: (usize, usize), end: (usize, usize)) -> ScreenRange {
        ScreenRange::new(Point::new(start.0, start.1), Point::new(end.0, end.1))
    }

    fn line(marker: Marker, filter: RowFilter, class: &str) -> Decoration {
        Decoration::new(
            marker,
            vec![DecorationProperties::new(DecorationKind::Line(filter), class)],
        )
    }

    fn rows_with_class(frame: &FrameDecorations) -> Vec<usize> {
        frame
            .rows
            .clone()
            .filter(|row| !frame.line_classes_for(*row).is_empty())
            .collect()
    }

    #[test]
    fn omit_empty_last_row_drops_row_ending_at_column_zero() {
        let marker = Marker::new(range((0, 0), (2, 0)), false);
        let omit = RowFilter {
            omit_empty_last_row: true,
            ..RowFilter::default()
        };
        let frame = FrameDecorations::parse(0..5, &[line(marker, omit, "selected")]);
        assert_eq!(rows_with_class(&frame), vec![0, 1]);

        let frame = FrameDecorations::parse(0..5, &[line(marker, RowFilter::default(), "selected")]);
        assert_eq!(rows_with_class(&frame), vec![0, 1, 2]);
    }

    #[test]
    fn row_filters_cover_empty_and_head_cases() {
        struct Case {
            name: &'static str,
            marker: Marker,
            filter: RowFilter,
            expected: Vec<usize>,
        }
        let selection = Marker::new(range((1, 2), (3, 4)), false);
        let reversed = Marker::new(range((1, 2), (3, 4)), true);
        let caret = Marker::at(Point::new(2, 5));
        let cases = vec![
            Case {
                name: "only_empty skips a selection",
                marker: selection,
                filter: RowFilter {
                    only_empty: true,
                    ..RowFilter::default()
                },
                expected: vec![],
            },
            Case {
                name: "only_empty keeps a caret",
                marker: caret,
                filter: RowFilter {
                    only_empty: true,
                    ..RowFilter::default()
                },
                expected: vec![2],
            },
            Case {
                name: "only_non_empty skips a caret",
                marker: caret,
                filter: RowFilter {
                    only_non_empty: true,
                    ..RowFilter::default()
                },
                expected: vec![],
            },
            Case {
                name: "both emptiness filters contribute nothing",
                marker: selection,
                filter: RowFilter {
                    only_empty: true,
                    only_non_empty: true,
                    ..RowFilter::default()
                },
                expected: vec![],
            },
            Case {
                name: "only_head on forward marker uses end row",
                marker: selection,
                filter: RowFilter {
                    only_head: true,
                    ..RowFilter::default()
                },
                expected: vec![3],
            },
            Case {
                name: "only_head on reversed marker uses start row",
                marker: reversed,
                filter: RowFilter {
                    only_head: true,
                    ..RowFilter::default()
                },
                expected: vec![1],
            },
            Case {
                name: "omit_empty_last_row ignores non-zero end column",
                marker: selection,
                filter: RowFilter {
                    omit_empty_last_row: true,
                    ..RowFilter::default()
                },
                expected: vec![1, 2, 3],
            },
            Case {
                name: "only_head on reversed range ending at column zero",
                marker: Marker::new(range((1, 0), (3, 0)), true),
                filter: RowFilter {
                    only_head: true,
                    omit_empty_last_row: true,
                    ..RowFilter::default()
                },
                expected: vec![1],
            },
            Case {
                name: "only_head on forward range ending at column zero",
                marker: Marker::new(range((1, 0), (3, 0)), false),
                filter: RowFilter {
                    only_head: true,
                    omit_empty_last_row: true,
                    ..RowFilter::default()
                },
                expected: vec![],
            },
        ];
        for case in cases {
            let frame = FrameDecorations::parse(0..6, &[line(case.marker, case.filter, "x")]);
            assert_eq!(rows_with_class(&frame), case.expected, "{}", case.name);
        }
    }

    #[test]
    fn line_rows_are_clipped_to_the_frame() {
        let marker = Marker::new(range((2, 1), (30, 4)), false);
        let frame = FrameDecorations::parse(10..13, &[line(marker, RowFilter::default(), "x")]);
        assert_eq!(rows_with_class(&frame), vec![10, 11, 12]);

        let outside = Marker::new(range((20, 0), (25, 0)), false);
        let frame = FrameDecorations::parse(10..13, &[line(outside, RowFilter::default(), "x")]);
        assert!(rows_with_class(&frame).is_empty());

        let frame = FrameDecorations::parse(4..4, &[line(marker, RowFilter::default(), "x")]);
        assert!(frame.line_classes.is_empty());
    }

    #[test]
    fn classes_accumulate_in_iteration_order_with_duplicates() {
        let marker = Marker::at(Point::new(1, 0));
        let decorations = [
            Decoration::new(
                marker,
                vec![
                    DecorationProperties::new(DecorationKind::Line(RowFilter::default()), "cursor-line"),
                    DecorationProperties::new(DecorationKind::LineNumber(RowFilter::default()), "cursor-line"),
                ],
            ),
            line(marker, RowFilter::default(), "cursor-line"),
        ];
        let frame = FrameDecorations::parse(0..3, &decorations);
        assert_eq!(frame.line_classes_for(1), "cursor-line cursor-line");
        assert_eq!(frame.gutter_classes_for(1), "cursor-line");
        assert_eq!(frame.line_classes_for(0), "");
        assert_eq!(frame.line_classes_for(7), "");
    }

    #[test]
    fn highlights_are_clipped_and_empty_ones_dropped() {
        let decorations = [
            Decoration::new(
                Marker::new(range((1, 3), (12, 2)), false),
                vec![DecorationProperties::new(DecorationKind::Highlight, "selection")],
            ),
            Decoration::new(
                Marker::at(Point::new(5, 1)),
                vec![DecorationProperties::new(DecorationKind::Highlight, "empty")],
            ),
            Decoration::new(
                Marker::new(range((0, 0), (3, 0)), false),
                vec![DecorationProperties::new(DecorationKind::Highlight, "above")],
            ),
        ];
        let frame = FrameDecorations::parse(4..10, &decorations);
        assert_eq!(
            frame.highlights,
            vec![HighlightSpan {
                range: range((4, 0), (10, 0)),
                class: "selection".to_string(),
            }]
        );
    }

    #[test]
    fn cursors_use_the_marker_head() {
        let decorations = [
            Decoration::new(
                Marker::from_tail_head(Point::new(2, 0), Point::new(4, 7)),
                vec![DecorationProperties::new(DecorationKind::Cursor, "")],
            ),
            Decoration::new(
                Marker::from_tail_head(Point::new(4, 7), Point::new(9, 0)),
                vec![DecorationProperties::new(DecorationKind::Cursor, "")],
            ),
        ];
        let frame = FrameDecorations::parse(3..6, &decorations);
        assert_eq!(frame.cursors, vec![Point::new(4, 7)]);
    }

    #[test]
    fn constrain_is_identity_inside_and_empty_outside() {
        struct Case {
            input: ScreenRange,
            expected: ScreenRange,
        }
        let cases = [
            Case {
                input: range((3, 1), (4, 2)),
                expected: range((3, 1), (4, 2)),
            },
            Case {
                input: range((0, 5), (4, 2)),
                expected: range((2, 0), (4, 2)),
            },
            Case {
                input: range((3, 1), (6, 2)),
                expected: range((3, 1), (5, 0)),
            },
            Case {
                input: range((0, 0), (1, 9)),
                expected: ScreenRange::default(),
            },
            Case {
                input: range((5, 0), (7, 0)),
                expected: ScreenRange::default(),
            },
        ];
        for case in cases {
            let clipped = constrain_range_to_rows(case.input, 2..5);
            assert_eq!(clipped, case.expected, "{:?}", case.input);
            assert_eq!(constrain_range_to_rows(clipped, 2..5), clipped);
        }
    }
}
