//! Content-addressed cache of shaped screen lines and gutter labels.
//!
//! Screen lines are keyed by `(text, tags)`, so a line that merely moved
//! (scrolling, edits above it) keeps its layout. Layouts are handed out as
//! `Arc`s: eviction never invalidates a handle that painting still holds.

use crate::generation::{CacheStats, GenerationalCache};
use crate::model::{ScopeNames, ScreenLine};
use crate::shaping::{styled_runs, ShapedLine, TextShaper};
use crate::style::StyleCache;
use std::sync::Arc;
use tracing::debug;

/// Glyph drawn in the gutter for soft-wrapped continuation rows.
pub const SOFT_WRAP_GLYPH: &str = "\u{2022}";

/// Text shown in the gutter for one screen row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GutterLabel {
    /// Zero-based buffer row, drawn one-based.
    BufferRow(usize),
    /// Continuation of the previous screen row's buffer row.
    SoftWrap,
}

impl GutterLabel {
    pub fn text(&self) -> String {
        match self {
            GutterLabel::BufferRow(row) => (row + 1).to_string(),
            GutterLabel::SoftWrap => SOFT_WRAP_GLYPH.to_string(),
        }
    }
}

/// Collaborators needed to shape a screen line on a cache miss.
pub struct ShapingContext<'a, S> {
    pub shaper: &'a mut S,
    pub styles: &'a mut StyleCache,
    pub scopes: &'a dyn ScopeNames,
}

/// Counters of both buckets, plus current sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutCacheStats {
    pub lines: CacheStats,
    pub line_numbers: CacheStats,
    pub cached_lines: usize,
    pub cached_line_numbers: usize,
}

pub struct LayoutCache<L> {
    lines: GenerationalCache<ScreenLine, Arc<L>>,
    line_numbers: GenerationalCache<GutterLabel, Arc<L>>,
}

impl<L> Default for LayoutCache<L> {
    fn default() -> Self {
        Self {
            lines: GenerationalCache::default(),
            line_numbers: GenerationalCache::default(),
        }
    }
}

impl<L: ShapedLine> LayoutCache<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shaped layout for `line`, building it on a miss.
    ///
    /// Never evicts; safe to call outside a frame (hit testing).
    pub fn get_layout<S>(&mut self, line: &ScreenLine, cx: &mut ShapingContext<'_, S>) -> Arc<L>
    where
        S: TextShaper<Line = L>,
    {
        self.lines.get_or_insert_with(line, || {
            let runs = styled_runs(line, cx.styles, cx.scopes);
            Arc::new(cx.shaper.shape_line(&line.text, &runs))
        })
    }

    /// Layouts for one frame's lines, in order.
    ///
    /// Starts a new line generation and sweeps afterwards: every cached
    /// screen line not in `lines` is dropped.
    pub fn get_layouts<S>(&mut self, lines: &[ScreenLine], cx: &mut ShapingContext<'_, S>) -> Vec<Arc<L>>
    where
        S: TextShaper<Line = L>,
    {
        self.lines.increment_generation();
        let layouts = lines
            .iter()
            .map(|line| self.get_layout(line, cx))
            .collect();
        let evicted = self.lines.collect_garbage();
        if evicted > 0 {
            debug!(evicted, cached = self.lines.len(), "layout cache sweep");
        }
        layouts
    }

    /// Shaped gutter label, cached in its own bucket.
    pub fn get_line_number<S>(&mut self, label: GutterLabel, shaper: &mut S) -> Arc<L>
    where
        S: TextShaper<Line = L>,
    {
        self.line_numbers
            .get_or_insert_with(&label, || Arc::new(shaper.shape_label(&label.text())))
    }

    /// Start a new gutter label generation.
    pub fn begin_frame(&mut self) {
        self.line_numbers.increment_generation();
    }

    /// Sweep both buckets.
    ///
    /// # Returns
    /// Number of evicted layouts.
    pub fn collect_garbage(&mut self) -> usize {
        self.lines.collect_garbage() + self.line_numbers.collect_garbage()
    }

    /// Drop shaped screen lines; gutter labels carry no style and survive.
    pub fn invalidate_lines(&mut self) {
        self.lines.clear();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.line_numbers.clear();
    }

    pub fn contains(&self, line: &ScreenLine) -> bool {
        self.lines.contains(line)
    }

    pub fn stats(&self) -> LayoutCacheStats {
        LayoutCacheStats {
            lines: self.lines.stats(),
            line_numbers: self.line_numbers.stats(),
            cached_lines: self.lines.len(),
            cached_line_numbers: self.line_numbers.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScopeId;
    use crate::shaping::{FontMetrics, MonospaceLine, MonospaceShaper, StyledRun};
    use crate::style::{ClassPath, StyleProperty, StyleValue};

    struct NoScopes;

    impl ScopeNames for NoScopes {
        fn class_name(&self, _scope: ScopeId) -> &str {
            ""
        }
    }

    #[derive(Default)]
    struct CountingShaper {
        inner: MonospaceShaper,
        lines: usize,
        labels: usize,
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

    fn styles() -> StyleCache {
        StyleCache::new(|_: &ClassPath, _: StyleProperty| -> Option<StyleValue> { None })
    }

    fn lines(texts: &[&str]) -> Vec<ScreenLine> {
        texts.iter().map(|text| ScreenLine::plain(*text)).collect()
    }

    #[test]
    fn equal_content_shares_one_layout() {
        let mut shaper = CountingShaper::default();
        let mut styles = styles();
        let mut cx = ShapingContext {
            shaper: &mut shaper,
            styles: &mut styles,
            scopes: &NoScopes,
        };
        let mut cache = LayoutCache::new();
        let first = cache.get_layout(&ScreenLine::plain("fn main()"), &mut cx);
        let second = cache.get_layout(&ScreenLine::plain("fn main()"), &mut cx);
        let other = cache.get_layout(&ScreenLine::plain("fn main() {"), &mut cx);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(shaper.lines, 2);
    }

    #[test]
    fn tags_are_part_of_the_key() {
        let mut shaper = CountingShaper::default();
        let mut styles = styles();
        let mut cx = ShapingContext {
            shaper: &mut shaper,
            styles: &mut styles,
            scopes: &NoScopes,
        };
        let mut cache = LayoutCache::new();
        let plain = cache.get_layout(&ScreenLine::plain("ab"), &mut cx);
        let tagged = ScreenLine::new(
            "ab",
            vec![
                crate::model::Tag::Open(ScopeId(0)),
                crate::model::Tag::Advance(2),
                crate::model::Tag::Close(ScopeId(0)),
            ],
        );
        let tagged = cache.get_layout(&tagged, &mut cx);
        assert!(!Arc::ptr_eq(&plain, &tagged));
    }

    #[test]
    fn get_layouts_keeps_exactly_the_requested_lines() {
        let mut shaper = CountingShaper::default();
        let mut styles = styles();
        let mut cx = ShapingContext {
            shaper: &mut shaper,
            styles: &mut styles,
            scopes: &NoScopes,
        };
        let mut cache = LayoutCache::new();
        let frame_one = cache.get_layouts(&lines(&["a", "b", "c"]), &mut cx);
        let frame_two = cache.get_layouts(&lines(&["b", "c", "d"]), &mut cx);
        assert!(Arc::ptr_eq(&frame_one[1], &frame_two[0]));
        assert!(Arc::ptr_eq(&frame_one[2], &frame_two[1]));
        assert!(!cache.contains(&ScreenLine::plain("a")));
        assert_eq!(cache.stats().cached_lines, 3);
        assert_eq!(shaper.lines, 4);
        // The evicted layout is still usable by whoever holds it.
        assert_eq!(frame_one[0].text(), "a");
    }

    #[test]
    fn get_layout_alone_never_evicts() {
        let mut shaper = CountingShaper::default();
        let mut styles = styles();
        let mut cx = ShapingContext {
            shaper: &mut shaper,
            styles: &mut styles,
            scopes: &NoScopes,
        };
        let mut cache = LayoutCache::new();
        cache.get_layouts(&lines(&["a", "b"]), &mut cx);
        cache.get_layout(&ScreenLine::plain("z"), &mut cx);
        assert_eq!(cache.stats().cached_lines, 3);
    }

    #[test]
    fn line_numbers_live_in_their_own_generation() {
        let mut shaper = CountingShaper::default();
        let mut styles = styles();
        let mut cache: LayoutCache<MonospaceLine> = LayoutCache::new();

        cache.begin_frame();
        let one = cache.get_line_number(GutterLabel::BufferRow(0), &mut shaper);
        let wrap = cache.get_line_number(GutterLabel::SoftWrap, &mut shaper);
        assert_eq!(one.text(), "1");
        assert_eq!(wrap.text(), SOFT_WRAP_GLYPH);
        {
            let mut cx = ShapingContext {
                shaper: &mut shaper,
                styles: &mut styles,
                scopes: &NoScopes,
            };
            cache.get_layouts(&lines(&["x"]), &mut cx);
        }
        assert_eq!(cache.stats().cached_line_numbers, 2);

        cache.begin_frame();
        let again = cache.get_line_number(GutterLabel::BufferRow(0), &mut shaper);
        assert!(Arc::ptr_eq(&one, &again));
        cache.collect_garbage();
        assert_eq!(cache.stats().cached_line_numbers, 1);
        assert_eq!(shaper.labels, 2);
    }

    #[test]
    fn invalidate_lines_keeps_gutter_labels() {
        let mut shaper = CountingShaper::default();
        let mut styles = styles();
        let mut cache: LayoutCache<MonospaceLine> = LayoutCache::new();
        cache.get_line_number(GutterLabel::BufferRow(4), &mut shaper);
        {
            let mut cx = ShapingContext {
                shaper: &mut shaper,
                styles: &mut styles,
                scopes: &NoScopes,
            };
            cache.get_layouts(&lines(&["x"]), &mut cx);
        }
        cache.invalidate_lines();
        let stats = cache.stats();
        assert_eq!(stats.cached_lines, 0);
        assert_eq!(stats.cached_line_numbers, 1);
        cache.clear();
        assert_eq!(cache.stats().cached_line_numbers, 0);
    }
}
