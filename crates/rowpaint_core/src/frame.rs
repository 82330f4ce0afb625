//! Frame orchestration: visible rows, decorations, cached layouts, paint.
//!
//! The surface origin is the top-left corner of the widget. The gutter
//! occupies `[0, gutter_width)` horizontally and the text area everything
//! to its right; both scroll vertically by `Viewport::scroll_top`.

use crate::config::ViewConfig;
use crate::constants::{AUTOSCROLL_MARGIN, CARET_WIDTH};
use crate::decorations::{FrameDecorations, HighlightSpan};
use crate::geometry::{highlight_row_spans, Pos, Rect};
use crate::layout_cache::{GutterLabel, LayoutCache, LayoutCacheStats, ShapingContext};
use crate::model::{DisplayModel, Point, ScopeId, ScopeNames, ScreenRange};
use crate::shaping::{FontMetrics, ShapedLine, TextShaper};
use crate::style::{BorderStyle, ClassPath, Rgba, StyleCache, StyleProperty, StyleResolver};
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Rows intersecting the viewport, clamped to `[0, total_rows]`.
pub fn visible_rows(
    scroll_top: f32,
    viewport_height: f32,
    line_height: f32,
    total_rows: usize,
) -> Range<usize> {
    if line_height <= 0.0 {
        return 0..0;
    }
    let clamp = |row: f32| {
        if row.is_nan() || row <= 0.0 {
            0
        } else {
            (row as usize).min(total_rows)
        }
    };
    let start = clamp((scroll_top / line_height).floor());
    let end = clamp(((scroll_top + viewport_height) / line_height).ceil());
    start..end.max(start)
}

/// Scroll offset and size of the widget, in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub scroll_top: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(scroll_top: f32, width: f32, height: f32) -> Self {
        Self {
            scroll_top,
            width,
            height,
        }
    }
}

/// Pixel metrics derived from the font.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMetrics {
    pub line_height: f32,
    /// Baseline offset from the top of a row, centered in the line height.
    pub ascent: f32,
    pub char_width: f32,
    /// Gutter padding, one cell wide.
    pub padding: f32,
}

impl FrameMetrics {
    pub fn new(font: FontMetrics, line_height_factor: f32) -> Self {
        let line_height = (font.font_size * line_height_factor).round().max(1.0);
        let ascent = (font.ascent + (line_height - (font.ascent + font.descent)) / 2.0).round();
        Self {
            line_height,
            ascent,
            char_width: font.char_width,
            padding: font.char_width.round(),
        }
    }

    /// Gutter width for a document of `row_count` screen rows.
    pub fn gutter_width(&self, row_count: usize) -> f32 {
        self.padding * 4.0 + (digit_count(row_count) as f32 * self.char_width).round()
    }
}

fn digit_count(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        digits += 1;
        n /= 10;
    }
    digits
}

/// Drawing backend for one frame.
pub trait PaintSurface<L> {
    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    fn draw_line(&mut self, from: Pos, to: Pos, width: f32, color: Rgba);

    /// Draw a shaped line with its left baseline at `baseline`.
    ///
    /// `color` overrides the layout's own colors (gutter labels); `None`
    /// keeps the colors baked in at shaping time.
    fn draw_text(&mut self, layout: &Arc<L>, baseline: Pos, color: Option<Rgba>);

    /// Start an offscreen group composited by the matching `pop_layer`.
    fn push_layer(&mut self);

    fn pop_layer(&mut self, opacity: f32);
}

/// What a pointer position lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Gutter { row: usize },
    Text(Point),
}

/// Per-frame counters, also emitted as a perf event when enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub rows: Range<usize>,
    pub layout_hits: u64,
    pub shaped_lines: u64,
    pub shaped_labels: u64,
    pub evicted: u64,
    pub style_entries: usize,
    pub highlights: usize,
    pub cursors: usize,
}

/// Borrows a display model as the scope-name source of the shaping context.
struct ModelScopes<'a, M: ?Sized>(&'a M);

impl<M: DisplayModel + ?Sized> ScopeNames for ModelScopes<'_, M> {
    fn class_name(&self, scope: ScopeId) -> &str {
        self.0.class_name(scope)
    }
}

fn class_list(base: &str, extra: &str) -> String {
    if extra.is_empty() {
        base.to_string()
    } else {
        format!("{} {}", base, extra)
    }
}

fn gutter_label<M: DisplayModel + ?Sized>(model: &M, row: usize) -> GutterLabel {
    let buffer_row = model.buffer_row_for_screen_row(row);
    if row > 0 && buffer_row == model.buffer_row_for_screen_row(row - 1) {
        GutterLabel::SoftWrap
    } else {
        GutterLabel::BufferRow(buffer_row)
    }
}

/// Redraws a display model through the layout and style caches.
pub struct FrameRenderer<S: TextShaper> {
    shaper: S,
    layouts: LayoutCache<S::Line>,
    styles: StyleCache,
    metrics: FrameMetrics,
    config: ViewConfig,
    caret_visible: bool,
}

impl<S: TextShaper> FrameRenderer<S> {
    pub fn new(shaper: S, resolver: Box<dyn StyleResolver>, config: ViewConfig) -> Self {
        let metrics = FrameMetrics::new(shaper.font_metrics(), config.line_height_factor);
        Self {
            shaper,
            layouts: LayoutCache::new(),
            styles: StyleCache::from_boxed(resolver),
            metrics,
            config,
            caret_visible: false,
        }
    }

    pub fn metrics(&self) -> FrameMetrics {
        self.metrics
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn shaper(&self) -> &S {
        &self.shaper
    }

    /// Mutable shaper access; call [`reload_font_metrics`](Self::reload_font_metrics)
    /// after changing its font.
    pub fn shaper_mut(&mut self) -> &mut S {
        &mut self.shaper
    }

    /// Recompute pixel metrics from the shaper and drop every cached layout.
    pub fn reload_font_metrics(&mut self) {
        self.metrics = FrameMetrics::new(self.shaper.font_metrics(), self.config.line_height_factor);
        self.invalidate_all();
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    /// Driven by the owner's blink timer.
    pub fn set_caret_visible(&mut self, visible: bool) {
        self.caret_visible = visible;
    }

    pub fn gutter_width(&self, row_count: usize) -> f32 {
        self.metrics.gutter_width(row_count)
    }

    /// Content height, never less than one page.
    pub fn scroll_height(&self, row_count: usize, viewport: Viewport) -> f32 {
        (row_count as f32 * self.metrics.line_height).max(viewport.height)
    }

    pub fn max_scroll_top(&self, row_count: usize, viewport: Viewport) -> f32 {
        (self.scroll_height(row_count, viewport) - viewport.height).max(0.0)
    }

    /// Scroll offset that brings `range` into view with a fixed margin.
    ///
    /// # Returns
    /// `viewport.scroll_top` when the range is already visible.
    pub fn scroll_to_reveal(&self, range: ScreenRange, viewport: Viewport, row_count: usize) -> f32 {
        let lh = self.metrics.line_height;
        let upper = self.scroll_height(row_count, viewport);
        let min_value = ((range.end.row + 1) as f32 * lh + AUTOSCROLL_MARGIN).min(upper) - viewport.height;
        let max_value = (range.start.row as f32 * lh - AUTOSCROLL_MARGIN).max(0.0);
        let mut value = viewport.scroll_top;
        if value > max_value {
            value = max_value;
        }
        if value < min_value {
            value = min_value;
        }
        value
    }

    /// Forget resolved styles. Shaped lines bake colors in, so they go too.
    pub fn invalidate_style(&mut self) {
        self.styles.clear();
        self.layouts.invalidate_lines();
    }

    /// Clear both caches (font or theme change).
    pub fn invalidate_all(&mut self) {
        self.styles.clear();
        self.layouts.clear();
    }

    pub fn set_style_resolver(&mut self, resolver: Box<dyn StyleResolver>) {
        self.styles.set_resolver(resolver);
        self.layouts.clear();
    }

    pub fn layout_stats(&self) -> LayoutCacheStats {
        self.layouts.stats()
    }

    pub fn style_entries(&self) -> usize {
        self.styles.len()
    }

    /// Map a widget-relative pointer position to a gutter row or text point.
    ///
    /// Shapes the row if needed but never evicts.
    pub fn hit_test<M>(&mut self, model: &M, viewport: Viewport, x: f32, y: f32) -> HitTarget
    where
        M: DisplayModel + ?Sized,
    {
        let offset = ((y + viewport.scroll_top) / self.metrics.line_height).floor();
        let row = if offset.is_nan() || offset <= 0.0 {
            0
        } else {
            offset as usize
        };
        let row_count = model.screen_line_count();
        let gutter_width = self.gutter_width(row_count);
        if x < gutter_width {
            return HitTarget::Gutter { row };
        }
        if row >= row_count {
            return HitTarget::Text(Point::new(row, 0));
        }
        let line = model.screen_line(row);
        let scopes = ModelScopes(model);
        let mut cx = ShapingContext {
            shaper: &mut self.shaper,
            styles: &mut self.styles,
            scopes: &scopes,
        };
        let layout = self.layouts.get_layout(&line, &mut cx);
        HitTarget::Text(Point::new(row, layout.column_at_x(x - gutter_width)))
    }

    /// Paint one frame and sweep both caches.
    pub fn render_frame<M, P>(&mut self, model: &M, viewport: Viewport, surface: &mut P) -> FrameStats
    where
        M: DisplayModel + ?Sized,
        P: PaintSurface<S::Line>,
    {
        #[cfg(feature = "profile")]
        puffin::profile_function!();
        let frame_started = self.config.perf_log.then(Instant::now);
        let before = self.layouts.stats();

        self.styles.increment_generation();
        self.layouts.begin_frame();

        let row_count = model.screen_line_count();
        let rows = visible_rows(
            viewport.scroll_top,
            viewport.height,
            self.metrics.line_height,
            row_count,
        );
        let (lines, decorations) = if rows.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            (
                model.screen_lines(rows.clone()),
                model.decorations_for_rows(rows.clone()),
            )
        };
        let frame = FrameDecorations::parse(rows.clone(), &decorations);

        let layouts = {
            #[cfg(feature = "profile")]
            puffin::profile_scope!("frame.layouts");
            let scopes = ModelScopes(model);
            let mut cx = ShapingContext {
                shaper: &mut self.shaper,
                styles: &mut self.styles,
                scopes: &scopes,
            };
            self.layouts.get_layouts(&lines, &mut cx)
        };

        let gutter_width = self.gutter_width(row_count);
        let background = self
            .styles
            .color(&ClassPath::root(), StyleProperty::BackgroundColor);
        surface.fill_rect(Rect::new(0.0, 0.0, viewport.width, viewport.height), background);

        self.paint_gutter(model, &frame, viewport, gutter_width, surface);
        self.paint_line_backgrounds(&frame, viewport, gutter_width, surface);
        for highlight in &frame.highlights {
            self.paint_highlight(highlight, &rows, &layouts, viewport, gutter_width, surface);
        }
        for (idx, layout) in layouts.iter().enumerate() {
            let y = self.row_top(rows.start + idx, viewport);
            surface.draw_text(layout, Pos::new(gutter_width, y + self.metrics.ascent), None);
        }
        self.paint_cursors(&frame, &rows, &layouts, viewport, gutter_width, surface);

        self.layouts.collect_garbage();
        self.styles.collect_garbage();

        let after = self.layouts.stats();
        let lines_delta = after.lines.since(&before.lines);
        let labels_delta = after.line_numbers.since(&before.line_numbers);
        let stats = FrameStats {
            rows,
            layout_hits: lines_delta.hits,
            shaped_lines: lines_delta.misses,
            shaped_labels: labels_delta.misses,
            evicted: lines_delta.evictions + labels_delta.evictions,
            style_entries: self.styles.len(),
            highlights: frame.highlights.len(),
            cursors: frame.cursors.len(),
        };
        if let Some(started) = frame_started {
            info!(
                target: "rowpaint_core::perf",
                event = "render_frame",
                start_row = stats.rows.start,
                end_row = stats.rows.end,
                layout_hits = stats.layout_hits,
                shaped_lines = stats.shaped_lines,
                shaped_labels = stats.shaped_labels,
                evicted = stats.evicted,
                style_entries = stats.style_entries,
                total_ms = started.elapsed().as_secs_f32() * 1000.0,
                "frame cache stats"
            );
        }
        stats
    }

    fn row_top(&self, row: usize, viewport: Viewport) -> f32 {
        row as f32 * self.metrics.line_height - viewport.scroll_top
    }

    fn paint_gutter<M, P>(
        &mut self,
        model: &M,
        frame: &FrameDecorations,
        viewport: Viewport,
        gutter_width: f32,
        surface: &mut P,
    ) where
        M: DisplayModel + ?Sized,
        P: PaintSurface<S::Line>,
    {
        #[cfg(feature = "profile")]
        puffin::profile_scope!("frame.gutter");
        let lh = self.metrics.line_height;
        surface.push_layer();
        for row in frame.rows.clone() {
            let y = self.row_top(row, viewport);
            let classes = frame.gutter_classes_for(row);
            let path = ClassPath::new([
                "gutter".to_string(),
                class_list("line-number", classes),
            ]);
            if !classes.is_empty() {
                let background = self.styles.color(&path, StyleProperty::BackgroundColor);
                surface.fill_rect(Rect::new(0.0, y, gutter_width, lh), background);
            }
            let label = self
                .layouts
                .get_line_number(gutter_label(model, row), &mut self.shaper);
            let color = self.styles.color(&path, StyleProperty::Color);
            let x = gutter_width - self.metrics.padding * 2.0 - label.width();
            surface.draw_text(&label, Pos::new(x, y + self.metrics.ascent), Some(color));
        }
        surface.pop_layer(self.config.gutter_opacity);
    }

    fn paint_line_backgrounds<P>(
        &mut self,
        frame: &FrameDecorations,
        viewport: Viewport,
        gutter_width: f32,
        surface: &mut P,
    ) where
        P: PaintSurface<S::Line>,
    {
        let text_width = (viewport.width - gutter_width).max(0.0);
        for row in frame.rows.clone() {
            let classes = frame.line_classes_for(row);
            if classes.is_empty() {
                continue;
            }
            let path = ClassPath::new([class_list("line", classes)]);
            let background = self.styles.color(&path, StyleProperty::BackgroundColor);
            let y = self.row_top(row, viewport);
            surface.fill_rect(
                Rect::new(gutter_width, y, text_width, self.metrics.line_height),
                background,
            );
        }
    }

    fn paint_highlight<P>(
        &mut self,
        highlight: &HighlightSpan,
        rows: &Range<usize>,
        layouts: &[Arc<S::Line>],
        viewport: Viewport,
        gutter_width: f32,
        surface: &mut P,
    ) where
        P: PaintSurface<S::Line>,
    {
        let path = ClassPath::new([
            "highlights".to_string(),
            class_list("highlight", &highlight.class),
            class_list("region", &highlight.class),
        ]);
        let lh = self.metrics.line_height;
        let origin = Pos::new(gutter_width, -viewport.scroll_top);
        let text_width = (viewport.width - gutter_width).max(0.0);
        let x_at = |row: usize, column: usize| {
            row.checked_sub(rows.start)
                .and_then(|idx| layouts.get(idx))
                .map_or(0.0, |layout| layout.x_for_column(column))
        };

        let background = self.styles.color(&path, StyleProperty::BackgroundColor);
        for span in highlight_row_spans(highlight.range, text_width, &x_at) {
            let rect = span.rect(lh, origin);
            if !rect.is_empty() {
                surface.fill_rect(rect, background);
            }
        }

        let range = highlight.range;
        let border = self.styles.border_style(&path, StyleProperty::BorderBottomStyle);
        if range.is_single_row() && border != BorderStyle::None {
            let color = self.styles.color(&path, StyleProperty::BorderBottomColor);
            let width = self
                .styles
                .length(&path, StyleProperty::BorderBottomWidth)
                .max(1.0);
            let x_start = origin.x + x_at(range.start.row, range.start.column);
            let x_end = origin.x + x_at(range.end.row, range.end.column);
            let y = self.row_top(range.start.row, viewport) + lh - width / 2.0;
            surface.draw_line(Pos::new(x_start, y), Pos::new(x_end, y), width, color);
        }
    }

    fn paint_cursors<P>(
        &mut self,
        frame: &FrameDecorations,
        rows: &Range<usize>,
        layouts: &[Arc<S::Line>],
        viewport: Viewport,
        gutter_width: f32,
        surface: &mut P,
    ) where
        P: PaintSurface<S::Line>,
    {
        let color = self
            .styles
            .color(&ClassPath::new(["cursor"]), StyleProperty::BorderLeftColor);
        if !self.caret_visible {
            return;
        }
        for cursor in &frame.cursors {
            let Some(layout) = cursor
                .row
                .checked_sub(rows.start)
                .and_then(|idx| layouts.get(idx))
            else {
                continue;
            };
            let x = gutter_width + layout.x_for_column(cursor.column);
            let y = self.row_top(cursor.row, viewport);
            surface.fill_rect(
                Rect::new(x, y, CARET_WIDTH, self.metrics.line_height),
                color,
            );
        }
    }
}
