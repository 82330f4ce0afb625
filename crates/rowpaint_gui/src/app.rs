//! eframe application driving the frame renderer.

use crate::document::RopeDocument;
use crate::input::{commands_from_events, ViewCommand};
use crate::shaper::EguiShaper;
use crate::surface::EguiSurface;
use crate::DemoArgs;
use eframe::egui::{self, RichText};
use rowpaint_core::style::one_dark::{self, Palette};
use rowpaint_core::{
    CaretBlink, DisplayModel, FrameRenderer, FrameStats, HitTarget, Point, Rgba, ScreenRange,
    StyleError, TextShaper, ViewConfig, Viewport,
};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

pub(crate) const DEFAULT_WINDOW_SIZE: [f32; 2] = [960.0, 640.0];
pub(crate) const MIN_WINDOW_SIZE: [f32; 2] = [320.0, 200.0];
const SOFT_WRAP_COLUMN: usize = 80;
const MIN_FONT_SIZE: f32 = 8.0;
const MAX_FONT_SIZE: f32 = 48.0;

const SAMPLE_TEXT: &str = r#"// rowpaint demo: scroll, click, drag and use the arrow keys.
use std::collections::HashMap;

/// Counts words, keeping the first spelling of each.
fn count_words(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in text.split_whitespace() {
        *counts.entry(word.to_lowercase()).or_insert(0) += 1;
    }
    counts
}

fn main() {
    let text = "the quick brown fox jumps over the lazy dog, then the fox naps in the warm afternoon sun while the dog keeps watch 🦊🐶";
    let counts = count_words(text);
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (word, count) in sorted.iter().take(5) {
        println!("{word}: {count}");
    }
    let total: usize = sorted.iter().map(|(_, c)| c).sum();
    println!("{} words, {} distinct", total, sorted.len());
}
"#;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("theme error: {0}")]
    Theme(#[from] StyleError),
    #[error("viewer error: {0}")]
    Viewer(#[from] eframe::Error),
}

/// Build the document named by `args`, or the sample text.
///
/// # Errors
/// Returns [`DemoError::Read`] when the file cannot be read.
pub fn load_document(args: &DemoArgs) -> Result<RopeDocument, DemoError> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path).map_err(|source| DemoError::Read {
            path: path.clone(),
            source,
        })?,
        None => SAMPLE_TEXT.to_string(),
    };
    let mut document = RopeDocument::new(&text);
    document.set_wrap_column(args.wrap);
    document.set_find(args.find.clone());
    Ok(document)
}

/// Single-view app: one document painted through the caches.
pub struct RowpaintApp {
    document: RopeDocument,
    renderer: FrameRenderer<EguiShaper>,
    blink: CaretBlink,
    scroll_top: f32,
    font_size: f32,
    text_color: Rgba,
    last_stats: FrameStats,
}

impl RowpaintApp {
    /// Show `document` with the One Dark theme.
    ///
    /// # Errors
    /// Returns [`DemoError::Theme`] when the theme fails to build.
    pub fn new(
        ctx: egui::Context,
        document: RopeDocument,
        config: ViewConfig,
    ) -> Result<Self, DemoError> {
        let font_size = config.font_size;
        let mut blink = CaretBlink::new(config.caret_blink_period);
        blink.restart(Instant::now());
        let renderer = FrameRenderer::new(
            EguiShaper::new(ctx, font_size),
            Box::new(one_dark::style_sheet()?),
            config,
        );
        info!(
            buffer_rows = document.buffer_line_count(),
            screen_rows = document.screen_line_count(),
            "document loaded"
        );
        Ok(Self {
            document,
            renderer,
            blink,
            scroll_top: 0.0,
            font_size,
            text_color: Palette::new().text,
            last_stats: FrameStats::default(),
        })
    }

    fn set_font_size(&mut self, font_size: f32) {
        let font_size = font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        if font_size == self.font_size {
            return;
        }
        self.font_size = font_size;
        self.renderer.shaper_mut().set_font_size(font_size);
        self.renderer.reload_font_metrics();
        debug!(font_size, "font size changed");
    }

    /// Apply one command.
    ///
    /// # Returns
    /// `true` when the cursor moved and should be revealed.
    fn apply(&mut self, command: ViewCommand, viewport: Viewport) -> bool {
        let page_rows = (viewport.height / self.renderer.metrics().line_height).floor() as isize;
        match command {
            ViewCommand::Move { motion, select } => {
                self.document.move_cursor(motion, select);
                true
            }
            ViewCommand::PageUp { select } => {
                self.document.move_rows(-page_rows.max(1), select);
                self.scroll_top -= viewport.height;
                true
            }
            ViewCommand::PageDown { select } => {
                self.document.move_rows(page_rows.max(1), select);
                self.scroll_top += viewport.height;
                true
            }
            ViewCommand::SelectAll => {
                self.document.select_all();
                false
            }
            ViewCommand::ZoomIn => {
                self.set_font_size(self.font_size + 1.0);
                true
            }
            ViewCommand::ZoomOut => {
                self.set_font_size(self.font_size - 1.0);
                true
            }
            ViewCommand::ToggleSoftWrap => {
                let wrap = match self.document.wrap_column() {
                    Some(_) => None,
                    None => Some(SOFT_WRAP_COLUMN),
                };
                self.document.set_wrap_column(wrap);
                true
            }
        }
    }

    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response, rect: egui::Rect) {
        let viewport = Viewport::new(self.scroll_top, rect.width(), rect.height());

        if response.hovered() {
            self.scroll_top -= ui.input(|i| i.smooth_scroll_delta.y);
        }

        if response.clicked() || response.dragged() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let local = pointer - rect.min;
                let extend = ui.input(|i| i.modifiers.shift)
                    || (response.dragged() && !response.drag_started());
                let target = match self.renderer.hit_test(&self.document, viewport, local.x, local.y)
                {
                    HitTarget::Text(point) => point,
                    HitTarget::Gutter { row } => Point::new(row, 0),
                };
                self.document.set_cursor(target, extend);
                self.blink.restart(Instant::now());
                response.request_focus();
            }
        }

        let events = ui.input(|i| i.events.clone());
        let mut reveal = false;
        for command in commands_from_events(&events) {
            reveal |= self.apply(command, viewport);
        }
        let row_count = self.document.screen_line_count();
        if reveal {
            let head = self.document.cursor();
            let viewport = Viewport::new(self.scroll_top, rect.width(), rect.height());
            self.scroll_top =
                self.renderer
                    .scroll_to_reveal(ScreenRange::new(head, head), viewport, row_count);
            self.blink.restart(Instant::now());
        }
        self.scroll_top = self
            .scroll_top
            .clamp(0.0, self.renderer.max_scroll_top(row_count, viewport));
    }

    /// Handle input and paint one frame.
    pub fn show(&mut self, ctx: &egui::Context) {
        #[cfg(feature = "profile")]
        puffin::profile_function!();

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            let stats = &self.last_stats;
            ui.label(
                RichText::new(format!(
                    "rows {}..{} | shaped {} | reused {} | labels {} | evicted {} | styles {}",
                    stats.rows.start,
                    stats.rows.end,
                    stats.shaped_lines,
                    stats.layout_hits,
                    stats.shaped_labels,
                    stats.evicted,
                    stats.style_entries,
                ))
                .small()
                .monospace(),
            );
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                if response.hovered() {
                    ctx.set_cursor_icon(egui::CursorIcon::Text);
                }
                self.handle_input(ui, &response, rect);

                let now = Instant::now();
                self.renderer.set_caret_visible(self.blink.visible_at(now));
                let viewport = Viewport::new(self.scroll_top, rect.width(), rect.height());
                let ascent = self.renderer.shaper().font_metrics().ascent;
                let mut surface =
                    EguiSurface::new(ui.painter_at(rect), rect.min, ascent, self.text_color);
                self.last_stats = self
                    .renderer
                    .render_frame(&self.document, viewport, &mut surface);
            });

        if let Some(delay) = self.blink.next_toggle_in(Instant::now()) {
            ctx.request_repaint_after(delay);
        }
    }
}

impl eframe::App for RowpaintApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        #[cfg(feature = "profile")]
        puffin::GlobalProfiler::lock().new_frame();
        self.show(ctx);
    }
}
