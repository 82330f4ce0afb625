//! egui-backed text shaping.

use eframe::egui::{
    self,
    text::{CCursor, LayoutJob, LayoutSection, TextFormat},
    Color32, FontId, Galley,
};
use rowpaint_core::shaping::{FontMetrics, HitIndex, ShapedLine, StyledRun, TextShaper};
use rowpaint_core::style::{FontStyle, Rgba};
use std::ops::Range;
use std::sync::Arc;

/// egui reports no font ascent; baseline sits at this fraction of a row.
const ASCENT_RATIO: f32 = 0.8;

pub(crate) fn to_color32(color: Rgba) -> Color32 {
    let [r, g, b, a] = color.to_rgba8();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Shapes lines through the egui font atlas of one context.
pub struct EguiShaper {
    ctx: egui::Context,
    font: FontId,
}

impl EguiShaper {
    pub fn new(ctx: egui::Context, font_size: f32) -> Self {
        Self {
            ctx,
            font: FontId::monospace(font_size),
        }
    }

    pub fn font(&self) -> &FontId {
        &self.font
    }

    /// Switch the font size; the renderer must reload its metrics afterwards.
    pub fn set_font_size(&mut self, font_size: f32) {
        self.font = FontId::monospace(font_size);
    }

    fn section(&self, byte_range: Range<usize>, color: Color32, italics: bool) -> LayoutSection {
        LayoutSection {
            leading_space: 0.0,
            byte_range,
            format: TextFormat {
                font_id: self.font.clone(),
                color,
                italics,
                ..Default::default()
            },
        }
    }

    fn layout(&self, job: LayoutJob, text: &str) -> EguiLine {
        let galley = self.ctx.fonts_mut(|f| f.layout_job(job));
        EguiLine {
            galley,
            text: text.to_owned(),
        }
    }
}

impl TextShaper for EguiShaper {
    type Line = EguiLine;

    // egui fonts carry no bold face; weight only survives in the run.
    fn shape_line(&mut self, text: &str, runs: &[StyledRun]) -> EguiLine {
        let mut job = LayoutJob {
            text: text.to_owned(),
            ..Default::default()
        };
        // Bytes no run covers keep the painter's fallback color.
        let mut covered = 0;
        for run in runs {
            let start = run.bytes.start.clamp(covered, text.len());
            let end = run.bytes.end.min(text.len());
            if start >= end {
                continue;
            }
            if start > covered {
                job.sections.push(self.section(covered..start, Color32::PLACEHOLDER, false));
            }
            job.sections.push(self.section(
                start..end,
                to_color32(run.color),
                run.style == FontStyle::Italic,
            ));
            covered = end;
        }
        if covered < text.len() {
            job.sections.push(self.section(covered..text.len(), Color32::PLACEHOLDER, false));
        }
        job.wrap.max_width = f32::INFINITY;
        self.layout(job, text)
    }

    fn shape_label(&mut self, text: &str) -> EguiLine {
        let job = LayoutJob::simple_singleline(
            text.to_owned(),
            self.font.clone(),
            Color32::PLACEHOLDER,
        );
        self.layout(job, text)
    }

    fn font_metrics(&self) -> FontMetrics {
        let font = self.font.clone();
        let sample = self
            .ctx
            .fonts_mut(|f| f.layout_no_wrap("m".to_owned(), font, Color32::PLACEHOLDER));
        let row_height = sample.size().y.max(1.0);
        let ascent = row_height * ASCENT_RATIO;
        FontMetrics {
            font_size: self.font.size,
            ascent,
            descent: row_height - ascent,
            char_width: sample.size().x.max(1.0),
        }
    }
}

/// A shaped egui galley plus the text it was built from.
///
/// Galley cursors count chars; byte offsets are converted at the boundary.
pub struct EguiLine {
    galley: Arc<Galley>,
    text: String,
}

impl EguiLine {
    pub fn galley(&self) -> &Arc<Galley> {
        &self.galley
    }

    fn char_index(&self, byte: usize) -> usize {
        let mut byte = byte.min(self.text.len());
        while !self.text.is_char_boundary(byte) {
            byte -= 1;
        }
        self.text[..byte].chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(byte, _)| byte)
    }
}

impl ShapedLine for EguiLine {
    fn text(&self) -> &str {
        &self.text
    }

    fn width(&self) -> f32 {
        self.galley.size().x
    }

    fn x_for_byte(&self, byte: usize) -> f32 {
        if byte >= self.text.len() {
            return self.width();
        }
        let cursor = CCursor::new(self.char_index(byte));
        self.galley.pos_from_cursor(cursor).min.x
    }

    /// egui already snaps to the nearest boundary, so `trailing` stays 0.
    fn hit_test(&self, x: f32) -> HitIndex {
        let cursor = self.galley.cursor_from_pos(egui::vec2(x, 0.0));
        HitIndex {
            byte: self.byte_index(cursor.index),
            trailing: 0,
        }
    }
}
