//! [`PaintSurface`] over an egui painter.

use crate::shaper::{to_color32, EguiLine};
use eframe::egui::{self, epaint::TextShape, Color32, Galley, Painter, Pos2, Stroke};
use rowpaint_core::frame::PaintSurface;
use rowpaint_core::geometry::{Pos, Rect};
use rowpaint_core::style::Rgba;
use std::sync::Arc;
use tracing::warn;

/// A paint call held back until its layer is composited.
enum Pending {
    Fill(egui::Rect, Color32),
    Line([Pos2; 2], Stroke),
    Text {
        pos: Pos2,
        galley: Arc<Galley>,
        fallback: Color32,
        opacity: f32,
    },
}

impl Pending {
    fn faded(self, opacity: f32) -> Self {
        match self {
            Pending::Fill(rect, color) => Pending::Fill(rect, color.gamma_multiply(opacity)),
            Pending::Line(points, stroke) => Pending::Line(
                points,
                Stroke::new(stroke.width, stroke.color.gamma_multiply(opacity)),
            ),
            Pending::Text {
                pos,
                galley,
                fallback,
                opacity: current,
            } => Pending::Text {
                pos,
                galley,
                fallback,
                opacity: current * opacity,
            },
        }
    }
}

/// Paints one frame into an egui painter.
///
/// Coordinates are relative to `origin`. egui cannot composite offscreen
/// groups, so a layer's opacity is applied to each of its shapes instead.
pub struct EguiSurface {
    painter: Painter,
    origin: Pos2,
    /// Distance from a row's baseline up to the top of its galley.
    ascent: f32,
    text_color: Color32,
    layers: Vec<Vec<Pending>>,
}

impl EguiSurface {
    pub fn new(painter: Painter, origin: Pos2, ascent: f32, text_color: Rgba) -> Self {
        Self {
            painter,
            origin,
            ascent,
            text_color: to_color32(text_color),
            layers: Vec::new(),
        }
    }

    fn pos(&self, pos: Pos) -> Pos2 {
        self.origin + egui::vec2(pos.x, pos.y)
    }

    fn emit(&mut self, op: Pending) {
        match self.layers.last_mut() {
            Some(layer) => layer.push(op),
            None => self.paint(op),
        }
    }

    fn paint(&self, op: Pending) {
        match op {
            Pending::Fill(rect, color) => {
                self.painter.rect_filled(rect, 0.0, color);
            }
            Pending::Line(points, stroke) => {
                self.painter.line_segment(points, stroke);
            }
            Pending::Text {
                pos,
                galley,
                fallback,
                opacity,
            } => {
                self.painter
                    .add(TextShape::new(pos, galley, fallback).with_opacity_factor(opacity));
            }
        }
    }
}

impl PaintSurface<EguiLine> for EguiSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        if rect.is_empty() || color.is_transparent() {
            return;
        }
        let min = self.pos(Pos::new(rect.x, rect.y));
        let rect = egui::Rect::from_min_size(min, egui::vec2(rect.width, rect.height));
        self.emit(Pending::Fill(rect, to_color32(color)));
    }

    fn draw_line(&mut self, from: Pos, to: Pos, width: f32, color: Rgba) {
        let points = [self.pos(from), self.pos(to)];
        self.emit(Pending::Line(points, Stroke::new(width, to_color32(color))));
    }

    fn draw_text(&mut self, layout: &Arc<EguiLine>, baseline: Pos, color: Option<Rgba>) {
        let top = self.pos(Pos::new(baseline.x, baseline.y - self.ascent));
        let fallback = color.map_or(self.text_color, to_color32);
        self.emit(Pending::Text {
            pos: top,
            galley: Arc::clone(layout.galley()),
            fallback,
            opacity: 1.0,
        });
    }

    fn push_layer(&mut self) {
        self.layers.push(Vec::new());
    }

    fn pop_layer(&mut self, opacity: f32) {
        let Some(ops) = self.layers.pop() else {
            warn!("pop_layer without a matching push_layer");
            return;
        };
        for op in ops {
            self.emit(op.faded(opacity));
        }
    }
}

impl Drop for EguiSurface {
    fn drop(&mut self) {
        // Unbalanced layers still reach the screen, unfaded.
        while let Some(ops) = self.layers.pop() {
            for op in ops {
                self.emit(op);
            }
        }
    }
}
