//! One Dark palette and the default editor theme.
//!
//! Colour arithmetic follows the less.js colour functions so palette
//! entries derived with `lighten`/`darken`/`fade` match the upstream theme.

use super::{BorderStyle, FontStyle, FontWeight, Rgba, StyleProperty, StyleSheet, StyleValue};
use crate::error::StyleError;

/// Hue in degrees, saturation/lightness/alpha in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub fn from_rgba(color: Rgba) -> Self {
        let Rgba { r, g, b, a } = color;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;
        if d == 0.0 {
            return Self { h: 0.0, s: 0.0, l, a };
        }
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        Self {
            h: h * 60.0,
            s,
            l,
            a,
        }
    }

    pub fn to_rgba(self) -> Rgba {
        hsla(self.h, self.s, self.l, self.a)
    }
}

pub fn hsla(h: f32, s: f32, l: f32, a: f32) -> Rgba {
    let h = h.rem_euclid(360.0) / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let a = a.clamp(0.0, 1.0);
    let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let m1 = l * 2.0 - m2;
    let channel = |h: f32| {
        let h = if h < 0.0 {
            h + 1.0
        } else if h > 1.0 {
            h - 1.0
        } else {
            h
        };
        if h * 6.0 < 1.0 {
            m1 + (m2 - m1) * h * 6.0
        } else if h * 2.0 < 1.0 {
            m2
        } else if h * 3.0 < 2.0 {
            m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
        } else {
            m1
        }
    };
    Rgba::new(
        channel(h + 1.0 / 3.0),
        channel(h),
        channel(h - 1.0 / 3.0),
        a,
    )
}

pub fn hsl(h: f32, s: f32, l: f32) -> Rgba {
    hsla(h, s, l, 1.0)
}

pub fn lighten(color: Rgba, amount: f32) -> Rgba {
    let mut hsl = Hsla::from_rgba(color);
    hsl.l = (hsl.l + amount).clamp(0.0, 1.0);
    hsl.to_rgba()
}

pub fn darken(color: Rgba, amount: f32) -> Rgba {
    lighten(color, -amount)
}

/// Replace alpha (not multiply), as less does.
pub fn fade(color: Rgba, amount: f32) -> Rgba {
    let mut hsl = Hsla::from_rgba(color);
    hsl.a = amount.clamp(0.0, 1.0);
    hsl.to_rgba()
}

const SYNTAX_HUE: f32 = 220.0;
const SYNTAX_SATURATION: f32 = 0.13;
const SYNTAX_BRIGHTNESS: f32 = 0.18;

/// Named colours of the One Dark syntax theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub mono_1: Rgba,
    pub mono_2: Rgba,
    pub mono_3: Rgba,
    pub cyan: Rgba,
    pub blue: Rgba,
    pub purple: Rgba,
    pub green: Rgba,
    pub red_1: Rgba,
    pub red_2: Rgba,
    pub orange_1: Rgba,
    pub orange_2: Rgba,
    pub background: Rgba,
    pub text: Rgba,
    pub gutter: Rgba,
    pub guide: Rgba,
    pub accent: Rgba,
    pub cursor: Rgba,
    pub selection: Rgba,
    pub invisible: Rgba,
}

impl Palette {
    pub fn new() -> Self {
        let mono_1 = hsl(SYNTAX_HUE, 0.14, 0.71);
        let background = hsl(SYNTAX_HUE, SYNTAX_SATURATION, SYNTAX_BRIGHTNESS);
        let accent = hsl(SYNTAX_HUE, 1.0, 0.66);
        let guide = fade(mono_1, 0.15);
        Self {
            mono_1,
            mono_2: hsl(SYNTAX_HUE, 0.09, 0.55),
            mono_3: hsl(SYNTAX_HUE, 0.10, 0.40),
            cyan: hsl(187.0, 0.47, 0.55),
            blue: hsl(207.0, 0.82, 0.66),
            purple: hsl(286.0, 0.60, 0.67),
            green: hsl(95.0, 0.38, 0.62),
            red_1: hsl(355.0, 0.65, 0.65),
            red_2: hsl(5.0, 0.48, 0.51),
            orange_1: hsl(29.0, 0.54, 0.61),
            orange_2: hsl(39.0, 0.67, 0.69),
            background,
            text: mono_1,
            gutter: darken(mono_1, 0.26),
            guide,
            accent,
            cursor: accent,
            selection: lighten(background, 0.10),
            invisible: guide,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

fn color(property: StyleProperty, value: Rgba) -> (StyleProperty, StyleValue) {
    (property, StyleValue::Color(value))
}

/// Default editor theme.
///
/// # Errors
/// Only if one of the built-in selectors stops parsing.
pub fn style_sheet() -> Result<StyleSheet, StyleError> {
    let p = Palette::new();
    let mut sheet = StyleSheet::new();
    let italic = (StyleProperty::FontStyle, StyleValue::FontStyle(FontStyle::Italic));
    let bold = (StyleProperty::FontWeight, StyleValue::FontWeight(FontWeight::BOLD));

    sheet
        .typed_rule(
            "atom-text-editor",
            &[
                color(StyleProperty::Color, p.text),
                color(StyleProperty::BackgroundColor, p.background),
            ],
        )?
        .typed_rule(".gutter .line-number", &[color(StyleProperty::Color, p.gutter)])?
        .typed_rule(
            ".gutter .line-number.cursor-line",
            &[
                color(StyleProperty::Color, p.text),
                color(StyleProperty::BackgroundColor, lighten(p.background, 0.04)),
            ],
        )?
        .typed_rule(
            ".line.cursor-line",
            &[color(
                StyleProperty::BackgroundColor,
                lighten(p.background, 0.04).with_alpha(0.5),
            )],
        )?
        .typed_rule(
            ".highlights .highlight.selection .region",
            &[color(StyleProperty::BackgroundColor, p.selection)],
        )?
        .typed_rule(
            ".highlights .highlight.bracket-matcher .region",
            &[
                color(StyleProperty::BorderBottomColor, p.accent),
                (
                    StyleProperty::BorderBottomStyle,
                    StyleValue::BorderStyle(BorderStyle::Solid),
                ),
                (StyleProperty::BorderBottomWidth, StyleValue::Length(1.0)),
            ],
        )?
        .typed_rule(
            ".highlights .highlight.find-result .region",
            &[color(
                StyleProperty::BackgroundColor,
                fade(p.accent, 0.25),
            )],
        )?
        .typed_rule(".cursor", &[color(StyleProperty::BorderLeftColor, p.cursor)])?
        .typed_rule(
            ".syntax--comment",
            &[color(StyleProperty::Color, p.mono_3), italic],
        )?
        .typed_rule(
            ".syntax--keyword, .syntax--storage",
            &[color(StyleProperty::Color, p.purple)],
        )?
        .typed_rule(
            ".syntax--string",
            &[color(StyleProperty::Color, p.green)],
        )?
        .typed_rule(
            ".syntax--constant.syntax--numeric, .syntax--constant.syntax--language",
            &[color(StyleProperty::Color, p.orange_1)],
        )?
        .typed_rule(
            ".syntax--entity.syntax--name.syntax--function, .syntax--support.syntax--function",
            &[color(StyleProperty::Color, p.blue)],
        )?
        .typed_rule(
            ".syntax--entity.syntax--name.syntax--type, .syntax--support.syntax--type",
            &[color(StyleProperty::Color, p.orange_2)],
        )?
        .typed_rule(
            ".syntax--variable",
            &[color(StyleProperty::Color, p.red_1)],
        )?
        .typed_rule(
            ".syntax--punctuation",
            &[color(StyleProperty::Color, p.mono_1)],
        )?
        .typed_rule(
            ".syntax--escape",
            &[color(StyleProperty::Color, p.cyan)],
        )?
        .typed_rule(".syntax--invalid", &[color(StyleProperty::Color, p.red_2)])?
        .typed_rule(".syntax--markup.syntax--bold", &[bold])?
        .typed_rule(".syntax--markup.syntax--italic", &[italic])?;
    Ok(sheet)
}
