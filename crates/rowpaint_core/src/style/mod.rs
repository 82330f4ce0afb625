//! Style values, class paths and the resolver seam.
//!
//! A [`ClassPath`] names a synthetic element nested under the editor root,
//! one element per path entry. Properties are resolved for the innermost
//! element through a [`StyleResolver`] and memoized by [`StyleCache`].

mod cache;
pub mod one_dark;
mod sheet;

pub use cache::StyleCache;
pub use sheet::{parse_value, Selector, StyleSheet, NESTED_ELEMENT, ROOT_ELEMENT};

use std::fmt;

/// Straight-alpha color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 255)
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        match digits.len() {
            3 => {
                let short = |idx: usize| channel(idx..idx + 1).map(|v| v * 17);
                Some(Self::from_rgb8(short(0)?, short(1)?, short(2)?))
            }
            6 => Some(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::from_rgba8(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Scale alpha by `opacity`, as when compositing a translucent layer.
    pub fn multiply_alpha(self, opacity: f32) -> Self {
        Self {
            a: (self.a * opacity).clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// Numeric font weight (`400` normal, `700` bold).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    pub fn is_bold(self) -> bool {
        self.0 >= 600
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
}

/// A resolved property value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StyleValue {
    Color(Rgba),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    BorderStyle(BorderStyle),
    /// Length in logical pixels.
    Length(f32),
}

impl StyleValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            StyleValue::Color(_) => ValueKind::Color,
            StyleValue::FontWeight(_) => ValueKind::FontWeight,
            StyleValue::FontStyle(_) => ValueKind::FontStyle,
            StyleValue::BorderStyle(_) => ValueKind::BorderStyle,
            StyleValue::Length(_) => ValueKind::Length,
        }
    }
}

/// Physical type of a property value; each has its own cache bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Color,
    FontWeight,
    FontStyle,
    BorderStyle,
    Length,
}

/// Properties the renderer reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Color,
    BackgroundColor,
    BorderBottomColor,
    BorderLeftColor,
    FontStyle,
    FontWeight,
    BorderBottomStyle,
    BorderBottomWidth,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 8] = [
        StyleProperty::Color,
        StyleProperty::BackgroundColor,
        StyleProperty::BorderBottomColor,
        StyleProperty::BorderLeftColor,
        StyleProperty::FontStyle,
        StyleProperty::FontWeight,
        StyleProperty::BorderBottomStyle,
        StyleProperty::BorderBottomWidth,
    ];

    /// CSS property name.
    pub fn name(self) -> &'static str {
        match self {
            StyleProperty::Color => "color",
            StyleProperty::BackgroundColor => "background-color",
            StyleProperty::BorderBottomColor => "border-bottom-color",
            StyleProperty::BorderLeftColor => "border-left-color",
            StyleProperty::FontStyle => "font-style",
            StyleProperty::FontWeight => "font-weight",
            StyleProperty::BorderBottomStyle => "border-bottom-style",
            StyleProperty::BorderBottomWidth => "border-bottom-width",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|property| property.name() == name)
    }

    pub fn kind(self) -> ValueKind {
        match self {
            StyleProperty::Color
            | StyleProperty::BackgroundColor
            | StyleProperty::BorderBottomColor
            | StyleProperty::BorderLeftColor => ValueKind::Color,
            StyleProperty::FontStyle => ValueKind::FontStyle,
            StyleProperty::FontWeight => ValueKind::FontWeight,
            StyleProperty::BorderBottomStyle => ValueKind::BorderStyle,
            StyleProperty::BorderBottomWidth => ValueKind::Length,
        }
    }

    /// Whether an unset value is taken from the parent element.
    pub fn inherited(self) -> bool {
        matches!(
            self,
            StyleProperty::Color | StyleProperty::FontStyle | StyleProperty::FontWeight
        )
    }

    /// Value used when nothing in the cascade sets the property.
    pub fn initial(self) -> StyleValue {
        match self {
            StyleProperty::Color
            | StyleProperty::BorderBottomColor
            | StyleProperty::BorderLeftColor => StyleValue::Color(Rgba::BLACK),
            StyleProperty::BackgroundColor => StyleValue::Color(Rgba::TRANSPARENT),
            StyleProperty::FontStyle => StyleValue::FontStyle(FontStyle::Normal),
            StyleProperty::FontWeight => StyleValue::FontWeight(FontWeight::NORMAL),
            StyleProperty::BorderBottomStyle => StyleValue::BorderStyle(BorderStyle::None),
            StyleProperty::BorderBottomWidth => StyleValue::Length(1.0),
        }
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Nested selector path below the editor root.
///
/// Each entry is one element; its string is a space-separated class set,
/// e.g. `["gutter", "line-number cursor-line"]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClassPath(Vec<String>);

impl ClassPath {
    pub fn new<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(elements.into_iter().map(Into::into).collect())
    }

    /// The editor root itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, classes: impl Into<String>) {
        self.0.push(classes.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn elements(&self) -> &[String] {
        &self.0
    }

    /// Path of the parent element, `None` for the root.
    pub fn parent(&self) -> Option<ClassPath> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }
}

/// External cascade: resolves one property for the innermost element of a
/// class path.
pub trait StyleResolver {
    /// `None` means the property keeps its initial value.
    fn resolve(&self, path: &ClassPath, property: StyleProperty) -> Option<StyleValue>;
}

impl<F> StyleResolver for F
where
    F: Fn(&ClassPath, StyleProperty) -> Option<StyleValue>,
{
    fn resolve(&self, path: &ClassPath, property: StyleProperty) -> Option<StyleValue> {
        self(path, property)
    }
}
