//! CSS-like cascade over the synthetic element tree of a class path.
//!
//! The tree is rooted at an `atom-text-editor` element; every class path
//! entry adds one nested `div` carrying that entry's classes. Selectors are
//! descendant chains of compound selectors (`element.class.class`).

use super::{BorderStyle, ClassPath, FontStyle, FontWeight, Rgba, StyleProperty, StyleResolver, StyleValue, ValueKind};
use crate::error::StyleError;

/// Element name of the tree root.
pub const ROOT_ELEMENT: &str = "atom-text-editor";
/// Element name of every nested class path entry.
pub const NESTED_ELEMENT: &str = "div";

#[derive(Clone, Debug, PartialEq, Eq)]
struct Compound {
    element: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(token: &str, selector: &str) -> Result<Self, StyleError> {
        let invalid = |reason| StyleError::InvalidSelector {
            selector: selector.to_string(),
            reason,
        };
        if token == "*" {
            return Ok(Self {
                element: None,
                classes: Vec::new(),
            });
        }
        let mut parts = token.split('.');
        let element = parts.next().unwrap_or_default();
        if !element.chars().all(is_ident_char) {
            return Err(invalid("unexpected character in element name"));
        }
        let classes = parts
            .map(|class| {
                if class.is_empty() {
                    Err(invalid("empty class name"))
                } else if !class.chars().all(is_ident_char) {
                    Err(invalid("unexpected character in class name"))
                } else {
                    Ok(class.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            element: (!element.is_empty()).then(|| element.to_string()),
            classes,
        })
    }

    fn matches(&self, node: &Node<'_>) -> bool {
        if let Some(element) = self.element.as_deref() {
            if element != node.element {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|class| node.classes.contains(&class.as_str()))
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

/// Descendant-combinator selector, e.g. `.gutter .line-number.cursor-line`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a single selector (no commas).
    ///
    /// # Errors
    /// Returns [`StyleError::InvalidSelector`] for empty selectors, empty
    /// class names and characters outside `[A-Za-z0-9_-]`.
    pub fn parse(selector: &str) -> Result<Self, StyleError> {
        let compounds = selector
            .split_whitespace()
            .map(|token| Compound::parse(token, selector))
            .collect::<Result<Vec<_>, _>>()?;
        if compounds.is_empty() {
            return Err(StyleError::InvalidSelector {
                selector: selector.to_string(),
                reason: "empty selector",
            });
        }
        Ok(Self { compounds })
    }

    /// `(class count, element count)`; compared lexicographically.
    pub fn specificity(&self) -> (usize, usize) {
        self.compounds.iter().fold((0, 0), |(classes, elements), c| {
            (
                classes + c.classes.len(),
                elements + usize::from(c.element.is_some()),
            )
        })
    }

    /// Whether the selector matches the last node of `nodes`.
    fn matches(&self, nodes: &[Node<'_>]) -> bool {
        let Some((target, ancestors)) = nodes.split_last() else {
            return false;
        };
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(target) {
            return false;
        }
        let mut remaining = ancestors;
        for compound in rest.iter().rev() {
            let Some(found) = remaining.iter().rposition(|node| compound.matches(node)) else {
                return false;
            };
            remaining = &remaining[..found];
        }
        true
    }
}

struct Node<'a> {
    element: &'a str,
    classes: Vec<&'a str>,
}

fn nodes_for(path: &ClassPath) -> Vec<Node<'_>> {
    std::iter::once(Node {
        element: ROOT_ELEMENT,
        classes: Vec::new(),
    })
    .chain(path.elements().iter().map(|classes| Node {
        element: NESTED_ELEMENT,
        classes: classes.split_whitespace().collect(),
    }))
    .collect()
}

#[derive(Clone, Debug)]
struct Rule {
    selector: Selector,
    declarations: Vec<(StyleProperty, StyleValue)>,
}

/// Ordered rule set resolving properties by specificity, then source order.
#[derive(Clone, Debug, Default)]
pub struct StyleSheet {
    rules: Vec<Rule>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Add a rule from CSS text fragments.
    ///
    /// `selectors` may be a comma-separated list; each declaration is a
    /// `(property, value)` pair such as `("color", "#abb2bf")`.
    ///
    /// # Errors
    /// Fails on unparsable selectors, unknown properties or values that do
    /// not fit the property's type. Nothing is added on error.
    pub fn rule(&mut self, selectors: &str, declarations: &[(&str, &str)]) -> Result<&mut Self, StyleError> {
        let parsed_declarations = declarations
            .iter()
            .map(|(name, value)| {
                let property = StyleProperty::from_name(name)
                    .ok_or_else(|| StyleError::UnknownProperty((*name).to_string()))?;
                Ok((property, parse_value(property, value)?))
            })
            .collect::<Result<Vec<_>, StyleError>>()?;
        self.typed_rule(selectors, &parsed_declarations)
    }

    /// Like [`StyleSheet::rule`] with already-typed declarations.
    ///
    /// # Errors
    /// Fails when any selector in the list does not parse.
    pub fn typed_rule(
        &mut self,
        selectors: &str,
        declarations: &[(StyleProperty, StyleValue)],
    ) -> Result<&mut Self, StyleError> {
        let parsed_selectors = selectors
            .split(',')
            .map(Selector::parse)
            .collect::<Result<Vec<_>, _>>()?;
        for selector in parsed_selectors {
            self.add_rule(selector, declarations.to_vec());
        }
        Ok(self)
    }

    /// Append an already-typed rule.
    pub fn add_rule(&mut self, selector: Selector, declarations: Vec<(StyleProperty, StyleValue)>) {
        self.rules.push(Rule {
            selector,
            declarations,
        });
    }

    /// Value set directly on the last node by the winning rule.
    fn cascaded(&self, nodes: &[Node<'_>], property: StyleProperty) -> Option<StyleValue> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(order, rule)| {
                let value = rule
                    .declarations
                    .iter()
                    .rev()
                    .find(|(declared, _)| *declared == property)
                    .map(|(_, value)| *value)?;
                rule.selector
                    .matches(nodes)
                    .then(|| ((rule.selector.specificity(), order), value))
            })
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, value)| value)
    }

    fn computed(&self, nodes: &[Node<'_>], property: StyleProperty) -> Option<StyleValue> {
        if let Some(value) = self.cascaded(nodes, property) {
            return Some(value);
        }
        if property.inherited() && nodes.len() > 1 {
            return self.computed(&nodes[..nodes.len() - 1], property);
        }
        // Border colors default to the element's own text color.
        match property {
            StyleProperty::BorderBottomColor | StyleProperty::BorderLeftColor => {
                self.computed(nodes, StyleProperty::Color)
            }
            _ => None,
        }
    }
}

impl StyleResolver for StyleSheet {
    fn resolve(&self, path: &ClassPath, property: StyleProperty) -> Option<StyleValue> {
        self.computed(&nodes_for(path), property)
    }
}

/// Parse a CSS value for `property`.
///
/// # Errors
/// Returns [`StyleError::InvalidValue`] when `text` does not parse as the
/// property's value type.
pub fn parse_value(property: StyleProperty, text: &str) -> Result<StyleValue, StyleError> {
    let text = text.trim();
    let parsed = match property.kind() {
        ValueKind::Color => parse_color(text).map(StyleValue::Color),
        ValueKind::FontStyle => match text {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            "oblique" => Some(FontStyle::Oblique),
            _ => None,
        }
        .map(StyleValue::FontStyle),
        ValueKind::FontWeight => match text {
            "normal" => Some(FontWeight::NORMAL),
            "bold" => Some(FontWeight::BOLD),
            number => number
                .parse::<u16>()
                .ok()
                .filter(|weight| (1..=1000).contains(weight))
                .map(FontWeight),
        }
        .map(StyleValue::FontWeight),
        ValueKind::BorderStyle => match text {
            "none" | "hidden" => Some(BorderStyle::None),
            "solid" => Some(BorderStyle::Solid),
            "dashed" => Some(BorderStyle::Dashed),
            "dotted" => Some(BorderStyle::Dotted),
            "double" => Some(BorderStyle::Double),
            _ => None,
        }
        .map(StyleValue::BorderStyle),
        ValueKind::Length => text
            .strip_suffix("px")
            .unwrap_or(text)
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|length| length.is_finite() && *length >= 0.0)
            .map(StyleValue::Length),
    };
    parsed.ok_or_else(|| StyleError::InvalidValue {
        property: property.name(),
        value: text.to_string(),
    })
}

fn parse_color(text: &str) -> Option<Rgba> {
    if text == "transparent" {
        return Some(Rgba::TRANSPARENT);
    }
    if text.starts_with('#') {
        return Rgba::from_hex(text);
    }
    let (args, has_alpha) = if let Some(args) = text.strip_prefix("rgba(") {
        (args, true)
    } else if let Some(args) = text.strip_prefix("rgb(") {
        (args, false)
    } else {
        return None;
    };
    let args: Vec<&str> = args.strip_suffix(')')?.split(',').map(str::trim).collect();
    if args.len() != if has_alpha { 4 } else { 3 } {
        return None;
    }
    let channel = |arg: &str| arg.parse::<u8>().ok().map(|v| f32::from(v) / 255.0);
    let alpha = if has_alpha {
        args[3].parse::<f32>().ok().filter(|a| (0.0..=1.0).contains(a))?
    } else {
        1.0
    };
    Some(Rgba::new(
        channel(args[0])?,
        channel(args[1])?,
        channel(args[2])?,
        alpha,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Rgba {
        Rgba::from_rgb8(255, 0, 0)
    }

    fn green() -> Rgba {
        Rgba::from_rgb8(0, 255, 0)
    }

    fn blue() -> Rgba {
        Rgba::from_rgb8(0, 0, 255)
    }

    fn color_of(sheet: &StyleSheet, path: &ClassPath, property: StyleProperty) -> Option<Rgba> {
        match sheet.resolve(path, property)? {
            StyleValue::Color(color) => Some(color),
            other => panic!("expected color, got {:?}", other),
        }
    }

    #[test]
    fn more_specific_selector_wins_regardless_of_order() {
        let mut sheet = StyleSheet::new();
        sheet
            .rule(".gutter .line-number.cursor-line", &[("color", "#00ff00")])
            .expect("rule")
            .rule(".line-number", &[("color", "#ff0000")])
            .expect("rule");
        let plain = ClassPath::new(["gutter", "line-number"]);
        let current = ClassPath::new(["gutter", "line-number cursor-line"]);
        assert_eq!(color_of(&sheet, &plain, StyleProperty::Color), Some(red()));
        assert_eq!(color_of(&sheet, &current, StyleProperty::Color), Some(green()));
    }

    #[test]
    fn later_rule_wins_specificity_ties() {
        let mut sheet = StyleSheet::new();
        sheet
            .rule(".line", &[("background-color", "#ff0000")])
            .expect("rule")
            .rule(".line", &[("background-color", "#0000ff")])
            .expect("rule");
        let path = ClassPath::new(["line"]);
        assert_eq!(
            color_of(&sheet, &path, StyleProperty::BackgroundColor),
            Some(blue())
        );
    }

    #[test]
    fn inherited_properties_flow_from_ancestors_only() {
        let mut sheet = StyleSheet::new();
        sheet
            .rule(
                "atom-text-editor",
                &[("color", "#ff0000"), ("background-color", "#0000ff")],
            )
            .expect("rule")
            .rule(".syntax--comment", &[("font-style", "italic")])
            .expect("rule");
        let path = ClassPath::new(["line", "syntax--comment", "syntax--punctuation"]);
        assert_eq!(color_of(&sheet, &path, StyleProperty::Color), Some(red()));
        assert_eq!(
            sheet.resolve(&path, StyleProperty::FontStyle),
            Some(StyleValue::FontStyle(FontStyle::Italic))
        );
        assert_eq!(sheet.resolve(&path, StyleProperty::BackgroundColor), None);
        assert_eq!(
            color_of(&sheet, &ClassPath::root(), StyleProperty::BackgroundColor),
            Some(blue())
        );
    }

    #[test]
    fn descendant_selectors_require_ancestors_in_order() {
        let mut sheet = StyleSheet::new();
        sheet
            .rule(".highlights .region", &[("background-color", "#ff0000")])
            .expect("rule");
        let inside = ClassPath::new(["highlights", "highlight selection", "region selection"]);
        let outside = ClassPath::new(["region selection", "highlights"]);
        assert_eq!(
            color_of(&sheet, &inside, StyleProperty::BackgroundColor),
            Some(red())
        );
        assert_eq!(sheet.resolve(&outside, StyleProperty::BackgroundColor), None);
    }

    #[test]
    fn border_colors_default_to_text_color() {
        let mut sheet = StyleSheet::new();
        sheet
            .rule(".cursor", &[("color", "#00ff00")])
            .expect("rule");
        let path = ClassPath::new(["cursor"]);
        assert_eq!(
            color_of(&sheet, &path, StyleProperty::BorderLeftColor),
            Some(green())
        );
    }

    #[test]
    fn comma_lists_add_one_rule_per_selector() {
        let mut sheet = StyleSheet::new();
        sheet
            .rule(".a, .b", &[("font-weight", "bold")])
            .expect("rule");
        assert_eq!(sheet.len(), 2);
        assert_eq!(
            sheet.resolve(&ClassPath::new(["b"]), StyleProperty::FontWeight),
            Some(StyleValue::FontWeight(FontWeight::BOLD))
        );
    }

    #[test]
    fn invalid_input_is_rejected_without_side_effects() {
        let mut sheet = StyleSheet::new();
        assert!(matches!(
            sheet.rule("", &[("color", "#fff")]),
            Err(StyleError::InvalidSelector { .. })
        ));
        assert!(matches!(
            sheet.rule(".a..b", &[("color", "#fff")]),
            Err(StyleError::InvalidSelector { .. })
        ));
        assert_eq!(
            sheet.rule(".a", &[("margin", "0")]).err(),
            Some(StyleError::UnknownProperty("margin".to_string()))
        );
        assert!(matches!(
            sheet.rule(".a", &[("font-weight", "heavy")]),
            Err(StyleError::InvalidValue { property: "font-weight", .. })
        ));
        assert!(sheet.is_empty());
    }

    #[test]
    fn values_parse_per_property_type() {
        let cases = [
            (StyleProperty::Color, "rgb(255, 0, 0)", StyleValue::Color(red())),
            (
                StyleProperty::BackgroundColor,
                "rgba(0, 0, 255, 0.5)",
                StyleValue::Color(blue().with_alpha(0.5)),
            ),
            (
                StyleProperty::BackgroundColor,
                "transparent",
                StyleValue::Color(Rgba::TRANSPARENT),
            ),
            (StyleProperty::FontWeight, "600", StyleValue::FontWeight(FontWeight(600))),
            (
                StyleProperty::BorderBottomStyle,
                "dotted",
                StyleValue::BorderStyle(BorderStyle::Dotted),
            ),
            (StyleProperty::BorderBottomWidth, "2px", StyleValue::Length(2.0)),
        ];
        for (property, text, expected) in cases {
            assert_eq!(parse_value(property, text), Ok(expected), "{} {}", property, text);
        }
        assert!(parse_value(StyleProperty::Color, "rgb(300, 0, 0)").is_err());
        assert!(parse_value(StyleProperty::BorderBottomWidth, "-1px").is_err());
    }
}
