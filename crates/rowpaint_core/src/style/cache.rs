//! Generational cache of resolved style properties.

use super::{
    BorderStyle, ClassPath, FontStyle, FontWeight, Rgba, StyleProperty, StyleResolver, StyleValue,
    ValueKind,
};
use crate::generation::GenerationalCache;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StyleKey {
    property: StyleProperty,
    path: ClassPath,
}

/// Memoizes resolver lookups keyed by `(property, class path)`.
///
/// Unlike the layout cache, generations are advanced explicitly by the frame
/// renderer: style lookups are interleaved with layout construction, so
/// there is no single batch call that could own the frame boundary.
///
/// Styles read only while shaping a line are not touched again once its
/// layout is cached, so they are swept after that frame and resolved anew by
/// the next layout miss that needs them. The cache trades that re-resolution
/// for holding only what the current frame asked for.
pub struct StyleCache {
    resolver: Box<dyn StyleResolver>,
    colors: GenerationalCache<StyleKey, Rgba>,
    font_weights: GenerationalCache<StyleKey, FontWeight>,
    font_styles: GenerationalCache<StyleKey, FontStyle>,
    border_styles: GenerationalCache<StyleKey, BorderStyle>,
    lengths: GenerationalCache<StyleKey, f32>,
}

impl StyleCache {
    pub fn new(resolver: impl StyleResolver + 'static) -> Self {
        Self::from_boxed(Box::new(resolver))
    }

    pub fn from_boxed(resolver: Box<dyn StyleResolver>) -> Self {
        Self {
            resolver,
            colors: GenerationalCache::new(),
            font_weights: GenerationalCache::new(),
            font_styles: GenerationalCache::new(),
            border_styles: GenerationalCache::new(),
            lengths: GenerationalCache::new(),
        }
    }

    /// Swap the resolver (theme change) and drop everything resolved so far.
    pub fn set_resolver(&mut self, resolver: Box<dyn StyleResolver>) {
        self.resolver = resolver;
        self.clear();
    }

    pub fn increment_generation(&mut self) {
        self.colors.increment_generation();
        self.font_weights.increment_generation();
        self.font_styles.increment_generation();
        self.border_styles.increment_generation();
        self.lengths.increment_generation();
    }

    /// Sweep entries not requested since the last generation bump.
    ///
    /// # Returns
    /// Number of evicted entries across all buckets.
    pub fn collect_garbage(&mut self) -> usize {
        let evicted = self.colors.collect_garbage()
            + self.font_weights.collect_garbage()
            + self.font_styles.collect_garbage()
            + self.border_styles.collect_garbage()
            + self.lengths.collect_garbage();
        if evicted > 0 {
            debug!(evicted, remaining = self.len(), "style cache sweep");
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.colors.clear();
        self.font_weights.clear();
        self.font_styles.clear();
        self.border_styles.clear();
        self.lengths.clear();
    }

    /// Total cached values across buckets.
    pub fn len(&self) -> usize {
        self.colors.len()
            + self.font_weights.len()
            + self.font_styles.len()
            + self.border_styles.len()
            + self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve any property, dispatching to the bucket of its value type.
    pub fn get_property(&mut self, path: &ClassPath, property: StyleProperty) -> StyleValue {
        match property.kind() {
            ValueKind::Color => StyleValue::Color(self.color(path, property)),
            ValueKind::FontWeight => StyleValue::FontWeight(self.font_weight(path)),
            ValueKind::FontStyle => StyleValue::FontStyle(self.font_style(path)),
            ValueKind::BorderStyle => StyleValue::BorderStyle(self.border_style(path, property)),
            ValueKind::Length => StyleValue::Length(self.length(path, property)),
        }
    }

    pub fn color(&mut self, path: &ClassPath, property: StyleProperty) -> Rgba {
        let key = StyleKey {
            property,
            path: path.clone(),
        };
        let resolver = &*self.resolver;
        self.colors.get_or_insert_with(&key, || {
            match resolve_typed(resolver, path, property) {
                StyleValue::Color(color) => color,
                _ => Rgba::BLACK,
            }
        })
    }

    pub fn font_weight(&mut self, path: &ClassPath) -> FontWeight {
        let property = StyleProperty::FontWeight;
        let key = StyleKey {
            property,
            path: path.clone(),
        };
        let resolver = &*self.resolver;
        self.font_weights.get_or_insert_with(&key, || {
            match resolve_typed(resolver, path, property) {
                StyleValue::FontWeight(weight) => weight,
                _ => FontWeight::NORMAL,
            }
        })
    }

    pub fn font_style(&mut self, path: &ClassPath) -> FontStyle {
        let property = StyleProperty::FontStyle;
        let key = StyleKey {
            property,
            path: path.clone(),
        };
        let resolver = &*self.resolver;
        self.font_styles.get_or_insert_with(&key, || {
            match resolve_typed(resolver, path, property) {
                StyleValue::FontStyle(style) => style,
                _ => FontStyle::Normal,
            }
        })
    }

    pub fn border_style(&mut self, path: &ClassPath, property: StyleProperty) -> BorderStyle {
        let key = StyleKey {
            property,
            path: path.clone(),
        };
        let resolver = &*self.resolver;
        self.border_styles.get_or_insert_with(&key, || {
            match resolve_typed(resolver, path, property) {
                StyleValue::BorderStyle(style) => style,
                _ => BorderStyle::None,
            }
        })
    }

    pub fn length(&mut self, path: &ClassPath, property: StyleProperty) -> f32 {
        let key = StyleKey {
            property,
            path: path.clone(),
        };
        let resolver = &*self.resolver;
        self.lengths.get_or_insert_with(&key, || {
            match resolve_typed(resolver, path, property) {
                StyleValue::Length(length) => length,
                _ => 0.0,
            }
        })
    }
}

/// Resolve and coerce to the property's value kind.
///
/// A value of the wrong kind is replaced by the initial value, so one
/// bucket never stores another bucket's type.
fn resolve_typed(
    resolver: &dyn StyleResolver,
    path: &ClassPath,
    property: StyleProperty,
) -> StyleValue {
    match resolver.resolve(path, property) {
        Some(value) if value.kind() == property.kind() => value,
        Some(value) => {
            warn!(
                property = property.name(),
                path = ?path.elements(),
                got = ?value.kind(),
                "style resolver returned a value of the wrong type; using initial value"
            );
            property.initial()
        }
        None => property.initial(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_resolver(calls: Rc<Cell<usize>>) -> impl StyleResolver {
        move |path: &ClassPath, property: StyleProperty| {
            calls.set(calls.get() + 1);
            match property {
                StyleProperty::Color if path.len() == 1 => Some(StyleValue::Color(Rgba::WHITE)),
                // Deliberately mistyped to exercise the fallback.
                StyleProperty::FontWeight => Some(StyleValue::Color(Rgba::WHITE)),
                _ => None,
            }
        }
    }

    #[test]
    fn repeated_lookups_hit_the_cache() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = StyleCache::new(counting_resolver(calls.clone()));
        let path = ClassPath::new(["line"]);
        for _ in 0..3 {
            assert_eq!(cache.color(&path, StyleProperty::Color), Rgba::WHITE);
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(
            cache.get_property(&path, StyleProperty::Color),
            StyleValue::Color(Rgba::WHITE)
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn property_and_path_are_both_part_of_the_key() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = StyleCache::new(counting_resolver(calls.clone()));
        let line = ClassPath::new(["line"]);
        let nested = ClassPath::new(["line", "syntax--keyword"]);
        assert_eq!(cache.color(&line, StyleProperty::Color), Rgba::WHITE);
        assert_eq!(cache.color(&nested, StyleProperty::Color), Rgba::BLACK);
        assert_eq!(
            cache.color(&line, StyleProperty::BackgroundColor),
            Rgba::TRANSPARENT
        );
        assert_eq!(calls.get(), 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn mistyped_values_fall_back_to_initial() {
        let mut cache = StyleCache::new(counting_resolver(Rc::new(Cell::new(0))));
        let path = ClassPath::new(["line"]);
        assert_eq!(cache.font_weight(&path), FontWeight::NORMAL);
        assert_eq!(
            cache.get_property(&path, StyleProperty::BorderBottomWidth),
            StyleValue::Length(1.0)
        );
    }

    #[test]
    fn unrequested_entries_are_swept_after_a_generation() {
        let calls = Rc::new(Cell::new(0));
        let mut cache = StyleCache::new(counting_resolver(calls.clone()));
        let kept = ClassPath::new(["line"]);
        let dropped = ClassPath::new(["cursor"]);

        cache.increment_generation();
        cache.color(&kept, StyleProperty::Color);
        cache.color(&dropped, StyleProperty::BorderLeftColor);
        assert_eq!(cache.collect_garbage(), 0);

        cache.increment_generation();
        cache.color(&kept, StyleProperty::Color);
        assert_eq!(cache.collect_garbage(), 1);
        assert_eq!(cache.len(), 1);

        cache.color(&dropped, StyleProperty::BorderLeftColor);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn set_resolver_discards_resolved_values() {
        let mut cache = StyleCache::new(counting_resolver(Rc::new(Cell::new(0))));
        let path = ClassPath::new(["line"]);
        assert_eq!(cache.color(&path, StyleProperty::Color), Rgba::WHITE);
        let red = Rgba::from_rgb8(255, 0, 0);
        cache.set_resolver(Box::new(move |_: &ClassPath, _: StyleProperty| {
            Some(StyleValue::Color(red))
        }));
        assert!(cache.is_empty());
        assert_eq!(cache.color(&path, StyleProperty::Color), red);
    }
}
