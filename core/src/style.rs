//! A named variation-coordinate set (C2): a named instance, a cross-product
//! corner, a master, or a diffenator-style explicit location.

use harfshapedfa::Location;

/// The `(min, default, max)` range declared in `fvar` for one axis a
/// [`Style`] was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisMetadata {
    pub tag: String,
    pub min: f32,
    pub default: f32,
    pub max: f32,
}

/// A point in a font's design space, with a display name.
///
/// A `Style` doesn't borrow the [`Font`](crate::font::Font) it came from —
/// call [`Font::set_variations`](crate::font::Font::set_variations) with its
/// [`coords`](Style::coords) to apply it.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    coords: Location,
    name: String,
    axes: Vec<AxisMetadata>,
}

impl Style {
    pub(crate) fn new(coords: Location, name: String) -> Self {
        Style { coords, name, axes: Vec::new() }
    }

    /// Same as [`Style::new`], additionally recording the font's `fvar`
    /// `(min, default, max)` range for each axis the Style was built from —
    /// unavailable for synthetic Styles (e.g. [`Matcher::diffenator`]'s
    /// `wght=400` pairing for two static fonts), which keep an empty list.
    ///
    /// [`Matcher::diffenator`]: crate::matcher::Matcher::diffenator
    pub(crate) fn with_axes(coords: Location, name: String, axes: Vec<AxisMetadata>) -> Self {
        Style { coords, name, axes }
    }

    /// The variation coordinates this style applies.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &Location {
        &self.coords
    }

    /// The style's display name (subfamily name for named instances,
    /// `tag=value,...` for cross-product/master styles).
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The font's per-axis `fvar` metadata this Style was built from, empty
    /// for synthetic Styles that never touched an axis table.
    #[inline]
    #[must_use]
    pub fn axes(&self) -> &[AxisMetadata] {
        &self.axes
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
