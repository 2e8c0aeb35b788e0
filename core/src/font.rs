//! The Font handle (C1): loads a font once, caches its shaping handle, and
//! holds the current variation-coordinate state.

use std::collections::BTreeSet;

use harfrust::{ShaperData, ShaperInstance};
use harfshapedfa::Location;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use skrifa::{FontRef, MetadataProvider, Tag, raw::TableProvider};

use crate::{
    errors::{DiffError, LoadError, SkrifaReadError},
    style::Style,
};

/// A loaded font: parsed tables, a shaping handle, and the current variation
/// coordinates.
///
/// Not safe to share across threads: each worker must own its own `Font` —
/// a `Font` and its derived shaping/rasterising handles are exclusive to
/// one worker.
pub struct Font<'a> {
    font: FontRef<'a>,
    shaper_data: ShaperData,
    location: Location,
    upem: u16,
    is_color: bool,
    family_name: String,
    /// `"old"`/`"new"`, used for CSS identity in reports only.
    suffix: &'static str,
}

impl<'a> Font<'a> {
    /// Loads a font from its raw bytes.
    ///
    /// Fails with [`LoadError`] if the bytes can't be parsed or the font is
    /// missing the `head`/`name` tables this crate depends on.
    pub fn open(font_bytes: &'a [u8], suffix: &'static str) -> Result<Self, DiffError> {
        let font = FontRef::new(font_bytes)
            .map_err(SkrifaReadError)
            .map_err(LoadError::from)?;

        let upem = font
            .head()
            .map_err(|_| LoadError::MissingTable("head"))?
            .units_per_em();

        let is_color = font.svg().is_ok()
            || font.colr().is_ok()
            || font.cbdt().is_ok()
            || font.sbix().is_ok();

        let family_name = best_family_name(&font)
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(Font {
            shaper_data: ShaperData::new(&font),
            font,
            location: Location::new(),
            upem,
            is_color,
            family_name,
            suffix,
        })
    }

    /// The underlying `skrifa`-parsed font.
    #[must_use]
    pub const fn fontref(&self) -> &FontRef<'a> {
        &self.font
    }

    /// Units per em, read from `head`.
    #[inline]
    #[must_use]
    pub const fn upem(&self) -> u16 {
        self.upem
    }

    /// The font's family name (from `name`, best-effort Windows/English
    /// first, falling back to any entry).
    #[must_use]
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// `"old"` or `"new"` — identifies which side of the diff this font is
    /// on. Used only for report CSS identity, never for comparison logic.
    #[inline]
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        self.suffix
    }

    /// The variation coordinates currently applied to this font.
    #[inline]
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// `true` iff the font declares a variation-axes table.
    #[inline]
    #[must_use]
    pub fn is_variable(&self) -> bool {
        !self.font.axes().is_empty()
    }

    /// `true` iff any of the SVG/COLR/CBDT/sbix colour-glyph tables are
    /// present.
    #[inline]
    #[must_use]
    pub const fn is_color(&self) -> bool {
        self.is_color
    }

    /// A [`harfrust::ShaperInstance`] built from the font's current
    /// [`Location`]; used by the Renderer (C4) to build a `Shaper`.
    #[must_use]
    pub fn shaper_instance(&self) -> ShaperInstance {
        ShaperInstance::from_variations(&self.font, self.location.to_harfrust())
    }

    #[must_use]
    pub(crate) const fn shaper_data(&self) -> &ShaperData {
        &self.shaper_data
    }

    /// One [`Style`] per named instance, or a single synthetic Style built
    /// from `(wght=OS/2.usWeightClass, subfamily name)` for a static font.
    #[must_use]
    pub fn named_instances(&self) -> Vec<Style> {
        if !self.is_variable() {
            let wght = self
                .font
                .os2()
                .map(|os2| f32::from(os2.us_weight_class()))
                .unwrap_or(400.0);
            return vec![Style::new(
                Location::new().axis("wght", wght).ok().cloned().unwrap_or_default(),
                self.family_name.clone(),
            )];
        }

        let axes = self.axis_metadata();
        self.font
            .named_instances()
            .iter()
            .map(|instance| {
                let coords = instance
                    .user_coords()
                    .zip(self.font.axes().iter())
                    .map(|(value, axis)| (axis.tag(), value))
                    .collect::<Location>();
                let name = instance
                    .subfamily_name_id()
                    .and_then(|id| self.font.localized_strings(id).english_or_first())
                    .map(|s| s.chars().collect::<String>())
                    .unwrap_or_else(|| "Instance".to_string());
                Style::with_axes(coords, name, axes.clone())
            })
            .collect()
    }

    /// The font's `fvar` axes as [`crate::style::AxisMetadata`], in
    /// declaration order. Empty for a static font.
    fn axis_metadata(&self) -> Vec<crate::style::AxisMetadata> {
        self.font
            .axes()
            .iter()
            .map(|axis| crate::style::AxisMetadata {
                tag: axis.tag().to_string(),
                min: axis.min_value(),
                default: axis.default_value(),
                max: axis.max_value(),
            })
            .collect()
    }

    /// Cartesian product of `{min, (min+max)/2, max}` across every declared
    /// axis.
    #[must_use]
    pub fn cross_product(&self) -> Vec<Style> {
        let axes = self.font.axes();
        if axes.is_empty() {
            return Vec::new();
        }

        let per_axis_values: Vec<Vec<(Tag, f32)>> = axes
            .iter()
            .map(|axis| {
                let min = axis.min_value();
                let max = axis.max_value();
                let mid = (min + max) / 2.0;
                vec![(axis.tag(), min), (axis.tag(), mid), (axis.tag(), max)]
            })
            .collect();

        let axis_metadata = self.axis_metadata();
        per_axis_values
            .iter()
            .multi_cartesian_product()
            .map(|combo| {
                let coords: Location = combo.into_iter().copied().collect();
                let name = format_style_name(&coords);
                Style::with_axes(coords, name, axis_metadata.clone())
            })
            .collect()
    }

    /// Per-axis "peak" values obtained from the font's variation stores,
    /// mapped back through the inverse `avar` segmentation to user-space,
    /// deduplicated, then combined as a Cartesian product.
    ///
    /// Axes with at most one distinct peak (i.e. only the default) are
    /// dropped, since a single-point axis contributes nothing to the
    /// product.
    #[must_use]
    pub fn masters(&self) -> Vec<Style> {
        let axes = self.font.axes();
        if axes.is_empty() {
            return Vec::new();
        }

        let avar_maps = crate::utils::avar_segment_maps(&self.font);

        let mut peaks_per_axis: Vec<BTreeSet<OrderedFloat<f32>>> =
            vec![BTreeSet::new(); axes.len()];

        for (axis_index, normalized_peak) in
            crate::utils::normalized_variation_peaks(&self.font)
        {
            let Some(axis) = axes.get(axis_index) else {
                continue;
            };
            let reversed = avar_maps
                .get(axis_index)
                .map(|segments| crate::utils::reverse_avar(segments, normalized_peak))
                .unwrap_or(normalized_peak);
            let user_value = crate::utils::normalized_to_user(
                reversed,
                axis.min_value(),
                axis.default_value(),
                axis.max_value(),
            );
            peaks_per_axis[axis_index].insert(OrderedFloat(user_value));
        }

        for (axis_index, axis) in axes.iter().enumerate() {
            peaks_per_axis[axis_index].insert(OrderedFloat(axis.default_value()));
        }

        let tags: Vec<Tag> = axes.iter().map(|axis| axis.tag()).collect();
        let axis_metadata = self.axis_metadata();
        peaks_per_axis
            .iter()
            .enumerate()
            .filter(|(_, peaks)| peaks.len() > 1)
            .map(|(i, peaks)| (tags[i], peaks))
            .map(|(tag, peaks)| peaks.iter().map(move |v| (tag, v.into_inner())).collect::<Vec<_>>())
            .multi_cartesian_product()
            .map(|combo| {
                let coords: Location = combo.into_iter().collect();
                let name = format_style_name(&coords);
                Style::with_axes(coords, name, axis_metadata.clone())
            })
            .collect()
    }

    /// Accepts `coords` iff every requested axis exists on the font and
    /// every value lies within `[min, max]` (boundary values are valid).
    #[must_use]
    pub fn closest_style(&self, coords: &Location) -> Option<Style> {
        let axes = self.font.axes();
        for (tag, value) in coords.to_std() {
            let tag = Tag::new_checked(tag.as_bytes()).ok()?;
            let axis = axes.iter().find(|axis| axis.tag() == tag)?;
            if value < axis.min_value() || value > axis.max_value() {
                return None;
            }
        }
        Some(Style::with_axes(coords.clone(), format_style_name(coords), self.axis_metadata()))
    }

    /// Updates the current coordinate state. No-op on an empty map (the
    /// coordinates already applied are left untouched).
    pub fn set_variations(&mut self, coords: &Location) -> Result<(), DiffError> {
        if coords.to_std().is_empty() {
            return Ok(());
        }
        coords.validate_for(&self.font)?;
        self.location = coords.clone();
        Ok(())
    }

    /// Finds the named instance whose subfamily name equals `other`'s best
    /// subfamily name and applies its coordinates.
    ///
    /// Fails with [`DiffError::NoMatchingInstance`] if none match.
    pub fn set_variations_from_static(&mut self, other: &Font) -> Result<(), DiffError> {
        let target = other.subfamily_name();
        let instance = self
            .named_instances()
            .into_iter()
            .find(|style| style.name() == target)
            .ok_or(DiffError::NoMatchingInstance)?;
        self.set_variations(instance.coords())
    }

    /// The font's subfamily (style) name, e.g. `"ExtraBold"`.
    #[must_use]
    pub fn subfamily_name(&self) -> String {
        use skrifa::string::StringId;

        self.font
            .localized_strings(StringId::SUBFAMILY_NAME)
            .english_or_first()
            .map(|s| s.chars().collect::<String>())
            .unwrap_or_else(|| "Regular".to_string())
    }
}

fn best_family_name(font: &FontRef) -> Option<String> {
    use skrifa::string::StringId;

    font.localized_strings(StringId::FAMILY_NAME)
        .english_or_first()
        .map(|s| s.chars().collect::<String>())
}

fn format_style_name(coords: &Location) -> String {
    let mut entries = coords.to_std().into_iter().collect::<Vec<_>>();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .into_iter()
        .map(|(tag, value)| format!("{tag}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use harfshapedfa::Location;

    use super::Font;

    #[test]
    fn open_reads_upem_and_family_name_from_a_variable_font() {
        let font = Font::open(font_test_data::VAZIRMATN_VAR, "old").expect("loads");
        assert!(font.upem() > 0);
        assert!(!font.family_name().is_empty());
        assert!(font.is_variable());
        assert_eq!(font.suffix(), "old");
    }

    #[test]
    fn a_static_font_has_no_variable_axes() {
        let font = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        assert!(!font.is_variable());
        assert!(font.cross_product().is_empty());
        assert!(font.masters().is_empty());
    }

    #[test]
    fn a_variable_font_yields_a_non_empty_cross_product_and_masters() {
        let font = Font::open(font_test_data::VAZIRMATN_VAR, "old").expect("loads");
        assert!(!font.cross_product().is_empty());
        assert!(!font.masters().is_empty());
    }

    #[test]
    fn styles_from_a_variable_font_carry_their_fvar_axis_metadata() {
        let font = Font::open(font_test_data::VAZIRMATN_VAR, "old").expect("loads");
        for style in font.named_instances() {
            assert!(!style.axes().is_empty());
        }
        assert!(!font.cross_product()[0].axes().is_empty());
    }

    #[test]
    fn a_synthetic_static_font_instance_has_no_axis_metadata() {
        let font = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let instances = font.named_instances();
        assert_eq!(instances.len(), 1);
        assert!(instances[0].axes().is_empty());
    }

    #[test]
    fn closest_style_rejects_out_of_range_or_unknown_axes() {
        let font = Font::open(font_test_data::VAZIRMATN_VAR, "old").expect("loads");
        let in_range = Location::new().axis("wght", 500.0).expect("valid tag").clone();
        assert!(font.closest_style(&in_range).is_some());

        let out_of_range = Location::new().axis("wght", 100_000.0).expect("valid tag").clone();
        assert!(font.closest_style(&out_of_range).is_none());

        let unknown_axis = Location::new().axis("zzzz", 1.0).expect("valid tag").clone();
        assert!(font.closest_style(&unknown_axis).is_none());
    }

    #[test]
    fn set_variations_is_a_no_op_on_an_empty_location() {
        let mut font = Font::open(font_test_data::VAZIRMATN_VAR, "old").expect("loads");
        let before = font.location().clone();
        font.set_variations(&Location::new()).expect("empty coords always validate");
        assert_eq!(font.location(), &before);
    }
}
