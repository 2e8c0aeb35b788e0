//! Pairs up Styles between a before/after font (C3).
//!
//! Grounded in the original's `FontMatcher`: name-overlap matching for
//! `instances`, closest-coordinate matching (against the before font) for
//! `cross_product`/`masters`, and the single-pair `diffenator` convenience.
//! This crate only ever compares one font against one other, so the
//! original's font *lists* collapse to a single `(before, after)` pair.

use std::collections::{HashMap, HashSet};

use harfshapedfa::Location;
use regex::Regex;

use crate::{
    errors::{DiffError, MatchError},
    font::Font,
    style::Style,
};

/// Produces two aligned Style lists from a before/after font pair.
pub struct Matcher<'f, 'a> {
    before: &'f mut Font<'a>,
    after: &'f mut Font<'a>,
    before_styles: Vec<Style>,
    after_styles: Vec<Style>,
}

impl<'f, 'a> Matcher<'f, 'a> {
    /// Borrows both fonts exclusively for the lifetime of the match.
    pub fn new(before: &'f mut Font<'a>, after: &'f mut Font<'a>) -> Self {
        Matcher {
            before,
            after,
            before_styles: Vec::new(),
            after_styles: Vec::new(),
        }
    }

    /// The paired before-side Styles, in the order matching
    /// [`Matcher::after_styles`].
    #[must_use]
    pub fn before_styles(&self) -> &[Style] {
        &self.before_styles
    }

    /// The paired after-side Styles.
    #[must_use]
    pub fn after_styles(&self) -> &[Style] {
        &self.after_styles
    }

    /// Intersects each side's named instances by name, sorted lexically.
    pub fn instances(&mut self, filter_regex: Option<&str>) -> Result<(), DiffError> {
        let before: HashMap<String, Style> = self
            .before
            .named_instances()
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();
        let after: HashMap<String, Style> = self
            .after
            .named_instances()
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();

        let mut names: Vec<&String> = before.keys().filter(|n| after.contains_key(*n)).collect();
        names.sort();

        let re = filter_regex.map(Regex::new).transpose().map_err(|_| MatchError)?;
        let names: Vec<&String> = match &re {
            Some(re) => names.into_iter().filter(|n| re.is_match(n)).collect(),
            None => names,
        };

        self.before_styles = names.iter().map(|n| before[*n].clone()).collect();
        self.after_styles = names.iter().map(|n| after[*n].clone()).collect();
        self.finish(MatchError)
    }

    /// `after.cross_product()`, matched against `before.closest_style`.
    pub fn cross_product(&mut self, filter_regex: Option<&str>) -> Result<(), DiffError> {
        self.closest_match(self.after.cross_product(), filter_regex)
    }

    /// `after.masters()`, matched against `before.closest_style`.
    pub fn masters(&mut self, filter_regex: Option<&str>) -> Result<(), DiffError> {
        self.closest_match(self.after.masters(), filter_regex)
    }

    fn closest_match(
        &mut self,
        candidates: Vec<Style>,
        filter_regex: Option<&str>,
    ) -> Result<(), DiffError> {
        let re = filter_regex.map(Regex::new).transpose().map_err(|_| MatchError)?;

        let mut seen = HashSet::new();
        let mut before_styles = Vec::new();
        let mut after_styles = Vec::new();
        for candidate in candidates {
            let Some(before_style) = self.before.closest_style(candidate.coords()) else {
                continue;
            };
            if !seen.insert(before_style.name().to_string()) {
                continue;
            }
            let after_style = Style::new(before_style.coords().clone(), candidate.name().to_string());
            before_styles.push(before_style);
            after_styles.push(after_style);
        }

        let mut paired: Vec<(Style, Style)> = before_styles.into_iter().zip(after_styles).collect();
        if let Some(re) = &re {
            paired.retain(|(before, _)| re.is_match(before.name()));
        }
        paired.sort_by(|a, b| {
            coord_values(a.0.coords())
                .partial_cmp(&coord_values(b.0.coords()))
                .unwrap()
                .then_with(|| a.0.name().cmp(b.0.name()))
        });

        self.before_styles = paired.iter().map(|(b, _)| b.clone()).collect();
        self.after_styles = paired.into_iter().map(|(_, a)| a).collect();
        self.finish(MatchError)
    }

    /// The single-pair convenience: pins both fonts to a shared location (or
    /// the stylename-matching instance, or a synthetic `wght=400` pair) and
    /// records a single unnamed Style pair.
    pub fn diffenator(&mut self, coords: Option<Location>) -> Result<(), DiffError> {
        match (self.before.is_variable(), self.after.is_variable()) {
            (true, true) => {
                let coords = match coords {
                    Some(coords) => coords,
                    None => default_location(self.after),
                };
                self.before.set_variations(&coords)?;
                self.after.set_variations(&coords)?;
                self.before_styles = vec![Style::new(coords.clone(), String::new())];
                self.after_styles = vec![Style::new(coords, String::new())];
            },
            (true, false) => {
                self.before.set_variations_from_static(self.after)?;
                self.before_styles = vec![Style::new(self.before.location().clone(), String::new())];
                self.after_styles = vec![Style::new(Location::new(), String::new())];
            },
            (false, true) => {
                self.after.set_variations_from_static(self.before)?;
                self.before_styles = vec![Style::new(Location::new(), String::new())];
                self.after_styles = vec![Style::new(self.after.location().clone(), String::new())];
            },
            (false, false) => {
                let coords = Location::new()
                    .axis("wght", 400.0)
                    .map_err(DiffError::from)?
                    .clone();
                self.before_styles = vec![Style::new(coords.clone(), String::new())];
                self.after_styles = vec![Style::new(coords, String::new())];
            },
        }
        Ok(())
    }

    /// The ratio to scale the before font's raw design units by so that its
    /// units-per-em equals the after font's.
    ///
    /// This crate never rewrites font tables — callers apply
    /// this factor to raw-unit quantities (advances, table values) before
    /// comparing them, rather than physically rescaling the before font.
    #[must_use]
    pub fn upms(&self) -> f32 {
        crate::utils::scale_upem(1.0, self.before.upem(), self.after.upem())
    }

    fn finish(&self, err: MatchError) -> Result<(), DiffError> {
        if self.before_styles.is_empty() {
            return Err(DiffError::Match(err));
        }
        Ok(())
    }
}

fn default_location(font: &Font) -> Location {
    font.fontref()
        .axes()
        .iter()
        .map(|axis| (axis.tag(), axis.default_value()))
        .collect()
}

fn coord_values(location: &Location) -> Vec<f32> {
    let mut entries: Vec<_> = location.to_std().into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::Matcher;
    use crate::font::Font;

    #[test]
    fn diffenator_pairs_two_static_fonts_on_a_synthetic_wght_400() {
        let mut before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let mut after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let mut matcher = Matcher::new(&mut before, &mut after);
        matcher.diffenator(None).expect("both static fonts always pair");
        assert_eq!(matcher.before_styles().len(), 1);
        assert_eq!(matcher.after_styles().len(), 1);
        assert_eq!(matcher.before_styles()[0].coords().to_std().get("wght"), Some(&400.0));
    }

    #[test]
    fn diffenator_pins_two_variable_fonts_to_a_shared_location() {
        let mut before = Font::open(font_test_data::VAZIRMATN_VAR, "old").expect("loads");
        let mut after = Font::open(font_test_data::VAZIRMATN_VAR, "new").expect("loads");
        let mut matcher = Matcher::new(&mut before, &mut after);
        matcher.diffenator(None).expect("both variable fonts always pair");
        assert_eq!(matcher.before_styles().len(), 1);
        assert_eq!(matcher.before_styles()[0].coords(), matcher.after_styles()[0].coords());
    }

    #[test]
    fn instances_matches_identical_fonts_by_name() {
        let mut before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let mut after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let mut matcher = Matcher::new(&mut before, &mut after);
        matcher.instances(None).expect("identical fonts share every instance name");
        assert_eq!(matcher.before_styles().len(), matcher.after_styles().len());
        assert!(!matcher.before_styles().is_empty());
    }

    #[test]
    fn upms_is_one_for_fonts_sharing_a_units_per_em() {
        let mut before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let mut after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let matcher = Matcher::new(&mut before, &mut after);
        assert_eq!(matcher.upms(), 1.0);
    }
}
