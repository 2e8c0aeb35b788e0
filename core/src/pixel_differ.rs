//! Pairs two Renderers and scores how differently they render a string
//! (C5).

use crate::{errors::DiffError, font::Font, renderer::Renderer};

/// The result of diffing one string: a `[0, 255]` score plus the raw
/// per-channel absolute-difference map (`width * height * 4` bytes, RGBA).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelDiff {
    pub score: f32,
    pub width: u32,
    pub height: u32,
    pub diff_map: Vec<u8>,
}

impl PixelDiff {
    #[must_use]
    pub const fn empty() -> Self {
        PixelDiff { score: 0.0, width: 0, height: 0, diff_map: Vec::new() }
    }
}

/// Holds a before/after Renderer pair sharing script/lang/feature state;
/// setters always mutate both sides together.
pub struct PixelDiffer<'f, 'a> {
    before: Renderer<'f, 'a>,
    after: Renderer<'f, 'a>,
}

impl<'f, 'a> PixelDiffer<'f, 'a> {
    #[must_use]
    pub fn new(before_font: &'f Font<'a>, after_font: &'f Font<'a>, font_size: f32, margin: f32) -> Self {
        PixelDiffer {
            before: Renderer::new(before_font, font_size, margin),
            after: Renderer::new(after_font, font_size, margin),
        }
    }

    #[must_use]
    pub const fn before(&self) -> &Renderer<'f, 'a> {
        &self.before
    }

    #[must_use]
    pub const fn after(&self) -> &Renderer<'f, 'a> {
        &self.after
    }

    pub fn set_script(&mut self, script: Option<harfrust::Tag>) {
        self.before.set_script(script);
        self.after.set_script(script);
    }

    pub fn set_language(&mut self, language: Option<harfrust::Tag>) {
        self.before.set_language(language);
        self.after.set_language(language);
    }

    pub fn set_features(&mut self, features: Vec<harfrust::Feature>) {
        self.before.set_features(features.clone());
        self.after.set_features(features);
    }

    /// Renders `text` with both sides, crops to their shared top-left
    /// region, and scores the mean absolute per-channel pixel difference.
    ///
    /// A zero-sized crop (either render collapsed to empty) scores `0` with
    /// an empty diff map, per the non-fatal `RenderError` contract — this
    /// is never an error.
    pub fn diff(&self, text: &str) -> Result<PixelDiff, DiffError> {
        let before = self.before.render(text)?;
        let after = self.after.render(text)?;

        let width = before.width.min(after.width);
        let height = before.height.min(after.height);
        if width == 0 || height == 0 {
            return Ok(PixelDiff::empty());
        }

        let mut diff_map = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let before_idx = ((y * before.width + x) * 4) as usize;
                let after_idx = ((y * after.width + x) * 4) as usize;
                for channel in 0..4 {
                    let a = before.pixels[before_idx + channel];
                    let b = after.pixels[after_idx + channel];
                    diff_map.push(a.abs_diff(b));
                }
            }
        }

        let score = diff_map.iter().map(|&b| u32::from(b)).sum::<u32>() as f32 / diff_map.len() as f32;

        Ok(PixelDiff { score, width, height, diff_map })
    }
}

#[cfg(test)]
mod tests {
    use super::PixelDiffer;
    use crate::font::Font;

    #[test]
    fn identical_fonts_score_zero() {
        let before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let differ = PixelDiffer::new(&before, &after, 64.0, 4.0);
        let diff = differ.diff("A").expect("renders");
        assert_eq!(diff.score, 0.0);
        assert_eq!(diff.diff_map.len(), (diff.width * diff.height * 4) as usize);
    }

    #[test]
    fn an_empty_string_renders_an_empty_crop() {
        let before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let differ = PixelDiffer::new(&before, &after, 64.0, 4.0);
        let diff = differ.diff("").expect("renders");
        assert_eq!(diff, super::PixelDiff::empty());
    }
}
