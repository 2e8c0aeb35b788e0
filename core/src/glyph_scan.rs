//! Cmap-driven single-codepoint rendering regression scan (C7).
//!
//! Grounded in the original's `shape.py::test_font_glyphs`.

use std::collections::BTreeSet;

use crate::{errors::DiffError, font::Font, pixel_differ::PixelDiffer};

/// A codepoint present on only one side of the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Glyph(pub char);

/// A codepoint present on both sides whose rendering differs above
/// threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphDiff {
    pub codepoint: char,
    pub score: f32,
    pub width: u32,
    pub height: u32,
    /// Per-pixel absolute channel difference, row-major RGBA.
    pub diff_map: Vec<u8>,
}

/// The three buckets a cmap comparison produces.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphItems {
    pub missing: Vec<Glyph>,
    pub new: Vec<Glyph>,
    pub modified: Vec<GlyphDiff>,
}

/// Compares two fonts' cmaps and scores the rendering of every shared
/// codepoint.
///
/// `missing`/`new` are sorted by codepoint; `modified` is sorted by score
/// descending. `font_size`/`margin` match the word scan's [`PixelDiffer`] so
/// a glyph and a word containing it are rasterised the same way.
pub fn scan_glyphs(
    before: &Font,
    after: &Font,
    threshold: f32,
    font_size: f32,
    margin: f32,
) -> Result<GlyphItems, DiffError> {
    let before_cmap: BTreeSet<char> = before
        .fontref()
        .charmap()
        .mappings()
        .filter_map(|(cp, _)| char::from_u32(cp))
        .collect();
    let after_cmap: BTreeSet<char> = after
        .fontref()
        .charmap()
        .mappings()
        .filter_map(|(cp, _)| char::from_u32(cp))
        .collect();

    let missing: Vec<Glyph> = before_cmap.difference(&after_cmap).copied().map(Glyph).collect();
    let new: Vec<Glyph> = after_cmap.difference(&before_cmap).copied().map(Glyph).collect();

    let differ = PixelDiffer::new(before, after, font_size, margin);
    let mut modified = Vec::new();
    for &codepoint in before_cmap.intersection(&after_cmap) {
        let diff = differ.diff(&codepoint.to_string())?;
        if diff.score > threshold {
            modified.push(GlyphDiff {
                codepoint,
                score: diff.score,
                width: diff.width,
                height: diff.height,
                diff_map: diff.diff_map,
            });
        }
    }
    modified.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());

    Ok(GlyphItems { missing, new, modified })
}

#[cfg(test)]
mod tests {
    use super::scan_glyphs;
    use crate::font::Font;

    #[test]
    fn identical_fonts_have_no_missing_new_or_modified_glyphs() {
        let before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let items = scan_glyphs(&before, &after, 0.0, 28.0, 2.0).expect("scans");
        assert!(items.missing.is_empty());
        assert!(items.new.is_empty());
        assert!(items.modified.is_empty());
    }

    #[test]
    fn a_very_high_threshold_suppresses_every_modified_entry() {
        let before = Font::open(font_test_data::NOTO_SERIF_DISPLAY_TRIMMED, "old").expect("loads");
        let after = Font::open(font_test_data::CANTARELL_VF_TRIMMED, "new").expect("loads");
        let items = scan_glyphs(&before, &after, f32::MAX, 28.0, 2.0).expect("scans");
        assert!(items.modified.is_empty());
    }
}
