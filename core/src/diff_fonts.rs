//! The top-level facade (C9): runs the table diff, glyph/word scans, and an
//! optional user wordlist scan against one before/after font pair, and
//! exposes the results as plain data.
//!
//! Replaces the original's `dir(self)`-based dynamic `diff_*` dispatch with
//! a fixed set of phases, each independently idempotent and rerun-safe.

use std::collections::{BTreeMap, HashSet};

use unicode_script::UnicodeScript;

use crate::{
    errors::DiffError,
    font::Font,
    glyph_scan::{self, GlyphItems},
    pixel_differ::PixelDiffer,
    table_diff::{self, Value},
    utils::characters_in_string,
    word_scan::{self, WordDiff},
    wordlist,
};

/// Minimum reachable-codepoint count a script needs before its bundled
/// wordlist is consulted.
const MIN_SCRIPT_CODEPOINTS: usize = 10;

/// Everything `diff_*` produced so far for one before/after font pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffReport {
    pub tables: Option<Value>,
    pub glyphs: Option<GlyphItems>,
    pub words: BTreeMap<String, Vec<WordDiff>>,
    pub strings: Option<Vec<WordDiff>>,
}

/// Runs the diff phases against a before/after [`Font`] pair.
pub struct DiffFonts<'f, 'a> {
    before: &'f Font<'a>,
    after: &'f Font<'a>,
    threshold: f32,
    font_size: f32,
    margin: f32,
    /// [`Matcher::upms`](crate::matcher::Matcher::upms): how much to scale
    /// `before`'s raw table units so they're comparable to `after`'s.
    upm_ratio: f32,
    report: DiffReport,
}

impl<'f, 'a> DiffFonts<'f, 'a> {
    #[must_use]
    pub fn new(
        before: &'f Font<'a>,
        after: &'f Font<'a>,
        threshold: f32,
        font_size: f32,
        upm_ratio: f32,
    ) -> Self {
        DiffFonts { before, after, threshold, font_size, margin: 2.0, upm_ratio, report: DiffReport::default() }
    }

    #[must_use]
    pub fn report(&self) -> &DiffReport {
        &self.report
    }

    /// Normalises both fonts' tables and structurally diffs them, scaling
    /// `before`'s raw units by [`DiffFonts::upm_ratio`] first so a
    /// units-per-em mismatch alone doesn't show up as a wall of changes.
    pub fn diff_tables(&mut self) -> Result<(), DiffError> {
        let before = table_diff::normalize(self.before.fontref(), self.upm_ratio);
        let after = table_diff::normalize(self.after.fontref(), 1.0);
        self.report.tables = table_diff::diff(&before, &after);
        Ok(())
    }

    /// Runs the glyph scan (C7), then the multi-script word scan (C6) over
    /// every script whose bundled wordlist applies.
    pub fn diff_words(&mut self) -> Result<(), DiffError> {
        let glyphs =
            glyph_scan::scan_glyphs(self.before, self.after, self.threshold, self.font_size, self.margin)?;
        let skip_glyphs: HashSet<char> = glyphs
            .missing
            .iter()
            .map(|g| g.0)
            .chain(glyphs.new.iter().map(|g| g.0))
            .collect();

        let mut script_tally: BTreeMap<&'static str, usize> = BTreeMap::new();
        for (codepoint, _) in self.before.fontref().charmap().mappings() {
            let Some(ch) = char::from_u32(codepoint) else { continue };
            *script_tally.entry(ch.script().full_name()).or_insert(0) += 1;
        }

        self.report.words = self.diff_scripts(script_tally, &skip_glyphs)?;
        self.report.glyphs = Some(glyphs);
        Ok(())
    }

    /// Scans every script with enough cmap coverage against its bundled
    /// wordlist.
    fn diff_scripts(
        &self,
        script_tally: BTreeMap<&'static str, usize>,
        skip_glyphs: &HashSet<char>,
    ) -> Result<BTreeMap<String, Vec<WordDiff>>, DiffError> {
        let mut words = BTreeMap::new();
        for (script, count) in script_tally {
            if count < MIN_SCRIPT_CODEPOINTS {
                continue;
            }
            let Some(word_list) = wordlist::lookup(script) else {
                continue;
            };
            let mut differ = PixelDiffer::new(self.before, self.after, self.font_size, self.margin);
            let diffs =
                word_scan::scan_words(wordlist::rows(word_list), &mut differ, skip_glyphs, self.threshold)?;
            if !diffs.is_empty() {
                words.insert(script.to_string(), diffs);
            }
        }
        Ok(words)
    }

    /// Runs the word scan over a user-supplied wordlist's raw contents.
    pub fn diff_strings(&mut self, wordlist_contents: &str) -> Result<(), DiffError> {
        let mut differ = PixelDiffer::new(self.before, self.after, self.font_size, self.margin);
        let diffs = word_scan::scan_words(
            wordlist::rows_from_str(wordlist_contents),
            &mut differ,
            &HashSet::new(),
            self.threshold,
        )?;
        self.report.strings = Some(diffs);
        Ok(())
    }

    /// Runs every phase except [`DiffFonts::diff_strings`].
    pub fn diff_all(&mut self) -> Result<(), DiffError> {
        self.diff_tables()?;
        self.diff_words()?;
        Ok(())
    }

    /// Retains only report entries whose source string is a subset of
    /// `characters`.
    pub fn filter_characters(&mut self, characters: &HashSet<char>) {
        let keep = |w: &WordDiff| characters_in_string(&w.string, characters);
        for diffs in self.report.words.values_mut() {
            diffs.retain(keep);
        }
        self.report.words.retain(|_, diffs| !diffs.is_empty());
        if let Some(strings) = &mut self.report.strings {
            strings.retain(keep);
        }
        if let Some(glyphs) = &mut self.report.glyphs {
            glyphs.missing.retain(|g| characters.contains(&g.0));
            glyphs.new.retain(|g| characters.contains(&g.0));
            glyphs.modified.retain(|g| characters.contains(&g.codepoint));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::DiffFonts;
    use crate::font::Font;

    #[test]
    fn identical_fonts_produce_an_empty_report() {
        let before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let mut diff = DiffFonts::new(&before, &after, 1.0, 64.0, 1.0);
        diff.diff_all().expect("diffing identical fonts never errors");
        let report = diff.report();
        assert_eq!(report.tables, None);
        assert!(report.words.is_empty());
        let glyphs = report.glyphs.as_ref().expect("glyph scan always runs");
        assert!(glyphs.missing.is_empty());
        assert!(glyphs.new.is_empty());
        assert!(glyphs.modified.is_empty());
    }

    #[test]
    fn diff_tables_scales_the_before_fonts_raw_units_by_upm_ratio() {
        let font = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");

        let mut unscaled = DiffFonts::new(&font, &font, 1.0, 64.0, 1.0);
        unscaled.diff_tables().expect("diffs identical fonts");
        assert_eq!(unscaled.report().tables, None, "a font never differs from itself");

        let mut scaled = DiffFonts::new(&font, &font, 1.0, 64.0, 2.0);
        scaled.diff_tables().expect("diffs the same font against itself, scaled");
        assert!(
            scaled.report().tables.is_some(),
            "scaling the before side's raw units should surface a glyf difference"
        );
    }

    #[test]
    fn diff_strings_runs_independently_of_diff_all() {
        let before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let mut diff = DiffFonts::new(&before, &after, 1.0, 64.0, 1.0);
        diff.diff_strings("hello\nworld\n").expect("scans a user wordlist");
        assert!(diff.report().strings.is_some());
        assert!(diff.report().tables.is_none());
    }

    #[test]
    fn filter_characters_drops_words_using_excluded_characters() {
        let before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let mut diff = DiffFonts::new(&before, &after, 1.0, 64.0, 1.0);
        diff.diff_strings("hello\n").expect("scans a user wordlist");
        let only_vowels: HashSet<char> = "aeiou".chars().collect();
        diff.filter_characters(&only_vowels);
        assert!(diff.report().strings.as_ref().unwrap().is_empty());
    }

    #[test]
    fn filter_characters_also_drops_excluded_glyph_entries() {
        use crate::glyph_scan::{Glyph, GlyphDiff, GlyphItems};

        let before = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let after = Font::open(font_test_data::SIMPLE_GLYF, "new").expect("loads");
        let mut diff = DiffFonts::new(&before, &after, 1.0, 64.0, 1.0);
        diff.report.glyphs = Some(GlyphItems {
            missing: vec![Glyph('n')],
            new: vec![Glyph('t')],
            modified: vec![GlyphDiff {
                codepoint: 'a',
                score: 10.0,
                width: 1,
                height: 1,
                diff_map: vec![0; 4],
            }],
        });

        let keep: HashSet<char> = "nt".chars().collect();
        diff.filter_characters(&keep);

        let glyphs = diff.report().glyphs.as_ref().unwrap();
        assert_eq!(glyphs.missing, vec![Glyph('n')]);
        assert_eq!(glyphs.new, vec![Glyph('t')]);
        assert!(glyphs.modified.is_empty(), "'a' is not in the keep set");
    }
}
