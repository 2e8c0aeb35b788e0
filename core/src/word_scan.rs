//! Multi-script word-list shaping regression scan (C6).
//!
//! Grounded in the original's `shape.py::test_words`/`test_font_words` and
//! `segmenting.py::textSegments`: wordlist rows are segmented into maximal
//! (script, bidi-level) runs before shaping, and already-exercised "after"
//! glyph positions are deduplicated via a seen-set of fingerprint
//! components.

use std::collections::{HashMap, HashSet};

use harfrust::Tag;
use unicode_bidi::BidiInfo;
use unicode_script::{Script, UnicodeScript};

use crate::{
    errors::DiffError,
    pixel_differ::PixelDiffer,
    renderer::{FingerprintComponent, Renderer},
    wordlist::WordRow,
};

/// A shaping-regression hit: the source string, both sides' shaping
/// fingerprints (for report display), the enabled features, and the score.
#[derive(Debug, Clone, PartialEq)]
pub struct WordDiff {
    pub string: String,
    pub before_fingerprint: Vec<FingerprintComponent>,
    pub after_fingerprint: Vec<FingerprintComponent>,
    pub features: Vec<String>,
    pub html_lang_tag: Option<String>,
    pub direction: WritingDirection,
    pub score: f32,
}

/// The writing direction a [`WordDiff`]'s segment was shaped under, derived
/// from its bidi embedding level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingDirection {
    LeftToRight,
    RightToLeft,
}

impl WritingDirection {
    #[must_use]
    const fn from_bidi_level(level: u8) -> Self {
        if level % 2 == 0 { Self::LeftToRight } else { Self::RightToLeft }
    }
}

/// One maximal run of a string sharing a common Unicode script and bidi
/// embedding level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'s> {
    pub text: &'s str,
    pub script: Script,
    pub bidi_level: u8,
}

/// Splits `text` into maximal (script, bidi-level) runs, the way a layout
/// engine would before running its own shaper per run.
#[must_use]
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    if text.is_empty() {
        return Vec::new();
    }

    let resolved_scripts = resolve_scripts(text);
    let bidi_info = BidiInfo::new(text, None);
    let levels = &bidi_info.levels;

    let mut segments = Vec::new();
    let mut start = 0;
    let mut current: Option<(Script, u8)> = None;

    for (byte_idx, _ch) in text.char_indices() {
        let script = resolved_scripts[&byte_idx];
        let level = levels[byte_idx].number();
        let key = (script, level);
        match current {
            None => current = Some(key),
            Some(prev) if prev == key => {},
            Some((prev_script, prev_level)) => {
                segments.push(Segment { text: &text[start..byte_idx], script: prev_script, bidi_level: prev_level });
                start = byte_idx;
                current = Some(key);
            },
        }
    }
    if let Some((script, level)) = current {
        segments.push(Segment { text: &text[start..], script, bidi_level: level });
    }
    segments
}

/// Two-pass script resolution: characters with an uninformative script
/// (`Common`/`Inherited`/`Unknown`) inherit the nearest preceding resolved
/// script, falling back to the nearest following one at the start of the
/// string.
fn resolve_scripts(text: &str) -> HashMap<usize, Script> {
    let indexed: Vec<(usize, char)> = text.char_indices().collect();
    let mut scripts: Vec<Option<Script>> = indexed
        .iter()
        .map(|&(_, ch)| {
            let script = ch.script();
            if matches!(script, Script::Common | Script::Inherited | Script::Unknown) {
                None
            } else {
                Some(script)
            }
        })
        .collect();

    for i in 1..scripts.len() {
        if scripts[i].is_none() {
            scripts[i] = scripts[i - 1];
        }
    }
    let mut next = None;
    for i in (0..scripts.len()).rev() {
        match scripts[i] {
            Some(script) => next = Some(script),
            None => scripts[i] = next,
        }
    }

    indexed
        .iter()
        .zip(scripts)
        .map(|(&(idx, _), script)| (idx, script.unwrap_or(Script::Unknown)))
        .collect()
}

/// Runs the word scan for one script's wordlist against a before/after
/// font, skipping any segment touching a missing-or-new codepoint.
///
/// Results are sorted by score descending.
pub fn scan_words(
    rows: impl Iterator<Item = WordRow>,
    differ: &mut PixelDiffer,
    skip_glyphs: &HashSet<char>,
    threshold: f32,
) -> Result<Vec<WordDiff>, DiffError> {
    let mut seen: HashSet<FingerprintComponent> = HashSet::new();
    let mut results = Vec::new();

    for row in rows {
        let script_tag = row.script.as_deref().and_then(parse_ot_tag);
        let language_tag = row.language.as_deref().and_then(parse_ot_tag);
        differ.set_script(script_tag);
        differ.set_language(language_tag);
        differ.set_features(row.features.iter().map(|tag| harfrust::Feature::new(parse_ot_tag(tag).unwrap_or(Tag::new(b"    ")), 1, ..)).collect());

        for seg in segment(&row.string) {
            if seg.text.is_empty() {
                continue;
            }
            if seg.text.chars().any(|ch| skip_glyphs.contains(&ch)) {
                continue;
            }

            let after_buffer = differ.after().shape(seg.text)?;
            let after_fingerprint = Renderer::fingerprint(&after_buffer);
            if after_fingerprint.iter().all(|component| seen.contains(component)) {
                continue;
            }

            let before_buffer = differ.before().shape(seg.text)?;
            if Renderer::contains_notdef(&before_buffer) || Renderer::contains_notdef(&after_buffer) {
                continue;
            }
            let before_fingerprint = Renderer::fingerprint(&before_buffer);

            let diff = differ.diff(seg.text)?;
            if diff.score < threshold {
                continue;
            }
            for component in &after_fingerprint {
                seen.insert(*component);
            }

            results.push(WordDiff {
                string: row.string.clone(),
                before_fingerprint,
                after_fingerprint,
                features: row.features.clone(),
                html_lang_tag: html_lang_tag(row.script.as_deref(), row.language.as_deref()),
                direction: WritingDirection::from_bidi_level(seg.bidi_level),
                score: diff.score,
            });
        }
    }

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    Ok(results)
}

fn parse_ot_tag(tag: &str) -> Option<Tag> {
    if tag.is_empty() || tag == "dflt" {
        return None;
    }
    let mut bytes = [b' '; 4];
    let src = tag.as_bytes();
    let len = src.len().min(4);
    bytes[..len].copy_from_slice(&src[..len]);
    Tag::new_checked(&bytes).ok()
}

/// Maps an `(script_tag, language_tag)` OpenType pair to a BCP-47 HTML
/// `lang` attribute, falling back to the bare OpenType tag — this is
/// cosmetic report display, never load-bearing, so an unknown pair is not
/// an error.
#[must_use]
pub fn html_lang_tag(script: Option<&str>, language: Option<&str>) -> Option<String> {
    match (script, language) {
        (None, None) => Some("en".to_string()),
        (Some("latn") | None, Some("dflt") | None) => Some("en".to_string()),
        (Some("arab"), Some("ARA")) => Some("ar".to_string()),
        (Some("dev2"), Some("HIN")) => Some("hi".to_string()),
        (Some("dev2"), Some("MAR")) => Some("mr".to_string()),
        (Some("dev2"), Some("NEP")) => Some("ne".to_string()),
        (Some("latn"), Some("MOL")) => Some("mo".to_string()),
        (Some("cyrl"), Some("SRB")) => Some("sr".to_string()),
        (script, _) => script.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use unicode_script::Script;

    use super::{html_lang_tag, parse_ot_tag, segment, WritingDirection};

    #[test]
    fn empty_string_has_no_segments() {
        assert_eq!(segment(""), Vec::new());
    }

    #[test]
    fn single_script_run_is_one_segment() {
        let segments = segment("hello");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "hello");
        assert_eq!(segments[0].script, Script::Latin);
        assert_eq!(WritingDirection::from_bidi_level(segments[0].bidi_level), WritingDirection::LeftToRight);
    }

    #[test]
    fn script_change_splits_into_multiple_segments() {
        let segments = segment("abcابج");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "abc");
        assert_eq!(segments[0].script, Script::Latin);
        assert_eq!(segments[1].text, "ابج");
        assert_eq!(segments[1].script, Script::Arabic);
    }

    #[test]
    fn common_script_punctuation_inherits_the_preceding_run() {
        let segments = segment("ab.cd");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "ab.cd");
        assert_eq!(segments[0].script, Script::Latin);
    }

    #[test]
    fn rtl_run_gets_an_odd_bidi_level() {
        let segments = segment("ابج");
        assert_eq!(segments.len(), 1);
        assert_eq!(WritingDirection::from_bidi_level(segments[0].bidi_level), WritingDirection::RightToLeft);
    }

    #[test]
    fn parse_ot_tag_rejects_empty_and_default() {
        assert_eq!(parse_ot_tag(""), None);
        assert_eq!(parse_ot_tag("dflt"), None);
    }

    #[test]
    fn parse_ot_tag_pads_short_tags_with_spaces() {
        let tag = parse_ot_tag("latn").expect("valid tag");
        assert_eq!(tag.to_string(), "latn");
    }

    #[test]
    fn html_lang_tag_maps_known_script_language_pairs() {
        assert_eq!(html_lang_tag(None, None), Some("en".to_string()));
        assert_eq!(html_lang_tag(Some("latn"), None), Some("en".to_string()));
        assert_eq!(html_lang_tag(Some("arab"), Some("ARA")), Some("ar".to_string()));
        assert_eq!(html_lang_tag(Some("dev2"), Some("HIN")), Some("hi".to_string()));
    }

    #[test]
    fn html_lang_tag_falls_back_to_the_bare_script_tag() {
        assert_eq!(html_lang_tag(Some("grek"), Some("ELL")), Some("grek".to_string()));
    }
}
