//! Small free functions (C11): coordinate formatting, UPM scaling, character
//! filtering and Unicode name lookup, plus the `avar`/variation-store
//! machinery [`crate::font::Font::masters`] builds on.

use std::collections::{HashMap, HashSet};

use harfshapedfa::Location;
use regex::Regex;
use skrifa::{FontRef, raw::TableProvider};

/// Formats a [`Location`] as `tag=value,tag=value`, axes sorted by tag, for
/// display and for the CLI's `--coords` round-trip.
#[must_use]
pub fn format_coords(location: &Location) -> String {
    let mut entries: Vec<_> = location.to_std().into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
        .into_iter()
        .map(|(tag, value)| format!("{tag}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses the CLI's `--coords wght=400,wdth=100` syntax into a [`Location`].
///
/// Each entry must be `tag=value` where `tag` is 1-4 ASCII characters and
/// `value` parses as `f32`. Returns `None` on any malformed entry.
#[must_use]
pub fn parse_coords(input: &str) -> Option<Location> {
    let input = input.trim();
    if input.is_empty() {
        return Some(Location::new());
    }

    let mut map = HashMap::new();
    for entry in input.split(',') {
        let (tag, value) = entry.split_once('=')?;
        let value: f32 = value.trim().parse().ok()?;
        map.insert(tag.trim().to_string(), value);
    }
    Location::try_from(map).ok()
}

/// Scales a value expressed in `from_upem` units-per-em to `to_upem`
/// units-per-em.
#[must_use]
pub fn scale_upem(value: f32, from_upem: u16, to_upem: u16) -> f32 {
    if from_upem == to_upem {
        return value;
    }
    value * f32::from(to_upem) / f32::from(from_upem)
}

/// The distinct Unicode scalar values used in `text`, in first-seen order.
#[must_use]
pub fn distinct_characters(text: &str) -> Vec<char> {
    let mut seen = Vec::new();
    for ch in text.chars() {
        if !seen.contains(&ch) {
            seen.push(ch);
        }
    }
    seen
}

/// Whether every character of `s` is a member of `characters` — the
/// subset check backing `DiffFonts::filter_characters`/`--characters`.
#[must_use]
pub fn characters_in_string(s: &str, characters: &HashSet<char>) -> bool {
    s.chars().all(|c| characters.contains(&c))
}

/// Keeps only the characters of `text` matching `pattern` (a single-character
/// class, e.g. `[a-z]` or `\p{Latin}`).
///
/// Returns `None` if `pattern` doesn't compile as a regex.
#[must_use]
pub fn filter_characters(text: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    Some(text.chars().filter(|ch| re.is_match(&ch.to_string())).collect())
}

/// The Unicode name of a codepoint (e.g. `U+0041` -> `"LATIN CAPITAL LETTER
/// A"`), or `None` if the codepoint is unassigned/unnamed.
///
/// Non-fatal by design: callers should log and continue when this returns
/// `None` rather than treat it as an error.
#[must_use]
pub fn unicode_name(ch: char) -> Option<String> {
    unicode_names2::name(ch).map(|name| name.to_string())
}

/// Per-axis piecewise-linear `avar` segment maps, `(from, to)` pairs sorted
/// by `from`, indexed in `fvar` axis order. Axes without an explicit segment
/// map get an empty `Vec` (identity mapping).
pub(crate) fn avar_segment_maps(font: &FontRef) -> Vec<Vec<(f32, f32)>> {
    let axis_count = font.axes().len();
    let mut maps = vec![Vec::new(); axis_count];

    let Ok(avar) = font.avar() else {
        return maps;
    };
    for (axis_index, segment_map) in avar.axis_segment_maps().iter().enumerate() {
        let Some(axis_maps) = maps.get_mut(axis_index) else {
            break;
        };
        let Ok(segment_map) = segment_map else { continue };
        for value_map in segment_map.axis_value_maps() {
            axis_maps.push((
                value_map.from_coordinate().to_f32(),
                value_map.to_coordinate().to_f32(),
            ));
        }
        axis_maps.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    maps
}

/// Inverts a piecewise-linear `avar` segment map: given a value in the
/// *final* normalized (`-1, 0, 1`) space, returns the corresponding value
/// before `avar` was applied.
pub(crate) fn reverse_avar(segments: &[(f32, f32)], value: f32) -> f32 {
    if segments.is_empty() {
        return value;
    }

    if value <= segments[0].1 {
        return segments[0].0;
    }
    if value >= segments[segments.len() - 1].1 {
        return segments[segments.len() - 1].0;
    }

    for window in segments.windows(2) {
        let (from_a, to_a) = window[0];
        let (from_b, to_b) = window[1];
        if value >= to_a && value <= to_b {
            if (to_b - to_a).abs() < f32::EPSILON {
                return from_a;
            }
            let t = (value - to_a) / (to_b - to_a);
            return from_a + t * (from_b - from_a);
        }
    }
    value
}

/// Maps a normalized (`-1, 0, 1`) coordinate back to user space given an
/// axis's `(min, default, max)`.
pub(crate) fn normalized_to_user(normalized: f32, min: f32, default: f32, max: f32) -> f32 {
    match normalized.total_cmp(&0.0) {
        std::cmp::Ordering::Less => default + normalized * (default - min),
        std::cmp::Ordering::Greater => default + normalized * (max - default),
        std::cmp::Ordering::Equal => default,
    }
}

/// Every distinct non-default normalized peak declared across the font's
/// `MVAR`/`HVAR`/`VVAR` item variation stores and `gvar`'s shared tuples, as
/// `(axis_index, peak)` pairs in `-1..=1` space.
pub(crate) fn normalized_variation_peaks(font: &FontRef) -> Vec<(usize, f32)> {
    let mut peaks = Vec::new();

    if let Ok(mvar) = font.mvar() {
        if let Ok(store) = mvar.item_variation_store() {
            collect_store_peaks(&store, &mut peaks);
        }
    }
    if let Ok(hvar) = font.hvar() {
        if let Ok(store) = hvar.item_variation_store() {
            collect_store_peaks(&store, &mut peaks);
        }
    }
    if let Ok(vvar) = font.vvar() {
        if let Ok(store) = vvar.item_variation_store() {
            collect_store_peaks(&store, &mut peaks);
        }
    }
    if let Ok(gvar) = font.gvar() {
        if let Ok(shared_tuples) = gvar.shared_tuples() {
            for tuple in shared_tuples.tuples() {
                for (axis_index, coord) in tuple.values().iter().enumerate() {
                    let peak = coord.to_f32();
                    if peak != 0.0 {
                        peaks.push((axis_index, peak));
                    }
                }
            }
        }
    }

    peaks
}

#[cfg(test)]
mod tests {
    use harfshapedfa::Location;

    use std::collections::HashSet;

    use super::{characters_in_string, distinct_characters, filter_characters, format_coords, normalized_to_user, parse_coords, reverse_avar, scale_upem, unicode_name};

    #[test]
    fn coords_round_trip_through_their_string_form() {
        let location = Location::try_from(std::collections::HashMap::from([
            ("wght".to_string(), 400.0),
            ("wdth".to_string(), 100.0),
        ]))
        .expect("valid tags");
        let formatted = format_coords(&location);
        assert_eq!(formatted, "wdth=100,wght=400");
        assert_eq!(parse_coords(&formatted).expect("parses back"), location);
    }

    #[test]
    fn parse_coords_trims_whitespace_and_accepts_empty_input() {
        assert_eq!(parse_coords(""), Some(Location::new()));
        assert_eq!(parse_coords("   "), Some(Location::new()));
        let location = parse_coords(" wght = 400.0 ").expect("parses");
        assert_eq!(format_coords(&location), "wght=400");
    }

    #[test]
    fn parse_coords_rejects_malformed_entries() {
        assert_eq!(parse_coords("wght"), None);
        assert_eq!(parse_coords("wght=not-a-number"), None);
    }

    #[test]
    fn scale_upem_is_identity_when_upem_matches() {
        assert_eq!(scale_upem(123.0, 1000, 1000), 123.0);
    }

    #[test]
    fn scale_upem_rescales_proportionally() {
        assert_eq!(scale_upem(1000.0, 1000, 2000), 2000.0);
        assert_eq!(scale_upem(2048.0, 2048, 1000), 1000.0);
    }

    #[test]
    fn distinct_characters_dedupes_preserving_first_seen_order() {
        assert_eq!(distinct_characters("abcaabbc"), vec!['a', 'b', 'c']);
    }

    #[test]
    fn characters_in_string_checks_subset_membership() {
        let vowels: HashSet<char> = "aeiou".chars().collect();
        assert!(characters_in_string("aei", &vowels));
        assert!(!characters_in_string("hello", &vowels));
    }

    #[test]
    fn filter_characters_keeps_only_matches_and_is_idempotent() {
        let filtered = filter_characters("abc123", r"[a-z]").expect("valid regex");
        assert_eq!(filtered, "abc");
        let twice = filter_characters(&filtered, r"[a-z]").expect("valid regex");
        assert_eq!(filtered, twice);
    }

    #[test]
    fn filter_characters_rejects_invalid_patterns() {
        assert_eq!(filter_characters("abc", "[a-"), None);
    }

    #[test]
    fn unicode_name_looks_up_named_codepoints() {
        assert_eq!(unicode_name('A'), Some("LATIN CAPITAL LETTER A".to_string()));
    }

    #[test]
    fn reverse_avar_is_identity_with_no_segments() {
        assert_eq!(reverse_avar(&[], 0.5), 0.5);
    }

    #[test]
    fn reverse_avar_interpolates_between_mapped_points() {
        let segments = [(-1.0, -1.0), (0.0, 0.0), (1.0, 0.5)];
        assert_eq!(reverse_avar(&segments, 0.25), 0.5);
        assert_eq!(reverse_avar(&segments, 0.6), 1.0);
        assert_eq!(reverse_avar(&segments, -2.0), -1.0);
    }

    #[test]
    fn normalized_to_user_maps_midpoints_around_default() {
        assert_eq!(normalized_to_user(0.0, 100.0, 400.0, 900.0), 400.0);
        assert_eq!(normalized_to_user(1.0, 100.0, 400.0, 900.0), 900.0);
        assert_eq!(normalized_to_user(-1.0, 100.0, 400.0, 900.0), 100.0);
    }
}

fn collect_store_peaks(
    store: &skrifa::raw::tables::variations::ItemVariationStore,
    out: &mut Vec<(usize, f32)>,
) {
    let Ok(regions) = store.variation_region_list() else {
        return;
    };
    for region in regions.variation_regions().iter().filter_map(|r| r.ok()) {
        for (axis_index, axis_coords) in region.region_axes().iter().enumerate() {
            let peak = axis_coords.peak_coord().to_f32();
            if peak != 0.0 {
                out.push((axis_index, peak));
            }
        }
    }
}
