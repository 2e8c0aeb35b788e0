//! Normalises a font's tables into plain data and structurally diffs two
//! such trees (C8).
//!
//! Grounded in the original's `jfont.py::_TTJ`/`Diff`: tables are flattened
//! into nested maps/lists of primitives (never binary offsets), then
//! diffed generically — `Diff._diff`/`clean` here become [`diff`]/
//! [`prune`].

use std::collections::BTreeMap;

use skrifa::{
    GlyphId, MetadataProvider,
    raw::{
        TableProvider,
        tables::glyf::{Glyph as GlyfGlyph, CompositeGlyphFlags},
    },
    string::StringId,
};

/// A plain-data value in a normalised font-table tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    fn is_primitive(&self) -> bool {
        matches!(self, Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_))
    }
}

/// The subtree-size past which [`diff`] collapses a node to a single
/// "too many changes" marker, keeping report pages tractable.
pub const OVERFLOW_GUARD: usize = 200;

/// Builds the normalised tree for one font: `name`, `fvar`, `STAT`, `cmap`,
/// `kern`, `glyf`.
///
/// `upem_scale` rescales `kern`/`glyf` raw design units before they land in
/// the tree — pass [`Matcher::upms`](crate::matcher::Matcher::upms) for the
/// "before" side of a pair with mismatched units-per-em, `1.0` otherwise, so
/// that a diff doesn't report every coordinate as changed.
#[must_use]
pub fn normalize(font: &skrifa::FontRef, upem_scale: f32) -> Value {
    let mut root = BTreeMap::new();
    root.insert("name".to_string(), normalize_name(font));
    if font.fvar().is_ok() {
        root.insert("fvar".to_string(), normalize_fvar(font));
    }
    if let Ok(stat) = font.stat() {
        root.insert("STAT".to_string(), normalize_stat(font, &stat));
    }
    root.insert("cmap".to_string(), normalize_cmap(font));
    if let Ok(kern) = font.kern() {
        root.insert("kern".to_string(), normalize_kern(&kern, upem_scale));
    }
    if let Some(glyf) = normalize_glyf(font, upem_scale) {
        root.insert("glyf".to_string(), glyf);
    }
    Value::Map(root)
}

fn normalize_name(font: &skrifa::FontRef) -> Value {
    let Ok(name) = font.name() else {
        return Value::Map(BTreeMap::new());
    };
    let mut map = BTreeMap::new();
    for record in name.name_record() {
        let key = format!(
            "{}/{}/{}/{}",
            record.name_id().to_u16(),
            record.platform_id(),
            record.encoding_id(),
            record.language_id(),
        );
        if let Ok(s) = record.string(name.string_data()) {
            map.insert(key, Value::Str(s.chars().collect::<String>()));
        }
    }
    Value::Map(map)
}

fn normalize_fvar(font: &skrifa::FontRef) -> Value {
    let mut axes = BTreeMap::new();
    for axis in font.axes().iter() {
        let mut entry = BTreeMap::new();
        entry.insert("minValue".to_string(), Value::Float(f64::from(axis.min_value())));
        entry.insert("maxValue".to_string(), Value::Float(f64::from(axis.max_value())));
        entry.insert("defaultValue".to_string(), Value::Float(f64::from(axis.default_value())));
        entry.insert("axisName".to_string(), Value::Str(axis_name(font, axis.tag())));
        axes.insert(axis.tag().to_string(), Value::Map(entry));
    }

    let mut instances = BTreeMap::new();
    for instance in font.named_instances().iter() {
        let name = instance
            .subfamily_name_id()
            .and_then(|id| font.localized_strings(id).english_or_first())
            .map(|s| s.chars().collect::<String>())
            .unwrap_or_default();
        let coords = Value::List(instance.user_coords().map(|v| Value::Float(f64::from(v))).collect());
        let mut entry = BTreeMap::new();
        entry.insert("coordinates".to_string(), coords);
        entry.insert("postscriptName".to_string(), Value::Null);
        entry.insert("flags".to_string(), Value::Int(0));
        instances.insert(name, Value::Map(entry));
    }

    let mut out = BTreeMap::new();
    out.insert("axes".to_string(), Value::Map(axes));
    out.insert("instances".to_string(), Value::Map(instances));
    Value::Map(out)
}

fn axis_name(font: &skrifa::FontRef, tag: skrifa::Tag) -> String {
    font.axes()
        .iter()
        .find(|a| a.tag() == tag)
        .and_then(|a| font.localized_strings(StringId::from(a.name_id())).english_or_first())
        .map(|s| s.chars().collect::<String>())
        .unwrap_or_else(|| tag.to_string())
}

fn normalize_stat(font: &skrifa::FontRef, stat: &skrifa::raw::tables::stat::Stat) -> Value {
    let mut design_records = BTreeMap::new();
    if let Ok(axes) = stat.design_axes() {
        for axis in axes.iter() {
            let mut entry = BTreeMap::new();
            entry.insert("order".to_string(), Value::Int(i64::from(axis.axis_ordering())));
            let name = font
                .localized_strings(axis.axis_name_id())
                .english_or_first()
                .map(|s| s.chars().collect::<String>())
                .unwrap_or_default();
            entry.insert("AxisName".to_string(), Value::Str(name));
            design_records.insert(axis.axis_tag().to_string(), Value::Map(entry));
        }
    }

    let mut axis_values = BTreeMap::new();
    if let Some(Ok(offsets)) = stat.offset_to_axis_values() {
        for value in offsets.axis_values().iter().filter_map(|v| v.ok()) {
            use skrifa::raw::tables::stat::AxisValue;
            let (name_id, mut entry) = match &value {
                AxisValue::Format1(v) => {
                    let mut e = BTreeMap::new();
                    e.insert("format".to_string(), Value::Int(1));
                    e.insert("AxisIndex".to_string(), Value::Int(i64::from(v.axis_index())));
                    e.insert("Flags".to_string(), Value::Int(i64::from(v.flags().bits())));
                    e.insert("Value".to_string(), Value::Float(f64::from(v.value().to_f32())));
                    (v.value_name_id(), e)
                },
                AxisValue::Format2(v) => {
                    let mut e = BTreeMap::new();
                    e.insert("format".to_string(), Value::Int(2));
                    e.insert("AxisIndex".to_string(), Value::Int(i64::from(v.axis_index())));
                    e.insert("Flags".to_string(), Value::Int(i64::from(v.flags().bits())));
                    e.insert("Value".to_string(), Value::Float(f64::from(v.nominal_value().to_f32())));
                    (v.value_name_id(), e)
                },
                AxisValue::Format3(v) => {
                    let mut e = BTreeMap::new();
                    e.insert("format".to_string(), Value::Int(3));
                    e.insert("AxisIndex".to_string(), Value::Int(i64::from(v.axis_index())));
                    e.insert("Flags".to_string(), Value::Int(i64::from(v.flags().bits())));
                    e.insert("Value".to_string(), Value::Float(f64::from(v.value().to_f32())));
                    (v.value_name_id(), e)
                },
                AxisValue::Format4(v) => {
                    let mut e = BTreeMap::new();
                    e.insert("format".to_string(), Value::Int(4));
                    e.insert("Flags".to_string(), Value::Int(i64::from(v.flags().bits())));
                    (v.value_name_id(), e)
                },
            };
            let name = font
                .localized_strings(name_id)
                .english_or_first()
                .map(|s| s.chars().collect::<String>())
                .unwrap_or_default();
            entry.entry("Flags".to_string()).or_insert(Value::Int(0));
            axis_values.insert(name, Value::Map(entry));
        }
    }

    let mut out = BTreeMap::new();
    out.insert("design axis records".to_string(), Value::Map(design_records));
    out.insert("axis values".to_string(), Value::Map(axis_values));
    Value::Map(out)
}

/// Normalises the `glyf` table: each glyph is either a composite component
/// list (the flags declared on each component) or a `Contour i -> Node j ->
/// {x, y, on}` map for a simple outline. Point coordinates are scaled by
/// `upem_scale`.
fn normalize_glyf(font: &skrifa::FontRef, upem_scale: f32) -> Option<Value> {
    let glyf = font.glyf().ok()?;
    let loca = font.loca(None).ok()?;
    let num_glyphs = loca.len().saturating_sub(1);

    let mut glyphs = BTreeMap::new();
    for gid in 0..num_glyphs {
        let glyph_id = GlyphId::new(gid as u32);
        let Ok(Some(glyph)) = loca.get_glyf(glyph_id, &glyf) else {
            continue;
        };
        let value = match glyph {
            GlyfGlyph::Simple(simple) => {
                let end_points = simple.end_pts_of_contours();
                let mut contours = BTreeMap::new();
                let mut contour_idx = 0i64;
                let mut node_idx = 0i64;
                let mut contour_nodes = BTreeMap::new();
                let mut next_end = end_points.first().map(|p| p.get());
                for (point_idx, point) in simple.points().enumerate() {
                    let mut node = BTreeMap::new();
                    node.insert("x".to_string(), Value::Int((f32::from(point.x) * upem_scale).round() as i64));
                    node.insert("y".to_string(), Value::Int((f32::from(point.y) * upem_scale).round() as i64));
                    node.insert("on".to_string(), Value::Bool(point.on_curve));
                    contour_nodes.insert(node_idx.to_string(), Value::Map(node));
                    node_idx += 1;

                    if next_end == Some(point_idx as u16) {
                        contours.insert(contour_idx.to_string(), Value::Map(std::mem::take(&mut contour_nodes)));
                        contour_idx += 1;
                        node_idx = 0;
                        next_end = end_points.get(contour_idx as usize).map(|p| p.get());
                    }
                }
                Value::Map(contours)
            },
            GlyfGlyph::Composite(composite) => Value::List(
                composite
                    .components()
                    .map(|component| {
                        let mut entry = BTreeMap::new();
                        entry.insert("glyph".to_string(), Value::Int(i64::from(component.glyph.to_u32())));
                        entry.insert(
                            "flags".to_string(),
                            Value::List(
                                [
                                    (CompositeGlyphFlags::ARGS_ARE_XY_VALUES, "ARGS_ARE_XY_VALUES"),
                                    (CompositeGlyphFlags::ROUND_XY_TO_GRID, "ROUND_XY_TO_GRID"),
                                    (CompositeGlyphFlags::WE_HAVE_A_SCALE, "WE_HAVE_A_SCALE"),
                                    (CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE, "WE_HAVE_AN_X_AND_Y_SCALE"),
                                    (CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO, "WE_HAVE_A_TWO_BY_TWO"),
                                    (CompositeGlyphFlags::OVERLAP_COMPOUND, "OVERLAP_COMPOUND"),
                                ]
                                .iter()
                                .filter(|(flag, _)| component.flags.contains(*flag))
                                .map(|(_, name)| Value::Str((*name).to_string()))
                                .collect(),
                            ),
                        );
                        Value::Map(entry)
                    })
                    .collect(),
            ),
        };
        glyphs.insert(gid.to_string(), value);
    }
    Some(Value::Map(glyphs))
}

fn normalize_cmap(font: &skrifa::FontRef) -> Value {
    let mut map = BTreeMap::new();
    let charmap = font.charmap();
    for (codepoint, glyph_id) in charmap.mappings() {
        let key = format!("0x{:04X}", codepoint);
        map.insert(key, Value::Int(i64::from(glyph_id.to_u32())));
    }
    Value::Map(map)
}

fn normalize_kern(kern: &skrifa::raw::tables::kern::Kern, upem_scale: f32) -> Value {
    let mut subtables = Vec::new();
    for subtable in kern.subtables().iter().filter_map(|s| s.ok()) {
        let mut pairs = BTreeMap::new();
        if let skrifa::raw::tables::kern::Subtable::Format0(format0) = subtable.kind() {
            for pair in format0.pairs() {
                let key = format!("{}/{}", pair.left(), pair.right());
                pairs.insert(key, Value::Int((f32::from(pair.value()) * upem_scale).round() as i64));
            }
        }
        subtables.push(Value::Map(pairs));
    }
    Value::List(subtables)
}

/// Recursively diffs two normalised trees, keeping only paths that differ.
///
/// Returns `None` if the subtrees are equal (an empty subtree is pruned by
/// the caller).
#[must_use]
pub fn diff(a: &Value, b: &Value) -> Option<Value> {
    prune(diff_raw(a, b))
}

fn diff_raw(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Map(a), Value::Map(b)) => {
            let mut out = BTreeMap::new();
            let mut keys: Vec<&String> = a.keys().chain(b.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                let diffed = match (a.get(key), b.get(key)) {
                    (Some(av), Some(bv)) => diff_raw(av, bv),
                    (Some(av), None) => diff_raw(av, &Value::Null),
                    (None, Some(bv)) => diff_raw(&Value::Null, bv),
                    (None, None) => continue,
                };
                out.insert(key.clone(), diffed);
            }
            Value::Map(out)
        },
        (Value::Map(a), other) | (other, Value::Map(a)) if !matches!(other, Value::Map(_)) => {
            let mut out = BTreeMap::new();
            for (key, value) in a {
                out.insert(key.clone(), diff_raw(value, other));
            }
            Value::Map(out)
        },
        (Value::List(a), Value::List(b)) => {
            let len = a.len().max(b.len());
            let mut out = Vec::with_capacity(len);
            for i in 0..len {
                let diffed = match (a.get(i), b.get(i)) {
                    (Some(av), Some(bv)) => diff_raw(av, bv),
                    (Some(av), None) => diff_raw(av, &Value::Null),
                    (None, Some(bv)) => diff_raw(&Value::Null, bv),
                    (None, None) => Value::Bool(false),
                };
                out.push(diffed);
            }
            Value::List(out)
        },
        (a, b) if a.is_primitive() && b.is_primitive() => {
            if a == b {
                Value::Bool(false)
            } else {
                Value::List(vec![a.clone(), b.clone()])
            }
        },
        (a, b) => Value::List(vec![a.clone(), b.clone()]),
    }
}

/// Removes subtrees that didn't change (`Value::Bool(false)` leaves, and
/// maps/lists left empty after their children are pruned), and collapses
/// any subtree with at least [`OVERFLOW_GUARD`] changed leaves.
fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Bool(false) => None,
        Value::Map(map) => {
            let mut out = BTreeMap::new();
            for (key, value) in map {
                if let Some(pruned) = prune(value) {
                    out.insert(key, pruned);
                }
            }
            if out.is_empty() {
                None
            } else if out.len() >= OVERFLOW_GUARD {
                let mut marker = BTreeMap::new();
                marker.insert(
                    "error".to_string(),
                    Value::Str(format!("there are {} changes, check manually", out.len())),
                );
                Some(Value::Map(marker))
            } else {
                Some(Value::Map(out))
            }
        },
        Value::List(list) => {
            let pruned: Vec<Value> = list.into_iter().filter_map(prune).collect();
            if pruned.is_empty() {
                None
            } else if pruned.len() >= OVERFLOW_GUARD {
                Some(Value::Str(format!("there are {} changes, check manually", pruned.len())))
            } else {
                Some(Value::List(pruned))
            }
        },
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{diff, Value};

    fn map(entries: &[(&str, Value)]) -> Value {
        Value::Map(entries.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect())
    }

    #[test]
    fn identical_trees_diff_to_none() {
        let a = map(&[("name", Value::Str("Foo".to_string())), ("weight", Value::Int(400))]);
        assert_eq!(diff(&a, &a), None);
    }

    #[test]
    fn changed_leaf_reports_before_after_pair() {
        let a = map(&[("weight", Value::Int(400))]);
        let b = map(&[("weight", Value::Int(700))]);
        let diffed = diff(&a, &b).expect("weight changed");
        let Value::Map(out) = diffed else { panic!("expected a map") };
        assert_eq!(out.get("weight"), Some(&Value::List(vec![Value::Int(400), Value::Int(700)])));
    }

    #[test]
    fn unchanged_sibling_keys_are_pruned() {
        let a = map(&[("name", Value::Str("Foo".to_string())), ("weight", Value::Int(400))]);
        let b = map(&[("name", Value::Str("Foo".to_string())), ("weight", Value::Int(700))]);
        let diffed = diff(&a, &b).expect("weight changed");
        let Value::Map(out) = diffed else { panic!("expected a map") };
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("weight"));
        assert!(!out.contains_key("name"));
    }

    #[test]
    fn a_key_present_on_only_one_side_diffs_against_null() {
        let a = map(&[("kern", Value::Int(1))]);
        let b = Value::Map(BTreeMap::new());
        let diffed = diff(&a, &b).expect("kern only in a");
        let Value::Map(out) = diffed else { panic!("expected a map") };
        assert_eq!(out.get("kern"), Some(&Value::List(vec![Value::Int(1), Value::Null])));
    }

    #[test]
    fn overflow_guard_collapses_large_change_sets() {
        let a = Value::Map((0..250).map(|i| (i.to_string(), Value::Int(0))).collect());
        let b = Value::Map((0..250).map(|i| (i.to_string(), Value::Int(1))).collect());
        let diffed = diff(&a, &b).expect("everything changed");
        let Value::Map(out) = diffed else { panic!("expected a map") };
        assert_eq!(out.len(), 1);
        let Some(Value::Str(message)) = out.get("error") else {
            panic!("expected an overflow marker")
        };
        assert!(message.contains("250"));
    }

    #[test]
    fn list_length_mismatch_diffs_extra_entries_against_null() {
        let a = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::List(vec![Value::Int(1)]);
        let diffed = diff(&a, &b).expect("lists differ in length");
        let Value::List(out) = diffed else { panic!("expected a list") };
        assert_eq!(out, vec![Value::List(vec![Value::Int(2), Value::Null])]);
    }

    #[test]
    fn normalize_includes_a_glyf_entry_per_glyph() {
        let font = skrifa::FontRef::new(font_test_data::SIMPLE_GLYF).unwrap();
        let Value::Map(root) = super::normalize(&font, 1.0) else { panic!("expected a map") };
        let Some(Value::Map(glyphs)) = root.get("glyf") else { panic!("expected a glyf map") };
        assert!(!glyphs.is_empty());
    }

    #[test]
    fn identical_fonts_normalize_to_equal_trees() {
        let font = skrifa::FontRef::new(font_test_data::SIMPLE_GLYF).unwrap();
        let a = super::normalize(&font, 1.0);
        let b = super::normalize(&font, 1.0);
        assert_eq!(diff(&a, &b), None);
    }

    #[test]
    fn normalize_includes_stat_axis_values_for_a_variable_font() {
        let font = skrifa::FontRef::new(font_test_data::VAZIRMATN_VAR).unwrap();
        let Value::Map(root) = super::normalize(&font, 1.0) else { panic!("expected a map") };
        let Some(Value::Map(stat)) = root.get("STAT") else { panic!("expected a STAT map") };
        assert!(stat.contains_key("design axis records"));
        assert!(stat.contains_key("axis values"));
    }

    #[test]
    fn normalize_scales_glyf_coordinates_by_upem_ratio() {
        let font = skrifa::FontRef::new(font_test_data::SIMPLE_GLYF).unwrap();
        let unscaled = super::normalize(&font, 1.0);
        let scaled = super::normalize(&font, 2.0);
        let diffed = diff(&unscaled, &scaled).expect("doubling every coordinate changes the tree");
        let Value::Map(out) = diffed else { panic!("expected a map") };
        assert!(out.contains_key("glyf"), "glyf coordinates should differ once scaled");
    }
}
