//! Renders a [`fontdiff::diff_fonts::DiffReport`] as a single self-contained
//! HTML page.
//!
//! Per-glyph and per-word visuals are inline SVG vector outlines (extracted
//! straight from the font's `glyf`/`CFF` tables via `skrifa`), not
//! rasterised images — the report never ships a PNG/bitmap of either font.

use chrono::Local;
use fontdiff::{
    Font,
    diff_fonts::DiffReport,
    glyph_scan::{Glyph, GlyphDiff, GlyphItems},
    renderer::Renderer,
    table_diff::Value,
    utils,
    word_scan::{WordDiff, WritingDirection},
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use skrifa::{
    GlyphId, MetadataProvider,
    instance::Size,
    outline::{DrawSettings, OutlinePen, pen::SvgPen},
};
use svg::node::element::{Group, Path, SVG};

static CSS: &str = "\
body {
    margin: 1em;
    font-family: sans-serif;
}

h1 {
    text-align: center;
}

details {
    margin: 2rem 0;
}

summary h2, summary h3 {
    display: inline;
}

table.diff-table {
    border-collapse: collapse;
    width: 100%;
}

table.diff-table td, table.diff-table th {
    border: 1px solid #ccc;
    padding: 0.25em 0.5em;
    vertical-align: top;
}

ul.entries {
    list-style: none;
    margin-left: 0;
    padding-left: 0;

    display: flex;
    flex-wrap: wrap;
    gap: 2rem;
}

ul.entries > li {
    border: 1px solid #ddd;
    padding: 0.5em;
}

.entries figure {
    margin: 0;
}

.entries figcaption {
    font-family: monospace;
    text-align: center;
}

.entries svg {
    height: 120px;
    display: block;
    margin: 0 auto;
    border: 1px dashed #ccc;
}

.score {
    font-weight: bold;
}

.before {
    color: #a33;
}

.after {
    color: #3a3;
}";

/// Renders the full report page.
pub fn render(report: &DiffReport, before: &Font, after: &Font) -> anyhow::Result<String> {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S %z").to_string();

    let markup = html! {
        (DOCTYPE)
        html {
            head {
                title { "Font diff report" }
                meta charset="utf-8";
                style { (CSS) }
            }
            body {
                h1 { "Font diff report" }
                p {
                    span.before { (before.family_name()) } " → "
                    span.after { (after.family_name()) }
                }
                p { small { "generated " (generated_at) } }

                @if let Some(tables) = &report.tables {
                    (render_tables_section(tables))
                }
                @if let Some(glyphs) = &report.glyphs {
                    (render_glyphs_section(glyphs, before, after))
                }
                @if !report.words.is_empty() {
                    (render_words_sections("Word scan", &report.words, before, after))
                }
                @if let Some(strings) = &report.strings {
                    @if !strings.is_empty() {
                        details open {
                            summary { h2 { "User wordlist" } }
                            (render_word_list(strings, before, after))
                        }
                    }
                }
            }
        }
    };
    Ok(markup.into_string())
}

fn render_tables_section(tables: &Value) -> Markup {
    html! {
        details open {
            summary { h2 { "Table diff" } }
            (render_value(tables))
        }
    }
}

fn render_value(value: &Value) -> Markup {
    match value {
        Value::Map(map) => html! {
            ul {
                @for (key, child) in map {
                    li {
                        strong { (key) } ": "
                        (render_value(child))
                    }
                }
            }
        },
        Value::List(items) if items.len() == 2 && is_primitive(&items[0]) && is_primitive(&items[1]) => {
            html! {
                span.before { (format_leaf(&items[0])) } " → "
                span.after { (format_leaf(&items[1])) }
            }
        },
        Value::List(items) => html! {
            ol {
                @for item in items {
                    li { (render_value(item)) }
                }
            }
        },
        other => html! { (format_leaf(other)) },
    }
}

fn format_leaf(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Str(s) => s.clone(),
        other => format!("{other:?}"),
    }
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::List(_) | Value::Map(_))
}

fn render_glyphs_section(glyphs: &GlyphItems, before: &Font, after: &Font) -> Markup {
    html! {
        details open {
            summary { h2 { "Glyphs" } }

            @if !glyphs.missing.is_empty() {
                h3 { "Missing (" (glyphs.missing.len()) ")" }
                ul.entries {
                    @for glyph in &glyphs.missing {
                        (render_glyph_entry(*glyph, before))
                    }
                }
            }
            @if !glyphs.new.is_empty() {
                h3 { "New (" (glyphs.new.len()) ")" }
                ul.entries {
                    @for glyph in &glyphs.new {
                        (render_glyph_entry(*glyph, after))
                    }
                }
            }
            @if !glyphs.modified.is_empty() {
                h3 { "Modified (" (glyphs.modified.len()) ")" }
                ul.entries {
                    @for diff in &glyphs.modified {
                        (render_glyph_diff_entry(diff, before, after))
                    }
                }
            }
        }
    }
}

fn glyph_label(ch: char) -> String {
    match utils::unicode_name(ch) {
        Some(name) => format!("U+{:04X} {name}", ch as u32),
        None => format!("U+{:04X}", ch as u32),
    }
}

/// Renders an extracted outline, or a placeholder if the font had none.
fn outline_markup(svg: Option<String>) -> Markup {
    match svg {
        Some(svg) => html! { (PreEscaped(svg)) },
        None => html! { "(no outline)" },
    }
}

fn render_glyph_entry(glyph: Glyph, font: &Font) -> Markup {
    let svg = draw_glyph_outline_svg(font, glyph.0);
    html! {
        li {
            figure {
                (outline_markup(svg))
                figcaption { (glyph_label(glyph.0)) }
            }
        }
    }
}

fn render_glyph_diff_entry(diff: &GlyphDiff, before: &Font, after: &Font) -> Markup {
    let before_svg = draw_glyph_outline_svg(before, diff.codepoint);
    let after_svg = draw_glyph_outline_svg(after, diff.codepoint);
    html! {
        li {
            figure {
                (outline_markup(before_svg))
                (outline_markup(after_svg))
                figcaption {
                    (glyph_label(diff.codepoint)) br;
                    "score: " span.score { (format!("{:.2}", diff.score)) }
                }
            }
        }
    }
}

fn render_words_sections(
    title: &str,
    words: &std::collections::BTreeMap<String, Vec<WordDiff>>,
    before: &Font,
    after: &Font,
) -> Markup {
    html! {
        details open {
            summary { h2 { (title) } }
            @for (script, diffs) in words {
                details open {
                    summary { h3 { (script) " (" (diffs.len()) ")" } }
                    (render_word_list(diffs, before, after))
                }
            }
        }
    }
}

fn render_word_list(diffs: &[WordDiff], before: &Font, after: &Font) -> Markup {
    html! {
        ul.entries {
            @for diff in diffs {
                (render_word_entry(diff, before, after))
            }
        }
    }
}

fn render_word_entry(diff: &WordDiff, before: &Font, after: &Font) -> Markup {
    let before_svg = draw_word_outline_svg(before, &diff.string);
    let after_svg = draw_word_outline_svg(after, &diff.string);
    let direction = match diff.direction {
        WritingDirection::LeftToRight => "ltr",
        WritingDirection::RightToLeft => "rtl",
    };
    html! {
        li dir=(direction) {
            figure {
                (outline_markup(before_svg))
                (outline_markup(after_svg))
                figcaption {
                    "\"" (diff.string) "\"" br;
                    "score: " span.score { (format!("{:.2}", diff.score)) }
                    @if let Some(lang) = &diff.html_lang_tag {
                        " (" (lang) ")"
                    }
                    @if !diff.features.is_empty() {
                        br; small { (diff.features.join(", ")) }
                    }
                }
            }
        }
    }
}

struct VerticalFlipPen<'p, P> {
    inner: &'p mut P,
}

impl<P> OutlinePen for VerticalFlipPen<'_, P>
where
    P: OutlinePen,
{
    fn move_to(&mut self, x: f32, y: f32) {
        self.inner.move_to(x, -y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.inner.line_to(x, -y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.inner.quad_to(cx0, -cy0, x, -y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.inner.curve_to(cx0, -cy0, cx1, -cy1, x, -y);
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

/// Draws a single codepoint's outline as a standalone `<svg>`, flipped into
/// SVG's y-down space. Returns `None` if the font has no cmap entry or
/// outline for `ch`.
fn draw_glyph_outline_svg(font: &Font, ch: char) -> Option<String> {
    let fontref = font.fontref();
    let gid = fontref.charmap().map(ch)?;
    let location = font.location().to_skrifa(fontref);
    let outlines = fontref.outline_glyphs();
    let glyph = outlines.get(gid)?;

    let mut svg_pen = SvgPen::new();
    {
        let mut flipped = VerticalFlipPen { inner: &mut svg_pen };
        glyph.draw(DrawSettings::unhinted(Size::unscaled(), &location), &mut flipped).ok()?;
    }

    let metrics = fontref.metrics(Size::unscaled(), &location);
    let upem = f32::from(font.upem());
    let pad = upem * 0.1;
    let advance = fontref.glyph_metrics(Size::unscaled(), &location).advance_width(gid).unwrap_or(upem);

    let x_min = -pad;
    let x_max = advance + pad;
    let y_min = -metrics.ascent - pad;
    let y_max = -metrics.descent + pad;

    let path = Path::new().set("d", svg_pen.to_string());
    let svg = SVG::new()
        .set("viewBox", format!("{x_min} {y_min} {} {}", x_max - x_min, y_max - y_min))
        .set("preserveAspectRatio", "xMidYMid meet")
        .add(path);
    Some(svg.to_string())
}

/// Shapes `text` against `font` (guessing script/direction from the string)
/// and draws the resulting glyph run's outlines as one `<svg>`.
fn draw_word_outline_svg(font: &Font, text: &str) -> Option<String> {
    let renderer = Renderer::new(font, 1.0, 0.0);
    let buffer = renderer.shape(text).ok()?;
    if buffer.glyph_infos().is_empty() {
        return None;
    }

    let fontref = font.fontref();
    let location = font.location().to_skrifa(fontref);
    let outlines = fontref.outline_glyphs();

    let mut x_cursor = 0.0_f32;
    let mut x_min = f32::MAX;
    let mut x_max = f32::MIN;
    let mut group = Group::new();
    for (info, pos) in buffer.glyph_infos().iter().zip(buffer.glyph_positions()) {
        let gx = x_cursor + pos.x_offset as f32;
        let gy = pos.y_offset as f32;
        if let Some(glyph) = outlines.get(GlyphId::new(info.glyph_id)) {
            let mut svg_pen = SvgPen::new();
            let drawn = {
                let mut flipped = VerticalFlipPen { inner: &mut svg_pen };
                glyph.draw(DrawSettings::unhinted(Size::unscaled(), &location), &mut flipped).is_ok()
            };
            if drawn {
                let path = Path::new()
                    .set("transform", format!("translate({gx}, {})", -gy))
                    .set("d", svg_pen.to_string());
                group = group.add(path);
            }
        }
        x_min = x_min.min(gx);
        x_max = x_max.max(x_cursor + pos.x_advance as f32);
        x_cursor += pos.x_advance as f32;
    }
    if x_min > x_max {
        return None;
    }

    let metrics = fontref.metrics(Size::unscaled(), &location);
    let upem = f32::from(font.upem());
    let pad = upem * 0.15;
    let x_min = x_min - pad;
    let x_max = x_max + pad;
    let y_min = -metrics.ascent - pad;
    let y_max = -metrics.descent + pad;

    let svg = SVG::new()
        .set("viewBox", format!("{x_min} {y_min} {} {}", x_max - x_min, y_max - y_min))
        .set("preserveAspectRatio", "xMidYMid meet")
        .add(group);
    Some(svg.to_string())
}
