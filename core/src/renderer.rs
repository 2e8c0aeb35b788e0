//! Shapes and rasterises strings against a single Font (C4).
//!
//! Shaping reuses [`harfshapedfa`]'s `ShapingMeta`/`HarfRustShaperExt`
//! (the same `ShaperData`/`ShaperInstance`/`ShapePlan` sequence a
//! bounding-box pass would use); rasterisation is new — outlines are
//! extracted the same way, but instead of only keeping `y0`/`y1` we fill
//! them onto a `tiny-skia` canvas.

use harfrust::{Feature, GlyphBuffer, Shaper, ShaperInstance, Tag, UnicodeBuffer};
use harfshapedfa::{HarfRustShaperExt, ShapingMeta, pens::BoundsPen};
use skrifa::{GlyphId, MetadataProvider, instance::Size, outline::DrawSettings};

use crate::{
    errors::{DiffError, SkrifaDrawError},
    font::Font,
};

/// An RGBA bitmap, row-major, premultiplied alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// The canonical zero-sized bitmap `render` returns when either
    /// dimension collapses to zero.
    #[must_use]
    pub const fn empty() -> Self {
        Bitmap { width: 0, height: 0, pixels: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A `(glyph_id, x_position, y_position)` tuple, in shaping order. Used by
/// the word scan (C6) to dedupe already-exercised "after" glyph positions.
pub type FingerprintComponent = (u32, i32, i32);

/// Shapes and rasterises strings against one Font's current variation
/// state.
///
/// Borrows its Font immutably: change variation coordinates by calling
/// [`Font::set_variations`] on the underlying handle, then build a new
/// `Renderer` (or re-borrow) to pick up the change.
pub struct Renderer<'f, 'a> {
    font: &'f Font<'a>,
    font_size: f32,
    margin: f32,
    script: Option<Tag>,
    language: Option<Tag>,
    features: Vec<Feature>,
}

impl<'f, 'a> Renderer<'f, 'a> {
    /// `font_size` and `margin` are both in pixels (or em-equivalent units,
    /// matching whatever precision the caller chose).
    #[must_use]
    pub fn new(font: &'f Font<'a>, font_size: f32, margin: f32) -> Self {
        Renderer {
            font,
            font_size,
            margin,
            script: None,
            language: None,
            features: Vec::new(),
        }
    }

    #[must_use]
    pub const fn font(&self) -> &Font<'a> {
        self.font
    }

    /// Overrides the guessed script tag (applies to every subsequent
    /// `shape`/`render` call).
    pub fn set_script(&mut self, script: Option<Tag>) {
        self.script = script;
    }

    /// Overrides the guessed language tag.
    pub fn set_language(&mut self, language: Option<Tag>) {
        self.language = language;
    }

    /// Replaces the enabled OpenType feature set.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        self.features = features;
    }

    fn build_shaper(&self, shaper_instance: &ShaperInstance) -> Shaper<'_> {
        self.font
            .shaper_data()
            .shaper(self.font.fontref())
            .instance(Some(shaper_instance))
            .build()
    }

    /// Shapes `text`: guesses segment properties, then overrides with any
    /// script/language set via [`Renderer::set_script`]/[`set_language`].
    ///
    /// Deterministic: identical `(font_state, text, script, lang,
    /// features)` always yields an identical buffer.
    pub fn shape(&self, text: &str) -> Result<GlyphBuffer, DiffError> {
        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();

        let script_tag = self.script.unwrap_or_else(|| buffer.script().to_iso15924_tag());
        let language_tag = self.language;

        let shaper_instance = self.font.shaper_instance();
        let shaper = self.build_shaper(&shaper_instance);

        let script_str = script_tag.to_string();
        let language_str = language_tag.map(|tag| tag.to_string());
        let meta = ShapingMeta::new(&script_str, language_str.as_deref(), &shaper)?;

        Ok(shaper.shape_with_meta(&meta, buffer, &self.features))
    }

    /// The per-glyph `(glyph_id, x, y)` fingerprint of a shaped buffer, in
    /// shaping order: `x`/`y` are the glyph's final drawn position (the
    /// cumulative advance plus its own offset), so two fingerprints compare
    /// equal only when both glyph identity and advance/offset positions
    /// match — a glyph whose offset is unchanged but whose advance (and
    /// thus every later glyph's position) shifted still produces a
    /// different fingerprint.
    #[must_use]
    pub fn fingerprint(buffer: &GlyphBuffer) -> Vec<FingerprintComponent> {
        let mut x_cursor = 0i32;
        let mut y_cursor = 0i32;
        buffer
            .glyph_infos()
            .iter()
            .zip(buffer.glyph_positions())
            .map(|(info, pos)| {
                let component = (info.glyph_id, x_cursor + pos.x_offset, y_cursor + pos.y_offset);
                x_cursor += pos.x_advance;
                y_cursor += pos.y_advance;
                component
            })
            .collect()
    }

    /// `true` iff the buffer contains a `.notdef` (glyph id 0) — the signal
    /// the word scan uses to skip a segment shaped against the before font.
    #[must_use]
    pub fn contains_notdef(buffer: &GlyphBuffer) -> bool {
        buffer.glyph_infos().iter().any(|info| info.glyph_id == 0)
    }

    /// Shapes and rasterises `text`.
    ///
    /// Returns [`Bitmap::empty`] (not an error) if either the shaped
    /// x-extent or the font's y-extent collapses to zero pixels.
    pub fn render(&self, text: &str) -> Result<Bitmap, DiffError> {
        let buffer = self.shape(text)?;

        let upem = f32::from(self.font.upem());
        let scale = self.font_size / upem;

        let mut x_cursor = 0.0_f32;
        let mut x_min = f32::MAX;
        let mut x_max = f32::MIN;
        let mut glyph_draws: Vec<(GlyphId, f32, f32)> = Vec::new();
        for (info, pos) in buffer.glyph_infos().iter().zip(buffer.glyph_positions()) {
            let x = x_cursor + pos.x_offset as f32;
            let y = pos.y_offset as f32;
            glyph_draws.push((GlyphId::new(info.glyph_id), x, y));
            x_min = x_min.min(x);
            x_max = x_max.max(x_cursor + pos.x_advance as f32);
            x_cursor += pos.x_advance as f32;
        }
        if glyph_draws.is_empty() {
            return Ok(Bitmap::empty());
        }

        let location = self.font.location().to_skrifa(self.font.fontref());
        let metrics = self.font.fontref().metrics(Size::unscaled(), &location);
        let y_min = -metrics.descent;
        let y_max = metrics.ascent;

        let width_px = ((x_max - x_min) * scale + 2.0 * self.margin).ceil().max(0.0) as u32;
        let height_px = ((y_max - y_min) * scale + 2.0 * self.margin).ceil().max(0.0) as u32;
        if width_px == 0 || height_px == 0 {
            return Ok(Bitmap::empty());
        }

        let mut canvas = match tiny_skia::Pixmap::new(width_px, height_px) {
            Some(canvas) => canvas,
            None => return Ok(Bitmap::empty()),
        };
        let paint = {
            let mut paint = tiny_skia::Paint::default();
            paint.set_color(tiny_skia::Color::BLACK);
            paint.anti_alias = true;
            paint
        };

        let outlines = self.font.fontref().outline_glyphs();
        for (glyph_id, gx, gy) in glyph_draws {
            let Some(glyph) = outlines.get(glyph_id) else {
                continue;
            };
            let mut pen = BoundsPen::new();
            glyph
                .draw(DrawSettings::unhinted(Size::unscaled(), &location), &mut pen)
                .map_err(|err| SkrifaDrawError(glyph_id, err))?;

            let translate_x = self.margin + (gx - x_min) * scale;
            let translate_y = self.margin + (y_max - gy) * scale;
            if let Some(path) = to_tiny_skia_path(pen.path(), scale, translate_x, translate_y) {
                canvas.fill_path(
                    &path,
                    &paint,
                    tiny_skia::FillRule::Winding,
                    tiny_skia::Transform::identity(),
                    None,
                );
            }
        }

        Ok(Bitmap {
            width: width_px,
            height: height_px,
            pixels: canvas.take(),
        })
    }
}

fn to_tiny_skia_path(
    path: &kurbo::BezPath,
    scale: f32,
    tx: f32,
    ty: f32,
) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    let map = |p: kurbo::Point| {
        (tx + p.x as f32 * scale, ty - p.y as f32 * scale)
    };
    for el in path.elements() {
        match *el {
            kurbo::PathEl::MoveTo(p) => {
                let (x, y) = map(p);
                builder.move_to(x, y);
            },
            kurbo::PathEl::LineTo(p) => {
                let (x, y) = map(p);
                builder.line_to(x, y);
            },
            kurbo::PathEl::QuadTo(c, p) => {
                let (cx, cy) = map(c);
                let (x, y) = map(p);
                builder.quad_to(cx, cy, x, y);
            },
            kurbo::PathEl::CurveTo(c1, c2, p) => {
                let (c1x, c1y) = map(c1);
                let (c2x, c2y) = map(c2);
                let (x, y) = map(p);
                builder.cubic_to(c1x, c1y, c2x, c2y, x, y);
            },
            kurbo::PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use crate::font::Font;

    #[test]
    fn shaping_is_deterministic() {
        let font = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let renderer = Renderer::new(&font, 64.0, 2.0);
        let first = renderer.shape("hello").expect("shapes");
        let second = renderer.shape("hello").expect("shapes");
        assert_eq!(Renderer::fingerprint(&first), Renderer::fingerprint(&second));
    }

    #[test]
    fn an_empty_string_renders_to_an_empty_bitmap() {
        let font = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let renderer = Renderer::new(&font, 64.0, 2.0);
        let bitmap = renderer.render("").expect("renders");
        assert!(bitmap.is_empty());
    }

    #[test]
    fn a_non_empty_string_renders_a_non_empty_bitmap() {
        let font = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let renderer = Renderer::new(&font, 64.0, 2.0);
        let bitmap = renderer.render("A").expect("renders");
        assert!(!bitmap.is_empty());
        assert_eq!(bitmap.pixels.len(), (bitmap.width * bitmap.height * 4) as usize);
    }

    #[test]
    fn an_unmapped_codepoint_does_not_signal_notdef_by_itself() {
        let font = Font::open(font_test_data::SIMPLE_GLYF, "old").expect("loads");
        let renderer = Renderer::new(&font, 64.0, 2.0);
        let buffer = renderer.shape("A").expect("shapes");
        assert!(!Renderer::contains_notdef(&buffer));
    }
}
