#![cfg_attr(docsrs, feature(doc_auto_cfg))]
//! Compares two font binaries and reports where their rendered output
//! differs: which glyphs vanished or appeared, which shaped words render
//! differently, and which font tables changed.
//!
//! The pipeline is a fixed sequence of independently-owned stages:
//! [`font::Font`] loads and holds shaping state for one font; [`style::Style`]
//! names a point in its design space; [`matcher::Matcher`] pairs styles
//! between a before/after font; [`renderer::Renderer`] shapes and
//! rasterises strings against one font; [`pixel_differ::PixelDiffer`]
//! scores two renders; [`diff_fonts::DiffFonts`] drives the whole thing and
//! exposes the result as plain data.
//!
//! Nothing here is safe to share across threads: callers that want
//! parallelism own one `(before, after)` font pair per worker (see
//! [`matcher`]'s module docs).

pub mod diff_fonts;
pub mod errors;
pub mod font;
pub mod glyph_scan;
pub mod matcher;
pub mod pixel_differ;
pub mod renderer;
pub mod style;
pub mod table_diff;
pub mod utils;
pub mod word_scan;
pub mod wordlist;

pub use font::Font;
pub use matcher::Matcher;
pub use style::Style;
