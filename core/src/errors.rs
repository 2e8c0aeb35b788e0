//! The errors produced by `fontdiff`.
//!
//! The top-level catch-all error is [`DiffError`]. A handful of conditions
//! (`WordlistMissing`, `RenderError`, `UnicodeNameError`) are *non-fatal* and
//! deliberately **not** variants of this enum — they
//! never propagate past the call site that can handle them; they're logged
//! via [`log`] and the affected item is skipped instead.

use harfshapedfa::errors::ShapingPlanError;
pub use harfshapedfa::errors::{InvalidTagError, MismatchedAxesError};
use skrifa::outline::DrawError;
use thiserror::Error;

/// A fatal error produced while diffing a font pair.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DiffError {
    /// A font file could not be parsed, or a table this crate depends on is
    /// absent.
    #[error("could not load font: {0}")]
    Load(#[from] LoadError),
    /// The [`Matcher`](crate::matcher::Matcher) produced zero Style pairs
    /// where the caller expected at least one.
    #[error("no common styles between the two fonts")]
    Match(#[from] MatchError),
    /// Stylename-based variation pinning
    /// ([`Font::set_variations_from_static`](crate::font::Font::set_variations_from_static))
    /// could not find a matching named instance.
    #[error("no named instance matches the static font's subfamily name")]
    NoMatchingInstance,
    /// An axis tag you provided was invalid.
    #[error("invalid tag: {0}")]
    InvalidTag(#[from] InvalidTagError),
    /// The axes a [`Location`](harfshapedfa::Location) specified didn't
    /// match those in the font.
    #[error(transparent)]
    MismatchedAxes(#[from] MismatchedAxesError),
    /// Extracting outlines from the font failed.
    #[error(transparent)]
    Drawing(#[from] SkrifaDrawError),
    /// Creating the shaping plan for a wordlist row failed.
    #[error(transparent)]
    WordListShapingPlan(#[from] ShapingPlanError),
}

/// A font file could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// [`skrifa`] could not parse the font.
    #[error("skrifa could not parse the font: {0}")]
    Skrifa(#[from] SkrifaReadError),
    /// The font is missing a table this crate requires (e.g. `cmap` or
    /// `head`).
    #[error("font is missing required table: {0}")]
    MissingTable(&'static str),
}

/// The [`Matcher`](crate::matcher::Matcher) produced no paired Styles.
#[derive(Debug, Error)]
#[error("no common styles between the two font lists")]
pub struct MatchError;

// New-typed errors so 3rd party error types don't leak into the public API.

/// Skrifa could not parse the font.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SkrifaReadError(#[from] pub(crate) skrifa::raw::ReadError);

/// [`skrifa`] failed to extract outlines for a glyph.
#[derive(Debug, Error)]
#[error("could not draw glyph {0:?}: {1}")]
pub struct SkrifaDrawError(pub(crate) skrifa::GlyphId, pub(crate) DrawError);
