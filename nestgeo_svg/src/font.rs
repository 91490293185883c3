//! Pluggable glyph outlines for `text` elements (spec §4.8): the
//! converter never rasterizes fonts itself, it only asks a
//! [`FontFactory`] for each character's outline.

use nestgeo_polygon::Polygon;

/// A single character's outline, already positioned as if drawn at
/// the origin with the text's nominal font size; the converter
/// applies the element's transform and per-glyph advance on top.
pub struct GlyphOutline {
    pub polygons: Vec<Polygon>,
    /// Horizontal distance to the next glyph's origin, in the same
    /// units as the outline's coordinates.
    pub advance: f64,
}

/// Supplies glyph outlines for a `(font_family, font_size)` pair. The
/// default build carries no font rendering; callers that need `text`
/// support for real provide their own factory (e.g. backed by
/// `ttf-parser` or a system font lookup) at the call site.
pub trait FontFactory {
    fn glyph(&self, ch: char, font_family: &str, font_size: f64) -> Option<GlyphOutline>;
}

/// A `FontFactory` that never produces glyphs; `text` elements become
/// no-ops rather than a hard error, matching the "skipped with a
/// diagnostic" treatment the spec gives unsupported inputs.
#[derive(Default)]
pub struct NullFontFactory;

impl FontFactory for NullFontFactory {
    fn glyph(&self, _ch: char, _font_family: &str, _font_size: f64) -> Option<GlyphOutline> {
        None
    }
}
