//! The seams between crates
//!
//! - [`GlyphSource`] - Everything layout needs to know about a font
//! - [`Exporter`] - Where surfaces become bytes
//!
//! Layout and rasterization only ever see a `GlyphSource`, so the font
//! format (TrueType `glyf` or CFF) is decided once, at load time.

use crate::error::{GlyphMissingError, Result};
use crate::types::{FontMetrics, GlyphId, GlyphOutline, Surface};

/// Read-only access to one parsed font
///
/// ```ignore
/// struct Fixed;
///
/// impl GlyphSource for Fixed {
///     fn metrics(&self) -> FontMetrics { /* ... */ }
///     fn glyph_id(&self, ch: char) -> Option<GlyphId> { (ch == 'A').then_some(1) }
///     fn advance_width(&self, _: GlyphId) -> f32 { 600.0 }
///     fn outline(&self, _: GlyphId) -> Option<GlyphOutline> { Some(GlyphOutline::default()) }
/// }
/// ```
pub trait GlyphSource: Send + Sync {
    /// Vertical metrics and the design grid
    fn metrics(&self) -> FontMetrics;

    /// Find the glyph for this character
    ///
    /// Returns None when the font has no glyph for it (`.notdef` counts as none).
    fn glyph_id(&self, ch: char) -> Option<GlyphId>;

    /// Horizontal advance in design units
    fn advance_width(&self, glyph_id: GlyphId) -> f32;

    /// Pair adjustment in design units, added to the left glyph's advance
    fn kerning(&self, _left: GlyphId, _right: GlyphId) -> f32 {
        0.0
    }

    /// The glyph's outline in design units
    ///
    /// Returns None when the glyph data cannot be decoded. An empty glyph
    /// such as a space yields an empty outline, not None.
    fn outline(&self, glyph_id: GlyphId) -> Option<GlyphOutline>;

    /// Codepoint straight to outline
    fn outline_for(&self, ch: char) -> std::result::Result<GlyphOutline, GlyphMissingError> {
        self.glyph_id(ch)
            .and_then(|gid| self.outline(gid))
            .ok_or(GlyphMissingError { ch })
    }
}

/// Where surfaces become files
pub trait Exporter: Send + Sync {
    /// Exporter name for logs
    fn name(&self) -> &'static str;

    /// Encode the surface into the target format
    fn export(&self, surface: &Surface) -> Result<Vec<u8>>;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn mime_type(&self) -> &'static str;
}
