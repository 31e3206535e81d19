// this_file: crates/glint-render/src/lib.rs

//! Layout, compositing and batch rendering for Glint.
//!
//! [`render_text`] turns one text into a [`Surface`]; [`BatchRenderer`]
//! does the same for many texts while sharing one glyph cache.

pub mod batch;
pub mod composite;
pub mod layout;

use glint_core::config::RenderConfig;
use glint_core::error::RenderError;
use glint_core::traits::GlyphSource;
use glint_core::types::{Surface, TextStyle};
use glint_raster::GlyphCache;

pub use batch::{BatchRenderer, ProgressUpdate};
pub use composite::{paint_mask, source_over};
pub use layout::{layout_and_composite, split_lines, PixelBounds, PlacedGlyph, TextLayout};

/// Renders one text with an already loaded font
pub fn render_text(
    font: &dyn GlyphSource,
    text: &str,
    style: &TextStyle,
    config: &RenderConfig,
) -> Result<Surface, RenderError> {
    let lines = split_lines(text);
    layout_and_composite(font, style, &lines, config, &GlyphCache::new())
}
