//! Glint's rasterizer: outlines in, coverage masks out
//!
//! - [`rasterize_glyph`] / [`rasterize_outline`] - anti-aliased fill coverage
//! - [`generate_outline_mask`] - the border band for stroked text
//! - [`GlyphCache`] - per-batch reuse of both
//!
//! Everything here is a pure function of its inputs. Curves are flattened
//! on a 26.6 fixed-point grid with a 1/16 px tolerance, and coverage is
//! resolved by signed-area accumulation, so equal inputs give equal bytes
//! on every thread and every run.

pub mod accumulate;
pub mod curves;
pub mod fixed;
pub mod glyph_cache;
pub mod rasterizer;
pub mod stroke;

use glint_core::error::RenderError;
use glint_core::types::GlyphOutline;

pub use glyph_cache::{GlyphCache, GlyphCacheStats, GlyphKey, GlyphMasks};
pub use rasterizer::{
    outline_extent, rasterize_glyph, rasterize_outline, Extent, Grid, MAX_MASK_SIDE,
};
pub use stroke::{generate_outline_mask, MITER_LIMIT};

/// Fill and border masks of one outline, flattening it only once
pub fn rasterize_masks(
    outline: &GlyphOutline,
    scale: f32,
    thickness: f32,
) -> Result<GlyphMasks, RenderError> {
    let extent = outline_extent(outline, scale, thickness)?;
    let polygons = rasterizer::pixel_polygons(outline, scale);

    let fill = match Grid::enclosing(polygons.iter().flatten())? {
        Some(grid) if grid.width > 0 && grid.height > 0 => {
            let data = grid.render(&polygons);
            grid.into_mask(data)
        }
        _ => Default::default(),
    };

    let outline = if thickness > 0.0 {
        stroke::band_mask(&polygons, thickness / 2.0)?
    } else {
        Default::default()
    };

    Ok(GlyphMasks {
        fill,
        outline,
        extent,
    })
}
