//! Outline generation: the border band around a glyph
//!
//! The band is built as a union of simple convex pieces. Every polygon
//! edge contributes a rectangle reaching `thickness / 2` to both sides,
//! and every corner contributes a join on its outer side: a miter while
//! the miter stays within [`MITER_LIMIT`] half-thicknesses of the corner,
//! a bevel beyond that. All pieces are wound the same way, so where they
//! overlap (self-intersecting offsets at tight concave corners included)
//! the accumulator's clamp turns the sum into a union.
//!
//! Pixels the fill covers completely are then cleared, leaving only the
//! border. Partially covered fill pixels keep their band coverage, so the
//! fill painted on top meets the border without a translucent seam.

use glint_core::error::RenderError;
use glint_core::types::{CoverageMask, GlyphOutline};

use crate::rasterizer::{outline_extent, pixel_polygons, FloatPolygon, Grid};

/// Longest miter, in half-thicknesses, before a corner is beveled
pub const MITER_LIMIT: f32 = 2.0;

const EPS: f32 = 1e-6;

/// Border band mask for an outline at `scale`, `thickness` pixels wide
///
/// Thickness zero returns an empty mask without touching the outline.
pub fn generate_outline_mask(
    outline: &GlyphOutline,
    scale: f32,
    thickness: f32,
) -> Result<CoverageMask, RenderError> {
    if thickness <= 0.0 {
        return Ok(CoverageMask::empty());
    }
    outline_extent(outline, scale, thickness)?;
    let fill = pixel_polygons(outline, scale);
    band_mask(&fill, thickness / 2.0)
}

/// Band mask around already-flattened fill polygons
pub(crate) fn band_mask(fill: &[FloatPolygon], half: f32) -> Result<CoverageMask, RenderError> {
    let pieces: Vec<FloatPolygon> = fill.iter().flat_map(|poly| band_pieces(poly, half)).collect();

    let Some(grid) = Grid::enclosing(pieces.iter().flatten())? else {
        return Ok(CoverageMask::empty());
    };
    if grid.width == 0 || grid.height == 0 {
        return Ok(CoverageMask::empty());
    }

    let band = grid.render(&pieces);
    let inside = grid.render(fill);
    let data = band
        .iter()
        .zip(&inside)
        .map(|(&b, &f)| if f == u8::MAX { 0 } else { b })
        .collect();
    Ok(grid.into_mask(data))
}

/// Edge rectangles and corner joins for one closed polygon
fn band_pieces(poly: &[(f32, f32)], half: f32) -> Vec<FloatPolygon> {
    let n = poly.len();
    let mut pieces = Vec::with_capacity(n * 2);
    if n < 2 {
        return pieces;
    }

    let edge_dir = |i: usize| -> Option<(f32, f32)> {
        let (ax, ay) = poly[i];
        let (bx, by) = poly[(i + 1) % n];
        let (dx, dy) = (bx - ax, by - ay);
        let len = (dx * dx + dy * dy).sqrt();
        (len > EPS).then(|| (dx / len, dy / len))
    };
    let dirs: Vec<Option<(f32, f32)>> = (0..n).map(edge_dir).collect();

    for i in 0..n {
        let Some((dx, dy)) = dirs[i] else {
            continue;
        };
        let (nx, ny) = (-dy * half, dx * half);
        let (ax, ay) = poly[i];
        let (bx, by) = poly[(i + 1) % n];
        pieces.push(vec![
            (ax + nx, ay + ny),
            (bx + nx, by + ny),
            (bx - nx, by - ny),
            (ax - nx, ay - ny),
        ]);
    }

    for i in 0..n {
        // Corner at poly[i], between edge i-1 (incoming) and edge i (outgoing)
        let (Some(d0), Some(d1)) = (dirs[(i + n - 1) % n], dirs[i]) else {
            continue;
        };
        if let Some(join) = corner_join(poly[i], d0, d1, half) {
            pieces.push(join);
        }
    }

    for piece in &mut pieces {
        if signed_area(piece) < 0.0 {
            piece.reverse();
        }
    }
    pieces
}

/// Outer-side join at `v`, or `None` for a straight continuation
fn corner_join(v: (f32, f32), d0: (f32, f32), d1: (f32, f32), half: f32) -> Option<FloatPolygon> {
    let cross = d0.0 * d1.1 - d0.1 * d1.0;
    let dot = d0.0 * d1.0 + d0.1 * d1.1;
    let n0 = (-d0.1, d0.0);
    let n1 = (-d1.1, d1.0);

    if cross.abs() <= EPS {
        if dot > 0.0 {
            return None;
        }
        // The path doubles back: square cap past the tip
        let (cx, cy) = (v.0 + d0.0 * half, v.1 + d0.1 * half);
        return Some(vec![
            (v.0 + n0.0 * half, v.1 + n0.1 * half),
            (cx + n0.0 * half, cy + n0.1 * half),
            (cx - n0.0 * half, cy - n0.1 * half),
            (v.0 - n0.0 * half, v.1 - n0.1 * half),
        ]);
    }

    // Turning toward the normal opens the gap on the other side
    let side = if cross > 0.0 { -1.0 } else { 1.0 };
    let p0 = (v.0 + side * n0.0 * half, v.1 + side * n0.1 * half);
    let p1 = (v.0 + side * n1.0 * half, v.1 + side * n1.1 * half);

    let (mx, my) = (n0.0 + n1.0, n0.1 + n1.1);
    let m_len_sq = mx * mx + my * my;
    // Miter length is 2h / |n0 + n1|
    if m_len_sq >= (2.0 / MITER_LIMIT).powi(2) {
        let k = side * half * 2.0 / m_len_sq;
        let miter = (v.0 + mx * k, v.1 + my * k);
        Some(vec![v, p0, miter, p1])
    } else {
        Some(vec![v, p0, p1])
    }
}

fn signed_area(poly: &[(f32, f32)]) -> f32 {
    let n = poly.len();
    (0..n)
        .map(|i| {
            let (x0, y0) = poly[i];
            let (x1, y1) = poly[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum::<f32>()
        / 2.0
}
