//! Where outlines meet pixels
//!
//! A glyph outline is flattened in fixed-point pixel space, an integer
//! [`Grid`] is fitted around the resulting polygons, and the accumulator
//! resolves coverage on that grid. Grids are anchored on whole pixels
//! relative to the pen, so a mask can be stamped at any integer pen
//! position without re-rendering.

use glint_core::error::RenderError;
use glint_core::traits::GlyphSource;
use glint_core::types::{CoverageMask, GlyphOutline};

use crate::accumulate::Accumulator;
use crate::curves::flatten;
use crate::fixed::FixedPoint;
use crate::stroke::MITER_LIMIT;

/// Glyph masks larger than this on either side are refused
pub const MAX_MASK_SIDE: u32 = 16_384;

/// Covers the 1/64 px rounding of the points a band is offset from
const REACH_SLACK: f32 = 1.0 / 32.0;

/// A closed polygon in pixels relative to the pen, y down
pub type FloatPolygon = Vec<(f32, f32)>;

/// Flattens an outline and lifts it into float pixel coordinates
pub fn pixel_polygons(outline: &GlyphOutline, scale: f32) -> Vec<FloatPolygon> {
    flatten(outline, scale)
        .into_iter()
        .map(|poly| poly.into_iter().map(FixedPoint::to_f32).collect())
        .collect()
}

/// Whole-pixel rectangle a mask is rendered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Grid {
    /// Smallest grid holding every point, or `None` for no points
    pub fn enclosing<'a, I>(points: I) -> Result<Option<Grid>, RenderError>
    where
        I: IntoIterator<Item = &'a (f32, f32)>,
    {
        let mut iter = points.into_iter();
        let Some(&(x, y)) = iter.next() else {
            return Ok(None);
        };
        let (min_x, min_y, max_x, max_y) = iter.fold((x, y, x, y), |(x0, y0, x1, y1), &(x, y)| {
            (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
        });

        let left = min_x.floor() as i64;
        let top = min_y.floor() as i64;
        let width = (max_x.ceil() as i64 - left).max(0);
        let height = (max_y.ceil() as i64 - top).max(0);
        let max = i64::from(MAX_MASK_SIDE);
        if width > max || height > max {
            return Err(RenderError::SurfaceTooLarge {
                width: width as u64,
                height: height as u64,
                max: MAX_MASK_SIDE,
            });
        }

        Ok(Some(Grid {
            left: left as i32,
            top: top as i32,
            width: width as u32,
            height: height as u32,
        }))
    }

    /// Coverage of `polygons` on this grid, row-major
    pub fn render(&self, polygons: &[FloatPolygon]) -> Vec<u8> {
        let mut acc = Accumulator::new(self.width, self.height);
        let (dx, dy) = (self.left as f32, self.top as f32);
        let mut local = Vec::new();
        for poly in polygons {
            local.clear();
            local.extend(poly.iter().map(|&(x, y)| (x - dx, y - dy)));
            acc.polygon(&local);
        }
        acc.coverage()
    }

    pub fn into_mask(self, data: Vec<u8>) -> CoverageMask {
        debug_assert_eq!(data.len(), self.width as usize * self.height as usize);
        CoverageMask {
            width: self.width,
            height: self.height,
            left: self.left,
            top: self.top,
            data,
        }
    }
}

/// Whole-pixel box, relative to the pen, that every mask of a glyph fits in
///
/// Unlike a fitted [`Grid`], each edge of an extent only ever moves outward
/// as the scale grows: it is taken from the scaled control box, always holds
/// the pen origin, and is widened by the farthest a border band can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Extent of `outline` at `scale` with a border `thickness` pixels wide
///
/// Also the size guard for everything downstream: an outline whose extent
/// exceeds [`MAX_MASK_SIDE`] is refused here, before any 26.6 arithmetic.
pub fn outline_extent(
    outline: &GlyphOutline,
    scale: f32,
    thickness: f32,
) -> Result<Option<Extent>, RenderError> {
    let Some((min, max)) = outline.bounds() else {
        return Ok(None);
    };
    let reach = if thickness > 0.0 {
        thickness / 2.0 * MITER_LIMIT + REACH_SLACK
    } else {
        0.0
    };

    // Design units are y up, pixels y down
    let left = ((min.x * scale).min(0.0) - reach).floor() as i64;
    let right = ((max.x * scale).max(0.0) + reach).ceil() as i64;
    let top = ((-max.y * scale).min(0.0) - reach).floor() as i64;
    let bottom = ((-min.y * scale).max(0.0) + reach).ceil() as i64;

    let (width, height) = (right - left, bottom - top);
    let limit = i64::from(MAX_MASK_SIDE);
    if width > limit || height > limit {
        return Err(RenderError::SurfaceTooLarge {
            width: width as u64,
            height: height as u64,
            max: MAX_MASK_SIDE,
        });
    }

    Ok(Some(Extent {
        left: left as i32,
        top: top as i32,
        right: right as i32,
        bottom: bottom as i32,
    }))
}

/// Fill coverage of an outline at `scale` pixels per design unit
pub fn rasterize_outline(outline: &GlyphOutline, scale: f32) -> Result<CoverageMask, RenderError> {
    outline_extent(outline, scale, 0.0)?;
    let polygons = pixel_polygons(outline, scale);
    let Some(grid) = Grid::enclosing(polygons.iter().flatten())? else {
        return Ok(CoverageMask::empty());
    };
    if grid.width == 0 || grid.height == 0 {
        return Ok(CoverageMask::empty());
    }
    let data = grid.render(&polygons);
    Ok(grid.into_mask(data))
}

/// Fill coverage of one character at `size` pixels per em
///
/// A character the font cannot draw yields an empty mask; the caller
/// decides how far to advance.
pub fn rasterize_glyph(
    font: &dyn GlyphSource,
    ch: char,
    size: f32,
) -> Result<CoverageMask, RenderError> {
    match font.outline_for(ch) {
        Ok(outline) => rasterize_outline(&outline, font.metrics().scale(size)),
        Err(missing) => {
            log::trace!("{missing}; rendering nothing");
            Ok(CoverageMask::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::types::{Contour, Point};

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> GlyphOutline {
        let mut c = Contour::starting_at(Point::new(x0, y0));
        c.line_to(Point::new(x0, y1))
            .line_to(Point::new(x1, y1))
            .line_to(Point::new(x1, y0));
        GlyphOutline { contours: vec![c] }
    }

    #[test]
    fn mask_is_placed_relative_to_baseline() {
        // 10..30 wide, 0..50 tall in design units at scale 0.1
        let mask = rasterize_outline(&rect(100.0, 0.0, 300.0, 500.0), 0.1).unwrap();
        assert_eq!((mask.left, mask.top), (10, -50));
        assert_eq!((mask.width, mask.height), (20, 50));
        assert!(mask.data.iter().all(|&c| c == 255));
    }

    #[test]
    fn fractional_edges_are_partial() {
        let mask = rasterize_outline(&rect(5.0, 0.0, 25.0, 10.0), 0.1).unwrap();
        // Spans 0.5..2.5 px: columns 0 and 2 half covered
        assert_eq!(mask.width, 3);
        assert_eq!(mask.coverage(0, 0), 128);
        assert_eq!(mask.coverage(1, 0), 255);
        assert_eq!(mask.coverage(2, 0), 128);
    }

    #[test]
    fn empty_outline_gives_empty_mask() {
        let mask = rasterize_outline(&GlyphOutline::default(), 1.0).unwrap();
        assert!(mask.is_empty());
    }

    #[test]
    fn absurd_scale_is_refused() {
        let err = rasterize_outline(&rect(0.0, 0.0, 1000.0, 1000.0), 100.0).unwrap_err();
        assert!(matches!(err, RenderError::SurfaceTooLarge { .. }));
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut c = Contour::starting_at(Point::new(0.0, 0.0));
        c.cubic_to(
            Point::new(10.0, 400.0),
            Point::new(390.0, 410.0),
            Point::new(400.0, 0.0),
        );
        let outline = GlyphOutline { contours: vec![c] };
        let a = rasterize_outline(&outline, 0.137).unwrap();
        let b = rasterize_outline(&outline, 0.137).unwrap();
        assert_eq!(a, b);
    }
}
