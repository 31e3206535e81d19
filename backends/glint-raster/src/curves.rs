//! Curves to polygons, one subdivision at a time
//!
//! Outlines are scaled into fixed-point pixel space first, then every
//! Bézier is split with de Casteljau's algorithm until it deviates less
//! than [`FLATNESS_THRESHOLD`] from a straight line. The tolerance is in
//! pixels, so a 12 px glyph and a 400 px glyph are equally smooth.

use crate::fixed::{F26Dot6, FixedPoint};
use glint_core::types::{GlyphOutline, PathCommand, Point};

/// 1/16 px, measured as Manhattan distance
pub const FLATNESS_THRESHOLD: F26Dot6 = F26Dot6::from_raw(4);

/// Malformed control points cannot recurse forever
const MAX_DEPTH: u32 = 16;

/// A closed polygon in fixed-point pixels; the last point joins the first
pub type Polygon = Vec<FixedPoint>;

/// Control point distance from the chord midpoint
///
/// Twice the curve's true maximum deviation, so the test errs on the
/// side of splitting.
pub fn quadratic_flatness(p0: FixedPoint, p1: FixedPoint, p2: FixedPoint) -> F26Dot6 {
    p1.manhattan(p0.midpoint(p2))
}

/// Control point distance from where a straight cubic would put them
pub fn cubic_flatness(
    p0: FixedPoint,
    p1: FixedPoint,
    p2: FixedPoint,
    p3: FixedPoint,
) -> F26Dot6 {
    let third = |a: F26Dot6, b: F26Dot6| F26Dot6::from_raw((2 * a.raw() + b.raw()) / 3);
    let at_third = FixedPoint::new(third(p0.x, p3.x), third(p0.y, p3.y));
    let at_two_thirds = FixedPoint::new(third(p3.x, p0.x), third(p3.y, p0.y));
    p1.manhattan(at_third).max(p2.manhattan(at_two_thirds))
}

/// Emits the end point of every flat piece of a quadratic
pub fn subdivide_quadratic<F>(
    p0: FixedPoint,
    p1: FixedPoint,
    p2: FixedPoint,
    output: &mut F,
    depth: u32,
) where
    F: FnMut(FixedPoint),
{
    if depth >= MAX_DEPTH || quadratic_flatness(p0, p1, p2) <= FLATNESS_THRESHOLD {
        output(p2);
        return;
    }

    let m01 = p0.midpoint(p1);
    let m12 = p1.midpoint(p2);
    let m012 = m01.midpoint(m12);

    subdivide_quadratic(p0, m01, m012, output, depth + 1);
    subdivide_quadratic(m012, m12, p2, output, depth + 1);
}

/// Emits the end point of every flat piece of a cubic
pub fn subdivide_cubic<F>(
    p0: FixedPoint,
    p1: FixedPoint,
    p2: FixedPoint,
    p3: FixedPoint,
    output: &mut F,
    depth: u32,
) where
    F: FnMut(FixedPoint),
{
    if depth >= MAX_DEPTH || cubic_flatness(p0, p1, p2, p3) <= FLATNESS_THRESHOLD {
        output(p3);
        return;
    }

    let m01 = p0.midpoint(p1);
    let m12 = p1.midpoint(p2);
    let m23 = p2.midpoint(p3);
    let m012 = m01.midpoint(m12);
    let m123 = m12.midpoint(m23);
    let m0123 = m012.midpoint(m123);

    subdivide_cubic(p0, m01, m012, m0123, output, depth + 1);
    subdivide_cubic(m0123, m123, m23, p3, output, depth + 1);
}

/// Design units (y up) to fixed-point pixels (y down) at `scale`
pub fn to_pixels(p: Point, scale: f32) -> FixedPoint {
    FixedPoint::new(
        F26Dot6::from_float(p.x * scale),
        F26Dot6::from_float(-p.y * scale),
    )
}

/// Flattens every contour of `outline` into a polygon in pixel space
///
/// Repeated points are dropped, and so is the explicit closing point when a
/// contour returns to its start. Contours that collapse to a single point
/// disappear.
pub fn flatten(outline: &GlyphOutline, scale: f32) -> Vec<Polygon> {
    let mut polygons = Vec::with_capacity(outline.contours.len());

    for contour in &outline.contours {
        let mut poly: Polygon = Vec::new();
        let mut push = |p: FixedPoint| {
            if poly.last() != Some(&p) {
                poly.push(p);
            }
        };
        let mut current = FixedPoint::default();

        for cmd in &contour.commands {
            match *cmd {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => {
                    current = to_pixels(p, scale);
                    push(current);
                }
                PathCommand::QuadTo(c, p) => {
                    let (c, p) = (to_pixels(c, scale), to_pixels(p, scale));
                    subdivide_quadratic(current, c, p, &mut push, 0);
                    current = p;
                }
                PathCommand::CubicTo(c0, c1, p) => {
                    let (c0, c1, p) = (
                        to_pixels(c0, scale),
                        to_pixels(c1, scale),
                        to_pixels(p, scale),
                    );
                    subdivide_cubic(current, c0, c1, p, &mut push, 0);
                    current = p;
                }
            }
        }

        while poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }
        if poly.len() > 1 {
            polygons.push(poly);
        }
    }
    polygons
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::types::Contour;

    fn fp(x: i32, y: i32) -> FixedPoint {
        FixedPoint::new(F26Dot6::from_int(x), F26Dot6::from_int(y))
    }

    #[test]
    fn test_quadratic_flatness_straight_line() {
        let flatness = quadratic_flatness(fp(0, 0), fp(5, 5), fp(10, 10));
        assert!(flatness <= FLATNESS_THRESHOLD);
    }

    #[test]
    fn test_straight_cubic_is_flat() {
        let flatness = cubic_flatness(fp(0, 0), fp(3, 0), fp(6, 0), fp(9, 0));
        assert!(flatness <= FLATNESS_THRESHOLD);
    }

    #[test]
    fn test_quadratic_subdivision() {
        let mut points = Vec::new();
        subdivide_quadratic(fp(0, 0), fp(5, 10), fp(10, 0), &mut |p| points.push(p), 0);

        assert!(points.len() > 1, "Curve should be subdivided");
        assert_eq!(points.last(), Some(&fp(10, 0)));
    }

    #[test]
    fn test_cubic_subdivision() {
        let mut points = Vec::new();
        subdivide_cubic(
            fp(0, 0),
            fp(0, 10),
            fp(10, 10),
            fp(10, 0),
            &mut |p| points.push(p),
            0,
        );

        assert!(points.len() > 1, "Curve should be subdivided");
        assert_eq!(points.last(), Some(&fp(10, 0)));
    }

    #[test]
    fn test_segment_count_grows_with_size() {
        let mut c = Contour::starting_at(Point::new(0.0, 0.0));
        c.quad_to(Point::new(500.0, 1000.0), Point::new(1000.0, 0.0));
        let outline = GlyphOutline { contours: vec![c] };

        let small = flatten(&outline, 0.012);
        let large = flatten(&outline, 0.4);
        assert!(large[0].len() > small[0].len());
    }

    #[test]
    fn test_flatten_flips_y_and_drops_closing_point() {
        let mut c = Contour::starting_at(Point::new(0.0, 0.0));
        c.line_to(Point::new(10.0, 0.0))
            .line_to(Point::new(10.0, 10.0))
            .line_to(Point::new(0.0, 0.0));
        let outline = GlyphOutline { contours: vec![c] };

        let polys = flatten(&outline, 1.0);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0], vec![fp(0, 0), fp(10, 0), fp(10, -10)]);
    }

    #[test]
    fn test_degenerate_contours_vanish() {
        let mut c = Contour::starting_at(Point::new(3.0, 3.0));
        c.line_to(Point::new(3.0, 3.0));
        let outline = GlyphOutline { contours: vec![c] };
        assert!(flatten(&outline, 1.0).is_empty());
    }
}
