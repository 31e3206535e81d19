//! Signed-area accumulation: exact anti-aliasing without supersampling
//!
//! Every line segment deposits the signed area it sweeps into a per-row
//! accumulation buffer. A running sum along each row then yields the
//! winding-weighted coverage of every pixel. Clamping `|sum|` to one makes
//! overlapping same-direction shapes behave as a union, which the outline
//! generator relies on.
//!
//! The float operations run in a fixed order for a given segment list, so
//! identical input always produces identical bytes.

/// Coverage accumulator for a `width` x `height` mask
pub struct Accumulator {
    width: usize,
    height: usize,
    /// Two spare cells per row absorb deposits at the right edge
    stride: usize,
    cells: Vec<f32>,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        let stride = width + 2;
        Self {
            width,
            height,
            stride,
            cells: vec![0.0; stride * height],
        }
    }

    /// Adds one directed edge; coordinates are mask-local pixels, y down
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32)) {
        let (x0, y0) = from;
        let (x1, y1) = to;
        if (y0 - y1).abs() <= f32::EPSILON {
            return;
        }
        let (dir, (x0, y0), (x1, y1)) = if y0 < y1 {
            (1.0f32, (x0, y0), (x1, y1))
        } else {
            (-1.0f32, (x1, y1), (x0, y0))
        };

        let dxdy = (x1 - x0) / (y1 - y0);
        let max_x = self.width as f32;
        let top = y0.max(0.0);
        let bottom = y1.min(self.height as f32);
        if top >= bottom {
            return;
        }

        let mut x = x0 + (top - y0) * dxdy;
        let mut row = top.floor() as usize;
        while (row as f32) < bottom && row < self.height {
            let row_top = (row as f32).max(top);
            let row_bottom = ((row + 1) as f32).min(bottom);
            let dy = row_bottom - row_top;
            let x_next = x + dxdy * dy;
            self.deposit(
                row,
                x.clamp(0.0, max_x),
                x_next.clamp(0.0, max_x),
                dy * dir,
            );
            x = x_next;
            row += 1;
        }
    }

    /// Spreads signed height `d` of a segment crossing one row between `xa` and `xb`
    fn deposit(&mut self, row: usize, xa: f32, xb: f32, d: f32) {
        let base = row * self.stride;
        let (lo, hi) = if xa < xb { (xa, xb) } else { (xb, xa) };
        let lo_floor = lo.floor();
        let lo_i = lo_floor as usize;
        let hi_ceil = hi.ceil();
        let hi_i = hi_ceil as usize;

        if hi_i <= lo_i + 1 {
            // Segment stays within one pixel column
            let mid = 0.5 * (xa + xb) - lo_floor;
            self.cells[base + lo_i] += d - d * mid;
            self.cells[base + lo_i + 1] += d * mid;
            return;
        }

        let inv = (hi - lo).recip();
        let lo_frac = lo - lo_floor;
        let first = 0.5 * inv * (1.0 - lo_frac) * (1.0 - lo_frac);
        let hi_frac = hi - hi_ceil + 1.0;
        let last = 0.5 * inv * hi_frac * hi_frac;

        self.cells[base + lo_i] += d * first;
        if hi_i == lo_i + 2 {
            self.cells[base + lo_i + 1] += d * (1.0 - first - last);
        } else {
            let second = inv * (1.5 - lo_frac);
            self.cells[base + lo_i + 1] += d * (second - first);
            for xi in lo_i + 2..hi_i - 1 {
                self.cells[base + xi] += d * inv;
            }
            let before_last = second + (hi_i - lo_i - 3) as f32 * inv;
            self.cells[base + hi_i - 1] += d * (1.0 - before_last - last);
        }
        self.cells[base + hi_i] += d * last;
    }

    /// Adds every edge of a closed polygon
    pub fn polygon(&mut self, points: &[(f32, f32)]) {
        let Some(&last) = points.last() else {
            return;
        };
        let mut prev = last;
        for &p in points {
            self.line(prev, p);
            prev = p;
        }
    }

    /// Resolves accumulated area into 0..=255 coverage, row by row
    pub fn coverage(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height);
        for row in self.cells.chunks_exact(self.stride) {
            let mut acc = 0.0f32;
            for &cell in &row[..self.width] {
                acc += cell;
                out.push(to_byte(acc));
            }
        }
        out
    }
}

#[inline]
fn to_byte(area: f32) -> u8 {
    (area.abs().min(1.0) * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(acc: &mut Accumulator, x0: f32, y0: f32, x1: f32, y1: f32) {
        acc.polygon(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)]);
    }

    #[test]
    fn pixel_aligned_square_is_solid() {
        let mut acc = Accumulator::new(4, 4);
        square(&mut acc, 1.0, 1.0, 3.0, 3.0);
        let cov = acc.coverage();
        assert_eq!(cov[4 + 1], 255);
        assert_eq!(cov[2 * 4 + 2], 255);
        assert_eq!(cov[0], 0);
        assert_eq!(cov[3 * 4 + 3], 0);
    }

    #[test]
    fn half_pixel_edge_is_half_covered() {
        let mut acc = Accumulator::new(3, 1);
        square(&mut acc, 0.5, 0.0, 3.0, 1.0);
        let cov = acc.coverage();
        assert_eq!(cov, vec![128, 255, 255]);
    }

    #[test]
    fn diagonal_edge_is_anti_aliased() {
        let mut acc = Accumulator::new(4, 4);
        acc.polygon(&[(0.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let cov = acc.coverage();
        // Pixels the diagonal crosses are half covered
        for i in 0..4 {
            assert_eq!(cov[i * 4 + i], 128, "diagonal pixel {i}");
        }
        assert_eq!(cov[3 * 4], 255);
        assert_eq!(cov[3], 0);
    }

    #[test]
    fn orientation_does_not_matter() {
        let mut cw = Accumulator::new(5, 5);
        cw.polygon(&[(0.5, 0.5), (4.2, 0.5), (4.2, 4.7), (0.5, 4.7)]);
        let mut ccw = Accumulator::new(5, 5);
        ccw.polygon(&[(0.5, 0.5), (0.5, 4.7), (4.2, 4.7), (4.2, 0.5)]);
        assert_eq!(cw.coverage(), ccw.coverage());
    }

    #[test]
    fn same_direction_overlap_clamps() {
        let mut acc = Accumulator::new(4, 1);
        square(&mut acc, 0.0, 0.0, 3.0, 1.0);
        square(&mut acc, 1.0, 0.0, 4.0, 1.0);
        assert_eq!(acc.coverage(), vec![255, 255, 255, 255]);
    }

    #[test]
    fn opposite_direction_cuts_a_hole() {
        let mut acc = Accumulator::new(5, 5);
        acc.polygon(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0)]);
        acc.polygon(&[(1.0, 1.0), (1.0, 4.0), (4.0, 4.0), (4.0, 1.0)]);
        let cov = acc.coverage();
        assert_eq!(cov[2 * 5 + 2], 0);
        assert_eq!(cov[0], 255);
    }

    #[test]
    fn geometry_outside_is_clipped_safely() {
        let mut acc = Accumulator::new(2, 2);
        square(&mut acc, -3.0, -3.0, 9.0, 9.0);
        assert_eq!(acc.coverage(), vec![255; 4]);
    }
}
