// this_file: crates/glint-render/src/composite.rs

//! Painting coverage masks onto a straight-alpha RGBA surface

use glint_core::types::{Color, CoverageMask, Surface};

/// Paints `mask` in `color` with its pen origin at `(pen_x, baseline)`
///
/// Surface coordinates; mask pixels falling outside the surface are dropped.
pub fn paint_mask(surface: &mut Surface, mask: &CoverageMask, pen_x: i32, baseline: i32, color: Color) {
    if mask.is_empty() || surface.is_empty() {
        return;
    }
    let surface_w = surface.width() as i64;
    let surface_h = surface.height() as i64;
    let x0 = i64::from(pen_x) + i64::from(mask.left);
    let y0 = i64::from(baseline) + i64::from(mask.top);
    let data = surface.data_mut();

    for my in 0..mask.height {
        let sy = y0 + i64::from(my);
        if sy < 0 || sy >= surface_h {
            continue;
        }
        let row = &mask.data[(my * mask.width) as usize..((my + 1) * mask.width) as usize];
        for (mx, &coverage) in row.iter().enumerate() {
            if coverage == 0 {
                continue;
            }
            let sx = x0 + mx as i64;
            if sx < 0 || sx >= surface_w {
                continue;
            }
            let idx = ((sy * surface_w + sx) * 4) as usize;
            source_over(&mut data[idx..idx + 4], color, coverage);
        }
    }
}

/// Straight-alpha source-over of an opaque color at `alpha` onto one pixel
///
/// Integer-only, rounding to nearest, so results are identical everywhere.
#[inline]
pub fn source_over(dst: &mut [u8], color: Color, alpha: u8) {
    if alpha == 0 {
        return;
    }
    let a_s = u32::from(alpha);
    let a_d = u32::from(dst[3]);
    let inv = 255 - a_s;

    // Output alpha scaled by 255
    let ao = a_s * 255 + a_d * inv;
    if ao == 0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }

    let mix = |c_s: u8, c_d: u8| -> u8 {
        let num = u32::from(c_s) * a_s * 255 + u32::from(c_d) * a_d * inv;
        ((num + ao / 2) / ao) as u8
    };
    dst[0] = mix(color.r, dst[0]);
    dst[1] = mix(color.g, dst[1]);
    dst[2] = mix(color.b, dst[2]);
    dst[3] = ((ao + 127) / 255) as u8;
}
