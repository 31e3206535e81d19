//! Line layout: pen positions, surface bounds and the two compositing layers
//!
//! Lines are laid out independently, left-aligned, one below the other.
//! Pen positions accumulate in floating point but each glyph is placed at
//! the nearest whole pixel, and every mask comes out of a [`GlyphCache`],
//! so a glyph renders to the same bytes wherever it lands.

use std::sync::Arc;

use glint_core::config::{BoundsPolicy, MissingGlyphPolicy, RenderConfig};
use glint_core::error::{GlyphMissingError, RenderError};
use glint_core::traits::GlyphSource;
use glint_core::types::{Contour, CoverageMask, GlyphId, GlyphOutline, Point, Surface, TextStyle};
use glint_raster::{rasterize_masks, Extent, GlyphCache, GlyphKey, GlyphMasks};

use crate::composite::paint_mask;

/// Tofu box height, in ems
const TOFU_HEIGHT_EM: f32 = 0.7;
/// Tofu box side inset and stroke, in ems
const TOFU_INSET_EM: f32 = 0.05;
const TOFU_STROKE_EM: f32 = 0.06;

/// Splits text on `\n`, `\r\n` and a lone `\r`
///
/// Always yields at least one (possibly empty) line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push(&text[start..]);
    lines
}

/// Half-open pixel rectangle in layout space (y down, first baseline below 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelBounds {
    pub fn union(self, other: PixelBounds) -> PixelBounds {
        PixelBounds {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grows every edge by `by` pixels
    pub fn pad(self, by: i32) -> PixelBounds {
        PixelBounds {
            x0: self.x0.saturating_sub(by),
            y0: self.y0.saturating_sub(by),
            x1: self.x1.saturating_add(by),
            y1: self.y1.saturating_add(by),
        }
    }

    pub fn width(&self) -> u64 {
        (i64::from(self.x1) - i64::from(self.x0)).max(0) as u64
    }

    pub fn height(&self) -> u64 {
        (i64::from(self.y1) - i64::from(self.y0)).max(0) as u64
    }

    fn of_mask(mask: &CoverageMask, pen_x: i32, baseline: i32) -> Option<PixelBounds> {
        if mask.is_empty() {
            return None;
        }
        let x0 = pen_x.saturating_add(mask.left);
        let y0 = baseline.saturating_add(mask.top);
        Some(PixelBounds {
            x0,
            y0,
            x1: x0.saturating_add(mask.width as i32),
            y1: y0.saturating_add(mask.height as i32),
        })
    }

    fn of_extent(extent: Extent, pen_x: i32, baseline: i32) -> PixelBounds {
        PixelBounds {
            x0: pen_x.saturating_add(extent.left),
            y0: baseline.saturating_add(extent.top),
            x1: pen_x.saturating_add(extent.right),
            y1: baseline.saturating_add(extent.bottom),
        }
    }
}

/// A glyph's masks at its rounded pen position
#[derive(Debug, Clone)]
pub struct PlacedGlyph {
    pub x: i32,
    pub baseline: i32,
    pub masks: Arc<GlyphMasks>,
}

/// Placed glyphs plus the padded surface extent
///
/// `bounds` is `None` when nothing contributes to the surface.
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    pub glyphs: Vec<PlacedGlyph>,
    pub bounds: Option<PixelBounds>,
}

impl TextLayout {
    fn include(&mut self, rect: PixelBounds) {
        self.bounds = Some(match self.bounds {
            Some(b) => b.union(rect),
            None => rect,
        });
    }
}

/// Places every glyph of `lines` and computes the surface bounds
pub fn layout_lines(
    font: &dyn GlyphSource,
    style: &TextStyle,
    lines: &[&str],
    config: &RenderConfig,
    cache: &GlyphCache,
) -> Result<TextLayout, RenderError> {
    style.validate()?;

    let metrics = font.metrics();
    let scale = metrics.scale(style.size);
    let ascent = (metrics.ascent * scale).round() as i32;
    let descent = (metrics.descent * scale).round() as i32;
    let line_advance = metrics.line_advance() * scale;
    let missing_advance = config.missing_advance_em * f32::from(metrics.units_per_em);

    let mut layout = TextLayout::default();

    for (index, line) in lines.iter().enumerate() {
        let baseline = ascent.saturating_add((index as f32 * line_advance).round() as i32);
        let mut pen = 0.0f32;
        let mut prev: Option<GlyphId> = None;
        let mut has_chars = false;

        for ch in line.chars() {
            has_chars = true;
            let gid = font.glyph_id(ch);
            if let (Some(left), Some(right)) = (prev, gid) {
                pen += font.kerning(left, right) * scale;
            }

            let (masks, advance) = match gid {
                Some(gid) => (
                    glyph_masks(font, cache, ch, gid, scale, style)?,
                    font.advance_width(gid),
                ),
                None => {
                    log::trace!(
                        "{}, falling back to {:?}",
                        GlyphMissingError { ch },
                        config.missing_glyph
                    );
                    let masks = missing_masks(
                        cache,
                        ch,
                        missing_advance,
                        scale,
                        style,
                        config,
                        metrics.units_per_em,
                    )?;
                    (masks, missing_advance)
                }
            };

            let x = pen.round() as i32;
            for mask in [&masks.fill, &masks.outline] {
                if let Some(rect) = PixelBounds::of_mask(mask, x, baseline) {
                    layout.include(rect);
                }
            }
            // Fitted masks can lose a pixel as the size grows; extents cannot
            if let (BoundsPolicy::LineBox, Some(extent)) = (config.bounds, masks.extent) {
                layout.include(PixelBounds::of_extent(extent, x, baseline));
            }
            layout.glyphs.push(PlacedGlyph {
                x,
                baseline,
                masks,
            });

            pen += advance * scale;
            prev = gid;
        }

        if has_chars && config.bounds == BoundsPolicy::LineBox {
            layout.include(PixelBounds {
                x0: 0,
                y0: baseline.saturating_sub(ascent),
                x1: pen.ceil().max(0.0) as i32,
                y1: baseline.saturating_add(descent),
            });
        }
    }

    let pad = (style.outline_thickness / 2.0).ceil() as i32;
    layout.bounds = layout.bounds.map(|b| b.pad(pad));
    Ok(layout)
}

/// Paints a layout onto a fresh surface: every border first, then every fill
pub fn composite(layout: &TextLayout, style: &TextStyle, config: &RenderConfig) -> Result<Surface, RenderError> {
    let Some(bounds) = layout.bounds else {
        return Ok(Surface::empty());
    };

    let (width, height) = (bounds.width(), bounds.height());
    let max = u64::from(config.max_surface_side);
    if width > max || height > max {
        return Err(RenderError::SurfaceTooLarge {
            width,
            height,
            max: config.max_surface_side,
        });
    }
    if width == 0 || height == 0 {
        return Ok(Surface::empty());
    }

    let mut surface = Surface::new(width as u32, height as u32);
    let (dx, dy) = (bounds.x0.saturating_neg(), bounds.y0.saturating_neg());

    if style.has_outline() {
        for glyph in &layout.glyphs {
            paint_mask(
                &mut surface,
                &glyph.masks.outline,
                glyph.x.saturating_add(dx),
                glyph.baseline.saturating_add(dy),
                style.outline,
            );
        }
    }
    for glyph in &layout.glyphs {
        paint_mask(
            &mut surface,
            &glyph.masks.fill,
            glyph.x.saturating_add(dx),
            glyph.baseline.saturating_add(dy),
            style.fill,
        );
    }

    Ok(surface)
}

/// Lays out `lines` and composites them in one step
pub fn layout_and_composite(
    font: &dyn GlyphSource,
    style: &TextStyle,
    lines: &[&str],
    config: &RenderConfig,
    cache: &GlyphCache,
) -> Result<Surface, RenderError> {
    let layout = layout_lines(font, style, lines, config, cache)?;
    log::trace!(
        "Laid out {} glyphs in {} lines, bounds {:?}",
        layout.glyphs.len(),
        lines.len(),
        layout.bounds
    );
    composite(&layout, style, config)
}

fn glyph_masks(
    font: &dyn GlyphSource,
    cache: &GlyphCache,
    ch: char,
    gid: GlyphId,
    scale: f32,
    style: &TextStyle,
) -> Result<Arc<GlyphMasks>, RenderError> {
    let key = GlyphKey::new(ch, style.size, style.outline_thickness);
    cache.get_or_try_insert_with(key, || match font.outline(gid) {
        Some(outline) => rasterize_masks(&outline, scale, style.outline_thickness),
        None => {
            log::trace!("Glyph {gid} for {ch:?} has no outline");
            Ok(GlyphMasks::default())
        }
    })
}

fn missing_masks(
    cache: &GlyphCache,
    ch: char,
    advance: f32,
    scale: f32,
    style: &TextStyle,
    config: &RenderConfig,
    units_per_em: u16,
) -> Result<Arc<GlyphMasks>, RenderError> {
    match config.missing_glyph {
        MissingGlyphPolicy::Skip => Ok(Arc::new(GlyphMasks::default())),
        MissingGlyphPolicy::Tofu => {
            let key = GlyphKey::new(ch, style.size, style.outline_thickness);
            cache.get_or_try_insert_with(key, || {
                let outline = tofu_outline(advance, f32::from(units_per_em));
                rasterize_masks(&outline, scale, style.outline_thickness)
            })
        }
    }
}

/// Hollow box standing in for a glyph the font lacks, in design units
pub fn tofu_outline(advance: f32, units_per_em: f32) -> GlyphOutline {
    let inset = TOFU_INSET_EM * units_per_em;
    let stroke = TOFU_STROKE_EM * units_per_em;
    let (x0, x1) = (inset, advance - inset);
    let (y0, y1) = (0.0, TOFU_HEIGHT_EM * units_per_em);
    if x1 <= x0 {
        return GlyphOutline::default();
    }

    let mut outer = Contour::starting_at(Point::new(x0, y0));
    outer
        .line_to(Point::new(x0, y1))
        .line_to(Point::new(x1, y1))
        .line_to(Point::new(x1, y0));
    let mut contours = vec![outer];

    let (ix0, ix1, iy0, iy1) = (x0 + stroke, x1 - stroke, y0 + stroke, y1 - stroke);
    if ix1 > ix0 && iy1 > iy0 {
        // Opposite winding punches the hole
        let mut inner = Contour::starting_at(Point::new(ix0, iy0));
        inner
            .line_to(Point::new(ix1, iy0))
            .line_to(Point::new(ix1, iy1))
            .line_to(Point::new(ix0, iy1));
        contours.push(inner);
    }
    GlyphOutline { contours }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::types::{Color, FontMetrics};

    /// Square glyphs: 'a' and 'b' are 100x100 unit blocks on a 100 unit advance
    struct Blocks {
        kern_ab: f32,
    }

    impl GlyphSource for Blocks {
        fn metrics(&self) -> FontMetrics {
            FontMetrics {
                units_per_em: 100,
                ascent: 80.0,
                descent: 20.0,
                line_gap: 10.0,
            }
        }

        fn glyph_id(&self, ch: char) -> Option<GlyphId> {
            match ch {
                'a' => Some(1),
                'b' => Some(2),
                ' ' => Some(3),
                _ => None,
            }
        }

        fn advance_width(&self, _gid: GlyphId) -> f32 {
            100.0
        }

        fn kerning(&self, left: GlyphId, right: GlyphId) -> f32 {
            if (left, right) == (1, 2) {
                self.kern_ab
            } else {
                0.0
            }
        }

        fn outline(&self, gid: GlyphId) -> Option<GlyphOutline> {
            if gid == 3 {
                return Some(GlyphOutline::default());
            }
            let mut c = Contour::starting_at(Point::new(0.0, 0.0));
            c.line_to(Point::new(0.0, 50.0))
                .line_to(Point::new(50.0, 50.0))
                .line_to(Point::new(50.0, 0.0));
            Some(GlyphOutline { contours: vec![c] })
        }
    }

    fn style(size: f32, thickness: f32) -> TextStyle {
        TextStyle::new(size, Color::BLACK, Color::WHITE, thickness)
    }

    fn lay(font: &dyn GlyphSource, text: &str, config: &RenderConfig) -> TextLayout {
        let lines = split_lines(text);
        layout_lines(font, &style(20.0, 0.0), &lines, config, &GlyphCache::new()).unwrap()
    }

    #[test]
    fn test_split_lines_variants() {
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a"), vec!["a"]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\rb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b", ""]);
        assert_eq!(split_lines("é\r\n\r"), vec!["é", "", ""]);
    }

    #[test]
    fn test_pen_advances_and_rounds() {
        let font = Blocks { kern_ab: 0.0 };
        let layout = lay(&font, "aab", &RenderConfig::default());
        let xs: Vec<i32> = layout.glyphs.iter().map(|g| g.x).collect();
        // 100 units at 20 px / 100 upem = 20 px each
        assert_eq!(xs, vec![0, 20, 40]);
    }

    #[test]
    fn test_kerning_applies_to_pair() {
        let font = Blocks { kern_ab: -15.0 };
        let layout = lay(&font, "abab", &RenderConfig::default());
        let xs: Vec<i32> = layout.glyphs.iter().map(|g| g.x).collect();
        // a->b kerned by -3 px, b->a not kerned
        assert_eq!(xs, vec![0, 17, 37, 54]);
    }

    #[test]
    fn test_no_kerning_across_missing_glyph() {
        let font = Blocks { kern_ab: -15.0 };
        let layout = lay(&font, "a?b", &RenderConfig::default());
        let xs: Vec<i32> = layout.glyphs.iter().map(|g| g.x).collect();
        // Missing advance is 0.5 em = 10 px
        assert_eq!(xs, vec![0, 20, 30]);
    }

    #[test]
    fn test_baselines_stack_by_line_advance() {
        let font = Blocks { kern_ab: 0.0 };
        let layout = lay(&font, "a\na\r\na", &RenderConfig::default());
        let baselines: Vec<i32> = layout.glyphs.iter().map(|g| g.baseline).collect();
        // ascent 16, line advance 110 units = 22 px
        assert_eq!(baselines, vec![16, 38, 60]);
    }

    #[test]
    fn test_line_box_bounds() {
        let font = Blocks { kern_ab: 0.0 };
        let layout = lay(&font, "ab", &RenderConfig::default());
        assert_eq!(
            layout.bounds,
            Some(PixelBounds {
                x0: 0,
                y0: 0,
                x1: 40,
                y1: 20
            })
        );
    }

    #[test]
    fn test_ink_bounds_follow_masks() {
        let font = Blocks { kern_ab: 0.0 };
        let config = RenderConfig::default().with_bounds(BoundsPolicy::Ink);
        let layout = lay(&font, "ab", &config);
        // Blocks are 10 px squares sitting on the baseline at y 16
        assert_eq!(
            layout.bounds,
            Some(PixelBounds {
                x0: 0,
                y0: 6,
                x1: 30,
                y1: 16
            })
        );
    }

    #[test]
    fn test_ink_bounds_of_blank_text_are_empty() {
        let font = Blocks { kern_ab: 0.0 };
        let config = RenderConfig::default().with_bounds(BoundsPolicy::Ink);
        assert_eq!(lay(&font, "  ", &config).bounds, None);
        // The line box still counts in the default policy
        assert!(lay(&font, "  ", &RenderConfig::default()).bounds.is_some());
    }

    #[test]
    fn test_empty_text_has_no_bounds() {
        let font = Blocks { kern_ab: 0.0 };
        for text in ["", "\n", "\r\n\r\n"] {
            let layout = lay(&font, text, &RenderConfig::default());
            assert!(layout.bounds.is_none(), "{text:?}");
            let surface = composite(&layout, &style(20.0, 0.0), &RenderConfig::default()).unwrap();
            assert_eq!((surface.width(), surface.height()), (0, 0));
            assert!(surface.data().is_empty());
        }
    }

    #[test]
    fn test_thickness_pads_bounds() {
        let font = Blocks { kern_ab: 0.0 };
        let lines = split_lines("a");
        let layout = layout_lines(
            &font,
            &style(20.0, 3.0),
            &lines,
            &RenderConfig::default(),
            &GlyphCache::new(),
        )
        .unwrap();
        let b = layout.bounds.unwrap();
        // Band reach (a 3 px miter) pokes 4 px left of the line box, then
        // ceil(3 / 2) = 2 more
        assert_eq!((b.x0, b.y0, b.x1, b.y1), (-6, -2, 22, 22));
    }

    #[test]
    fn test_line_box_never_shrinks_with_outline() {
        let font = Blocks { kern_ab: -15.0 };
        let lines = split_lines("ab");
        let config = RenderConfig::default();
        let mut prev: Option<PixelBounds> = None;
        for step in 0..240 {
            let size = 4.0 + step as f32 * 0.25;
            let layout =
                layout_lines(&font, &style(size, 2.5), &lines, &config, &GlyphCache::new()).unwrap();
            let b = layout.bounds.unwrap();
            if let Some(p) = prev {
                assert!(b.width() >= p.width(), "width at {size}");
                assert!(b.height() >= p.height(), "height at {size}");
            }
            prev = Some(b);
        }
    }

    #[test]
    fn test_tofu_policy_draws_box() {
        let font = Blocks { kern_ab: 0.0 };
        let skip = lay(&font, "?", &RenderConfig::default());
        assert!(skip.glyphs[0].masks.fill.is_empty());

        let config = RenderConfig::default().with_missing_glyph(MissingGlyphPolicy::Tofu);
        let tofu = lay(&font, "?", &config);
        let fill = &tofu.glyphs[0].masks.fill;
        assert!(!fill.is_empty());
        // 0.7 em tall at 20 px
        assert_eq!(fill.height, 14);
    }

    #[test]
    fn test_tofu_outline_is_hollow() {
        let outline = tofu_outline(500.0, 1000.0);
        assert_eq!(outline.contours.len(), 2);
        let masks = rasterize_masks(&outline, 0.1, 0.0).unwrap();
        let fill = &masks.fill;
        // Center of the box is open, the left side is solid
        assert_eq!(fill.coverage(fill.width / 2, fill.height / 2), 0);
        assert_eq!(fill.coverage(0, fill.height / 2), 255);
    }

    #[test]
    fn test_surface_limit_is_enforced() {
        let font = Blocks { kern_ab: 0.0 };
        let config = RenderConfig::default().with_max_surface_side(30);
        let lines = split_lines("aa");
        let err = layout_and_composite(&font, &style(20.0, 0.0), &lines, &config, &GlyphCache::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::SurfaceTooLarge { width: 40, .. }));
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        let font = Blocks { kern_ab: 0.0 };
        let lines = split_lines("a");
        for size in [0.0, -1.0, f32::NAN] {
            let err = layout_lines(
                &font,
                &style(size, 0.0),
                &lines,
                &RenderConfig::default(),
                &GlyphCache::new(),
            )
            .unwrap_err();
            assert!(matches!(err, RenderError::InvalidRequest(_)));
        }
    }

    #[test]
    fn test_fill_paints_over_neighbour_outline() {
        let font = Blocks { kern_ab: -60.0 };
        let lines = split_lines("ab");
        let config = RenderConfig::default();
        let layout = layout_lines(&font, &style(20.0, 4.0), &lines, &config, &GlyphCache::new()).unwrap();
        let b = layout.bounds.unwrap();
        let surface = composite(&layout, &style(20.0, 4.0), &config).unwrap();
        // 'b' sits at x 8; its band overlaps 'a' fill at x 6..10. Fill wins.
        let (x, y) = ((7 - b.x0) as u32, (12 - b.y0) as u32);
        assert_eq!(surface.pixel(x, y), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_zero_thickness_never_paints_outline_color() {
        let font = Blocks { kern_ab: 0.0 };
        let lines = split_lines("ab");
        let surface = layout_and_composite(
            &font,
            &TextStyle::new(20.0, Color::rgb(0, 0, 255), Color::rgb(255, 0, 0), 0.0),
            &lines,
            &RenderConfig::default(),
            &GlyphCache::new(),
        )
        .unwrap();
        assert!(surface.data().chunks(4).all(|px| px[0] == 0));
    }
}
