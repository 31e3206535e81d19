//! Glint Core: the shared vocabulary of the text-to-pixels pipeline
//!
//! Every Glint crate speaks through the types defined here. Fonts hand out
//! [`types::GlyphOutline`]s, the rasterizer turns them into
//! [`types::CoverageMask`]s, the compositor paints masks into a
//! [`types::Surface`], and exporters turn surfaces into bytes.
//!
//! ## The Flow
//!
//! 1. **Font Store** - A font file becomes a read-only [`GlyphSource`]
//! 2. **Rasterizer** - Outlines become anti-aliased coverage masks
//! 3. **Outline Generator** - Outlines grow a border band mask
//! 4. **Compositor** - Masks are positioned and blended into a surface
//! 5. **Export** - Surfaces become PNG bytes
//!
//! ## Where Things Live
//!
//! - [`error`] - One error enum per concern, folded into [`GlintError`]
//! - [`traits`] - [`GlyphSource`] and [`Exporter`], the seams between crates
//! - [`config`] - [`RenderConfig`], the knobs a caller may turn

pub mod config;
pub mod error;
pub mod traits;

pub use config::{BoundsPolicy, MissingGlyphPolicy, RenderConfig};
pub use error::{EncodeError, FontLoadError, GlintError, GlyphMissingError, RenderError, Result};
pub use traits::{Exporter, GlyphSource};
pub use types::{
    Color, Contour, CoverageMask, FontMetrics, GlyphId, GlyphOutline, PathCommand, Point,
    RenderRequest, Surface, TextStyle,
};

/// The data structures that flow between pipeline stages
pub mod types {
    use crate::error::{EncodeError, RenderError};
    use std::path::PathBuf;

    /// Unique identifier for a glyph within a font
    pub type GlyphId = u32;

    /// A position in design units or pixels, depending on the stage
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct Point {
        pub x: f32,
        pub y: f32,
    }

    impl Point {
        pub const fn new(x: f32, y: f32) -> Self {
            Self { x, y }
        }
    }

    /// One drawing instruction of a contour
    ///
    /// Control points come before the end point, as in every font format.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum PathCommand {
        MoveTo(Point),
        LineTo(Point),
        QuadTo(Point, Point),
        CubicTo(Point, Point, Point),
    }

    impl PathCommand {
        /// The point the pen rests on after this command
        pub fn end(&self) -> Point {
            match *self {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p,
                PathCommand::QuadTo(_, p) => p,
                PathCommand::CubicTo(_, _, p) => p,
            }
        }
    }

    /// A closed loop of commands
    ///
    /// The first command is always a `MoveTo`; closing back to it is implicit.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Contour {
        pub commands: Vec<PathCommand>,
    }

    impl Contour {
        /// Start a new contour at `p`
        pub fn starting_at(p: Point) -> Self {
            Self {
                commands: vec![PathCommand::MoveTo(p)],
            }
        }

        pub fn line_to(&mut self, p: Point) -> &mut Self {
            self.commands.push(PathCommand::LineTo(p));
            self
        }

        pub fn quad_to(&mut self, c: Point, p: Point) -> &mut Self {
            self.commands.push(PathCommand::QuadTo(c, p));
            self
        }

        pub fn cubic_to(&mut self, c0: Point, c1: Point, p: Point) -> &mut Self {
            self.commands.push(PathCommand::CubicTo(c0, c1, p));
            self
        }

        /// Where the contour begins (and implicitly ends)
        pub fn start(&self) -> Option<Point> {
            self.commands.first().map(PathCommand::end)
        }
    }

    /// A glyph's shape in font design units, y pointing up
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct GlyphOutline {
        pub contours: Vec<Contour>,
    }

    impl GlyphOutline {
        /// True when there is nothing to draw (space, empty glyph)
        pub fn is_empty(&self) -> bool {
            self.contours.iter().all(|c| c.commands.len() < 2)
        }

        /// Control-box bounds as `(min, max)`, or `None` when empty
        ///
        /// Includes off-curve points, so it may be slightly larger than the ink.
        pub fn bounds(&self) -> Option<(Point, Point)> {
            let mut points = self.contours.iter().flat_map(|c| {
                c.commands.iter().flat_map(|cmd| match *cmd {
                    PathCommand::MoveTo(p) | PathCommand::LineTo(p) => vec![p],
                    PathCommand::QuadTo(a, p) => vec![a, p],
                    PathCommand::CubicTo(a, b, p) => vec![a, b, p],
                })
            });
            let first = points.next()?;
            let (min, max) = points.fold((first, first), |(lo, hi), p| {
                (
                    Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                    Point::new(hi.x.max(p.x), hi.y.max(p.y)),
                )
            });
            Some((min, max))
        }
    }

    /// Per-pixel coverage for one glyph at one size
    ///
    /// `left` and `top` place the mask's top-left pixel relative to the pen
    /// position on the baseline, in y-down pixel coordinates: a glyph that
    /// rises 70 px above the baseline has `top == -70`.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct CoverageMask {
        pub width: u32,
        pub height: u32,
        pub left: i32,
        pub top: i32,
        pub data: Vec<u8>,
    }

    impl CoverageMask {
        /// A mask with no pixels
        pub fn empty() -> Self {
            Self::default()
        }

        pub fn is_empty(&self) -> bool {
            self.width == 0 || self.height == 0
        }

        /// Coverage at mask-local `(x, y)`, zero outside the mask
        pub fn coverage(&self, x: u32, y: u32) -> u8 {
            if x >= self.width || y >= self.height {
                return 0;
            }
            self.data[(y * self.width + x) as usize]
        }
    }

    /// Opaque RGB color; alpha always comes from coverage
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Color {
        pub r: u8,
        pub g: u8,
        pub b: u8,
    }

    impl Color {
        pub const BLACK: Color = Color::rgb(0, 0, 0);
        pub const WHITE: Color = Color::rgb(255, 255, 255);

        pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
            Self { r, g, b }
        }
    }

    /// A finished render: straight-alpha RGBA8, rows top to bottom
    ///
    /// The buffer length is always `width * height * 4`; the constructors
    /// are the only way in, so the invariant cannot be broken from outside.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct Surface {
        width: u32,
        height: u32,
        data: Vec<u8>,
    }

    impl Surface {
        /// A fully transparent surface
        pub fn new(width: u32, height: u32) -> Self {
            let len = width as usize * height as usize * 4;
            Self {
                width,
                height,
                data: vec![0; len],
            }
        }

        /// The 0x0 surface produced by text with no characters
        pub fn empty() -> Self {
            Self::default()
        }

        /// Wrap an existing RGBA buffer, checking its length
        pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EncodeError> {
            let expected = width as usize * height as usize * 4;
            if data.len() != expected {
                return Err(EncodeError::BufferMismatch {
                    expected,
                    actual: data.len(),
                });
            }
            Ok(Self {
                width,
                height,
                data,
            })
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn is_empty(&self) -> bool {
            self.width == 0 || self.height == 0
        }

        pub fn data(&self) -> &[u8] {
            &self.data
        }

        /// Mutable pixel bytes; the length cannot change through a slice
        pub fn data_mut(&mut self) -> &mut [u8] {
            &mut self.data
        }

        /// RGBA at `(x, y)`, or `None` outside the surface
        pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
            if x >= self.width || y >= self.height {
                return None;
            }
            let i = (y as usize * self.width as usize + x as usize) * 4;
            Some([
                self.data[i],
                self.data[i + 1],
                self.data[i + 2],
                self.data[i + 3],
            ])
        }

        pub fn into_data(self) -> Vec<u8> {
            self.data
        }
    }

    /// Vertical metrics in design units; `descent` is a positive magnitude
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct FontMetrics {
        pub units_per_em: u16,
        pub ascent: f32,
        pub descent: f32,
        pub line_gap: f32,
    }

    impl FontMetrics {
        /// Design units to pixels at `size`
        pub fn scale(&self, size: f32) -> f32 {
            size / f32::from(self.units_per_em.max(1))
        }

        /// Baseline-to-baseline distance in design units
        pub fn line_advance(&self) -> f32 {
            self.ascent + self.descent + self.line_gap
        }
    }

    /// Everything about a render except the text and the font
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct TextStyle {
        pub size: f32,
        pub fill: Color,
        pub outline: Color,
        pub outline_thickness: f32,
    }

    impl TextStyle {
        pub fn new(size: f32, fill: Color, outline: Color, outline_thickness: f32) -> Self {
            Self {
                size,
                fill,
                outline,
                outline_thickness,
            }
        }

        /// Reject sizes and thicknesses no render can honour
        pub fn validate(&self) -> Result<(), RenderError> {
            if !self.size.is_finite() || self.size <= 0.0 {
                return Err(RenderError::InvalidRequest(format!(
                    "font size must be positive and finite, got {}",
                    self.size
                )));
            }
            if !self.outline_thickness.is_finite() || self.outline_thickness < 0.0 {
                return Err(RenderError::InvalidRequest(format!(
                    "outline thickness must be non-negative and finite, got {}",
                    self.outline_thickness
                )));
            }
            Ok(())
        }

        pub fn has_outline(&self) -> bool {
            self.outline_thickness > 0.0
        }
    }

    /// One `render_text` call, spelled out
    #[derive(Debug, Clone, PartialEq)]
    pub struct RenderRequest {
        pub font_path: PathBuf,
        pub size: f32,
        pub text: String,
        pub fill: Color,
        pub outline: Color,
        pub outline_thickness: f32,
    }

    impl RenderRequest {
        pub fn new(font_path: impl Into<PathBuf>, size: f32, text: impl Into<String>) -> Self {
            Self {
                font_path: font_path.into(),
                size,
                text: text.into(),
                fill: Color::BLACK,
                outline: Color::WHITE,
                outline_thickness: 0.0,
            }
        }

        pub fn with_fill(mut self, fill: Color) -> Self {
            self.fill = fill;
            self
        }

        pub fn with_outline(mut self, color: Color, thickness: f32) -> Self {
            self.outline = color;
            self.outline_thickness = thickness;
            self
        }

        pub fn style(&self) -> TextStyle {
            TextStyle::new(self.size, self.fill, self.outline, self.outline_thickness)
        }

        pub fn validate(&self) -> Result<(), RenderError> {
            self.style().validate()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_new_is_transparent_and_sized() {
        let s = Surface::new(3, 2);
        assert_eq!(s.data().len(), 3 * 2 * 4);
        assert!(s.data().iter().all(|&b| b == 0));
        assert_eq!(s.pixel(2, 1), Some([0, 0, 0, 0]));
        assert_eq!(s.pixel(3, 0), None);
    }

    #[test]
    fn surface_from_rgba_checks_length() {
        assert!(Surface::from_rgba(2, 2, vec![0; 16]).is_ok());
        match Surface::from_rgba(2, 2, vec![0; 15]) {
            Err(EncodeError::BufferMismatch { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 15);
            }
            other => panic!("expected BufferMismatch, got {other:?}"),
        }
    }

    #[test]
    fn empty_surface_has_no_bytes() {
        let s = Surface::empty();
        assert!(s.is_empty());
        assert_eq!((s.width(), s.height()), (0, 0));
        assert!(s.into_data().is_empty());
    }

    #[test]
    fn outline_bounds_cover_control_points() {
        let mut c = Contour::starting_at(Point::new(0.0, 0.0));
        c.quad_to(Point::new(50.0, 120.0), Point::new(100.0, 0.0));
        let outline = GlyphOutline { contours: vec![c] };
        let (min, max) = outline.bounds().unwrap();
        assert_eq!(min, Point::new(0.0, 0.0));
        assert_eq!(max, Point::new(100.0, 120.0));
        assert!(!outline.is_empty());
    }

    #[test]
    fn empty_outline_has_no_bounds() {
        let outline = GlyphOutline::default();
        assert!(outline.is_empty());
        assert!(outline.bounds().is_none());
    }

    #[test]
    fn style_validation() {
        assert!(TextStyle::new(12.0, Color::BLACK, Color::WHITE, 0.0)
            .validate()
            .is_ok());
        assert!(TextStyle::new(0.0, Color::BLACK, Color::WHITE, 0.0)
            .validate()
            .is_err());
        assert!(TextStyle::new(f32::NAN, Color::BLACK, Color::WHITE, 0.0)
            .validate()
            .is_err());
        assert!(TextStyle::new(12.0, Color::BLACK, Color::WHITE, -1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn metrics_scale() {
        let m = FontMetrics {
            units_per_em: 1000,
            ascent: 800.0,
            descent: 200.0,
            line_gap: 0.0,
        };
        assert_eq!(m.scale(100.0), 0.1);
        assert_eq!(m.line_advance(), 1000.0);
    }

    #[test]
    fn request_builder_carries_style() {
        let req = RenderRequest::new("font.ttf", 24.0, "hi")
            .with_fill(Color::rgb(1, 2, 3))
            .with_outline(Color::rgb(4, 5, 6), 2.0);
        let style = req.style();
        assert_eq!(style.fill, Color::rgb(1, 2, 3));
        assert_eq!(style.outline, Color::rgb(4, 5, 6));
        assert!(style.has_outline());
        assert!(req.validate().is_ok());
    }
}
