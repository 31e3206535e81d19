//! Glint - text to pixels
//!
//! Glint renders text strings into straight-alpha RGBA surfaces using a
//! font file, a fill color and an optional stroked outline, and writes
//! surfaces out as PNG.
//!
//! The pipeline:
//! 1. Font loading and caching ([`fontdb`])
//! 2. Glyph rasterization and outline bands ([`raster`])
//! 3. Line layout and compositing ([`render`])
//! 4. PNG export ([`export`])
//!
//! # Example
//!
//! ```no_run
//! use glint::{Color, Renderer};
//!
//! let renderer = Renderer::new();
//! let surface = renderer.render_text("font.ttf", 48.0, "Hello", Color::BLACK, Color::WHITE, 2.0)?;
//! glint::save_png("hello.png", &surface)?;
//! # Ok::<(), glint::GlintError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default): batch renders run on the rayon pool

use std::path::Path;

pub use glint_core::{
    config, error, traits, types, BoundsPolicy, Color, EncodeError, FontLoadError, GlintError,
    MissingGlyphPolicy, RenderConfig, RenderError, RenderRequest, Result, Surface, TextStyle,
};
pub use glint_export as export;
pub use glint_export::{encode_png, save_png, PngExporter};
pub use glint_fontdb as fontdb;
pub use glint_fontdb::{Font, FontStore};
pub use glint_raster as raster;
pub use glint_render as render;

use glint_render::BatchRenderer;

/// Common imports for typical usage
pub mod prelude {
    pub use glint_core::{
        error::{GlintError, Result},
        traits::{Exporter, GlyphSource},
        Color, RenderConfig, RenderRequest, Surface, TextStyle,
    };

    pub use crate::Renderer;
}

/// Entry point: a font store plus render settings
///
/// Fonts are parsed once per path and kept until [`Renderer::clear_cache`].
/// A renderer is `Send + Sync` and meant to be shared.
#[derive(Default)]
pub struct Renderer {
    store: FontStore,
    batch: BatchRenderer,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer configured from `GLINT_*` environment variables
    pub fn from_env() -> Self {
        Self::with_config(RenderConfig::from_env())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            store: FontStore::new(),
            batch: BatchRenderer::new(config),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        self.batch.config()
    }

    pub fn store(&self) -> &FontStore {
        &self.store
    }

    /// Drops every cached font; the next render reparses from disk
    pub fn clear_cache(&self) {
        self.store.clear();
    }

    /// Render one text with the font at `font_path`
    ///
    /// # Errors
    /// - [`GlintError::Render`] for a non-positive size, a negative
    ///   thickness or a surface over the configured size limit
    /// - [`GlintError::FontLoad`] when the font cannot be read or parsed
    pub fn render_text(
        &self,
        font_path: impl AsRef<Path>,
        size: f32,
        text: &str,
        fill: Color,
        outline: Color,
        outline_thickness: f32,
    ) -> Result<Surface> {
        let style = TextStyle::new(size, fill, outline, outline_thickness);
        self.render_styled(font_path.as_ref(), text, &style)
    }

    pub fn render_request(&self, request: &RenderRequest) -> Result<Surface> {
        self.render_styled(&request.font_path, &request.text, &request.style())
    }

    /// Render many texts with one font, in input order
    ///
    /// The font is loaded once; a font failure fails the whole call.
    pub fn render_texts<S>(
        &self,
        font_path: impl AsRef<Path>,
        size: f32,
        texts: &[S],
        fill: Color,
        outline: Color,
        outline_thickness: f32,
    ) -> Result<Vec<Surface>>
    where
        S: AsRef<str> + Sync,
    {
        let style = TextStyle::new(size, fill, outline, outline_thickness);
        self.batch.render_many(&self.store, font_path, texts, &style)
    }

    fn render_styled(&self, font_path: &Path, text: &str, style: &TextStyle) -> Result<Surface> {
        style.validate()?;
        let font = self.store.get_font(font_path)?;
        let surface = glint_render::render_text(font.as_ref(), text, style, self.config())?;
        log::debug!(
            "Rendered {} chars at {} px into {}x{}",
            text.chars().count(),
            style.size,
            surface.width(),
            surface.height()
        );
        Ok(surface)
    }
}

/// Render one text with a fresh [`Renderer`]
///
/// Each call parses the font again; keep a [`Renderer`] around to reuse it.
pub fn render_text(
    font_path: impl AsRef<Path>,
    size: f32,
    text: &str,
    fill: Color,
    outline: Color,
    outline_thickness: f32,
) -> Result<Surface> {
    Renderer::new().render_text(font_path, size, text, fill, outline, outline_thickness)
}

/// Render many texts with a fresh [`Renderer`], loading the font once
pub fn render_texts<S>(
    font_path: impl AsRef<Path>,
    size: f32,
    texts: &[S],
    fill: Color,
    outline: Color,
    outline_thickness: f32,
) -> Result<Vec<Surface>>
where
    S: AsRef<str> + Sync,
{
    Renderer::new().render_texts(font_path, size, texts, fill, outline, outline_thickness)
}
