// this_file: crates/glint-render/src/batch.rs

//! Batch rendering: one font, one glyph cache, many texts.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use glint_core::config::RenderConfig;
use glint_core::error::RenderError;
use glint_core::traits::GlyphSource;
use glint_core::types::{Surface, TextStyle};
use glint_core::Result;
use glint_fontdb::FontStore;
use glint_raster::GlyphCache;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::layout::{layout_and_composite, split_lines};

/// Progress reported after each finished text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
}

/// Renders many texts with one font.
///
/// Texts are taken `batch_chunk_size` at a time; a chunk runs on the rayon
/// pool when the config allows it, and the next chunk starts only after the
/// previous one finished. Output order always matches input order, and each
/// surface is byte-identical to a single render of the same text.
#[derive(Debug, Clone, Default)]
pub struct BatchRenderer {
    config: RenderConfig,
}

impl BatchRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Loads the font at `path` through `store`, then renders every text.
    ///
    /// A font that fails to load fails the whole batch.
    pub fn render_many<S>(
        &self,
        store: &FontStore,
        path: impl AsRef<Path>,
        texts: &[S],
        style: &TextStyle,
    ) -> Result<Vec<Surface>>
    where
        S: AsRef<str> + Sync,
    {
        style.validate()?;
        let font = store.get_font(path)?;
        let cache = GlyphCache::new();
        let surfaces = self.render_batch(font.as_ref(), texts, style, &cache)?;

        let stats = cache.stats();
        log::debug!(
            "Batch of {} texts: {} cached glyphs, {} hits, {} misses",
            texts.len(),
            stats.size,
            stats.hits,
            stats.misses
        );
        Ok(surfaces)
    }

    /// Renders every text with an already loaded font and a caller-owned cache.
    pub fn render_batch<S>(
        &self,
        font: &dyn GlyphSource,
        texts: &[S],
        style: &TextStyle,
        cache: &GlyphCache,
    ) -> std::result::Result<Vec<Surface>, RenderError>
    where
        S: AsRef<str> + Sync,
    {
        self.render_batch_internal(font, texts, style, cache, None)
    }

    /// Like [`Self::render_batch`], calling `progress` after each text.
    ///
    /// With parallel rendering the callback runs on pool threads, and
    /// updates from one chunk may arrive out of order.
    pub fn render_batch_with_progress<S, F>(
        &self,
        font: &dyn GlyphSource,
        texts: &[S],
        style: &TextStyle,
        cache: &GlyphCache,
        progress: F,
    ) -> std::result::Result<Vec<Surface>, RenderError>
    where
        S: AsRef<str> + Sync,
        F: Fn(ProgressUpdate) + Send + Sync,
    {
        self.render_batch_internal(font, texts, style, cache, Some(&progress))
    }

    fn render_batch_internal<S>(
        &self,
        font: &dyn GlyphSource,
        texts: &[S],
        style: &TextStyle,
        cache: &GlyphCache,
        progress: Option<&(dyn Fn(ProgressUpdate) + Send + Sync)>,
    ) -> std::result::Result<Vec<Surface>, RenderError>
    where
        S: AsRef<str> + Sync,
    {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let total = texts.len();
        let counter = AtomicUsize::new(0);
        let render_one = |text: &S| -> std::result::Result<Surface, RenderError> {
            let lines = split_lines(text.as_ref());
            let surface = layout_and_composite(font, style, &lines, &self.config, cache)?;
            if let Some(callback) = progress {
                let completed = counter.fetch_add(1, Ordering::SeqCst) + 1;
                callback(ProgressUpdate { completed, total });
            }
            Ok(surface)
        };

        let mut surfaces = Vec::with_capacity(total);
        for chunk in texts.chunks(self.config.batch_chunk_size.max(1)) {
            let rendered: std::result::Result<Vec<Surface>, RenderError> = if self.parallel() {
                render_chunk_parallel(chunk, &render_one)
            } else {
                chunk.iter().map(&render_one).collect()
            };
            surfaces.extend(rendered?);
        }
        Ok(surfaces)
    }

    fn parallel(&self) -> bool {
        cfg!(feature = "parallel") && self.config.parallel
    }
}

#[cfg(feature = "parallel")]
fn render_chunk_parallel<S, F>(chunk: &[S], render_one: &F) -> std::result::Result<Vec<Surface>, RenderError>
where
    S: Sync,
    F: Fn(&S) -> std::result::Result<Surface, RenderError> + Sync,
{
    chunk.par_iter().map(render_one).collect()
}

#[cfg(not(feature = "parallel"))]
fn render_chunk_parallel<S, F>(chunk: &[S], render_one: &F) -> std::result::Result<Vec<Surface>, RenderError>
where
    S: Sync,
    F: Fn(&S) -> std::result::Result<Surface, RenderError> + Sync,
{
    chunk.iter().map(render_one).collect()
}
