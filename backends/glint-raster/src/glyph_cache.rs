//! Glyph mask cache for batch rendering
//!
//! The same character at the same size and outline thickness always
//! rasterizes to the same masks, so a batch keeps one cache and renders each
//! distinct (character, size, thickness) once. Masks are shared by `Arc`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glint_core::types::CoverageMask;
use parking_lot::RwLock;

use crate::rasterizer::Extent;

/// Cache key: what was drawn, how big, how thick a border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub ch: char,
    /// `f32::to_bits` of the pixel size
    pub size: u32,
    /// `f32::to_bits` of the outline thickness
    pub thickness: u32,
}

impl GlyphKey {
    pub fn new(ch: char, size: f32, thickness: f32) -> Self {
        Self {
            ch,
            size: size.to_bits(),
            thickness: thickness.to_bits(),
        }
    }
}

/// Fill and border coverage for one glyph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphMasks {
    pub fill: CoverageMask,
    /// Empty when the thickness is zero
    pub outline: CoverageMask,
    /// Box holding both masks; `None` for a glyph without points
    pub extent: Option<Extent>,
}

/// Shared, thread-safe glyph mask cache
#[derive(Default)]
pub struct GlyphCache {
    entries: RwLock<HashMap<GlyphKey, Arc<GlyphMasks>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get cached masks if available
    pub fn get(&self, key: &GlyphKey) -> Option<Arc<GlyphMasks>> {
        let found = self.entries.read().get(key).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Returns the cached masks, rendering them with `render` on a miss
    ///
    /// Rendering happens outside the lock. Two threads missing the same key
    /// may both render; the first insert wins and both get the same `Arc`.
    pub fn get_or_try_insert_with<E, F>(&self, key: GlyphKey, render: F) -> Result<Arc<GlyphMasks>, E>
    where
        F: FnOnce() -> Result<GlyphMasks, E>,
    {
        if let Some(masks) = self.get(&key) {
            return Ok(masks);
        }
        let masks = Arc::new(render()?);
        let mut entries = self.entries.write();
        Ok(Arc::clone(entries.entry(key).or_insert(masks)))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn stats(&self) -> GlyphCacheStats {
        GlyphCacheStats {
            size: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Glyph cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphCacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
}

impl GlyphCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
