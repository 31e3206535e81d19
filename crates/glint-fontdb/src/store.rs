// this_file: crates/glint-fontdb/src/store.rs

//! Path-keyed font cache with claim-once parsing.
//!
//! The store is an explicit object: callers own it, share it by reference,
//! and clear it when fonts on disk may have changed. There is no
//! process-wide instance.

use dashmap::DashMap;
use glint_core::error::FontLoadError;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::Font;

type Slot = Arc<OnceCell<Arc<Font>>>;

/// Font store statistics for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Fonts currently cached.
    pub entries: usize,
    /// Parses performed since creation, failed ones included.
    pub loads: usize,
}

/// Caches parsed fonts by path.
///
/// The first caller for a path claims its slot and parses; concurrent
/// callers for the same path wait on that slot instead of parsing again.
/// A failed parse leaves no entry behind, so the next call retries.
#[derive(Default)]
pub struct FontStore {
    entries: DashMap<PathBuf, Slot>,
    loads: AtomicUsize,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the font at `path`, parsing it on first use.
    ///
    /// The key is the path exactly as given; `a/../font.ttf` and
    /// `font.ttf` are different entries.
    ///
    /// # Errors
    /// Returns error if:
    /// - File not found or unreadable
    /// - File exceeds [`crate::MAX_FONT_SIZE`]
    /// - Bytes are not a recognized font format, or are malformed
    pub fn get_font(&self, path: impl AsRef<Path>) -> Result<Arc<Font>, FontLoadError> {
        let path = path.as_ref();

        // Fast path: already parsed
        if let Some(font) = self.entries.get(path).and_then(|slot| slot.get().cloned()) {
            log::debug!("Font cache hit: {}", path.display());
            return Ok(font);
        }

        // Claim (or join) the slot; the shard lock is released before parsing
        let slot: Slot = Arc::clone(
            self.entries
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );

        let result = slot.get_or_try_init(|| {
            self.loads.fetch_add(1, Ordering::Relaxed);
            log::debug!("Font cache miss, parsing {}", path.display());
            Font::from_file(path).map(Arc::new)
        });

        match result {
            Ok(font) => Ok(Arc::clone(font)),
            Err(e) => {
                self.entries
                    .remove_if(path, |_, s| Arc::ptr_eq(s, &slot) && s.get().is_none());
                Err(e)
            }
        }
    }

    /// True when `path` is parsed and cached
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries
            .get(path.as_ref())
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of cached fonts
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached font.
    ///
    /// Fonts already handed out stay alive until their last `Arc` goes.
    pub fn clear(&self) {
        let dropped = self.entries.len();
        self.entries.clear();
        log::debug!("Font store cleared ({dropped} entries)");
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.len(),
            loads: self.loads.load(Ordering::Relaxed),
        }
    }
}
