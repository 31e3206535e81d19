//! Where fonts come to life: loading and caching for Glint
//!
//! A [`Font`] is parsed once, never mutated, and shared behind an `Arc` by
//! every render that names its path. The [`FontStore`] guarantees the
//! "once": concurrent first requests for a path share a single parse.
//!
//! ## Memory Management
//!
//! Fonts store their raw bytes and create a `read_fonts::FontRef` on demand
//! for table lookups. Advances are read once at load and character lookups
//! are memoized; outlines are drawn per call and left to the render side's
//! glyph cache. Collections (`.ttc`) always open face 0.
//!
//! ## Formats
//!
//! TrueType (`glyf`) and OpenType CFF faces load through the same code;
//! [`format::FontFormat::sniff`] decides from magic bytes, and skrifa's
//! outline loader picks the matching glyph decoder.

use std::fs;
use std::path::Path;

use dashmap::DashMap;
use glint_core::error::FontLoadError;
use glint_core::traits::GlyphSource;
use glint_core::types::{FontMetrics, GlyphId, GlyphOutline};
use read_fonts::tables::kern::{Subtable, SubtableKind};
use read_fonts::types::Tag;
use read_fonts::{FontRef as ReadFontRef, TableProvider};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::DrawSettings;
use skrifa::MetadataProvider;

pub mod format;
mod pen;
pub mod store;

pub use format::FontFormat;
pub use store::{FontStore, StoreStats};

/// Maximum font file size (50MB) to prevent resource exhaustion.
pub const MAX_FONT_SIZE: u64 = 50 * 1024 * 1024;

/// Tables every face must carry, whatever its outline format
const REQUIRED_TABLES: [&[u8; 4]; 4] = [b"head", b"hhea", b"hmtx", b"cmap"];

/// OpenType `kern` coverage bits
const KERN_MINIMUM: u16 = 0x0002;
const KERN_OVERRIDE: u16 = 0x0008;

/// A parsed, read-only font face
pub struct Font {
    data: Vec<u8>,
    format: FontFormat,
    metrics: FontMetrics,
    num_glyphs: u32,
    advances: Vec<Option<u16>>,
    has_kern: bool,
    glyph_ids: DashMap<char, Option<GlyphId>>,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("format", &self.format)
            .field("metrics", &self.metrics)
            .field("num_glyphs", &self.num_glyphs)
            .field("has_kern", &self.has_kern)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Font {
    /// Opens a font file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontLoadError> {
        let path = path.as_ref();
        let meta = fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FontLoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => FontLoadError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        if meta.len() > MAX_FONT_SIZE {
            return Err(FontLoadError::TooLarge {
                path: path.to_path_buf(),
                size: meta.len(),
                max: MAX_FONT_SIZE,
            });
        }

        let data = fs::read(path).map_err(|e| FontLoadError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(data, path)
    }

    /// Turns raw font bytes into a face
    pub fn from_data(data: Vec<u8>) -> Result<Self, FontLoadError> {
        Self::parse(data, Path::new("<memory>"))
    }

    fn parse(data: Vec<u8>, path: &Path) -> Result<Self, FontLoadError> {
        let malformed = |reason: String| FontLoadError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let format = FontFormat::sniff(&data).ok_or_else(|| FontLoadError::UnrecognizedFormat {
            path: path.to_path_buf(),
        })?;

        let font = ReadFontRef::from_index(&data, 0)
            .map_err(|e| malformed(format!("failed to parse font: {e}")))?;

        for tag in REQUIRED_TABLES {
            if font.table_data(Tag::new(tag)).is_none() {
                return Err(malformed(format!(
                    "missing required table '{}'",
                    Tag::new(tag)
                )));
            }
        }
        if !format
            .outline_tables()
            .iter()
            .any(|tag| font.table_data(Tag::new(tag)).is_some())
        {
            return Err(malformed(format!("no outline table for {format:?}")));
        }

        let head = font
            .head()
            .map_err(|e| malformed(format!("failed to read head table: {e}")))?;
        let units_per_em = head.units_per_em();
        if units_per_em == 0 {
            return Err(malformed("unitsPerEm is zero".to_string()));
        }

        let metrics = Self::read_metrics(&font, units_per_em)
            .ok_or_else(|| malformed("no usable OS/2 or hhea metrics".to_string()))?;

        let num_glyphs = font
            .maxp()
            .map(|maxp| u32::from(maxp.num_glyphs()))
            .map_err(|e| malformed(format!("failed to read maxp table: {e}")))?;

        let hmtx = font
            .hmtx()
            .map_err(|e| malformed(format!("failed to read hmtx table: {e}")))?;
        let advances: Vec<Option<u16>> = (0..num_glyphs)
            .map(|gid| hmtx.advance(read_fonts::types::GlyphId::new(gid)))
            .collect();

        let has_kern = match font.kern() {
            Ok(_) => true,
            Err(read_fonts::ReadError::TableIsMissing(_)) => false,
            Err(e) => {
                log::warn!("Ignoring unreadable kern table in {}: {e}", path.display());
                false
            }
        };

        log::debug!(
            "Parsed {} as {:?}{}: {} glyphs, upem {}, kern {}",
            path.display(),
            format,
            if format::is_collection(&data) { " (collection face 0)" } else { "" },
            num_glyphs,
            units_per_em,
            if has_kern { "present" } else { "absent" }
        );

        Ok(Font {
            data,
            format,
            metrics,
            num_glyphs,
            advances,
            has_kern,
            glyph_ids: DashMap::new(),
        })
    }

    /// OS/2 typo metrics when present, hhea otherwise
    fn read_metrics(font: &ReadFontRef<'_>, units_per_em: u16) -> Option<FontMetrics> {
        let (ascent, descent, line_gap) = font
            .os2()
            .ok()
            .map(|os2| {
                (
                    os2.s_typo_ascender(),
                    os2.s_typo_descender(),
                    os2.s_typo_line_gap(),
                )
            })
            .filter(|&(a, d, _)| a != 0 || d != 0)
            .or_else(|| {
                font.hhea().ok().map(|hhea| {
                    (
                        hhea.ascender().to_i16(),
                        hhea.descender().to_i16(),
                        hhea.line_gap().to_i16(),
                    )
                })
            })?;

        Some(FontMetrics {
            units_per_em,
            ascent: f32::from(ascent),
            descent: f32::from(descent).abs(),
            line_gap: f32::from(line_gap.max(0)),
        })
    }

    /// Creates a FontRef on-demand for parsing operations
    fn font_ref(&self) -> Option<ReadFontRef<'_>> {
        ReadFontRef::from_index(&self.data, 0).ok()
    }

    pub fn format(&self) -> FontFormat {
        self.format
    }

    pub fn num_glyphs(&self) -> u32 {
        self.num_glyphs
    }

    /// Horizontal adjustment from the `kern` table, in design units
    ///
    /// Walks the horizontal, non-minimum, non-cross-stream subtables in
    /// order. Values add up unless a subtable sets the override bit.
    /// State-machine subtables are contextual shaping and are skipped.
    fn kern_value(&self, left: GlyphId, right: GlyphId) -> Option<i32> {
        let kern = self.font_ref()?.kern().ok()?;
        let (left, right) = (
            read_fonts::types::GlyphId::new(left),
            read_fonts::types::GlyphId::new(right),
        );

        let mut total: Option<i32> = None;
        for subtable in kern.subtables() {
            let subtable = match subtable {
                Ok(subtable) => subtable,
                Err(e) => {
                    log::trace!("Stopping at malformed kern subtable: {e}");
                    break;
                }
            };
            let coverage = match &subtable {
                Subtable::Ot(ot) => ot.coverage(),
                Subtable::Aat(_) => 0,
            };
            if !subtable.is_horizontal()
                || subtable.is_cross_stream()
                || subtable.is_variable()
                || coverage & KERN_MINIMUM != 0
            {
                continue;
            }
            let value = match subtable.kind() {
                Ok(SubtableKind::Format0(pairs)) => pairs.kerning(left, right),
                Ok(SubtableKind::Format2(classes)) => classes.kerning(left, right),
                Ok(SubtableKind::Format3(classes)) => classes.kerning(left, right),
                Ok(SubtableKind::Format1(_)) | Err(_) => None,
            };
            if let Some(value) = value {
                total = Some(if coverage & KERN_OVERRIDE != 0 {
                    value
                } else {
                    total.unwrap_or(0).saturating_add(value)
                });
            }
        }
        total
    }
}

impl GlyphSource for Font {
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn glyph_id(&self, ch: char) -> Option<GlyphId> {
        if let Some(found) = self.glyph_ids.get(&ch) {
            return *found;
        }
        let gid = self
            .font_ref()
            .and_then(|font| font.cmap().ok()?.map_codepoint(ch))
            .map(|gid| gid.to_u32())
            .filter(|&gid| gid != 0 && gid < self.num_glyphs);
        self.glyph_ids.insert(ch, gid);
        gid
    }

    fn advance_width(&self, glyph_id: GlyphId) -> f32 {
        match self.advances.get(glyph_id as usize).copied().flatten() {
            Some(advance) => f32::from(advance),
            None => {
                log::trace!("No advance for glyph {glyph_id}, using half an em");
                f32::from(self.metrics.units_per_em) / 2.0
            }
        }
    }

    fn kerning(&self, left: GlyphId, right: GlyphId) -> f32 {
        if !self.has_kern {
            return 0.0;
        }
        self.kern_value(left, right).map_or(0.0, |v| v as f32)
    }

    fn outline(&self, glyph_id: GlyphId) -> Option<GlyphOutline> {
        let font = self.font_ref()?;
        let glyphs = font.outline_glyphs();
        let glyph = glyphs.get(skrifa::GlyphId::new(glyph_id))?;

        let mut pen = pen::RecordingPen::default();
        let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
        if let Err(e) = glyph.draw(settings, &mut pen) {
            log::warn!("Failed to draw outline for glyph {glyph_id}: {e}");
            return None;
        }
        Some(pen.finish())
    }
}
