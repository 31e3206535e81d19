//! Render configuration
//!
//! Defaults are chosen so a plain [`RenderConfig::default()`] renders the
//! way most callers expect. [`RenderConfig::from_env`] lets deployments
//! flip the policies without code changes:
//!
//! ```bash
//! GLINT_MISSING_GLYPH=tofu GLINT_BOUNDS=ink ./my_app
//! ```
//!
//! Unparseable values are ignored with a warning; the default stays.

use std::str::FromStr;

/// Largest surface side the compositor will allocate by default
pub const DEFAULT_MAX_SURFACE_SIDE: u32 = 16_384;

/// Texts per chunk of a batch render
pub const DEFAULT_BATCH_CHUNK: usize = 64;

/// What to do with a character the font cannot draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingGlyphPolicy {
    /// Draw nothing, advance by the missing-glyph width
    #[default]
    Skip,
    /// Draw a hollow box of the missing-glyph width
    Tofu,
}

impl FromStr for MissingGlyphPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "tofu" => Ok(Self::Tofu),
            other => Err(format!("unknown missing-glyph policy '{other}'")),
        }
    }
}

/// How far the surface extends around the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Union of the ink and each line's ascent/descent box
    #[default]
    LineBox,
    /// Union of the painted masks only
    Ink,
}

impl FromStr for BoundsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linebox" | "line-box" | "line_box" => Ok(Self::LineBox),
            "ink" => Ok(Self::Ink),
            other => Err(format!("unknown bounds policy '{other}'")),
        }
    }
}

/// Knobs shared by single and batch renders
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub missing_glyph: MissingGlyphPolicy,
    /// Pen advance for a missing glyph, in ems
    pub missing_advance_em: f32,
    pub bounds: BoundsPolicy,
    pub max_surface_side: u32,
    /// Bounded work queue: texts rendered per chunk
    pub batch_chunk_size: usize,
    /// Render batch chunks on the rayon pool
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            missing_glyph: MissingGlyphPolicy::Skip,
            missing_advance_em: 0.5,
            bounds: BoundsPolicy::LineBox,
            max_surface_side: DEFAULT_MAX_SURFACE_SIDE,
            batch_chunk_size: DEFAULT_BATCH_CHUNK,
            parallel: true,
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by `GLINT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("GLINT_MISSING_GLYPH") {
            match val.parse() {
                Ok(policy) => {
                    config.missing_glyph = policy;
                    log::info!("Missing-glyph policy {policy:?} via GLINT_MISSING_GLYPH");
                }
                Err(e) => log::warn!("Ignoring GLINT_MISSING_GLYPH: {e}"),
            }
        }

        if let Some(val) = lookup("GLINT_BOUNDS") {
            match val.parse() {
                Ok(policy) => {
                    config.bounds = policy;
                    log::info!("Bounds policy {policy:?} via GLINT_BOUNDS");
                }
                Err(e) => log::warn!("Ignoring GLINT_BOUNDS: {e}"),
            }
        }

        if let Some(val) = lookup("GLINT_BATCH_CHUNK") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.batch_chunk_size = n,
                _ => log::warn!("Ignoring GLINT_BATCH_CHUNK: '{val}' is not a positive integer"),
            }
        }

        if let Some(val) = lookup("GLINT_PARALLEL") {
            match val.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.parallel = true,
                "0" | "false" | "no" | "off" => config.parallel = false,
                _ => log::warn!("Ignoring GLINT_PARALLEL: '{val}' is not a boolean"),
            }
        }

        config
    }

    pub fn with_missing_glyph(mut self, policy: MissingGlyphPolicy) -> Self {
        self.missing_glyph = policy;
        self
    }

    pub fn with_missing_advance_em(mut self, em: f32) -> Self {
        self.missing_advance_em = em;
        self
    }

    pub fn with_bounds(mut self, policy: BoundsPolicy) -> Self {
        self.bounds = policy;
        self
    }

    pub fn with_max_surface_side(mut self, max: u32) -> Self {
        self.max_surface_side = max;
        self
    }

    /// Zero is treated as one
    pub fn with_batch_chunk_size(mut self, size: usize) -> Self {
        self.batch_chunk_size = size.max(1);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let c = RenderConfig::default();
        assert_eq!(c.missing_glyph, MissingGlyphPolicy::Skip);
        assert_eq!(c.bounds, BoundsPolicy::LineBox);
        assert_eq!(c.max_surface_side, 16_384);
        assert_eq!(c.batch_chunk_size, 64);
        assert!(c.parallel);
    }

    #[test]
    fn env_overrides_apply() {
        let c = RenderConfig::from_lookup(lookup_from(&[
            ("GLINT_MISSING_GLYPH", "Tofu"),
            ("GLINT_BOUNDS", "ink"),
            ("GLINT_BATCH_CHUNK", "8"),
            ("GLINT_PARALLEL", "off"),
        ]));
        assert_eq!(c.missing_glyph, MissingGlyphPolicy::Tofu);
        assert_eq!(c.bounds, BoundsPolicy::Ink);
        assert_eq!(c.batch_chunk_size, 8);
        assert!(!c.parallel);
    }

    #[test]
    fn invalid_env_values_keep_defaults() {
        let c = RenderConfig::from_lookup(lookup_from(&[
            ("GLINT_MISSING_GLYPH", "guess"),
            ("GLINT_BOUNDS", "everything"),
            ("GLINT_BATCH_CHUNK", "0"),
            ("GLINT_PARALLEL", "maybe"),
        ]));
        assert_eq!(c, RenderConfig::default());
    }

    #[test]
    fn builders_chain() {
        let c = RenderConfig::default()
            .with_missing_glyph(MissingGlyphPolicy::Tofu)
            .with_bounds(BoundsPolicy::Ink)
            .with_batch_chunk_size(0)
            .with_parallel(false);
        assert_eq!(c.batch_chunk_size, 1);
        assert_eq!(c.bounds, BoundsPolicy::Ink);
        assert!(!c.parallel);
    }
}
