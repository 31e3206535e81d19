//! Error types for Glint
//!
//! Each concern owns one enum. [`GlintError`] folds them together so the
//! public entry points can return a single [`Result`].

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlintError>;

/// Main error type for Glint
#[derive(Debug, Error)]
pub enum GlintError {
    #[error("Font loading failed: {0}")]
    FontLoad(#[from] FontLoadError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),

    /// Filesystem failure, passed through untouched
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Font loading errors
#[derive(Debug, Error)]
pub enum FontLoadError {
    #[error("Font file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read font file {}: {}", path.display(), source)]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Font file too large: {} bytes (max: {} bytes) at {}", size, max, path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Not a recognized font format: {}", path.display())]
    UnrecognizedFormat { path: PathBuf },

    #[error("Malformed font at {}: {}", path.display(), reason)]
    Malformed { path: PathBuf, reason: String },
}

impl FontLoadError {
    /// The path the failed load was asked for
    pub fn path(&self) -> &std::path::Path {
        match self {
            FontLoadError::NotFound { path }
            | FontLoadError::Unreadable { path, .. }
            | FontLoadError::TooLarge { path, .. }
            | FontLoadError::UnrecognizedFormat { path }
            | FontLoadError::Malformed { path, .. } => path,
        }
    }
}

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid render request: {0}")]
    InvalidRequest(String),

    #[error("Surface {width}x{height} exceeds the {max} px limit")]
    SurfaceTooLarge { width: u64, height: u64, max: u32 },
}

/// PNG encoding errors
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Cannot encode an empty {width}x{height} surface")]
    EmptySurface { width: u32, height: u32 },

    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferMismatch { expected: usize, actual: usize },

    #[error("PNG encoder error: {0}")]
    Png(String),
}

/// A codepoint the font has no glyph for
///
/// Never leaves the render pipeline: layout resolves it through the
/// configured missing-glyph policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No glyph for {ch:?}")]
pub struct GlyphMissingError {
    pub ch: char,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_its_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: GlintError = io.into();
        match err {
            GlintError::Io(inner) => {
                assert_eq!(inner.kind(), std::io::ErrorKind::PermissionDenied)
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn font_load_error_reports_path() {
        let err = FontLoadError::NotFound {
            path: PathBuf::from("/nonexistent/font.ttf"),
        };
        assert_eq!(err.path(), std::path::Path::new("/nonexistent/font.ttf"));
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }

    #[test]
    fn glyph_missing_names_the_char() {
        let err = GlyphMissingError { ch: 'é' };
        assert_eq!(err.to_string(), "No glyph for 'é'");
    }
}
