//! PNG export format
//!
//! Straight-alpha RGBA8, 8-bit, non-interlaced, written with the `png`
//! crate using adaptive per-row filtering and default compression.

use std::path::Path;

use glint_core::error::{EncodeError, Result};
use glint_core::traits::Exporter;
use glint_core::types::Surface;

/// Encode a surface to PNG bytes.
///
/// A surface with zero width or height is a valid render (empty text) but
/// not a valid image, and is rejected with [`EncodeError::EmptySurface`].
pub fn encode_png(surface: &Surface) -> std::result::Result<Vec<u8>, EncodeError> {
    if surface.is_empty() {
        return Err(EncodeError::EmptySurface {
            width: surface.width(),
            height: surface.height(),
        });
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Default);
        encoder.set_adaptive_filter(png::AdaptiveFilterType::Adaptive);
        let mut writer = encoder
            .write_header()
            .map_err(|err| EncodeError::Png(format!("PNG encoder error: {err}")))?;
        writer
            .write_image_data(surface.data())
            .map_err(|err| EncodeError::Png(format!("PNG write error: {err}")))?;
        writer
            .finish()
            .map_err(|err| EncodeError::Png(format!("PNG finish error: {err}")))?;
    }
    Ok(png_data)
}

/// Encode `surface` and write it to `path`.
///
/// Nothing is written when encoding fails. Filesystem errors come back as
/// [`glint_core::GlintError::Io`] with the original `io::Error` inside.
pub fn save_png(path: impl AsRef<Path>, surface: &Surface) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_png(surface)?;
    std::fs::write(path, &bytes)?;
    log::debug!(
        "Wrote {}x{} PNG ({} bytes) to {}",
        surface.width(),
        surface.height(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// PNG exporter
#[derive(Debug, Default, Clone, Copy)]
pub struct PngExporter;

impl PngExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for PngExporter {
    fn name(&self) -> &'static str {
        "png"
    }

    fn export(&self, surface: &Surface) -> Result<Vec<u8>> {
        Ok(encode_png(surface)?)
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::GlintError;

    const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    fn checker() -> Surface {
        let data = vec![
            255, 0, 0, 255, // Red
            0, 255, 0, 128, // Half green
            0, 0, 255, 0, // Transparent blue
            255, 255, 255, 255, // White
        ];
        Surface::from_rgba(2, 2, data).unwrap()
    }

    #[test]
    fn test_png_exporter_metadata() {
        let exporter = PngExporter::new();
        assert_eq!(exporter.name(), "png");
        assert_eq!(exporter.extension(), "png");
        assert_eq!(exporter.mime_type(), "image/png");
    }

    #[test]
    fn test_encode_writes_png_signature() {
        let bytes = encode_png(&checker()).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
        // IHDR comes first
        assert_eq!(&bytes[12..16], b"IHDR");
        assert_eq!(&bytes[bytes.len() - 8..bytes.len() - 4], b"IEND");
    }

    #[test]
    fn test_png_encoding_round_trips_pixels() {
        let surface = checker();
        let bytes = encode_png(&surface).unwrap();

        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (2, 2));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(info.bit_depth, png::BitDepth::Eight);
        assert_eq!(&buf[..info.buffer_size()], surface.data());
    }

    #[test]
    fn test_empty_surface_is_rejected() {
        let err = encode_png(&Surface::empty()).unwrap_err();
        assert!(matches!(err, EncodeError::EmptySurface { width: 0, height: 0 }));

        let err = PngExporter.export(&Surface::new(5, 0)).unwrap_err();
        assert!(matches!(
            err,
            GlintError::Encode(EncodeError::EmptySurface { width: 5, height: 0 })
        ));
    }
}
