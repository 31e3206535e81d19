// this_file: crates/glint-fontdb/src/format.rs

//! Font format detection by magic bytes
//!
//! File extensions lie; the first four bytes of an sfnt do not.

/// Outline flavour of a font face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFormat {
    /// Quadratic outlines in `glyf`/`loca`
    TrueType,
    /// Cubic outlines in `CFF ` or `CFF2`
    OpenTypeCff,
}

impl FontFormat {
    /// Detects the format of the face the loader will open
    ///
    /// Collections (`ttcf`) are resolved to the format of their first face.
    pub fn sniff(data: &[u8]) -> Option<FontFormat> {
        match data.get(0..4)? {
            [0x00, 0x01, 0x00, 0x00] | b"true" => Some(FontFormat::TrueType),
            b"OTTO" => Some(FontFormat::OpenTypeCff),
            b"ttcf" => {
                let offset = read_u32(data, 12)? as usize;
                match data.get(offset..offset.checked_add(4)?)? {
                    [0x00, 0x01, 0x00, 0x00] | b"true" => Some(FontFormat::TrueType),
                    b"OTTO" => Some(FontFormat::OpenTypeCff),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Outline tables this format cannot do without; any one suffices
    pub(crate) fn outline_tables(self) -> &'static [&'static [u8; 4]] {
        match self {
            FontFormat::TrueType => &[b"glyf"],
            FontFormat::OpenTypeCff => &[b"CFF ", b"CFF2"],
        }
    }
}

/// True when the bytes start a TrueType collection
pub(crate) fn is_collection(data: &[u8]) -> bool {
    data.get(0..4) == Some(b"ttcf".as_slice())
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
