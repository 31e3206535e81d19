//! Export module for Glint
//!
//! Surfaces leave the pipeline as PNG. Encoding is pure and happens in
//! memory; [`save_png`] only touches the filesystem once the bytes exist.

pub mod png;

pub use crate::png::{encode_png, save_png, PngExporter};
