// this_file: backends/glint-raster/tests/glyphs.rs

use glint_core::traits::GlyphSource;
use glint_fontdb::Font;
use glint_raster::{generate_outline_mask, rasterize_glyph, rasterize_masks, rasterize_outline};
use proptest::prelude::*;

fn font() -> Font {
    Font::from_data(glint_fixtures::test_font()).expect("fixture font")
}

#[test]
fn test_rasterize_a_at_100px() {
    let font = font();
    let mask = rasterize_glyph(&font, 'A', 100.0).expect("rasterize");

    // Outline spans x 20..680, y 0..700 in a 1000 upem font
    assert_eq!((mask.left, mask.top), (2, -70));
    assert_eq!((mask.width, mask.height), (66, 70));

    // Solid below the counter, empty inside it
    let at = |x: i32, y: i32| mask.coverage((x - mask.left) as u32, (y - mask.top) as u32);
    assert_eq!(at(35, -10), 255);
    assert_eq!(at(35, -25), 0);
    // Anti-aliased slanted edge somewhere along the left stroke
    let row: Vec<u8> = (0..mask.width).map(|x| mask.coverage(x, 40)).collect();
    assert!(row.iter().any(|&c| c > 0 && c < 255));
}

#[test]
fn test_missing_glyph_renders_nothing() {
    let mask = rasterize_glyph(&font(), 'Z', 48.0).expect("rasterize");
    assert!(mask.is_empty());
}

#[test]
fn test_space_renders_nothing() {
    let mask = rasterize_glyph(&font(), ' ', 48.0).expect("rasterize");
    assert!(mask.is_empty());
}

#[test]
fn test_quadratic_glyph_has_hole() {
    let font = font();
    let mask = rasterize_glyph(&font, 'O', 100.0).expect("rasterize");
    let at = |x: i32, y: i32| mask.coverage((x - mask.left) as u32, (y - mask.top) as u32);
    // Ring at x 5..20, counter centered at (35, -35)
    assert_eq!(at(35, -35), 0);
    assert_eq!(at(10, -35), 255);
}

#[test]
fn test_outline_band_is_border_only() {
    let font = font();
    let outline = font.outline_for('I').expect("outline");
    let scale = font.metrics().scale(100.0);
    let band = generate_outline_mask(&outline, scale, 4.0).expect("band");

    // Stem covers x 10..20, y -70..0; band reaches 2 px further out
    assert_eq!((band.left, band.top), (8, -72));
    assert_eq!((band.width, band.height), (14, 74));
    let at = |x: i32, y: i32| band.coverage((x - band.left) as u32, (y - band.top) as u32);
    assert_eq!(at(8, -30), 255);
    assert_eq!(at(15, -30), 0);
}

proptest! {
    #[test]
    fn prop_rasterization_is_deterministic(
        ch in prop::sample::select(vec!['A', 'V', 'I', 'O']),
        size in 4.0f32..160.0,
        thickness in 0.0f32..8.0,
    ) {
        let font = font();
        let outline = font.outline_for(ch).expect("outline");
        let scale = font.metrics().scale(size);
        let first = rasterize_masks(&outline, scale, thickness).expect("masks");
        let second = rasterize_masks(&outline, scale, thickness).expect("masks");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_masks_stay_within_padded_bounds(
        ch in prop::sample::select(vec!['A', 'V', 'I', 'O']),
        size in 4.0f32..160.0,
        thickness in 0.0f32..8.0,
    ) {
        let font = font();
        let outline = font.outline_for(ch).expect("outline");
        let scale = font.metrics().scale(size);
        let (min, max) = outline.bounds().expect("bounds");
        let box_w = (max.x - min.x) * scale;
        let box_h = (max.y - min.y) * scale;

        let fill = rasterize_outline(&outline, scale).expect("fill");
        prop_assert!(fill.width as f32 <= box_w.ceil() + 1.0);
        prop_assert!(fill.height as f32 <= box_h.ceil() + 1.0);

        let band = generate_outline_mask(&outline, scale, thickness).expect("band");
        prop_assert!(band.width as f32 <= (box_w + 2.0 * thickness).ceil() + 1.0);
        prop_assert!(band.height as f32 <= (box_h + 2.0 * thickness).ceil() + 1.0);
        if thickness == 0.0 {
            prop_assert!(band.is_empty());
        }
    }
}
