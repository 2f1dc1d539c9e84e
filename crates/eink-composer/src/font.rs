//! Fixed 6x8 bitmap font rasterizer.
//!
//! Glyphs are scaled by nearest-neighbor pixel replication, so text stays
//! crisp on a binary panel at any integer size. Free-angle rotation of the
//! assembled text bitmap expands the bounding box rather than cropping.

use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::debug;

/// Width of one glyph cell in pixels (at scale 1).
pub const GLYPH_WIDTH: u32 = 6;

/// Height of one glyph cell in pixels (at scale 1).
pub const GLYPH_HEIGHT: u32 = 8;

/// Glyph used for characters outside the printable ASCII range.
const FALLBACK_GLYPH: [u8; 8] = [0x3E, 0x3E, 0x3E, 0x3E, 0x3E, 0x3E, 0x3E, 0x00];

/// 6x8 glyph bitmaps for ASCII 0x20..=0x7E.
///
/// One byte per row; bit 5 is the leftmost pixel of the cell. The sixth
/// column and the bottom row stay clear so adjacent cells don't touch.
#[rustfmt::skip]
static GLYPHS: [[u8; 8]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x08, 0x08, 0x08, 0x08, 0x08, 0x00, 0x08, 0x00], // '!'
    [0x14, 0x14, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00], // '"'
    [0x14, 0x14, 0x3E, 0x14, 0x3E, 0x14, 0x14, 0x00], // '#'
    [0x08, 0x1E, 0x28, 0x1C, 0x0A, 0x3C, 0x08, 0x00], // '$'
    [0x30, 0x32, 0x04, 0x08, 0x10, 0x26, 0x06, 0x00], // '%'
    [0x18, 0x24, 0x28, 0x10, 0x2A, 0x24, 0x1A, 0x00], // '&'
    [0x18, 0x08, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00], // '\''
    [0x04, 0x08, 0x10, 0x10, 0x10, 0x08, 0x04, 0x00], // '('
    [0x10, 0x08, 0x04, 0x04, 0x04, 0x08, 0x10, 0x00], // ')'
    [0x00, 0x08, 0x2A, 0x1C, 0x2A, 0x08, 0x00, 0x00], // '*'
    [0x00, 0x08, 0x08, 0x3E, 0x08, 0x08, 0x00, 0x00], // '+'
    [0x00, 0x00, 0x00, 0x00, 0x18, 0x08, 0x10, 0x00], // ','
    [0x00, 0x00, 0x00, 0x3E, 0x00, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00], // '.'
    [0x00, 0x02, 0x04, 0x08, 0x10, 0x20, 0x00, 0x00], // '/'
    [0x1C, 0x22, 0x26, 0x2A, 0x32, 0x22, 0x1C, 0x00], // '0'
    [0x08, 0x18, 0x08, 0x08, 0x08, 0x08, 0x1C, 0x00], // '1'
    [0x1C, 0x22, 0x02, 0x04, 0x08, 0x10, 0x3E, 0x00], // '2'
    [0x3E, 0x04, 0x08, 0x04, 0x02, 0x22, 0x1C, 0x00], // '3'
    [0x04, 0x0C, 0x14, 0x24, 0x3E, 0x04, 0x04, 0x00], // '4'
    [0x3E, 0x20, 0x3C, 0x02, 0x02, 0x22, 0x1C, 0x00], // '5'
    [0x0C, 0x10, 0x20, 0x3C, 0x22, 0x22, 0x1C, 0x00], // '6'
    [0x3E, 0x02, 0x04, 0x08, 0x10, 0x10, 0x10, 0x00], // '7'
    [0x1C, 0x22, 0x22, 0x1C, 0x22, 0x22, 0x1C, 0x00], // '8'
    [0x1C, 0x22, 0x22, 0x1E, 0x02, 0x04, 0x18, 0x00], // '9'
    [0x00, 0x18, 0x18, 0x00, 0x18, 0x18, 0x00, 0x00], // ':'
    [0x00, 0x18, 0x18, 0x00, 0x18, 0x08, 0x10, 0x00], // ';'
    [0x04, 0x08, 0x10, 0x20, 0x10, 0x08, 0x04, 0x00], // '<'
    [0x00, 0x00, 0x3E, 0x00, 0x3E, 0x00, 0x00, 0x00], // '='
    [0x10, 0x08, 0x04, 0x02, 0x04, 0x08, 0x10, 0x00], // '>'
    [0x1C, 0x22, 0x02, 0x04, 0x08, 0x00, 0x08, 0x00], // '?'
    [0x1C, 0x22, 0x02, 0x1A, 0x2A, 0x2A, 0x1C, 0x00], // '@'
    [0x1C, 0x22, 0x22, 0x22, 0x3E, 0x22, 0x22, 0x00], // 'A'
    [0x3C, 0x22, 0x22, 0x3C, 0x22, 0x22, 0x3C, 0x00], // 'B'
    [0x1C, 0x22, 0x20, 0x20, 0x20, 0x22, 0x1C, 0x00], // 'C'
    [0x38, 0x24, 0x22, 0x22, 0x22, 0x24, 0x38, 0x00], // 'D'
    [0x3E, 0x20, 0x20, 0x3C, 0x20, 0x20, 0x3E, 0x00], // 'E'
    [0x3E, 0x20, 0x20, 0x3C, 0x20, 0x20, 0x20, 0x00], // 'F'
    [0x1C, 0x22, 0x20, 0x2E, 0x22, 0x22, 0x1E, 0x00], // 'G'
    [0x22, 0x22, 0x22, 0x3E, 0x22, 0x22, 0x22, 0x00], // 'H'
    [0x1C, 0x08, 0x08, 0x08, 0x08, 0x08, 0x1C, 0x00], // 'I'
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x24, 0x18, 0x00], // 'J'
    [0x22, 0x24, 0x28, 0x30, 0x28, 0x24, 0x22, 0x00], // 'K'
    [0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x3E, 0x00], // 'L'
    [0x22, 0x36, 0x2A, 0x2A, 0x22, 0x22, 0x22, 0x00], // 'M'
    [0x22, 0x22, 0x32, 0x2A, 0x26, 0x22, 0x22, 0x00], // 'N'
    [0x1C, 0x22, 0x22, 0x22, 0x22, 0x22, 0x1C, 0x00], // 'O'
    [0x3C, 0x22, 0x22, 0x3C, 0x20, 0x20, 0x20, 0x00], // 'P'
    [0x1C, 0x22, 0x22, 0x22, 0x2A, 0x24, 0x1A, 0x00], // 'Q'
    [0x3C, 0x22, 0x22, 0x3C, 0x28, 0x24, 0x22, 0x00], // 'R'
    [0x1E, 0x20, 0x20, 0x1C, 0x02, 0x02, 0x3C, 0x00], // 'S'
    [0x3E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x08, 0x00], // 'T'
    [0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x1C, 0x00], // 'U'
    [0x22, 0x22, 0x22, 0x22, 0x22, 0x14, 0x08, 0x00], // 'V'
    [0x22, 0x22, 0x22, 0x2A, 0x2A, 0x2A, 0x14, 0x00], // 'W'
    [0x22, 0x22, 0x14, 0x08, 0x14, 0x22, 0x22, 0x00], // 'X'
    [0x22, 0x22, 0x22, 0x14, 0x08, 0x08, 0x08, 0x00], // 'Y'
    [0x3E, 0x02, 0x04, 0x08, 0x10, 0x20, 0x3E, 0x00], // 'Z'
    [0x1C, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1C, 0x00], // '['
    [0x00, 0x20, 0x10, 0x08, 0x04, 0x02, 0x00, 0x00], // '\\'
    [0x1C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x1C, 0x00], // ']'
    [0x08, 0x14, 0x22, 0x00, 0x00, 0x00, 0x00, 0x00], // '^'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x3E, 0x00], // '_'
    [0x10, 0x08, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00], // '`'
    [0x00, 0x00, 0x1C, 0x02, 0x1E, 0x22, 0x1E, 0x00], // 'a'
    [0x20, 0x20, 0x2C, 0x32, 0x22, 0x22, 0x3C, 0x00], // 'b'
    [0x00, 0x00, 0x1C, 0x20, 0x20, 0x22, 0x1C, 0x00], // 'c'
    [0x02, 0x02, 0x1A, 0x26, 0x22, 0x22, 0x1E, 0x00], // 'd'
    [0x00, 0x00, 0x1C, 0x22, 0x3E, 0x20, 0x1C, 0x00], // 'e'
    [0x0C, 0x12, 0x10, 0x38, 0x10, 0x10, 0x10, 0x00], // 'f'
    [0x00, 0x1E, 0x22, 0x22, 0x1E, 0x02, 0x1C, 0x00], // 'g'
    [0x20, 0x20, 0x2C, 0x32, 0x22, 0x22, 0x22, 0x00], // 'h'
    [0x08, 0x00, 0x18, 0x08, 0x08, 0x08, 0x1C, 0x00], // 'i'
    [0x04, 0x00, 0x0C, 0x04, 0x04, 0x24, 0x18, 0x00], // 'j'
    [0x20, 0x20, 0x24, 0x28, 0x30, 0x28, 0x24, 0x00], // 'k'
    [0x18, 0x08, 0x08, 0x08, 0x08, 0x08, 0x1C, 0x00], // 'l'
    [0x00, 0x00, 0x34, 0x2A, 0x2A, 0x22, 0x22, 0x00], // 'm'
    [0x00, 0x00, 0x2C, 0x32, 0x22, 0x22, 0x22, 0x00], // 'n'
    [0x00, 0x00, 0x1C, 0x22, 0x22, 0x22, 0x1C, 0x00], // 'o'
    [0x00, 0x00, 0x3C, 0x22, 0x3C, 0x20, 0x20, 0x00], // 'p'
    [0x00, 0x00, 0x1A, 0x26, 0x1E, 0x02, 0x02, 0x00], // 'q'
    [0x00, 0x00, 0x2C, 0x32, 0x20, 0x20, 0x20, 0x00], // 'r'
    [0x00, 0x00, 0x1C, 0x20, 0x1C, 0x02, 0x3C, 0x00], // 's'
    [0x10, 0x10, 0x38, 0x10, 0x10, 0x12, 0x0C, 0x00], // 't'
    [0x00, 0x00, 0x22, 0x22, 0x22, 0x26, 0x1A, 0x00], // 'u'
    [0x00, 0x00, 0x22, 0x22, 0x22, 0x14, 0x08, 0x00], // 'v'
    [0x00, 0x00, 0x22, 0x22, 0x2A, 0x2A, 0x14, 0x00], // 'w'
    [0x00, 0x00, 0x22, 0x14, 0x08, 0x14, 0x22, 0x00], // 'x'
    [0x00, 0x00, 0x22, 0x22, 0x1E, 0x02, 0x1C, 0x00], // 'y'
    [0x00, 0x00, 0x3E, 0x04, 0x08, 0x10, 0x3E, 0x00], // 'z'
    [0x04, 0x08, 0x08, 0x10, 0x08, 0x08, 0x04, 0x00], // '{'
    [0x08, 0x08, 0x08, 0x08, 0x08, 0x08, 0x08, 0x00], // '|'
    [0x10, 0x08, 0x08, 0x04, 0x08, 0x08, 0x10, 0x00], // '}'
    [0x00, 0x00, 0x10, 0x2A, 0x04, 0x00, 0x00, 0x00], // '~'
];

/// Look up the glyph bitmap for a character.
///
/// Characters outside printable ASCII map to a filled-block placeholder,
/// never an error.
pub fn glyph(ch: char) -> &'static [u8; 8] {
    let code = ch as u32;
    if (0x20..=0x7E).contains(&code) {
        &GLYPHS[(code - 0x20) as usize]
    } else {
        &FALLBACK_GLYPH
    }
}

/// Pixel dimensions of `text` rendered at `scale`, before any rotation.
pub fn measure_text(text: &str, scale: u32) -> (u32, u32) {
    let scale = scale.max(1);
    let chars = text.chars().count() as u32;
    (chars * GLYPH_WIDTH * scale, GLYPH_HEIGHT * scale)
}

/// Rasterize `text` into a grayscale bitmap.
///
/// Glyph cells are concatenated left-to-right with no extra padding; each
/// font pixel becomes a `scale` x `scale` block of `fg` on a `bg` field.
pub fn render_text(text: &str, scale: u32, fg: u8, bg: u8) -> GrayImage {
    let scale = scale.max(1);
    let (width, height) = measure_text(text, scale);
    debug!(width, height, scale, "rasterizing text");

    let mut img = GrayImage::from_pixel(width, height, Luma([bg]));
    for (i, ch) in text.chars().enumerate() {
        let rows = glyph(ch);
        let x0 = i as u32 * GLYPH_WIDTH * scale;
        for (cy, &row) in rows.iter().enumerate() {
            for cx in 0..GLYPH_WIDTH {
                if row >> (GLYPH_WIDTH - 1 - cx) & 1 == 1 {
                    for dy in 0..scale {
                        for dx in 0..scale {
                            img.put_pixel(x0 + cx * scale + dx, cy as u32 * scale + dy, Luma([fg]));
                        }
                    }
                }
            }
        }
    }
    img
}

/// Rotate a bitmap by an arbitrary angle (degrees, counter-clockwise).
///
/// The output bounding box grows to hold the rotated content; uncovered
/// corners are filled with `fill`. Sampling is nearest-neighbor. Exact
/// multiples of 90 degrees take the lossless quarter-turn path.
pub fn rotate_any(img: &GrayImage, degrees: f32, fill: u8) -> GrayImage {
    let norm = degrees.rem_euclid(360.0);
    if norm == 0.0 {
        return img.clone();
    }
    if norm % 90.0 == 0.0 {
        return image_ops::rotate_ccw(img, (norm / 90.0) as u32);
    }

    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }

    let theta = norm.to_radians();
    let (sin, cos) = theta.sin_cos();
    let new_w = (w as f32 * cos.abs() + h as f32 * sin.abs()).ceil() as u32;
    let new_h = (w as f32 * sin.abs() + h as f32 * cos.abs()).ceil() as u32;
    debug!(w, h, degrees, new_w, new_h, "rotating text bitmap");

    // Map input coords to output coords: center, rotate, re-center.
    // Negated angle because y grows downward in image space.
    let projection = Projection::translate(new_w as f32 / 2.0, new_h as f32 / 2.0)
        * Projection::rotate(-theta)
        * Projection::translate(-(w as f32) / 2.0, -(h as f32) / 2.0);

    let mut out = GrayImage::from_pixel(new_w, new_h, Luma([fill]));
    warp_into(img, &projection, Interpolation::Nearest, Luma([fill]), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_counts_cells() {
        assert_eq!(measure_text("HI", 1), (12, 8));
        assert_eq!(measure_text("HI", 3), (36, 24));
        assert_eq!(measure_text("", 1), (0, 8));
    }

    #[test]
    fn zero_scale_is_treated_as_one() {
        assert_eq!(measure_text("A", 0), (6, 8));
        let img = render_text("A", 0, 0, 255);
        assert_eq!(img.dimensions(), (6, 8));
    }

    #[test]
    fn rendered_pixels_match_glyph_bitmap() {
        let img = render_text("T", 1, 0, 255);
        let rows = glyph('T');

        for cy in 0..GLYPH_HEIGHT {
            for cx in 0..GLYPH_WIDTH {
                let ink = rows[cy as usize] >> (GLYPH_WIDTH - 1 - cx) & 1 == 1;
                let expected = if ink { 0 } else { 255 };
                assert_eq!(
                    img.get_pixel(cx, cy).0[0],
                    expected,
                    "cell ({cx}, {cy})"
                );
            }
        }
    }

    #[test]
    fn scale_replicates_pixel_blocks() {
        let img = render_text("T", 2, 0, 255);
        assert_eq!(img.dimensions(), (12, 16));

        let rows = glyph('T');
        for cy in 0..GLYPH_HEIGHT {
            for cx in 0..GLYPH_WIDTH {
                let ink = rows[cy as usize] >> (GLYPH_WIDTH - 1 - cx) & 1 == 1;
                let expected = if ink { 0 } else { 255 };
                for dy in 0..2 {
                    for dx in 0..2 {
                        assert_eq!(img.get_pixel(cx * 2 + dx, cy * 2 + dy).0[0], expected);
                    }
                }
            }
        }
    }

    #[test]
    fn cells_concatenate_left_to_right() {
        let img = render_text("AB", 1, 0, 255);
        assert_eq!(img.dimensions(), (12, 8));

        let single = render_text("B", 1, 0, 255);
        for y in 0..8 {
            for x in 0..6 {
                assert_eq!(img.get_pixel(x + 6, y).0[0], single.get_pixel(x, y).0[0]);
            }
        }
    }

    #[test]
    fn unsupported_char_uses_fallback_not_error() {
        let rows = glyph('\u{263A}');
        assert_eq!(rows, &FALLBACK_GLYPH);
        // Rendering must not panic
        let img = render_text("\u{263A}", 1, 0, 255);
        assert_eq!(img.dimensions(), (6, 8));
    }

    #[test]
    fn space_renders_blank() {
        let img = render_text(" ", 1, 0, 255);
        assert!(img.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn rotate_any_quarter_turn_matches_lossless_path() {
        let img = render_text("HI", 1, 0, 255);
        let rotated = rotate_any(&img, 90.0, 255);
        assert_eq!(rotated.as_raw(), image_ops::rotate_ccw(&img, 1).as_raw());
    }

    #[test]
    fn rotate_any_full_turn_is_identity() {
        let img = render_text("HI", 1, 0, 255);
        assert_eq!(rotate_any(&img, 360.0, 255).as_raw(), img.as_raw());
    }

    #[test]
    fn rotate_any_45_degrees_grows_bounding_box() {
        let img = render_text("HELLO", 2, 0, 255);
        let (w, h) = img.dimensions();
        let rotated = rotate_any(&img, 45.0, 255);
        assert!(rotated.width() > h);
        assert!(rotated.height() > h);
        assert!(rotated.width() < w + h);
        // Rotation keeps some ink
        assert!(rotated.pixels().any(|p| p.0[0] == 0));
    }

    #[test]
    fn rotate_any_fills_corners_with_background() {
        let img = GrayImage::from_pixel(10, 10, Luma([0]));
        let rotated = rotate_any(&img, 45.0, 255);
        // Corner of the expanded box is outside the rotated square
        assert_eq!(rotated.get_pixel(0, 0).0[0], 255);
    }
}
