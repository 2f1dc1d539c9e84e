//! Quarter-turn rotation and axis flips.
//!
//! All operations return a new buffer; the input is never mutated.

use image::GrayImage;
use image::imageops;
use tracing::debug;

/// Rotate an image by `quarter_turns` x 90 degrees counter-clockwise.
///
/// `quarter_turns` is taken modulo 4. Width and height swap for odd turns.
pub fn rotate_ccw(img: &GrayImage, quarter_turns: u32) -> GrayImage {
    let (w, h) = img.dimensions();
    let k = quarter_turns % 4;
    debug!(w, h, k, "rotating image counter-clockwise");

    match k {
        0 => img.clone(),
        // image's rotate functions are clockwise; 270 CW == 90 CCW
        1 => imageops::rotate270(img),
        2 => imageops::rotate180(img),
        _ => imageops::rotate90(img),
    }
}

/// Mirror an image along the requested axes.
///
/// Both flips together are equivalent to a 180-degree rotation.
pub fn flip(img: &GrayImage, horizontal: bool, vertical: bool) -> GrayImage {
    match (horizontal, vertical) {
        (false, false) => img.clone(),
        (true, false) => imageops::flip_horizontal(img),
        (false, true) => imageops::flip_vertical(img),
        (true, true) => imageops::rotate180(img),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Test image with unique values at the corners.
    /// Top-left=10, top-right=20, bottom-left=30, bottom-right=40
    fn corner_image(width: u32, height: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(width, height, Luma([128]));
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(width - 1, 0, Luma([20]));
        img.put_pixel(0, height - 1, Luma([30]));
        img.put_pixel(width - 1, height - 1, Luma([40]));
        img
    }

    #[test]
    fn rotate_zero_is_identity() {
        let img = corner_image(4, 3);
        let result = rotate_ccw(&img, 0);
        assert_eq!(result.as_raw(), img.as_raw());
    }

    #[test]
    fn rotate_odd_turns_swap_dimensions() {
        let img = corner_image(6, 3);
        assert_eq!(rotate_ccw(&img, 1).dimensions(), (3, 6));
        assert_eq!(rotate_ccw(&img, 2).dimensions(), (6, 3));
        assert_eq!(rotate_ccw(&img, 3).dimensions(), (3, 6));
    }

    #[test]
    fn rotate_ccw_moves_top_right_to_top_left() {
        let img = corner_image(4, 3);
        let result = rotate_ccw(&img, 1);

        // 90 CCW: the top-right corner becomes the new top-left
        assert_eq!(result.get_pixel(0, 0).0[0], 20);
        assert_eq!(result.get_pixel(0, result.height() - 1).0[0], 10);
        assert_eq!(result.get_pixel(result.width() - 1, 0).0[0], 40);
        assert_eq!(result.get_pixel(result.width() - 1, result.height() - 1).0[0], 30);
    }

    #[test]
    fn four_quarter_turns_restore_original() {
        let img = corner_image(5, 7);
        let mut result = img.clone();
        for _ in 0..4 {
            result = rotate_ccw(&result, 1);
        }
        assert_eq!(result.as_raw(), img.as_raw());
    }

    #[test]
    fn turns_wrap_modulo_four() {
        let img = corner_image(5, 4);
        assert_eq!(rotate_ccw(&img, 5).as_raw(), rotate_ccw(&img, 1).as_raw());
        assert_eq!(rotate_ccw(&img, 4).as_raw(), img.as_raw());
    }

    #[test]
    fn flip_horizontal_mirrors_columns() {
        let img = corner_image(4, 3);
        let result = flip(&img, true, false);
        assert_eq!(result.get_pixel(0, 0).0[0], 20);
        assert_eq!(result.get_pixel(3, 0).0[0], 10);
    }

    #[test]
    fn flip_vertical_mirrors_rows() {
        let img = corner_image(4, 3);
        let result = flip(&img, false, true);
        assert_eq!(result.get_pixel(0, 0).0[0], 30);
        assert_eq!(result.get_pixel(0, 2).0[0], 10);
    }

    #[test]
    fn both_flips_equal_half_turn() {
        let img = corner_image(5, 3);
        assert_eq!(flip(&img, true, true).as_raw(), rotate_ccw(&img, 2).as_raw());
    }

    #[test]
    fn flip_does_not_mutate_input() {
        let img = corner_image(3, 3);
        let before = img.as_raw().clone();
        let _ = flip(&img, true, true);
        assert_eq!(img.as_raw(), &before);
    }
}
