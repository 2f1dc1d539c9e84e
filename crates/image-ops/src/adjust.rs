//! Tonal adjustments: inversion and brightness/contrast.

use image::{GrayImage, Luma};
use tracing::debug;

/// Invert image colors: v -> 255 - v.
pub fn invert(img: &GrayImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([255 - img.get_pixel(x, y).0[0]])
    })
}

/// Adjust image brightness and contrast.
///
/// `brightness` is a multiplier (1.0 = no change). `contrast` ranges over
/// -100..=100 (0 = no change) and is applied around the mid-gray point
/// with the standard 259-factor curve. The result is clamped to 0..=255.
pub fn adjust_brightness_contrast(img: &GrayImage, brightness: f32, contrast: f32) -> GrayImage {
    if brightness == 1.0 && contrast == 0.0 {
        return img.clone();
    }
    debug!(brightness, contrast, "adjusting brightness/contrast");

    let factor = if contrast != 0.0 {
        (259.0 * (contrast + 255.0)) / (255.0 * (259.0 - contrast))
    } else {
        1.0
    };

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let v = f32::from(img.get_pixel(x, y).0[0]) * brightness;
        let v = 128.0 + factor * (v - 128.0);
        Luma([v.clamp(0.0, 255.0) as u8])
    })
}
