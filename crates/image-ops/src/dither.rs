//! Dithering algorithms for reducing grayscale images to black-and-white.
//!
//! Provides Floyd-Steinberg error-diffusion dithering and simple threshold
//! conversion, plus the [`DitherMode`] selector used by layers and the
//! final render pass.

use std::fmt;
use std::str::FromStr;

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ParseModeError;

/// Default threshold value for binarization.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Dithering algorithm selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherMode {
    /// Floyd-Steinberg error diffusion.
    #[default]
    FloydSteinberg,
    /// Hard threshold at 128.
    Threshold,
    /// Passthrough; pixel values stay continuous grayscale.
    None,
}

impl DitherMode {
    /// Apply this mode to an image. `None` returns the input unchanged.
    pub fn apply(self, img: &GrayImage) -> GrayImage {
        match self {
            DitherMode::FloydSteinberg => floyd_steinberg_dither(img),
            DitherMode::Threshold => threshold_convert(img, DEFAULT_THRESHOLD),
            DitherMode::None => img.clone(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DitherMode::FloydSteinberg => "floyd-steinberg",
            DitherMode::Threshold => "threshold",
            DitherMode::None => "none",
        }
    }
}

impl fmt::Display for DitherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DitherMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "floyd-steinberg" => Ok(DitherMode::FloydSteinberg),
            "threshold" => Ok(DitherMode::Threshold),
            "none" => Ok(DitherMode::None),
            other => Err(ParseModeError::new("dither", other)),
        }
    }
}

/// Apply Floyd-Steinberg dithering to a grayscale image.
///
/// Pixels are visited in a single left-to-right, top-to-bottom pass and
/// quantized against a threshold of 128. The quantization error is
/// distributed to unvisited neighbors:
/// - Right:        7/16
/// - Bottom-left:  3/16
/// - Bottom:       5/16
/// - Bottom-right: 1/16
///
/// Neighbors outside the buffer receive no error.
pub fn floyd_steinberg_dither(img: &GrayImage) -> GrayImage {
    let (width, height) = img.dimensions();
    debug!(width, height, "applying Floyd-Steinberg dithering");

    let w = width as usize;
    let h = height as usize;

    // i16 working buffer so accumulated error can leave the u8 range
    let mut buffer: Vec<i16> = img.as_raw().iter().map(|&v| i16::from(v)).collect();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let old = buffer[idx];
            let new = if old >= i16::from(DEFAULT_THRESHOLD) { 255 } else { 0 };
            buffer[idx] = new;
            let error = old - new;

            if x + 1 < w {
                buffer[idx + 1] += error * 7 / 16;
            }
            if y + 1 < h {
                if x > 0 {
                    buffer[idx + w - 1] += error * 3 / 16;
                }
                buffer[idx + w] += error * 5 / 16;
                if x + 1 < w {
                    buffer[idx + w + 1] += error / 16;
                }
            }
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        Luma([buffer[y as usize * w + x as usize].clamp(0, 255) as u8])
    })
}

/// Simple threshold conversion without dithering.
///
/// Pixels with values >= `cutoff` become white (255), others black (0).
pub fn threshold_convert(img: &GrayImage, cutoff: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    debug!(width, height, cutoff, "applying threshold conversion");

    GrayImage::from_fn(width, height, |x, y| {
        let val = img.get_pixel(x, y).0[0];
        Luma([if val >= cutoff { 255 } else { 0 }])
    })
}
