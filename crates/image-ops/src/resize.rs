//! Image resizing for panel layout.
//!
//! Three modes: stretch to exact dimensions, fit within bounds on a
//! background, or scale-to-cover and crop. Resampling is nearest-neighbor
//! so axis-aligned integer scale factors reproduce pixels exactly.

use std::fmt;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ParseModeError;

/// Policy governing how a source image maps onto a target size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeMode {
    /// Scale to exact dimensions; may distort aspect ratio.
    Stretch,
    /// Scale to fit within bounds, centered on a background fill.
    #[default]
    Fit,
    /// Scale to cover the bounds, then crop to the target window.
    Crop,
}

impl ResizeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ResizeMode::Stretch => "stretch",
            ResizeMode::Fit => "fit",
            ResizeMode::Crop => "crop",
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stretch" => Ok(ResizeMode::Stretch),
            "fit" => Ok(ResizeMode::Fit),
            "crop" => Ok(ResizeMode::Crop),
            other => Err(ParseModeError::new("resize", other)),
        }
    }
}

/// Resize an image to (`target_w`, `target_h`) according to `mode`.
///
/// `bg` fills the letterbox area in `fit` mode. `crop_x`/`crop_y` position
/// the crop window in `crop` mode, measured on the scaled image; `None`
/// centers the window on that axis, and explicit values are clamped so the
/// window stays within the scaled bounds.
pub fn resize(
    img: &GrayImage,
    target_w: u32,
    target_h: u32,
    mode: ResizeMode,
    bg: u8,
    crop_x: Option<u32>,
    crop_y: Option<u32>,
) -> GrayImage {
    let (orig_w, orig_h) = img.dimensions();
    let target_w = target_w.max(1);
    let target_h = target_h.max(1);
    debug!(orig_w, orig_h, target_w, target_h, mode = %mode, "resizing image");

    match mode {
        ResizeMode::Stretch => imageops::resize(img, target_w, target_h, FilterType::Nearest),
        ResizeMode::Fit => {
            let ratio = (f64::from(target_w) / f64::from(orig_w))
                .min(f64::from(target_h) / f64::from(orig_h));
            let new_w = ((f64::from(orig_w) * ratio).round() as u32).clamp(1, target_w);
            let new_h = ((f64::from(orig_h) * ratio).round() as u32).clamp(1, target_h);
            let scaled = imageops::resize(img, new_w, new_h, FilterType::Nearest);

            let mut result = GrayImage::from_pixel(target_w, target_h, Luma([bg]));
            let x = (target_w - new_w) / 2;
            let y = (target_h - new_h) / 2;
            imageops::replace(&mut result, &scaled, i64::from(x), i64::from(y));
            result
        }
        ResizeMode::Crop => {
            let img_ratio = f64::from(orig_w) / f64::from(orig_h);
            let target_ratio = f64::from(target_w) / f64::from(target_h);

            let (new_w, new_h) = if img_ratio > target_ratio {
                // Image is wider: fit to height, overflow horizontally
                let h = target_h;
                let w = (f64::from(target_h) * img_ratio) as u32;
                (w.max(target_w), h)
            } else {
                // Image is taller: fit to width, overflow vertically
                let w = target_w;
                let h = (f64::from(target_w) / img_ratio) as u32;
                (w, h.max(target_h))
            };

            let scaled = imageops::resize(img, new_w, new_h, FilterType::Nearest);

            let x = match crop_x {
                Some(x) => x.min(new_w - target_w),
                None => (new_w - target_w) / 2,
            };
            let y = match crop_y {
                Some(y) => y.min(new_h - target_h),
                None => (new_h - target_h) / 2,
            };

            imageops::crop_imm(&scaled, x, y, target_w, target_h).to_image()
        }
    }
}
