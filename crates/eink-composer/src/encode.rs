//! Output encoders: the packed 1-bit panel stream and raster writers.
//!
//! The binary format is row-major, 8 pixels per byte, MSB first, with
//! bit 1 = white (pixel >= 128) and bit 0 = black. There is no row
//! padding, so the pixel count must be a multiple of 8.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::{GrayImage, ImageFormat, Luma};
use image_ops::threshold_convert;
use tracing::debug;

use crate::{ComposerError, Result};

/// Cutoff between "black" and "white" when packing bits.
const PACK_THRESHOLD: u8 = 128;

/// File format for saved renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Png,
    Bmp,
    Binary,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Binary => "binary",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "png" => Ok(OutputFormat::Png),
            "bmp" => Ok(OutputFormat::Bmp),
            "binary" | "bin" => Ok(OutputFormat::Binary),
            other => Err(ComposerError::Encoding(format!("unknown output format: {other}"))),
        }
    }
}

/// Pack a grayscale canvas into the panel's 1-bit wire format.
///
/// Fails if `width * height` is not a multiple of 8; the panel protocol
/// has no padding slot, so partial bytes cannot be represented.
pub fn pack_bits(img: &GrayImage) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    let total = width as usize * height as usize;
    if total % 8 != 0 {
        return Err(ComposerError::Encoding(format!(
            "pixel count {total} ({width}x{height}) is not a multiple of 8"
        )));
    }
    debug!(width, height, bytes = total / 8, "packing canvas bits");

    let mut out = Vec::with_capacity(total / 8);
    for chunk in img.as_raw().chunks(8) {
        let mut byte = 0u8;
        for (bit, &px) in chunk.iter().enumerate() {
            if px >= PACK_THRESHOLD {
                byte |= 0x80 >> bit;
            }
        }
        out.push(byte);
    }
    Ok(out)
}

/// Unpack a 1-bit panel stream back into a {0, 255} grayscale buffer.
pub fn unpack_bits(data: &[u8], width: u32, height: u32) -> Result<GrayImage> {
    let total = width as usize * height as usize;
    if total % 8 != 0 {
        return Err(ComposerError::Encoding(format!(
            "pixel count {total} ({width}x{height}) is not a multiple of 8"
        )));
    }
    if data.len() != total / 8 {
        return Err(ComposerError::Encoding(format!(
            "packed length {} does not match {}x{} (expected {} bytes)",
            data.len(),
            width,
            height,
            total / 8
        )));
    }

    Ok(GrayImage::from_fn(width, height, |x, y| {
        let idx = (y * width + x) as usize;
        let bit = data[idx / 8] >> (7 - idx % 8) & 1;
        Luma([if bit == 1 { 255 } else { 0 }])
    }))
}

/// Write a canvas to a raster image file.
///
/// PNG keeps the full 8-bit grayscale range. BMP is binarized first,
/// since the panel formats it feeds are strictly monochrome.
pub fn save_image(path: impl AsRef<Path>, img: &GrayImage, format: OutputFormat) -> Result<()> {
    let path = path.as_ref();
    match format {
        OutputFormat::Png => img.save_with_format(path, ImageFormat::Png)?,
        OutputFormat::Bmp => {
            threshold_convert(img, PACK_THRESHOLD).save_with_format(path, ImageFormat::Bmp)?
        }
        OutputFormat::Binary => {
            return Err(ComposerError::Encoding(String::from(
                "binary format is not a raster image",
            )));
        }
    }
    Ok(())
}
