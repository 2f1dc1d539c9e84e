//! QR code generation for composition layers.

use image::{GrayImage, Luma};
use qrcode::QrCode;
use tracing::debug;

use crate::{ComposerError, Result};

/// Generate a QR code bitmap for `data`.
///
/// Module blocks are scaled by integer replication toward `target_size`,
/// so the result is at most `target_size` pixels square and stays sharp;
/// callers needing an exact size resize it afterwards.
pub fn generate_qr(data: &str, target_size: u32) -> Result<GrayImage> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| ComposerError::Qr(e.to_string()))?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;

    let scale = (target_size / module_count).max(1);
    let img_size = module_count * scale;
    debug!(module_count, scale, img_size, "generating QR code");

    let mut img = GrayImage::from_pixel(img_size, img_size, Luma([255u8]));
    for (i, color) in modules.iter().enumerate() {
        if *color == qrcode::Color::Dark {
            let x = (i as u32) % module_count;
            let y = (i as u32) / module_count;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(x * scale + dx, y * scale + dy, Luma([0u8]));
                }
            }
        }
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_square_image() {
        let img = generate_qr("https://example.com", 200).unwrap();
        assert!(img.width() > 0);
        assert_eq!(img.width(), img.height());
        assert!(img.width() <= 200);
    }

    #[test]
    fn output_is_binary() {
        let img = generate_qr("test", 100).unwrap();
        assert!(img.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert!(img.pixels().any(|p| p.0[0] == 0));
    }

    #[test]
    fn tiny_target_still_renders_modules() {
        let img = generate_qr("test", 1).unwrap();
        // Scale clamps at 1, one pixel per module
        assert!(img.width() >= 21);
    }
}
