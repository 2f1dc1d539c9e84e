//! File-backed panel simulator.
//!
//! Writes each displayed frame as a PNG into an output directory, so
//! compositions can be checked without panel hardware attached.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use tracing::{debug, info};

use crate::{DisplayError, DisplayMode, EinkDisplay, Result};

/// Simulated e-ink panel that persists frames to disk.
#[derive(Debug)]
pub struct SimulatorDisplay {
    width: u32,
    height: u32,
    output_dir: PathBuf,
    frame: u32,
    asleep: bool,
}

impl SimulatorDisplay {
    /// Create a simulator for a `width` x `height` panel writing frames
    /// into `output_dir` (created if missing).
    pub fn new(width: u32, height: u32, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { width, height, output_dir, frame: 0, asleep: false })
    }

    /// Number of frames displayed so far.
    pub fn frame_count(&self) -> u32 {
        self.frame
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Path the next frame will be written to.
    pub fn next_frame_path(&self) -> PathBuf {
        self.output_dir.join(format!("frame-{:04}.png", self.frame))
    }

    fn write_frame(&mut self, image: &GrayImage, mode: DisplayMode) -> Result<PathBuf> {
        let path = self.next_frame_path();
        image.save_with_format(&path, image::ImageFormat::Png)?;
        info!(path = %path.display(), mode = %mode, "simulated panel refresh");
        self.frame += 1;
        self.asleep = false;
        Ok(path)
    }

    /// Unpack a 1-bit stream (MSB first, 1 = white) into pixels.
    fn unpack(&self, data: &[u8]) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let idx = (y * self.width + x) as usize;
            let bit = data[idx / 8] >> (7 - idx % 8) & 1;
            Luma([if bit == 1 { 255 } else { 0 }])
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl EinkDisplay for SimulatorDisplay {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn display_image(&mut self, image: &GrayImage, mode: DisplayMode) -> Result<()> {
        let (w, h) = image.dimensions();
        if (w, h) != (self.width, self.height) {
            return Err(DisplayError::InvalidImageSize {
                expected_w: self.width,
                expected_h: self.height,
                actual_w: w,
                actual_h: h,
            });
        }
        self.write_frame(image, mode)?;
        Ok(())
    }

    fn display_packed(&mut self, data: &[u8], mode: DisplayMode) -> Result<()> {
        let expected = (self.width as usize * self.height as usize).div_ceil(8);
        if data.len() != expected {
            return Err(DisplayError::PackedSize { expected, actual: data.len() });
        }
        let image = self.unpack(data);
        self.write_frame(&image, mode)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        debug!("clearing simulated panel");
        let blank = GrayImage::from_pixel(self.width, self.height, Luma([255]));
        self.write_frame(&blank, DisplayMode::Full)?;
        Ok(())
    }

    fn sleep(&mut self) -> Result<()> {
        debug!("simulated panel entering sleep");
        self.asleep = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("eink-sim-test-{tag}-{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn display_image_writes_frames_in_sequence() {
        let dir = temp_dir("frames");
        let mut sim = SimulatorDisplay::new(16, 8, &dir).unwrap();
        let img = GrayImage::from_pixel(16, 8, Luma([0]));

        sim.display_image(&img, DisplayMode::Full).unwrap();
        sim.display_image(&img, DisplayMode::Partial).unwrap();

        assert_eq!(sim.frame_count(), 2);
        assert!(dir.join("frame-0000.png").exists());
        assert!(dir.join("frame-0001.png").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn wrong_dimensions_are_rejected() {
        let dir = temp_dir("dims");
        let mut sim = SimulatorDisplay::new(16, 8, &dir).unwrap();
        let img = GrayImage::new(8, 8);

        let err = sim.display_image(&img, DisplayMode::Full);
        assert!(matches!(err, Err(DisplayError::InvalidImageSize { .. })));
        assert_eq!(sim.frame_count(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn packed_stream_round_trips_through_panel() {
        let dir = temp_dir("packed");
        let mut sim = SimulatorDisplay::new(8, 2, &dir).unwrap();

        // Row 0 all white, row 1 all black
        sim.display_packed(&[0xFF, 0x00], DisplayMode::Full).unwrap();
        assert_eq!(sim.frame_count(), 1);

        let frame = image::open(dir.join("frame-0000.png")).unwrap().to_luma8();
        assert_eq!(frame.get_pixel(0, 0).0[0], 255);
        assert_eq!(frame.get_pixel(0, 1).0[0], 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn packed_length_mismatch_is_rejected() {
        let dir = temp_dir("len");
        let mut sim = SimulatorDisplay::new(8, 2, &dir).unwrap();
        let err = sim.display_packed(&[0xFF], DisplayMode::Full);
        assert!(matches!(err, Err(DisplayError::PackedSize { .. })));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn sleep_state_clears_on_next_frame() {
        let dir = temp_dir("sleep");
        let mut sim = SimulatorDisplay::new(4, 2, &dir).unwrap();
        sim.sleep().unwrap();
        assert!(sim.is_asleep());

        sim.display_image(&GrayImage::new(4, 2), DisplayMode::Full).unwrap();
        assert!(!sim.is_asleep());
        std::fs::remove_dir_all(&dir).ok();
    }
}
