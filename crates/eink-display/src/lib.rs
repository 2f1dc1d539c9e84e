//! E-ink panel driver abstraction.
//!
//! The composer core never depends on this crate; it only produces
//! buffers a driver can consume. [`EinkDisplay`] is the contract a panel
//! driver implements, and [`SimulatorDisplay`] is a file-backed stand-in
//! for development and tests.

pub mod simulator;

use std::fmt;
use std::str::FromStr;

use image::GrayImage;

pub use simulator::SimulatorDisplay;

/// Panel refresh strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Full refresh: slower, clears ghosting.
    #[default]
    Full,
    /// Partial refresh: fast update of changed regions.
    Partial,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Full => "full",
            DisplayMode::Partial => "partial",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(DisplayMode::Full),
            "partial" => Ok(DisplayMode::Partial),
            other => Err(DisplayError::UnknownMode(other.to_string())),
        }
    }
}

/// Errors that can occur while driving a panel.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("unknown display mode: {0}")]
    UnknownMode(String),

    #[error("invalid image dimensions: expected {expected_w}x{expected_h}, got {actual_w}x{actual_h}")]
    InvalidImageSize {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },

    #[error("packed buffer length mismatch: expected {expected} bytes, got {actual}")]
    PackedSize { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image write error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for display operations.
pub type Result<T> = std::result::Result<T, DisplayError>;

/// Contract implemented by panel drivers.
///
/// Drivers are sinks: they consume finished canvases (or packed 1-bit
/// streams) and never feed anything back into the composition.
pub trait EinkDisplay {
    /// Panel dimensions in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Push a rendered canvas to the panel.
    fn display_image(&mut self, image: &GrayImage, mode: DisplayMode) -> Result<()>;

    /// Push a packed 1-bit stream (row-major, MSB first, 1 = white).
    fn display_packed(&mut self, data: &[u8], mode: DisplayMode) -> Result<()>;

    /// Blank the panel.
    fn clear(&mut self) -> Result<()>;

    /// Put the panel into low-power sleep until the next display call.
    fn sleep(&mut self) -> Result<()>;
}
