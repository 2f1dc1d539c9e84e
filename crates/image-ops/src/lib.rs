//! Grayscale image operations for e-ink panel output.
//!
//! Provides dithering (Floyd-Steinberg and threshold), resizing
//! (stretch/fit/crop), quarter-turn rotation, axis flips, and
//! brightness/contrast adjustment. All operations are pure: the input
//! buffer is never mutated.

pub mod adjust;
pub mod dither;
pub mod resize;
pub mod rotate;

// Re-exports for convenience
pub use adjust::{adjust_brightness_contrast, invert};
pub use dither::{DitherMode, floyd_steinberg_dither, threshold_convert};
pub use resize::{ResizeMode, resize};
pub use rotate::{flip, rotate_ccw};

/// Error returned when parsing a mode name from a string fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind} mode: {value}")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
}

impl ParseModeError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}
