//! Layered composition for monochrome e-ink panels.
//!
//! An [`EinkComposer`] owns a fixed-size grayscale canvas and an ordered
//! set of layers (images, text, rectangles). Rendering composites the
//! layers in insertion order, applies optional canvas-level transforms and
//! a final dithering pass, and the result can be encoded as a raster image
//! or as the packed 1-bit-per-pixel stream the panel consumes.

pub mod composer;
pub mod encode;
pub mod font;
pub mod layer;
pub mod qr;
pub mod template;

// Re-exports for convenience
pub use composer::{CanvasTransform, EinkComposer, LayerSummary, LayerUpdate, RenderOptions};
pub use encode::{OutputFormat, pack_bits, unpack_bits};
pub use layer::{ImageLayer, ImageSource, Layer, LayerKind, RectangleLayer, TextLayer};
pub use template::Template;

/// Pixel value for black ink.
pub const BLACK: u8 = 0;

/// Pixel value for white / unlit panel background.
pub const WHITE: u8 = 255;

/// Errors that can occur while building or rendering a composition.
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("duplicate layer id: {0}")]
    DuplicateLayer(String),

    #[error("unknown layer id: {0}")]
    UnknownLayer(String),

    #[error("invalid layer {id}: {reason}")]
    InvalidLayer { id: String, reason: String },

    #[error("image source error: {0}")]
    ImageSource(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(#[from] serde_json::Error),

    #[error("QR encode error: {0}")]
    Qr(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Result type alias for composer operations.
pub type Result<T> = std::result::Result<T, ComposerError>;
