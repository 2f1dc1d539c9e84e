//! Layer model: the visual units composited onto the canvas.
//!
//! A [`Layer`] couples an identifier, a position, and a visibility flag
//! with one of a closed set of payloads ([`LayerKind`]). Each variant
//! renders its own fully-transformed patch; no layer knows about the
//! canvas or other layers.

use std::path::PathBuf;

use image::{GrayImage, Luma, imageops};
use image_ops::{
    DitherMode, ResizeMode, adjust_brightness_contrast, flip, resize, rotate_ccw,
};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BLACK, ComposerError, Result, WHITE, font};

fn default_true() -> bool {
    true
}

fn default_brightness() -> f32 {
    1.0
}

fn default_font_size() -> u32 {
    1
}

fn default_padding() -> u32 {
    2
}

/// One addressable visual unit of a composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(flatten)]
    pub kind: LayerKind,
}

/// Closed set of layer payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    Image(ImageLayer),
    Text(TextLayer),
    Rectangle(RectangleLayer),
}

/// Where an image layer's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// Image file decoded at render time.
    Path(PathBuf),
    /// Raw grayscale pixels, row-major.
    Raw { width: u32, height: u32, pixels: Vec<u8> },
}

impl ImageSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageSource::Path(path.into())
    }

    /// Wrap an in-memory grayscale buffer as a source.
    pub fn from_pixels(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        ImageSource::Raw { width, height, pixels: img.into_raw() }
    }

    fn load(&self) -> Result<GrayImage> {
        match self {
            ImageSource::Path(path) => {
                debug!(path = %path.display(), "loading image source");
                Ok(image::open(path)?.to_luma8())
            }
            ImageSource::Raw { width, height, pixels } => {
                GrayImage::from_raw(*width, *height, pixels.clone()).ok_or_else(|| {
                    ComposerError::Encoding(format!(
                        "raw pixel buffer length {} does not match {}x{}",
                        pixels.len(),
                        width,
                        height
                    ))
                })
            }
        }
    }
}

/// Image layer with geometry and dithering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageLayer {
    pub source: ImageSource,
    #[serde(default)]
    pub resize_mode: ResizeMode,
    #[serde(default)]
    pub dither_mode: DitherMode,
    /// Explicit output width; defaults to the space right of the anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Explicit output height; defaults to the space below the anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Pre-resize rotation in degrees, counter-clockwise: 0, 90, 180 or 270.
    #[serde(default)]
    pub rotate: u32,
    #[serde(default)]
    pub flip_h: bool,
    #[serde(default)]
    pub flip_v: bool,
    /// Crop window x for `crop` mode, on the scaled image. None = center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_x: Option<u32>,
    /// Crop window y for `crop` mode, on the scaled image. None = center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_y: Option<u32>,
    #[serde(default = "default_brightness")]
    pub brightness: f32,
    #[serde(default)]
    pub contrast: f32,
}

impl ImageLayer {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            resize_mode: ResizeMode::default(),
            dither_mode: DitherMode::default(),
            width: None,
            height: None,
            rotate: 0,
            flip_h: false,
            flip_v: false,
            crop_x: None,
            crop_y: None,
            brightness: default_brightness(),
            contrast: 0.0,
        }
    }

    /// Render the patch: rotate, flip, resize, adjust, dither.
    fn render(&self, avail_w: u32, avail_h: u32) -> Result<GrayImage> {
        let mut img = self.source.load()?;

        if self.rotate != 0 {
            img = rotate_ccw(&img, self.rotate / 90);
        }
        if self.flip_h || self.flip_v {
            img = flip(&img, self.flip_h, self.flip_v);
        }

        let target_w = self.width.unwrap_or(avail_w).max(1);
        let target_h = self.height.unwrap_or(avail_h).max(1);
        if img.dimensions() != (target_w, target_h) {
            img = resize(
                &img,
                target_w,
                target_h,
                self.resize_mode,
                WHITE,
                self.crop_x,
                self.crop_y,
            );
        }

        img = adjust_brightness_contrast(&img, self.brightness, self.contrast);
        Ok(self.dither_mode.apply(&img))
    }
}

/// Text layer rendered with the built-in 6x8 bitmap font.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLayer {
    pub text: String,
    /// Ink value: 0 (black) or 255 (white).
    #[serde(default)]
    pub color: u8,
    /// Integer multiplier for the 6x8 glyph cell.
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Rotation in degrees, counter-clockwise; any real value.
    #[serde(default)]
    pub rotate: f32,
    #[serde(default)]
    pub flip_h: bool,
    #[serde(default)]
    pub flip_v: bool,
    /// Draw a padded box of the opposite color behind the text.
    #[serde(default)]
    pub background: bool,
    #[serde(default = "default_padding")]
    pub padding: u32,
}

impl TextLayer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: BLACK,
            font_size: default_font_size(),
            rotate: 0.0,
            flip_h: false,
            flip_v: false,
            background: false,
            padding: default_padding(),
        }
    }

    /// Render the patch: rasterize, flip, pad, rotate.
    ///
    /// Non-ink pixels carry the opposite of the ink color, so stamping the
    /// patch over a matching field leaves only the glyphs visible.
    fn render(&self) -> GrayImage {
        if self.text.is_empty() {
            return GrayImage::new(0, 0);
        }
        let fg = self.color;
        let bg = 255 - self.color;

        let mut img = font::render_text(&self.text, self.font_size, fg, bg);
        if self.flip_h || self.flip_v {
            img = flip(&img, self.flip_h, self.flip_v);
        }
        if self.background && self.padding > 0 {
            let (w, h) = img.dimensions();
            let p = self.padding;
            let mut boxed = GrayImage::from_pixel(w + 2 * p, h + 2 * p, Luma([bg]));
            imageops::replace(&mut boxed, &img, i64::from(p), i64::from(p));
            img = boxed;
        }
        if self.rotate != 0.0 {
            img = font::rotate_any(&img, self.rotate, bg);
        }
        img
    }
}

/// Solid or outlined rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectangleLayer {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_true")]
    pub filled: bool,
    /// Stroke/fill value: 0 (black) or 255 (white).
    #[serde(default)]
    pub color: u8,
}

impl RectangleLayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, filled: true, color: BLACK }
    }

    /// Render the patch: a filled block or a 1-pixel border on the
    /// opposite-color interior.
    fn render(&self) -> GrayImage {
        let mut img = GrayImage::from_pixel(self.width, self.height, Luma([255 - self.color]));
        let rect = Rect::at(0, 0).of_size(self.width, self.height);
        if self.filled {
            draw_filled_rect_mut(&mut img, rect, Luma([self.color]));
        } else {
            draw_hollow_rect_mut(&mut img, rect, Luma([self.color]));
        }
        img
    }
}

impl Layer {
    pub fn new(id: impl Into<String>, kind: LayerKind) -> Self {
        Self { id: id.into(), x: 0, y: 0, visible: true, kind }
    }

    pub fn image(id: impl Into<String>, source: ImageSource) -> Self {
        Self::new(id, LayerKind::Image(ImageLayer::new(source)))
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, LayerKind::Text(TextLayer::new(text)))
    }

    pub fn rectangle(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(id, LayerKind::Rectangle(RectangleLayer::new(width, height)))
    }

    /// Position the layer's top-left anchor on the canvas.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            LayerKind::Image(_) => "image",
            LayerKind::Text(_) => "text",
            LayerKind::Rectangle(_) => "rectangle",
        }
    }

    /// Check every field eagerly; no partially-valid layer is ever stored.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ComposerError::InvalidLayer { id: self.id.clone(), reason };

        if self.id.is_empty() {
            return Err(ComposerError::InvalidLayer {
                id: String::from("<empty>"),
                reason: String::from("layer id must not be empty"),
            });
        }

        match &self.kind {
            LayerKind::Image(l) => {
                if !matches!(l.rotate, 0 | 90 | 180 | 270) {
                    return Err(invalid(format!(
                        "image rotation must be 0, 90, 180 or 270 degrees, got {}",
                        l.rotate
                    )));
                }
                if l.width == Some(0) || l.height == Some(0) {
                    return Err(invalid(String::from("explicit output dimensions must be positive")));
                }
                if l.brightness < 0.0 {
                    return Err(invalid(format!("brightness must be non-negative, got {}", l.brightness)));
                }
                if !(-100.0..=100.0).contains(&l.contrast) {
                    return Err(invalid(format!("contrast must be in -100..=100, got {}", l.contrast)));
                }
                if let ImageSource::Raw { width, height, pixels } = &l.source {
                    if *width == 0 || *height == 0 {
                        return Err(invalid(String::from("raw image dimensions must be positive")));
                    }
                    if pixels.len() != (*width as usize) * (*height as usize) {
                        return Err(invalid(format!(
                            "raw pixel buffer length {} does not match {}x{}",
                            pixels.len(),
                            width,
                            height
                        )));
                    }
                }
            }
            LayerKind::Text(l) => {
                if l.color != BLACK && l.color != WHITE {
                    return Err(invalid(format!("text color must be 0 or 255, got {}", l.color)));
                }
                if l.font_size == 0 {
                    return Err(invalid(String::from("font size must be at least 1")));
                }
            }
            LayerKind::Rectangle(l) => {
                if l.width == 0 || l.height == 0 {
                    return Err(invalid(format!(
                        "rectangle dimensions must be positive, got {}x{}",
                        l.width, l.height
                    )));
                }
                if l.color != BLACK && l.color != WHITE {
                    return Err(invalid(format!("rectangle color must be 0 or 255, got {}", l.color)));
                }
            }
        }
        Ok(())
    }

    /// Produce this layer's rendered patch.
    ///
    /// `avail_w`/`avail_h` is the space from the layer's anchor to the
    /// canvas edge; image layers without explicit dimensions fill it.
    pub fn render(&self, avail_w: u32, avail_h: u32) -> Result<GrayImage> {
        match &self.kind {
            LayerKind::Image(l) => l.render(avail_w, avail_h),
            LayerKind::Text(l) => Ok(l.render()),
            LayerKind::Rectangle(l) => Ok(l.render()),
        }
    }
}
