//! The composer: canvas ownership, layer management, and the render
//! pipeline.
//!
//! Layers live in an explicit insertion-order vector (the z-order) with a
//! separate id-to-position map for O(1) lookup. The canvas is scratch
//! state: it is rebuilt from the background up on every render.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::{GrayImage, Luma, imageops};
use image_ops::{DitherMode, ResizeMode, flip, invert, rotate_ccw};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::encode::{self, OutputFormat};
use crate::layer::{Layer, LayerKind};
use crate::qr;
use crate::{ComposerError, ImageSource, Result, WHITE};

/// Whole-canvas transformation applied after compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanvasTransform {
    FlipH,
    FlipV,
    /// 90 degrees counter-clockwise; swaps the output dimensions.
    #[serde(rename = "rotate-90")]
    Rotate90,
    /// v -> 255 - v.
    Invert,
}

impl CanvasTransform {
    pub fn as_str(self) -> &'static str {
        match self {
            CanvasTransform::FlipH => "flip-h",
            CanvasTransform::FlipV => "flip-v",
            CanvasTransform::Rotate90 => "rotate-90",
            CanvasTransform::Invert => "invert",
        }
    }
}

impl fmt::Display for CanvasTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanvasTransform {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flip-h" => Ok(CanvasTransform::FlipH),
            "flip-v" => Ok(CanvasTransform::FlipV),
            "rotate-90" => Ok(CanvasTransform::Rotate90),
            "invert" => Ok(CanvasTransform::Invert),
            other => Err(ComposerError::Encoding(format!("unknown canvas transform: {other}"))),
        }
    }
}

/// Options for a render pass.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Value the canvas is reset to before compositing.
    pub background_color: u8,
    /// Optional whole-canvas dithering pass, applied last.
    pub final_dither: Option<DitherMode>,
    /// Canvas transformations, applied in listed order after compositing.
    pub transformations: Vec<CanvasTransform>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { background_color: WHITE, final_dither: None, transformations: Vec::new() }
    }
}

/// Partial update for a stored layer. Unset fields keep their value;
/// fields that don't apply to the layer's kind are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerUpdate {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub visible: Option<bool>,
    pub text: Option<String>,
    pub color: Option<u8>,
    pub font_size: Option<u32>,
    pub rotate: Option<f32>,
    pub flip_h: Option<bool>,
    pub flip_v: Option<bool>,
    pub background: Option<bool>,
    pub padding: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub filled: Option<bool>,
    pub resize_mode: Option<ResizeMode>,
    pub dither_mode: Option<DitherMode>,
    pub crop_x: Option<u32>,
    pub crop_y: Option<u32>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
}

impl LayerUpdate {
    fn apply(&self, layer: &mut Layer) {
        if let Some(x) = self.x {
            layer.x = x;
        }
        if let Some(y) = self.y {
            layer.y = y;
        }
        if let Some(visible) = self.visible {
            layer.visible = visible;
        }

        match &mut layer.kind {
            LayerKind::Image(l) => {
                if let Some(rotate) = self.rotate {
                    l.rotate = rotate as u32;
                }
                if let Some(flip_h) = self.flip_h {
                    l.flip_h = flip_h;
                }
                if let Some(flip_v) = self.flip_v {
                    l.flip_v = flip_v;
                }
                if let Some(width) = self.width {
                    l.width = Some(width);
                }
                if let Some(height) = self.height {
                    l.height = Some(height);
                }
                if let Some(mode) = self.resize_mode {
                    l.resize_mode = mode;
                }
                if let Some(mode) = self.dither_mode {
                    l.dither_mode = mode;
                }
                if let Some(crop_x) = self.crop_x {
                    l.crop_x = Some(crop_x);
                }
                if let Some(crop_y) = self.crop_y {
                    l.crop_y = Some(crop_y);
                }
                if let Some(brightness) = self.brightness {
                    l.brightness = brightness;
                }
                if let Some(contrast) = self.contrast {
                    l.contrast = contrast;
                }
            }
            LayerKind::Text(l) => {
                if let Some(ref text) = self.text {
                    l.text = text.clone();
                }
                if let Some(color) = self.color {
                    l.color = color;
                }
                if let Some(font_size) = self.font_size {
                    l.font_size = font_size;
                }
                if let Some(rotate) = self.rotate {
                    l.rotate = rotate;
                }
                if let Some(flip_h) = self.flip_h {
                    l.flip_h = flip_h;
                }
                if let Some(flip_v) = self.flip_v {
                    l.flip_v = flip_v;
                }
                if let Some(background) = self.background {
                    l.background = background;
                }
                if let Some(padding) = self.padding {
                    l.padding = padding;
                }
            }
            LayerKind::Rectangle(l) => {
                if let Some(width) = self.width {
                    l.width = width;
                }
                if let Some(height) = self.height {
                    l.height = height;
                }
                if let Some(filled) = self.filled {
                    l.filled = filled;
                }
                if let Some(color) = self.color {
                    l.color = color;
                }
            }
        }
    }
}

/// Serializable summary of one layer, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    pub id: String,
    pub kind: &'static str,
    pub visible: bool,
    pub x: i32,
    pub y: i32,
    pub detail: String,
}

/// E-ink display composer: a fixed-size canvas plus an ordered layer set.
#[derive(Debug, Clone)]
pub struct EinkComposer {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    index: HashMap<String, usize>,
}

impl EinkComposer {
    /// Create a composer for a panel of the given dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ComposerError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height, layers: Vec::new(), index: HashMap::new() })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Add a layer on top of the stack. Fails on a duplicate id or an
    /// invalid layer; nothing is stored on failure.
    pub fn add_layer(&mut self, layer: Layer) -> Result<()> {
        layer.validate()?;
        if self.index.contains_key(&layer.id) {
            return Err(ComposerError::DuplicateLayer(layer.id.clone()));
        }
        info!(id = %layer.id, kind = layer.kind_name(), "adding layer");
        self.index.insert(layer.id.clone(), self.layers.len());
        self.layers.push(layer);
        Ok(())
    }

    /// Add an image layer backed by a file path.
    pub fn add_image_layer(&mut self, id: &str, path: impl AsRef<Path>, x: i32, y: i32) -> Result<()> {
        self.add_layer(Layer::image(id, ImageSource::path(path.as_ref())).at(x, y))
    }

    /// Add an image layer backed by in-memory grayscale pixels.
    pub fn add_raw_image_layer(&mut self, id: &str, pixels: GrayImage, x: i32, y: i32) -> Result<()> {
        self.add_layer(Layer::image(id, ImageSource::from_pixels(pixels)).at(x, y))
    }

    /// Add a text layer with the given ink color.
    pub fn add_text_layer(&mut self, id: &str, text: &str, x: i32, y: i32, color: u8) -> Result<()> {
        let mut layer = Layer::text(id, text).at(x, y);
        if let LayerKind::Text(ref mut t) = layer.kind {
            t.color = color;
        }
        self.add_layer(layer)
    }

    /// Add a rectangle layer.
    pub fn add_rectangle_layer(
        &mut self,
        id: &str,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        filled: bool,
        color: u8,
    ) -> Result<()> {
        let mut layer = Layer::rectangle(id, width, height).at(x, y);
        if let LayerKind::Rectangle(ref mut r) = layer.kind {
            r.filled = filled;
            r.color = color;
        }
        self.add_layer(layer)
    }

    /// Generate a QR code for `data` and add it as a raw image layer of
    /// `size` x `size` pixels.
    pub fn add_qr_layer(&mut self, id: &str, data: &str, size: u32, x: i32, y: i32) -> Result<()> {
        let code = qr::generate_qr(data, size)?;
        let exact = image_ops::resize(&code, size, size, ResizeMode::Stretch, WHITE, None, None);
        let mut layer = Layer::image(id, ImageSource::from_pixels(exact)).at(x, y);
        if let LayerKind::Image(ref mut l) = layer.kind {
            l.width = Some(size);
            l.height = Some(size);
            l.resize_mode = ResizeMode::Stretch;
            // Module blocks are already binary; leave them untouched
            l.dither_mode = DitherMode::None;
        }
        self.add_layer(layer)
    }

    /// Remove a layer; later layers keep their relative order.
    pub fn remove_layer(&mut self, id: &str) -> Result<()> {
        let idx = self
            .index
            .remove(id)
            .ok_or_else(|| ComposerError::UnknownLayer(id.to_string()))?;
        self.layers.remove(idx);
        for (i, layer) in self.layers.iter().enumerate().skip(idx) {
            self.index.insert(layer.id.clone(), i);
        }
        info!(id, "removed layer");
        Ok(())
    }

    /// Flip a layer's visibility; returns the new state.
    pub fn toggle_layer(&mut self, id: &str) -> Result<bool> {
        let idx = self.lookup(id)?;
        let layer = &mut self.layers[idx];
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    /// Update fields of the named layer. The update is validated against
    /// a copy first, so a rejected update leaves the layer untouched.
    pub fn update_layer(&mut self, id: &str, update: &LayerUpdate) -> Result<()> {
        let idx = self.lookup(id)?;
        let mut candidate = self.layers[idx].clone();
        update.apply(&mut candidate);
        candidate.validate()?;
        self.layers[idx] = candidate;
        Ok(())
    }

    pub fn get_layer(&self, id: &str) -> Option<&Layer> {
        self.index.get(id).map(|&idx| &self.layers[idx])
    }

    /// Summaries of all layers, bottom to top.
    pub fn get_layer_info(&self) -> Vec<LayerSummary> {
        self.layers
            .iter()
            .map(|layer| {
                let detail = match &layer.kind {
                    LayerKind::Image(l) => {
                        let source = match &l.source {
                            ImageSource::Path(p) => p.display().to_string(),
                            ImageSource::Raw { width, height, .. } => {
                                format!("raw {width}x{height}")
                            }
                        };
                        format!("{source}, {}, dither {}", l.resize_mode, l.dither_mode)
                    }
                    LayerKind::Text(l) => format!("\"{}\" x{}", l.text, l.font_size),
                    LayerKind::Rectangle(l) => format!(
                        "{}x{} {}",
                        l.width,
                        l.height,
                        if l.filled { "filled" } else { "outline" }
                    ),
                };
                LayerSummary {
                    id: layer.id.clone(),
                    kind: layer.kind_name(),
                    visible: layer.visible,
                    x: layer.x,
                    y: layer.y,
                    detail,
                }
            })
            .collect()
    }

    /// Discard all layers. Not reversible.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.index.clear();
    }

    fn lookup(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| ComposerError::UnknownLayer(id.to_string()))
    }

    /// Render all visible layers to a fresh canvas.
    ///
    /// A composition with no (visible) layers renders a plain
    /// background-colored canvas; it is not an error.
    pub fn render(&self, opts: &RenderOptions) -> Result<GrayImage> {
        debug!(
            width = self.width,
            height = self.height,
            layers = self.layers.len(),
            "rendering composition"
        );
        let mut canvas =
            GrayImage::from_pixel(self.width, self.height, Luma([opts.background_color]));

        for layer in &self.layers {
            if !layer.visible {
                continue;
            }
            // Space from the anchor to the bottom-right canvas edge; a
            // negative anchor widens it, clipping happens at blit time.
            let avail_w = (i64::from(self.width) - i64::from(layer.x)).max(1) as u32;
            let avail_h = (i64::from(self.height) - i64::from(layer.y)).max(1) as u32;
            let patch = layer.render(avail_w, avail_h)?;
            if patch.width() == 0 || patch.height() == 0 {
                continue;
            }
            imageops::replace(&mut canvas, &patch, i64::from(layer.x), i64::from(layer.y));
        }

        for transform in &opts.transformations {
            canvas = match transform {
                CanvasTransform::FlipH => flip(&canvas, true, false),
                CanvasTransform::FlipV => flip(&canvas, false, true),
                CanvasTransform::Rotate90 => rotate_ccw(&canvas, 1),
                CanvasTransform::Invert => invert(&canvas),
            };
        }

        if let Some(mode) = opts.final_dither {
            canvas = mode.apply(&canvas);
        }
        Ok(canvas)
    }

    /// Render and pack into the panel's 1-bit wire format.
    pub fn render_binary(&self, opts: &RenderOptions) -> Result<Vec<u8>> {
        let canvas = self.render(opts)?;
        encode::pack_bits(&canvas)
    }

    /// Render and write to a file in the given format.
    pub fn save(&self, path: impl AsRef<Path>, format: OutputFormat, opts: &RenderOptions) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), format = %format, "saving composition");
        match format {
            OutputFormat::Binary => {
                let data = self.render_binary(opts)?;
                std::fs::write(path, data)?;
                Ok(())
            }
            OutputFormat::Png | OutputFormat::Bmp => {
                let canvas = self.render(opts)?;
                encode::save_image(path, &canvas, format)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            Luma([((x + y) * 255 / (width + height - 2)) as u8])
        })
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            EinkComposer::new(0, 100),
            Err(ComposerError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn empty_composition_renders_background() {
        let composer = EinkComposer::new(10, 10).unwrap();
        let canvas = composer.render(&RenderOptions::default()).unwrap();
        assert_eq!(canvas.dimensions(), (10, 10));
        assert!(canvas.pixels().all(|p| p.0[0] == 255));

        let black = composer
            .render(&RenderOptions { background_color: 0, ..Default::default() })
            .unwrap();
        assert!(black.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn hidden_layers_do_not_draw() {
        let mut composer = EinkComposer::new(10, 10).unwrap();
        composer.add_rectangle_layer("r", 0, 0, 10, 10, true, 0).unwrap();
        composer.toggle_layer("r").unwrap();
        let canvas = composer.render(&RenderOptions::default()).unwrap();
        assert!(canvas.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn later_layers_draw_on_top() {
        let mut composer = EinkComposer::new(20, 20).unwrap();
        composer.add_rectangle_layer("a", 0, 0, 10, 10, true, 0).unwrap();
        composer.add_rectangle_layer("b", 5, 5, 10, 10, true, 255).unwrap();
        let canvas = composer.render(&RenderOptions::default()).unwrap();

        // Every pixel of the overlap carries B's color
        for y in 5..10 {
            for x in 5..10 {
                assert_eq!(canvas.get_pixel(x, y).0[0], 255, "overlap at ({x}, {y})");
            }
        }
        // Non-overlapped part of A is untouched
        assert_eq!(canvas.get_pixel(2, 2).0[0], 0);
    }

    #[test]
    fn negative_position_clips_patch() {
        let mut composer = EinkComposer::new(8, 8).unwrap();
        composer.add_rectangle_layer("r", -4, -4, 8, 8, true, 0).unwrap();
        let canvas = composer.render(&RenderOptions::default()).unwrap();

        assert_eq!(canvas.get_pixel(0, 0).0[0], 0);
        assert_eq!(canvas.get_pixel(3, 3).0[0], 0);
        assert_eq!(canvas.get_pixel(4, 4).0[0], 255);
    }

    #[test]
    fn overflow_position_clips_patch() {
        let mut composer = EinkComposer::new(8, 8).unwrap();
        composer.add_rectangle_layer("r", 6, 6, 10, 10, true, 0).unwrap();
        let canvas = composer.render(&RenderOptions::default()).unwrap();

        assert_eq!(canvas.get_pixel(7, 7).0[0], 0);
        assert_eq!(canvas.get_pixel(5, 5).0[0], 255);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut composer = EinkComposer::new(10, 10).unwrap();
        composer.add_rectangle_layer("r", 0, 0, 2, 2, true, 0).unwrap();
        let err = composer.add_rectangle_layer("r", 1, 1, 2, 2, true, 0);
        assert!(matches!(err, Err(ComposerError::DuplicateLayer(_))));
        assert_eq!(composer.layer_count(), 1);
    }

    #[test]
    fn update_unknown_id_is_rejected() {
        let mut composer = EinkComposer::new(10, 10).unwrap();
        let update = LayerUpdate { x: Some(3), ..Default::default() };
        assert!(matches!(
            composer.update_layer("ghost", &update),
            Err(ComposerError::UnknownLayer(_))
        ));
    }

    #[test]
    fn update_mutates_only_named_layer() {
        let mut composer = EinkComposer::new(30, 30).unwrap();
        composer.add_text_layer("a", "A", 1, 1, 0).unwrap();
        composer.add_text_layer("b", "B", 2, 2, 0).unwrap();

        let update = LayerUpdate {
            x: Some(9),
            text: Some(String::from("Z")),
            ..Default::default()
        };
        composer.update_layer("b", &update).unwrap();

        let a = composer.get_layer("a").unwrap();
        assert_eq!(a.x, 1);
        assert!(matches!(a.kind, LayerKind::Text(ref t) if t.text == "A"));

        let b = composer.get_layer("b").unwrap();
        assert_eq!(b.x, 9);
        assert!(matches!(b.kind, LayerKind::Text(ref t) if t.text == "Z"));
    }

    #[test]
    fn rejected_update_leaves_layer_untouched() {
        let mut composer = EinkComposer::new(30, 30).unwrap();
        composer.add_text_layer("t", "HI", 0, 0, 0).unwrap();

        let update = LayerUpdate { color: Some(7), x: Some(5), ..Default::default() };
        assert!(composer.update_layer("t", &update).is_err());

        let layer = composer.get_layer("t").unwrap();
        assert_eq!(layer.x, 0);
        assert!(matches!(layer.kind, LayerKind::Text(ref t) if t.color == 0));
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut composer = EinkComposer::new(30, 30).unwrap();
        composer.add_text_layer("a", "A", 0, 0, 0).unwrap();
        composer.add_text_layer("b", "B", 0, 0, 0).unwrap();
        composer.add_text_layer("c", "C", 0, 0, 0).unwrap();

        composer.remove_layer("b").unwrap();
        assert_eq!(composer.layer_count(), 2);
        assert!(matches!(
            composer.remove_layer("b"),
            Err(ComposerError::UnknownLayer(_))
        ));

        // "c" is still addressable after reindexing
        let update = LayerUpdate { y: Some(7), ..Default::default() };
        composer.update_layer("c", &update).unwrap();
        assert_eq!(composer.get_layer("c").unwrap().y, 7);
    }

    #[test]
    fn text_over_filled_rectangle_scenario() {
        let mut composer = EinkComposer::new(128, 250).unwrap();
        composer.add_rectangle_layer("bg", 0, 0, 128, 250, true, 0).unwrap();
        composer.add_text_layer("hi", "HI", 20, 120, 255).unwrap();

        let canvas = composer.render(&RenderOptions::default()).unwrap();

        let (tw, th) = font::measure_text("HI", 1);
        for y in 0..250u32 {
            for x in 0..128u32 {
                let in_text = (20..20 + tw).contains(&x) && (120..120 + th).contains(&y);
                if !in_text {
                    assert_eq!(canvas.get_pixel(x, y).0[0], 0, "background at ({x}, {y})");
                }
            }
        }

        // Glyph ink positions carry the text color
        for (i, ch) in "HI".chars().enumerate() {
            let rows = font::glyph(ch);
            for cy in 0..8u32 {
                for cx in 0..6u32 {
                    if rows[cy as usize] >> (5 - cx) & 1 == 1 {
                        let px = 20 + i as u32 * 6 + cx;
                        let py = 120 + cy;
                        assert_eq!(canvas.get_pixel(px, py).0[0], 255, "ink at ({px}, {py})");
                    }
                }
            }
        }
    }

    #[test]
    fn rotate_transform_swaps_output_dimensions() {
        let composer = EinkComposer::new(20, 10).unwrap();
        let opts = RenderOptions {
            transformations: vec![CanvasTransform::Rotate90],
            ..Default::default()
        };
        let canvas = composer.render(&opts).unwrap();
        assert_eq!(canvas.dimensions(), (10, 20));
    }

    #[test]
    fn invert_transform_flips_values() {
        let mut composer = EinkComposer::new(4, 4).unwrap();
        composer.add_rectangle_layer("r", 0, 0, 4, 4, true, 0).unwrap();
        let opts = RenderOptions {
            transformations: vec![CanvasTransform::Invert],
            ..Default::default()
        };
        let canvas = composer.render(&opts).unwrap();
        assert!(canvas.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn transforms_apply_in_listed_order() {
        let mut composer = EinkComposer::new(4, 2).unwrap();
        composer.add_rectangle_layer("r", 0, 0, 1, 1, true, 0).unwrap();

        // flip-h moves the ink to (3,0); rotate-90 CCW then maps it to (0,0)
        let opts = RenderOptions {
            transformations: vec![CanvasTransform::FlipH, CanvasTransform::Rotate90],
            ..Default::default()
        };
        let canvas = composer.render(&opts).unwrap();
        assert_eq!(canvas.dimensions(), (2, 4));
        assert_eq!(canvas.get_pixel(0, 0).0[0], 0);

        // Reversed order: rotate-90 CCW maps (0,0) to (0,3); flip-h then
        // moves it to (1,3) - a different pixel, so order matters
        let opts = RenderOptions {
            transformations: vec![CanvasTransform::Rotate90, CanvasTransform::FlipH],
            ..Default::default()
        };
        let canvas = composer.render(&opts).unwrap();
        assert_eq!(canvas.dimensions(), (2, 4));
        assert_eq!(canvas.get_pixel(1, 3).0[0], 0);
    }

    #[test]
    fn final_dither_binarizes_canvas() {
        let mut composer = EinkComposer::new(16, 16).unwrap();
        composer.add_raw_image_layer("g", gradient(16, 16), 0, 0).unwrap();
        let update = LayerUpdate {
            dither_mode: Some(DitherMode::None),
            resize_mode: Some(ResizeMode::Stretch),
            ..Default::default()
        };
        composer.update_layer("g", &update).unwrap();

        let opts = RenderOptions {
            final_dither: Some(DitherMode::FloydSteinberg),
            ..Default::default()
        };
        let canvas = composer.render(&opts).unwrap();
        assert!(canvas.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn render_binary_packs_whole_canvas() {
        let mut composer = EinkComposer::new(16, 4).unwrap();
        composer.add_rectangle_layer("r", 0, 0, 16, 4, true, 255).unwrap();
        let data = composer.render_binary(&RenderOptions::default()).unwrap();
        assert_eq!(data.len(), 16 * 4 / 8);
        assert!(data.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn qr_layer_composites_as_image() {
        let mut composer = EinkComposer::new(64, 64).unwrap();
        composer.add_qr_layer("qr", "https://example.com", 48, 8, 8).unwrap();

        let layer = composer.get_layer("qr").unwrap();
        assert_eq!(layer.kind_name(), "image");

        let canvas = composer.render(&RenderOptions::default()).unwrap();
        // QR modules put some black ink inside the window
        assert!(canvas.pixels().any(|p| p.0[0] == 0));
    }

    #[test]
    fn layer_info_reports_in_z_order() {
        let mut composer = EinkComposer::new(30, 30).unwrap();
        composer.add_rectangle_layer("bottom", 0, 0, 5, 5, true, 0).unwrap();
        composer.add_text_layer("top", "X", 1, 1, 0).unwrap();

        let info = composer.get_layer_info();
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].id, "bottom");
        assert_eq!(info[0].kind, "rectangle");
        assert_eq!(info[1].id, "top");
        assert_eq!(info[1].kind, "text");
    }

    #[test]
    fn clear_discards_all_layers() {
        let mut composer = EinkComposer::new(10, 10).unwrap();
        composer.add_text_layer("t", "X", 0, 0, 0).unwrap();
        composer.clear();
        assert!(composer.is_empty());
        // Ids are reusable after clearing
        composer.add_text_layer("t", "Y", 0, 0, 0).unwrap();
    }
}
