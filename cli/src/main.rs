//! `eink-compose`: command-line front end for the e-ink composer.
//!
//! Every subcommand operates on a JSON template file, so compositions
//! can be built up incrementally across invocations and rendered or
//! pushed to a (simulated) panel at the end.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use eink_composer::{
    CanvasTransform, EinkComposer, ImageSource, Layer, LayerKind, LayerUpdate, OutputFormat,
    RenderOptions, Template,
};
use eink_display::{DisplayMode, EinkDisplay, SimulatorDisplay};
use image_ops::{DitherMode, ResizeMode};

#[derive(Parser, Debug)]
#[command(name = "eink-compose", version, about = "Compose layered images for monochrome e-ink panels")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new composition template.
    Create(CreateArgs),
    /// Add an image layer.
    AddImage(AddImageArgs),
    /// Add a text layer.
    AddText(AddTextArgs),
    /// Add a rectangle layer.
    AddRect(AddRectArgs),
    /// Add a QR code layer.
    AddQr(AddQrArgs),
    /// List the layers of a template, bottom to top.
    List(ListArgs),
    /// Update fields of an existing layer.
    Update(UpdateArgs),
    /// Toggle a layer's visibility.
    Toggle(LayerRefArgs),
    /// Remove a layer.
    Remove(LayerRefArgs),
    /// Render a template to an image or binary file.
    Render(RenderArgs),
    /// Render a template and push it to the simulated panel.
    Display(DisplayArgs),
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Template file to create.
    template: PathBuf,

    /// Panel width in pixels.
    #[arg(long)]
    width: u32,

    /// Panel height in pixels.
    #[arg(long)]
    height: u32,

    /// Overwrite an existing template file.
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
struct AddImageArgs {
    /// Template file to modify.
    template: PathBuf,

    /// Unique layer id.
    #[arg(long)]
    id: String,

    /// Source image file.
    #[arg(long)]
    path: PathBuf,

    #[arg(long, default_value_t = 0)]
    x: i32,

    #[arg(long, default_value_t = 0)]
    y: i32,

    /// Resize mode: stretch, fit or crop.
    #[arg(long, default_value = "fit")]
    resize_mode: ResizeMode,

    /// Dither mode: floyd-steinberg, threshold or none.
    #[arg(long, default_value = "floyd-steinberg")]
    dither: DitherMode,

    /// Pre-resize rotation in degrees: 0, 90, 180 or 270.
    #[arg(long, default_value_t = 0)]
    rotate: u32,

    /// Flip horizontally before resizing.
    #[arg(long)]
    flip_h: bool,

    /// Flip vertically before resizing.
    #[arg(long)]
    flip_v: bool,

    /// Crop window x for crop mode (default: centered).
    #[arg(long)]
    crop_x: Option<u32>,

    /// Crop window y for crop mode (default: centered).
    #[arg(long)]
    crop_y: Option<u32>,

    /// Explicit output width (default: fill to the canvas edge).
    #[arg(long)]
    width: Option<u32>,

    /// Explicit output height (default: fill to the canvas edge).
    #[arg(long)]
    height: Option<u32>,

    /// Brightness multiplier.
    #[arg(long, default_value_t = 1.0)]
    brightness: f32,

    /// Contrast adjustment, -100 to 100.
    #[arg(long, default_value_t = 0.0)]
    contrast: f32,
}

#[derive(Args, Debug)]
struct AddTextArgs {
    /// Template file to modify.
    template: PathBuf,

    /// Unique layer id.
    #[arg(long)]
    id: String,

    /// Text to render.
    #[arg(long)]
    text: String,

    #[arg(long, default_value_t = 0)]
    x: i32,

    #[arg(long, default_value_t = 0)]
    y: i32,

    /// Ink value: 0 (black) or 255 (white).
    #[arg(long, default_value_t = 0)]
    color: u8,

    /// Integer multiplier for the 6x8 glyph cell.
    #[arg(long, default_value_t = 1)]
    font_size: u32,

    /// Rotation in degrees, counter-clockwise; any real value.
    #[arg(long, default_value_t = 0.0)]
    rotate: f32,

    #[arg(long)]
    flip_h: bool,

    #[arg(long)]
    flip_v: bool,

    /// Draw a padded box of the opposite color behind the text.
    #[arg(long)]
    background: bool,

    /// Padding around the background box.
    #[arg(long, default_value_t = 2)]
    padding: u32,
}

#[derive(Args, Debug)]
struct AddRectArgs {
    /// Template file to modify.
    template: PathBuf,

    /// Unique layer id.
    #[arg(long)]
    id: String,

    #[arg(long, default_value_t = 0)]
    x: i32,

    #[arg(long, default_value_t = 0)]
    y: i32,

    #[arg(long)]
    width: u32,

    #[arg(long)]
    height: u32,

    /// Draw only a 1-pixel border instead of a filled block.
    #[arg(long)]
    outline: bool,

    /// Stroke/fill value: 0 (black) or 255 (white).
    #[arg(long, default_value_t = 0)]
    color: u8,
}

#[derive(Args, Debug)]
struct AddQrArgs {
    /// Template file to modify.
    template: PathBuf,

    /// Unique layer id.
    #[arg(long)]
    id: String,

    /// Data to encode.
    #[arg(long)]
    data: String,

    /// Output size (pixels, square).
    #[arg(long, default_value_t = 70)]
    size: u32,

    #[arg(long, default_value_t = 0)]
    x: i32,

    #[arg(long, default_value_t = 0)]
    y: i32,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Template file to read.
    template: PathBuf,
}

#[derive(Args, Debug)]
struct LayerRefArgs {
    /// Template file to modify.
    template: PathBuf,

    /// Layer id.
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Template file to modify.
    template: PathBuf,

    /// Layer id.
    #[arg(long)]
    id: String,

    #[arg(long)]
    x: Option<i32>,

    #[arg(long)]
    y: Option<i32>,

    #[arg(long)]
    visible: Option<bool>,

    /// New text content (text layers).
    #[arg(long)]
    text: Option<String>,

    /// New ink value (text/rectangle layers).
    #[arg(long)]
    color: Option<u8>,

    /// New glyph cell multiplier (text layers).
    #[arg(long)]
    font_size: Option<u32>,

    /// New rotation in degrees.
    #[arg(long)]
    rotate: Option<f32>,

    /// New width (image/rectangle layers).
    #[arg(long)]
    width: Option<u32>,

    /// New height (image/rectangle layers).
    #[arg(long)]
    height: Option<u32>,

    /// New resize mode (image layers).
    #[arg(long)]
    resize_mode: Option<ResizeMode>,

    /// New dither mode (image layers).
    #[arg(long)]
    dither: Option<DitherMode>,
}

#[derive(Args, Debug)]
struct RenderCommonArgs {
    /// Canvas background value, 0-255.
    #[arg(long, default_value_t = 255)]
    background: u8,

    /// Final whole-canvas dither pass: floyd-steinberg, threshold or none.
    #[arg(long)]
    final_dither: Option<DitherMode>,

    /// Canvas transform, repeatable: flip-h, flip-v, rotate-90, invert.
    #[arg(long = "transform")]
    transformations: Vec<CanvasTransform>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Template file to render.
    template: PathBuf,

    /// Output file.
    #[arg(long, short)]
    output: PathBuf,

    /// Output format: png, bmp or binary.
    #[arg(long, default_value = "png")]
    format: OutputFormat,

    #[command(flatten)]
    render: RenderCommonArgs,
}

#[derive(Args, Debug)]
struct DisplayArgs {
    /// Template file to render.
    template: PathBuf,

    /// Directory the simulated panel writes frames into.
    #[arg(long, default_value = "panel-frames")]
    output_dir: PathBuf,

    /// Panel refresh mode: full or partial.
    #[arg(long, default_value = "full")]
    mode: DisplayMode,

    #[command(flatten)]
    render: RenderCommonArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Create(args) => cmd_create(args),
        Command::AddImage(args) => cmd_add_image(args),
        Command::AddText(args) => cmd_add_text(args),
        Command::AddRect(args) => cmd_add_rect(args),
        Command::AddQr(args) => cmd_add_qr(args),
        Command::List(args) => cmd_list(args),
        Command::Update(args) => cmd_update(args),
        Command::Toggle(args) => cmd_toggle(args),
        Command::Remove(args) => cmd_remove(args),
        Command::Render(args) => cmd_render(args),
        Command::Display(args) => cmd_display(args),
    }
}

fn load_composer(path: &Path) -> anyhow::Result<EinkComposer> {
    let template =
        Template::load(path).with_context(|| format!("load template '{}'", path.display()))?;
    Ok(template.into_composer()?)
}

fn store_composer(path: &Path, composer: &EinkComposer) -> anyhow::Result<()> {
    Template::from_composer(composer)
        .save(path)
        .with_context(|| format!("save template '{}'", path.display()))
}

fn render_options(args: &RenderCommonArgs) -> RenderOptions {
    RenderOptions {
        background_color: args.background,
        final_dither: args.final_dither,
        transformations: args.transformations.clone(),
    }
}

fn cmd_create(args: CreateArgs) -> anyhow::Result<()> {
    if args.template.exists() && !args.force {
        bail!("template '{}' already exists (use --force to overwrite)", args.template.display());
    }
    let composer = EinkComposer::new(args.width, args.height)?;
    store_composer(&args.template, &composer)?;
    println!("Created {}x{} template: {}", args.width, args.height, args.template.display());
    Ok(())
}

fn cmd_add_image(args: AddImageArgs) -> anyhow::Result<()> {
    let mut composer = load_composer(&args.template)?;

    let mut layer = Layer::image(&args.id, ImageSource::path(&args.path)).at(args.x, args.y);
    if let LayerKind::Image(ref mut l) = layer.kind {
        l.resize_mode = args.resize_mode;
        l.dither_mode = args.dither;
        l.rotate = args.rotate;
        l.flip_h = args.flip_h;
        l.flip_v = args.flip_v;
        l.crop_x = args.crop_x;
        l.crop_y = args.crop_y;
        l.width = args.width;
        l.height = args.height;
        l.brightness = args.brightness;
        l.contrast = args.contrast;
    }
    composer.add_layer(layer)?;

    store_composer(&args.template, &composer)?;
    println!("Added image layer '{}'", args.id);
    Ok(())
}

fn cmd_add_text(args: AddTextArgs) -> anyhow::Result<()> {
    let mut composer = load_composer(&args.template)?;

    let mut layer = Layer::text(&args.id, &args.text).at(args.x, args.y);
    if let LayerKind::Text(ref mut l) = layer.kind {
        l.color = args.color;
        l.font_size = args.font_size;
        l.rotate = args.rotate;
        l.flip_h = args.flip_h;
        l.flip_v = args.flip_v;
        l.background = args.background;
        l.padding = args.padding;
    }
    composer.add_layer(layer)?;

    store_composer(&args.template, &composer)?;
    println!("Added text layer '{}'", args.id);
    Ok(())
}

fn cmd_add_rect(args: AddRectArgs) -> anyhow::Result<()> {
    let mut composer = load_composer(&args.template)?;
    composer.add_rectangle_layer(
        &args.id,
        args.x,
        args.y,
        args.width,
        args.height,
        !args.outline,
        args.color,
    )?;
    store_composer(&args.template, &composer)?;
    println!("Added rectangle layer '{}'", args.id);
    Ok(())
}

fn cmd_add_qr(args: AddQrArgs) -> anyhow::Result<()> {
    let mut composer = load_composer(&args.template)?;
    composer.add_qr_layer(&args.id, &args.data, args.size, args.x, args.y)?;
    store_composer(&args.template, &composer)?;
    println!("Added QR layer '{}'", args.id);
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let composer = load_composer(&args.template)?;
    let info = composer.get_layer_info();
    if info.is_empty() {
        println!("(no layers)");
        return Ok(());
    }
    for summary in info {
        let marker = if summary.visible { " " } else { "*" };
        println!(
            "{marker} {:<16} [{:<9}] at ({}, {})  {}",
            summary.id, summary.kind, summary.x, summary.y, summary.detail
        );
    }
    Ok(())
}

fn cmd_update(args: UpdateArgs) -> anyhow::Result<()> {
    let mut composer = load_composer(&args.template)?;
    let update = LayerUpdate {
        x: args.x,
        y: args.y,
        visible: args.visible,
        text: args.text,
        color: args.color,
        font_size: args.font_size,
        rotate: args.rotate,
        width: args.width,
        height: args.height,
        resize_mode: args.resize_mode,
        dither_mode: args.dither,
        ..Default::default()
    };
    composer.update_layer(&args.id, &update)?;
    store_composer(&args.template, &composer)?;
    println!("Updated layer '{}'", args.id);
    Ok(())
}

fn cmd_toggle(args: LayerRefArgs) -> anyhow::Result<()> {
    let mut composer = load_composer(&args.template)?;
    let visible = composer.toggle_layer(&args.id)?;
    store_composer(&args.template, &composer)?;
    println!("Layer '{}' is now {}", args.id, if visible { "visible" } else { "hidden" });
    Ok(())
}

fn cmd_remove(args: LayerRefArgs) -> anyhow::Result<()> {
    let mut composer = load_composer(&args.template)?;
    composer.remove_layer(&args.id)?;
    store_composer(&args.template, &composer)?;
    println!("Removed layer '{}'", args.id);
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let composer = load_composer(&args.template)?;
    let opts = render_options(&args.render);
    composer
        .save(&args.output, args.format, &opts)
        .with_context(|| format!("render to '{}'", args.output.display()))?;
    println!("Rendered {} -> {}", args.template.display(), args.output.display());
    Ok(())
}

fn cmd_display(args: DisplayArgs) -> anyhow::Result<()> {
    let composer = load_composer(&args.template)?;
    let opts = render_options(&args.render);
    let canvas = composer.render(&opts)?;

    // The panel takes the post-transform dimensions
    let mut panel = match SimulatorDisplay::new(canvas.width(), canvas.height(), &args.output_dir) {
        Ok(panel) => panel,
        Err(e) => {
            // A missing panel is not a render failure; report and move on
            tracing::warn!("panel unavailable: {e}");
            println!("Panel unavailable ({e}); rendered composition was discarded");
            return Ok(());
        }
    };
    let frame = panel.next_frame_path();
    panel.display_image(&canvas, args.mode)?;
    println!("Displayed ({} refresh): {}", args.mode, frame.display());
    Ok(())
}
