//! `stage-image`: render a saved stage payload to a PNG.
//!
//! ```text
//! stage-image [--sprites DIR] [--cg N] [--tile PX] [--keep-margin] STAGE.json OUT.png
//! ```
//!
//! Sprites are read from `DIR/{cg:02}/{reference}.png`. The stage may be a
//! bare layer map or a save request carrying it under `blocks`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use image::{RgbaImage, imageops};
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use tilestage_core::payload::layer_rows;
use tilestage_core::{GridStore, LayerId, LayerRows, Point};
use tilestage_render::{
    Batch, Color, DrawJob, FsImageSource, ImagePath, RenderError, Renderer, RendererConfig,
    RgbaCanvas, composite,
};

const USAGE: &str =
    "usage: stage-image [--sprites DIR] [--cg N] [--tile PX] [--keep-margin] STAGE.json OUT.png";

#[derive(Debug, Error)]
enum ToolError {
    #[error("{0}\n{usage}", usage = USAGE)]
    Usage(String),

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stage payload has no layers")]
    Empty,

    #[error(transparent)]
    Payload(#[from] tilestage_core::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Clone, Debug, PartialEq)]
struct Options {
    sprites: PathBuf,
    cg: u8,
    tile: u32,
    keep_margin: bool,
    input: PathBuf,
    output: PathBuf,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ToolError> {
        let mut sprites = PathBuf::from("static/image/sprite");
        let mut cg = 0;
        let mut tile = 32;
        let mut keep_margin = false;
        let mut files = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--sprites" => sprites = PathBuf::from(value(&mut args, "--sprites")?),
                "--cg" => cg = number(&mut args, "--cg")?,
                "--tile" => tile = number(&mut args, "--tile")?,
                "--keep-margin" => keep_margin = true,
                flag if flag.starts_with("--") => {
                    return Err(ToolError::Usage(format!("unknown flag {flag}")));
                }
                _ => files.push(PathBuf::from(&arg)),
            }
        }
        let [input, output]: [PathBuf; 2] = files
            .try_into()
            .map_err(|_| ToolError::Usage("expected STAGE.json and OUT.png".into()))?;
        if tile == 0 {
            return Err(ToolError::Usage("--tile must be positive".into()));
        }
        Ok(Self {
            sprites,
            cg,
            tile,
            keep_margin,
            input,
            output,
        })
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ToolError> {
    args.next()
        .ok_or_else(|| ToolError::Usage(format!("{flag} needs a value")))
}

fn number<T: FromStr>(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<T, ToolError> {
    let raw = value(args, flag)?;
    raw.parse()
        .map_err(|_| ToolError::Usage(format!("{flag}: `{raw}` is not a number")))
}

/// The layer map of a stage file.
fn stage_rows(mut data: Value) -> Result<LayerRows, ToolError> {
    if let Some(blocks) = data.get_mut("blocks").map(Value::take) {
        data = blocks;
    }
    let rows = layer_rows(data)?;
    if rows.is_empty() {
        return Err(ToolError::Empty);
    }
    Ok(rows)
}

/// Paint every layer through a batch and flatten them on white.
fn render(opts: &Options, rows: &LayerRows) -> Result<RgbaImage, ToolError> {
    let (_, first) = rows.first_key_value().ok_or(ToolError::Empty)?;
    let size = Point::new(
        first.first().map_or(0, Vec::len) as i32,
        first.len() as i32,
    );
    let layers: Vec<LayerId> = rows.keys().copied().collect();
    let mut store = GridStore::new(size, layers.iter().copied());
    store.load_rows(rows)?;

    let config = RendererConfig {
        tile_size: opts.tile,
        extent: size,
    };
    let (width, height) = config.pixel_size();
    let mut canvas = RgbaCanvas::new(width, height);
    let source = FsImageSource::new(opts.sprites.clone());
    let mut renderer = Renderer::bind(config, source, &mut canvas, &layers)?;

    for &layer in &layers {
        let jobs: Vec<DrawJob> = store
            .layer(layer)
            .tiles()
            .map(|(at, tile)| DrawJob {
                layer,
                at,
                image: ImagePath::for_tile("", opts.cg, tile),
            })
            .collect();
        log::debug!("{layer}: {} tiles", jobs.len());
        let batch = Batch {
            layers: vec![layer],
            jobs,
            area: None,
            render_only: false,
        };
        pollster::block_on(renderer.draw_batch(&batch))?;
    }
    log::info!("{} images loaded", renderer.cache().len());

    let surfaces = layers.iter().filter_map(|&layer| renderer.surface(layer));
    Ok(composite(width, height, Color::MENU, surfaces))
}

/// Drop the first and the last two columns.
fn trim_margin(image: &RgbaImage, tile: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width <= 3 * tile {
        return image.clone();
    }
    imageops::crop_imm(image, tile, 0, width - 3 * tile, height).to_image()
}

fn run(args: impl IntoIterator<Item = String>) -> Result<(), ToolError> {
    let opts = Options::parse(args)?;
    let text = std::fs::read_to_string(&opts.input).map_err(|source| ToolError::Read {
        path: opts.input.clone(),
        source,
    })?;
    let data: Value = serde_json::from_str(&text).map_err(tilestage_core::Error::from)?;
    let rows = stage_rows(data)?;

    let mut image = render(&opts, &rows)?;
    if !opts.keep_margin {
        image = trim_margin(&image, opts.tile);
    }
    image.save(&opts.output).map_err(|source| ToolError::Write {
        path: opts.output.clone(),
        source,
    })?;
    log::info!(
        "wrote {} ({}x{})",
        opts.output.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    match run(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use serde_json::json;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn parses_flags_and_files() {
        let opts = Options::parse(args("--cg 1 --tile 16 --keep-margin a.json b.png")).unwrap();
        assert_eq!(opts.cg, 1);
        assert_eq!(opts.tile, 16);
        assert!(opts.keep_margin);
        assert_eq!(opts.input, PathBuf::from("a.json"));
        assert_eq!(opts.output, PathBuf::from("b.png"));
        assert_eq!(opts.sprites, PathBuf::from("static/image/sprite"));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(Options::parse(args("a.json")), Err(ToolError::Usage(_))));
        assert!(matches!(
            Options::parse(args("--cg x a.json b.png")),
            Err(ToolError::Usage(_))
        ));
        assert!(matches!(
            Options::parse(args("--bogus a.json b.png")),
            Err(ToolError::Usage(_))
        ));
        assert!(matches!(Options::parse(args("a.json b.png --tile")), Err(ToolError::Usage(_))));
    }

    #[test]
    fn reads_bare_and_wrapped_stages() {
        let layer = json!([["", "layer1/block/00"]]);
        let bare = stage_rows(json!({ "layer1": layer })).unwrap();
        let wrapped = stage_rows(json!({ "content": "stage", "blocks": { "layer1": layer } })).unwrap();
        assert_eq!(bare, wrapped);
        assert!(matches!(stage_rows(json!({ "content": "stage" })), Err(ToolError::Empty)));
    }

    #[test]
    fn trims_menu_margin() {
        let mut image = RgbaImage::new(8, 2);
        image.put_pixel(2, 0, Rgba([1, 2, 3, 255]));
        let trimmed = trim_margin(&image, 2);
        assert_eq!(trimmed.dimensions(), (2, 2));
        assert_eq!(*trimmed.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn missing_sprite_fails_the_render() {
        let opts = Options::parse(args("--sprites /nonexistent-sprites a.json b.png")).unwrap();
        let rows = stage_rows(json!({ "layer1": [["layer1/rock/00"]] })).unwrap();
        assert!(matches!(render(&opts, &rows), Err(ToolError::Render(_))));
    }

    #[test]
    fn empty_stage_renders_white() {
        let opts = Options::parse(args("--tile 2 a.json b.png")).unwrap();
        let rows = stage_rows(json!({ "layer1": [["", ""], ["", ""]] })).unwrap();
        let image = render(&opts, &rows).unwrap();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(*image.get_pixel(3, 3), Rgba([255, 255, 255, 255]));
    }
}
