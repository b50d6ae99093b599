//! logoforge CLI - turn a 2D vector logo into a textured 3D asset

mod raster;
mod svg;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use logoforge_core::prelude::*;

#[derive(Parser)]
#[command(name = "logoforge")]
#[command(about = "Turn 2D vector logos into textured 3D assets", long_about = None)]
#[command(version)]
struct Cli {
    /// Input vector artwork (SVG)
    input: PathBuf,

    /// Output asset path; defaults to the input with a .glb extension
    output: Option<PathBuf>,

    /// Maximum chord deviation when flattening curved outline segments
    #[arg(long, default_value_t = LevelConfig::default().chord_tolerance)]
    lod: f32,

    /// Extrusion depth
    #[arg(long, default_value_t = LevelConfig::default().depth)]
    depth: f32,

    /// Seconds to wait for the external rasterizer
    #[arg(long, default_value_t = 60)]
    raster_timeout: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    info!(
        input = %cli.input.display(),
        output = %output.display(),
        "starting conversion"
    );

    let rasterizer = raster::MagickRasterizer::new(Duration::from_secs(cli.raster_timeout));
    let bitmap_path = rasterizer
        .rasterize(&cli.input, &RasterizeRequest::default())
        .context("rasterizing artwork")?;
    let bitmap = TextureBitmap::open(&bitmap_path).context("reading rasterized bitmap")?;

    let outlines = svg::import_outlines(&cli.input).context("importing vector artwork")?;

    let config = PipelineConfig {
        level: LevelConfig::default()
            .with_chord_tolerance(cli.lod)
            .with_depth(cli.depth),
        weld: WeldConfig::default(),
    };
    let bundle = build_asset(&outlines, bitmap, &SurfaceRegistry::default(), &config)
        .context("building asset")?;

    export_glb(&bundle, &output, &GlbExportOptions::default()).context("writing asset")?;
    info!(output = %output.display(), "asset written");

    Ok(())
}
