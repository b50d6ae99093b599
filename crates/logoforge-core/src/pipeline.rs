//! Stage orchestration
//!
//! Runs the synthesis stages strictly in sequence, each consuming the
//! previous stage's output: normalize, extrude, project UVs, weld, bind.
//! Only UV projection failures are survivable; everything else aborts the
//! run before any output is written.

use tracing::{info, warn};

use crate::export::ExportBundle;
use crate::material::{SurfaceRegistry, bind};
use crate::mesh::{LevelConfig, WeldConfig, extrude};
use crate::path::{RawOutline, normalize};
use crate::texture::TextureBitmap;
use crate::{Error, Result};

/// Settings for one conversion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineConfig {
    pub level: LevelConfig,
    pub weld: WeldConfig,
}

/// Turn imported outlines and a rasterized bitmap into an export-ready
/// bundle.
///
/// The mesh moves through the stages by value; no stage aliases another's
/// data. A UV projection failure downgrades the asset to untextured
/// instead of failing the run.
pub fn build_asset(
    outlines: &[RawOutline],
    bitmap: TextureBitmap,
    registry: &SurfaceRegistry,
    config: &PipelineConfig,
) -> Result<ExportBundle> {
    info!(outlines = outlines.len(), "normalizing outlines");
    let paths = normalize(outlines)?;
    info!(contours = paths.contour_count(), "outlines normalized");

    info!(
        chord_tolerance = config.level.chord_tolerance,
        depth = config.level.depth,
        "extruding outline"
    );
    let mut mesh = extrude(&paths, &config.level)?;
    info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "extrusion complete"
    );

    match mesh.project_uvs_from_top() {
        Ok(()) => info!("top-down UV projection complete"),
        Err(Error::Projection(reason)) => {
            warn!(%reason, "UV projection failed; continuing without UVs");
        }
        Err(other) => return Err(other),
    }

    info!(epsilon = config.weld.epsilon, "welding seams");
    let before = mesh.vertex_count();
    mesh.weld(&config.weld);
    info!(
        merged = before - mesh.vertex_count(),
        vertices = mesh.vertex_count(),
        "weld complete"
    );

    info!(bitmap = %bitmap.path.display(), "binding material");
    let material = bind(bitmap, registry)?;

    Ok(ExportBundle { mesh, material })
}
