//! # Logoforge Core
//!
//! Turn a 2D vector logo into a textured 3D asset.
//!
//! The pipeline extrudes the logo's outline into a leveled solid, projects
//! a top-down UV layout, welds extrusion seams, binds a rasterized texture
//! to an opaque physically-based material, and serializes the result as a
//! single-file GLB asset.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use logoforge_core::prelude::*;
//!
//! let bundle = build_asset(&outlines, bitmap, &SurfaceRegistry::default(), &PipelineConfig::default())?;
//! export_glb(&bundle, Path::new("logo.glb"), &GlbExportOptions::default())?;
//! ```
//!
//! ## Units and Conventions
//!
//! - **Coordinate system**: right-handed, Y-up. Artwork XY maps to the XZ
//!   ground plane; extrusion runs along +Y.
//! - **Distances**: arbitrary units, typically the artwork's own units.
//! - **Precision**: `f32` throughout for GPU compatibility.

pub mod export;
pub mod material;
pub mod mesh;
pub mod path;
pub mod pipeline;
pub mod texture;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // Outline normalization
    pub use crate::path::{Contour, FillRule, PathCommand, PathSet, RawOutline, Segment};

    // Mesh generation
    pub use crate::mesh::{LevelConfig, Mesh, WeldConfig, extrude};

    // Materials
    pub use crate::material::{BlendMode, MaterialGraph, SurfaceRegistry, bind};

    // Texture boundary
    pub use crate::texture::{AlphaMode, RasterizeRequest, Rasterizer, TextureBitmap};

    // Pipeline and export
    pub use crate::export::{ExportBundle, GlbExportOptions, default_output_path, export_glb};
    pub use crate::pipeline::{PipelineConfig, build_asset};

    // Math (re-export glam)
    pub use glam::{Vec2, Vec3};

    // Error handling
    pub use crate::{Error, Result};
}
