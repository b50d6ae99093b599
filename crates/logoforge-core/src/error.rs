//! Error types for logoforge

use thiserror::Error;

/// Result type alias using logoforge's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning an outline into an asset
#[derive(Error, Debug)]
pub enum Error {
    /// No usable outline geometry was supplied
    #[error("no outline geometry was imported")]
    EmptyInput,

    /// A contour crosses itself; extruding it would produce a corrupt solid
    #[error("contour {contour} is self-intersecting")]
    SelfIntersecting { contour: usize },

    /// Input collapsed to nothing during extrusion
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// UV projection failed; the pipeline may continue without UVs
    #[error("UV projection failed: {0}")]
    Projection(String),

    /// The requested surface shading definition is not registered
    #[error("surface shading node {0:?} not found")]
    ShadingNodeNotFound(String),

    /// The external rasterizer failed or timed out
    #[error("rasterizer failed: {0}")]
    Rasterizer(String),

    /// Export failed
    #[error("export failed: {0}")]
    Export(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding/decoding error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
