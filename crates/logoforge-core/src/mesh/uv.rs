//! Top-down orthographic UV projection
//!
//! Simulates projecting from a fixed top view: each vertex's X/Z
//! coordinates are normalized against the mesh's projected footprint,
//! independent of any interactive viewpoint.

use crate::{Error, Result};
use glam::Vec2;

use super::Mesh;

impl Mesh {
    /// Assign UVs by orthographic projection along -Y, bounds-fitted so the
    /// projected footprint spans [0,1]^2.
    ///
    /// An axis with zero extent falls back to a constant 0.5 rather than
    /// dividing by zero. Fails with [`Error::Projection`] when the mesh has
    /// no vertices; callers may treat that as recoverable and keep the mesh
    /// untextured.
    pub fn project_uvs_from_top(&mut self) -> Result<()> {
        let Some((min, max)) = self.bounds() else {
            return Err(Error::Projection("mesh has no vertices".into()));
        };
        let extent = max - min;

        self.uvs = self
            .positions
            .iter()
            .map(|p| {
                let u = if extent.x > 0.0 {
                    (p.x - min.x) / extent.x
                } else {
                    0.5
                };
                let v = if extent.z > 0.0 {
                    (p.z - min.z) / extent.z
                } else {
                    0.5
                };
                Vec2::new(u, v)
            })
            .collect();

        Ok(())
    }
}
