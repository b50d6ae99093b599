//! Mesh generation and cleanup
//!
//! The leveler extrudes a normalized outline into a solid, the projector
//! assigns a top-down UV layout, and welding collapses extrusion seams.

mod extrude;
mod uv;
mod weld;

use glam::{Vec2, Vec3};

pub use extrude::{LevelConfig, extrude};
pub use weld::WeldConfig;

/// An indexed triangle mesh.
///
/// UVs are optional: the vector is empty until the projector assigns them,
/// and covers every vertex afterwards. Each pipeline stage owns the mesh it
/// is transforming; ownership moves stage to stage.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the per-vertex UV attribute has been assigned
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Axis-aligned bounding box, or None for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        if self.positions.is_empty() {
            return None;
        }
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in &self.positions {
            min = min.min(*p);
            max = max.max(*p);
        }
        Some((min, max))
    }

    /// Calculate smooth vertex normals from face normals
    pub fn recalculate_normals(&mut self) {
        self.normals = vec![Vec3::ZERO; self.positions.len()];

        // Accumulate area-weighted face normals
        for tri in self.indices.chunks(3) {
            let i0 = tri[0] as usize;
            let i1 = tri[1] as usize;
            let i2 = tri[2] as usize;

            let edge1 = self.positions[i1] - self.positions[i0];
            let edge2 = self.positions[i2] - self.positions[i0];
            let face_normal = edge1.cross(edge2);

            for &i in &[i0, i1, i2] {
                self.normals[i] += face_normal;
            }
        }

        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_triangle() -> Mesh {
        Mesh {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_counts() {
        let mesh = single_triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_uvs());
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_bounds() {
        let mesh = single_triangle();
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::ZERO);
        assert_eq!(max, Vec3::new(1.0, 0.0, 1.0));
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn test_recalculate_normals_flat_triangle() {
        let mut mesh = single_triangle();
        mesh.recalculate_normals();
        // Winding (0,0,0) -> (0,0,1) -> (1,0,0) faces up.
        for n in &mesh.normals {
            assert_relative_eq!(n.y, 1.0, epsilon = 1e-6);
        }
    }
}
