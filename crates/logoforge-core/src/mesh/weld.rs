//! Seam removal: merge-by-distance vertex welding
//!
//! Extrusion and projection leave coincident vertices along cap/wall seams.
//! Welding collapses every group of vertices mutually within epsilon into
//! its first-visited member and drops faces that degenerate in the process.

use std::collections::HashMap;

use super::Mesh;

/// Configuration for merge-by-distance welding.
#[derive(Debug, Clone, Copy)]
pub struct WeldConfig {
    /// Vertices closer than this collapse into one.
    pub epsilon: f32,
}

impl Default for WeldConfig {
    fn default() -> Self {
        Self { epsilon: 1e-4 }
    }
}

impl WeldConfig {
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }
}

impl Mesh {
    /// Collapse vertices closer than `config.epsilon` and remap faces.
    ///
    /// The first-visited vertex of each merge group survives and keeps its
    /// attributes, including its UV; merging vertices with differing UVs is
    /// deliberately lossy. Faces left with a repeated index are dropped.
    /// Running the weld twice with the same epsilon changes nothing.
    pub fn weld(&mut self, config: &WeldConfig) {
        if self.positions.is_empty() || config.epsilon <= 0.0 {
            return;
        }

        let epsilon_sq = config.epsilon * config.epsilon;

        // Spatial hash so each vertex only scans its neighborhood.
        let cell_size = config.epsilon * 2.0;
        let cell_of = |p: glam::Vec3| {
            (
                (p.x / cell_size).floor() as i32,
                (p.y / cell_size).floor() as i32,
                (p.z / cell_size).floor() as i32,
            )
        };

        let mut occupied: HashMap<(i32, i32, i32), Vec<u32>> = HashMap::new();
        let mut remap: Vec<u32> = Vec::with_capacity(self.positions.len());
        let mut new_positions = Vec::with_capacity(self.positions.len());
        let mut new_normals = Vec::new();
        let mut new_uvs = Vec::new();
        let has_normals = self.normals.len() == self.positions.len();
        let has_uvs = self.has_uvs();

        for (i, &p) in self.positions.iter().enumerate() {
            let key = cell_of(p);

            let mut found = None;
            'outer: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let neighbor = (key.0 + dx, key.1 + dy, key.2 + dz);
                        if let Some(kept) = occupied.get(&neighbor) {
                            for &j in kept {
                                if p.distance_squared(new_positions[j as usize]) < epsilon_sq {
                                    found = Some(j);
                                    break 'outer;
                                }
                            }
                        }
                    }
                }
            }

            match found {
                Some(j) => remap.push(j),
                None => {
                    let j = new_positions.len() as u32;
                    new_positions.push(p);
                    if has_normals {
                        new_normals.push(self.normals[i]);
                    }
                    if has_uvs {
                        new_uvs.push(self.uvs[i]);
                    }
                    occupied.entry(cell_of(p)).or_default().push(j);
                    remap.push(j);
                }
            }
        }

        // Remap faces, dropping any triangle that collapsed.
        let mut new_indices = Vec::with_capacity(self.indices.len());
        for tri in self.indices.chunks(3) {
            let a = remap[tri[0] as usize];
            let b = remap[tri[1] as usize];
            let c = remap[tri[2] as usize];
            if a != b && b != c && c != a {
                new_indices.extend([a, b, c]);
            }
        }

        self.positions = new_positions;
        self.normals = new_normals;
        self.uvs = new_uvs;
        self.indices = new_indices;

        self.drop_unreferenced_vertices();
    }

    /// Remove vertices no face references, compacting attribute arrays.
    fn drop_unreferenced_vertices(&mut self) {
        let mut used = vec![false; self.positions.len()];
        for &idx in &self.indices {
            used[idx as usize] = true;
        }
        if used.iter().all(|&u| u) {
            return;
        }

        let has_normals = self.normals.len() == self.positions.len();
        let has_uvs = self.has_uvs();
        let mut remap = vec![0u32; self.positions.len()];
        let mut new_positions = Vec::new();
        let mut new_normals = Vec::new();
        let mut new_uvs = Vec::new();

        for i in 0..self.positions.len() {
            if used[i] {
                remap[i] = new_positions.len() as u32;
                new_positions.push(self.positions[i]);
                if has_normals {
                    new_normals.push(self.normals[i]);
                }
                if has_uvs {
                    new_uvs.push(self.uvs[i]);
                }
            }
        }

        for idx in &mut self.indices {
            *idx = remap[*idx as usize];
        }

        self.positions = new_positions;
        self.normals = new_normals;
        self.uvs = new_uvs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn mesh_with_near_duplicate() -> Mesh {
        Mesh {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.00001, 0.0, 0.0), // within epsilon of vertex 0
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            normals: vec![Vec3::Y; 4],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.9, 0.9), // loses to vertex 0's UV on merge
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
            ],
            indices: vec![0, 2, 3, 1, 3, 2],
        }
    }

    #[test]
    fn test_weld_merges_near_vertices() {
        let mut mesh = mesh_with_near_duplicate();
        mesh.weld(&WeldConfig::default());

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 2);
        for tri in mesh.indices.chunks(3) {
            assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0]);
        }
    }

    #[test]
    fn test_first_visited_uv_survives() {
        let mut mesh = mesh_with_near_duplicate();
        mesh.weld(&WeldConfig::default());
        assert_eq!(mesh.uvs[0], Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_weld_is_idempotent() {
        let mut mesh = mesh_with_near_duplicate();
        let config = WeldConfig::default();
        mesh.weld(&config);
        let vertices = mesh.vertex_count();
        let triangles = mesh.triangle_count();

        mesh.weld(&config);
        assert_eq!(mesh.vertex_count(), vertices);
        assert_eq!(mesh.triangle_count(), triangles);
    }

    #[test]
    fn test_collapsed_faces_are_dropped() {
        // A sliver triangle whose vertices all merge disappears entirely.
        let mut mesh = Mesh {
            positions: vec![
                Vec3::ZERO,
                Vec3::new(1e-6, 0.0, 0.0),
                Vec3::new(0.0, 1e-6, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            normals: vec![Vec3::Y; 5],
            uvs: Vec::new(),
            indices: vec![0, 1, 2, 0, 3, 4],
        };
        mesh.weld(&WeldConfig::default());
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_distinct_vertices_are_untouched() {
        let mut mesh = Mesh {
            positions: vec![
                Vec3::ZERO,
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            normals: vec![Vec3::Y; 3],
            uvs: Vec::new(),
            indices: vec![0, 1, 2],
        };
        mesh.weld(&WeldConfig::default());
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_weld_without_uvs_keeps_uvs_absent() {
        let mut mesh = mesh_with_near_duplicate();
        mesh.uvs = Vec::new();
        mesh.weld(&WeldConfig::default());
        assert!(!mesh.has_uvs());
    }
}
