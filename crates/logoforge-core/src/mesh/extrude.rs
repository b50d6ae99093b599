//! Leveler: outline extrusion with level-of-detail control
//!
//! Each contour is flattened into a planar ring, the ring is triangulated
//! into a cap, and the cap is extruded along +Y into a closed prism. The
//! chord tolerance only affects how finely curved segments are faceted;
//! straight edges and the extrusion depth are untouched by it.

use crate::path::{Contour, PathSet, Segment};
use crate::{Error, Result};
use glam::{Vec2, Vec3};

use super::Mesh;

/// Recursion cap for adaptive curve flattening.
const MAX_FLATTEN_DEPTH: u32 = 16;

/// Level-of-detail and depth settings for extrusion.
#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    /// Maximum chord deviation when flattening curved segments.
    /// Smaller values produce finer geometry.
    pub chord_tolerance: f32,
    /// Extrusion depth along +Y.
    pub depth: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            chord_tolerance: 0.001,
            depth: 0.1,
        }
    }
}

impl LevelConfig {
    pub fn with_chord_tolerance(mut self, tolerance: f32) -> Self {
        self.chord_tolerance = tolerance;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }
}

/// Extrude a normalized path set into a solid mesh.
///
/// Artwork XY maps onto the XZ ground plane; the solid spans y = 0 to
/// y = `config.depth`. Caps and side walls share ring vertices, so for
/// simple input every edge ends up on exactly two faces.
pub fn extrude(paths: &PathSet, config: &LevelConfig) -> Result<Mesh> {
    let mut mesh = Mesh::new();

    for (index, contour) in paths.contours().iter().enumerate() {
        let mut ring = flatten_contour(contour, config.chord_tolerance);
        if ring.len() < 3 {
            return Err(Error::DegenerateGeometry(format!(
                "contour {index} has fewer than 3 distinct points"
            )));
        }

        // Counter-clockwise rings keep wall orientation consistent.
        if signed_area(&ring) < 0.0 {
            ring.reverse();
        }

        let mut coords: Vec<f64> = Vec::with_capacity(ring.len() * 2);
        for p in &ring {
            coords.push(f64::from(p.x));
            coords.push(f64::from(p.y));
        }
        let cap: Vec<u32> = earcutr::earcut(&coords, &[], 2)
            .unwrap_or_default()
            .iter()
            .map(|&i| i as u32)
            .collect();
        if cap.is_empty() {
            return Err(Error::DegenerateGeometry(format!(
                "contour {index} produced no cap triangles"
            )));
        }

        append_prism(&mut mesh, &ring, &cap, config.depth);
    }

    mesh.recalculate_normals();
    Ok(mesh)
}

/// Append one ring's bottom cap, top cap, and side walls to the mesh.
fn append_prism(mesh: &mut Mesh, ring: &[Vec2], cap: &[u32], depth: f32) {
    let base = mesh.positions.len() as u32;
    let n = ring.len() as u32;

    for p in ring {
        mesh.positions.push(Vec3::new(p.x, 0.0, p.y));
    }
    for p in ring {
        mesh.positions.push(Vec3::new(p.x, depth, p.y));
    }

    for tri in cap.chunks(3) {
        // Orient each cap triangle explicitly rather than trusting the
        // triangulator's output winding.
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let area = triangle_area(
            ring[a as usize],
            ring[b as usize],
            ring[c as usize],
        );
        let (a, b, c) = if area >= 0.0 { (a, b, c) } else { (a, c, b) };

        // A 2D counter-clockwise triangle faces -Y once mapped onto XZ.
        mesh.indices.extend([base + a, base + b, base + c]);
        mesh.indices
            .extend([base + n + a, base + n + c, base + n + b]);
    }

    for i in 0..n {
        let j = (i + 1) % n;
        let (bi, bj) = (base + i, base + j);
        let (ti, tj) = (base + n + i, base + n + j);
        mesh.indices.extend([bi, ti, bj, bj, ti, tj]);
    }
}

/// Flatten a contour into a deduplicated planar ring.
fn flatten_contour(contour: &Contour, tolerance: f32) -> Vec<Vec2> {
    let mut ring = vec![contour.start()];
    let mut pen = contour.start();

    for segment in contour.segments() {
        match *segment {
            Segment::Line(to) => ring.push(to),
            Segment::Cubic { c1, c2, to } => {
                flatten_cubic(pen, c1, c2, to, tolerance, MAX_FLATTEN_DEPTH, &mut ring);
            }
        }
        pen = segment.endpoint();
    }

    dedup_ring(&mut ring);
    ring
}

/// Adaptively subdivide a cubic until it is flat within `tolerance`,
/// pushing intermediate endpoints onto the ring.
fn flatten_cubic(
    p0: Vec2,
    c1: Vec2,
    c2: Vec2,
    p3: Vec2,
    tolerance: f32,
    depth: u32,
    out: &mut Vec<Vec2>,
) {
    if depth == 0 || cubic_is_flat(p0, c1, c2, p3, tolerance) {
        out.push(p3);
        return;
    }

    // De Casteljau split at t = 0.5
    let p01 = p0.midpoint(c1);
    let p12 = c1.midpoint(c2);
    let p23 = c2.midpoint(p3);
    let p012 = p01.midpoint(p12);
    let p123 = p12.midpoint(p23);
    let mid = p012.midpoint(p123);

    flatten_cubic(p0, p01, p012, mid, tolerance, depth - 1, out);
    flatten_cubic(mid, p123, p23, p3, tolerance, depth - 1, out);
}

/// A cubic is flat when both control points sit within `tolerance` of the
/// chord between its endpoints.
fn cubic_is_flat(p0: Vec2, c1: Vec2, c2: Vec2, p3: Vec2, tolerance: f32) -> bool {
    distance_to_chord(c1, p0, p3).max(distance_to_chord(c2, p0, p3)) <= tolerance
}

fn distance_to_chord(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let chord = b - a;
    let len = chord.length();
    if len <= f32::EPSILON {
        return p.distance(a);
    }
    ((p.x - a.x) * chord.y - (p.y - a.y) * chord.x).abs() / len
}

/// Drop consecutive coincident points and a redundant closing point.
fn dedup_ring(ring: &mut Vec<Vec2>) {
    let eps_sq = crate::path::POINT_MERGE_TOLERANCE.powi(2);
    ring.dedup_by(|a, b| a.distance_squared(*b) <= eps_sq);
    while ring.len() > 1 {
        let first = ring[0];
        let Some(last) = ring.last() else { break };
        if last.distance_squared(first) <= eps_sq {
            ring.pop();
        } else {
            break;
        }
    }
}

fn signed_area(ring: &[Vec2]) -> f32 {
    let mut area = 0.0;
    for i in 0..ring.len() {
        let j = (i + 1) % ring.len();
        area += ring[i].x * ring[j].y - ring[j].x * ring[i].y;
    }
    area * 0.5
}

fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathCommand, RawOutline, normalize};
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn square_paths() -> PathSet {
        let commands = vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 1.0)),
            PathCommand::LineTo(Vec2::new(0.0, 1.0)),
            PathCommand::Close,
        ];
        normalize(&[RawOutline::new(commands)]).unwrap()
    }

    fn curved_paths() -> PathSet {
        // A semicircle-ish blob: one cubic across the top, a line back.
        let commands = vec![
            PathCommand::MoveTo(Vec2::new(-1.0, 0.0)),
            PathCommand::CurveTo {
                c1: Vec2::new(-1.0, 1.4),
                c2: Vec2::new(1.0, 1.4),
                to: Vec2::new(1.0, 0.0),
            },
            PathCommand::Close,
        ];
        normalize(&[RawOutline::new(commands)]).unwrap()
    }

    /// Count how many faces reference each undirected edge.
    fn edge_face_counts(mesh: &Mesh) -> HashMap<(u32, u32), usize> {
        let mut counts = HashMap::new();
        for tri in mesh.indices.chunks(3) {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                let key = (a.min(b), a.max(b));
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn test_square_produces_shared_vertex_prism() {
        let mesh = extrude(&square_paths(), &LevelConfig::default()).unwrap();
        // 4 bottom + 4 top; straight edges are never subdivided by the LOD.
        assert_eq!(mesh.vertex_count(), 8);
        // 2 triangles per cap + 2 per wall quad.
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn test_extrusion_is_closed_manifold() {
        let mesh = extrude(&square_paths(), &LevelConfig::default()).unwrap();
        for (edge, count) in edge_face_counts(&mesh) {
            assert_eq!(count, 2, "edge {edge:?} is on {count} faces");
        }
    }

    #[test]
    fn test_curved_contour_manifold_too() {
        let mesh = extrude(&curved_paths(), &LevelConfig::default()).unwrap();
        for (edge, count) in edge_face_counts(&mesh) {
            assert_eq!(count, 2, "edge {edge:?} is on {count} faces");
        }
    }

    #[test]
    fn test_depth_controls_extrusion_height() {
        let config = LevelConfig::default().with_depth(0.25);
        let mesh = extrude(&square_paths(), &config).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert_relative_eq!(min.y, 0.0);
        assert_relative_eq!(max.y, 0.25);
    }

    #[test]
    fn test_chord_tolerance_trades_density() {
        let coarse = extrude(&curved_paths(), &LevelConfig::default().with_chord_tolerance(0.1))
            .unwrap();
        let fine = extrude(&curved_paths(), &LevelConfig::default().with_chord_tolerance(0.001))
            .unwrap();
        assert!(fine.vertex_count() > coarse.vertex_count());

        // Depth is not the LOD's business.
        assert_relative_eq!(
            coarse.bounds().unwrap().1.y,
            fine.bounds().unwrap().1.y
        );
    }

    #[test]
    fn test_two_distinct_points_are_degenerate() {
        let commands = vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 0.0)),
            PathCommand::Close,
        ];
        let paths = normalize(&[RawOutline::new(commands)]).unwrap();
        let result = extrude(&paths, &LevelConfig::default());
        assert!(matches!(result, Err(Error::DegenerateGeometry(_))));
    }

    #[test]
    fn test_multiple_contours_stack_into_one_mesh() {
        let square = |offset: f32| {
            vec![
                PathCommand::MoveTo(Vec2::new(offset, 0.0)),
                PathCommand::LineTo(Vec2::new(offset + 1.0, 0.0)),
                PathCommand::LineTo(Vec2::new(offset + 1.0, 1.0)),
                PathCommand::LineTo(Vec2::new(offset, 1.0)),
                PathCommand::Close,
            ]
        };
        let paths = normalize(&[
            RawOutline::new(square(0.0)),
            RawOutline::new(square(3.0)),
        ])
        .unwrap();
        let mesh = extrude(&paths, &LevelConfig::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        for (_, count) in edge_face_counts(&mesh) {
            assert_eq!(count, 2);
        }
    }
}
