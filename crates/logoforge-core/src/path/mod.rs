//! Outline normalization
//!
//! Takes raw vector path data as delivered by an importer, discards fill
//! rules, and merges everything into one [`PathSet`] of closed contours
//! ready for extrusion as stroke geometry.

use crate::{Error, Result};
use glam::Vec2;

/// Points closer than this are treated as coincident during normalization.
pub const POINT_MERGE_TOLERANCE: f32 = 1e-6;

/// A raw path command as produced by a vector importer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    CurveTo { c1: Vec2, c2: Vec2, to: Vec2 },
    Close,
}

/// Fill rule attached to imported artwork.
///
/// Outlines are extruded as stroke geometry, so the rule is discarded
/// during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// One imported outline: a command stream plus its (ignored) fill rule.
#[derive(Debug, Clone)]
pub struct RawOutline {
    pub commands: Vec<PathCommand>,
    pub fill: FillRule,
}

impl RawOutline {
    pub fn new(commands: Vec<PathCommand>) -> Self {
        Self {
            commands,
            fill: FillRule::default(),
        }
    }
}

/// One segment of a closed contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Straight edge to the endpoint
    Line(Vec2),
    /// Cubic Bezier edge with two control points
    Cubic { c1: Vec2, c2: Vec2, to: Vec2 },
}

impl Segment {
    /// Endpoint of this segment
    pub fn endpoint(&self) -> Vec2 {
        match self {
            Segment::Line(to) | Segment::Cubic { to, .. } => *to,
        }
    }
}

/// A closed loop of segments. The final segment's endpoint connects back
/// to [`Contour::start`]; the closing edge is implicit, never stored.
#[derive(Debug, Clone)]
pub struct Contour {
    start: Vec2,
    segments: Vec<Segment>,
}

impl Contour {
    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// On-curve points of the loop: the start plus each segment endpoint.
    ///
    /// The implicit closing point is not repeated.
    pub fn points(&self) -> Vec<Vec2> {
        let mut points = Vec::with_capacity(self.segments.len() + 1);
        points.push(self.start);
        for segment in &self.segments {
            let p = segment.endpoint();
            if points
                .last()
                .is_none_or(|last| last.distance_squared(p) > POINT_MERGE_TOLERANCE.powi(2))
            {
                points.push(p);
            }
        }
        if points.len() > 1 {
            let closes = points[0].distance_squared(*points.last().unwrap_or(&self.start))
                <= POINT_MERGE_TOLERANCE.powi(2);
            if closes {
                points.pop();
            }
        }
        points
    }
}

/// Normalized curve set: every contour of every imported outline, merged
/// into one group in a shared 2D frame. Immutable once built.
#[derive(Debug, Clone)]
pub struct PathSet {
    contours: Vec<Contour>,
}

impl PathSet {
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    pub fn contour_count(&self) -> usize {
        self.contours.len()
    }
}

/// Normalize imported outlines into a single [`PathSet`].
///
/// Fill rules are discarded, consecutive coincident points are dropped,
/// redundant closing points are removed, and all contours are merged into
/// one curve group. Contours whose on-curve control polygon crosses itself
/// are rejected: extruding them would produce a corrupt solid.
pub fn normalize(outlines: &[RawOutline]) -> Result<PathSet> {
    let mut contours = Vec::new();

    for outline in outlines {
        collect_contours(&outline.commands, &mut contours);
    }

    if contours.is_empty() {
        return Err(Error::EmptyInput);
    }

    for (index, contour) in contours.iter().enumerate() {
        if polygon_self_intersects(&contour.points()) {
            return Err(Error::SelfIntersecting { contour: index });
        }
    }

    Ok(PathSet { contours })
}

/// Split one command stream into closed contours.
fn collect_contours(commands: &[PathCommand], out: &mut Vec<Contour>) {
    let mut start: Option<Vec2> = None;
    let mut pen = Vec2::ZERO;
    let mut segments: Vec<Segment> = Vec::new();

    let mut flush = |start: &mut Option<Vec2>, segments: &mut Vec<Segment>| {
        if let Some(s) = start.take() {
            let mut segs = std::mem::take(segments);
            // Drop an explicit closing edge back to the start; closure is implicit.
            if let Some(Segment::Line(to)) = segs.last() {
                if to.distance_squared(s) <= POINT_MERGE_TOLERANCE.powi(2) {
                    segs.pop();
                }
            }
            if !segs.is_empty() {
                out.push(Contour { start: s, segments: segs });
            }
        }
    };

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                flush(&mut start, &mut segments);
                start = Some(p);
                pen = p;
            }
            PathCommand::LineTo(p) => {
                if start.is_none() {
                    // Tolerate streams that omit the initial MoveTo.
                    start = Some(p);
                    pen = p;
                    continue;
                }
                if pen.distance_squared(p) > POINT_MERGE_TOLERANCE.powi(2) {
                    segments.push(Segment::Line(p));
                    pen = p;
                }
            }
            PathCommand::CurveTo { c1, c2, to } => {
                if start.is_none() {
                    start = Some(to);
                    pen = to;
                    continue;
                }
                // A cubic whose control points all sit on the pen is no edge at all.
                let degenerate = pen.distance_squared(c1) <= POINT_MERGE_TOLERANCE.powi(2)
                    && pen.distance_squared(c2) <= POINT_MERGE_TOLERANCE.powi(2)
                    && pen.distance_squared(to) <= POINT_MERGE_TOLERANCE.powi(2);
                if !degenerate {
                    segments.push(Segment::Cubic { c1, c2, to });
                    pen = to;
                }
            }
            PathCommand::Close => {
                flush(&mut start, &mut segments);
            }
        }
    }

    // An unterminated trailing contour is still treated as closed.
    flush(&mut start, &mut segments);
}

/// Test whether a closed polygon has any properly crossing edge pair.
///
/// Adjacent edges sharing an endpoint are skipped. O(n^2) over the
/// on-curve control polygon; logo outlines are small.
fn polygon_self_intersects(points: &[Vec2]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let a0 = points[i];
        let a1 = points[(i + 1) % n];
        for j in (i + 1)..n {
            // Skip the edge itself and the two edges adjacent to it.
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let b0 = points[j];
            let b1 = points[(j + 1) % n];
            if segments_properly_intersect(a0, a1, b0, b1) {
                return true;
            }
        }
    }
    false
}

fn segments_properly_intersect(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> bool {
    let d1 = cross2(b1 - b0, a0 - b0);
    let d2 = cross2(b1 - b0, a1 - b0);
    let d3 = cross2(a1 - a0, b0 - a0);
    let d4 = cross2(a1 - a0, b1 - a0);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

fn cross2(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_commands() -> Vec<PathCommand> {
        vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 1.0)),
            PathCommand::LineTo(Vec2::new(0.0, 1.0)),
            PathCommand::Close,
        ]
    }

    #[test]
    fn test_normalize_preserves_contour_count() {
        let outlines = vec![
            RawOutline::new(square_commands()),
            RawOutline {
                commands: vec![
                    PathCommand::MoveTo(Vec2::new(2.0, 0.0)),
                    PathCommand::LineTo(Vec2::new(3.0, 0.0)),
                    PathCommand::LineTo(Vec2::new(2.5, 1.0)),
                    PathCommand::Close,
                ],
                fill: FillRule::EvenOdd,
            },
        ];

        let paths = normalize(&outlines).unwrap();
        assert_eq!(paths.contour_count(), 2);
    }

    #[test]
    fn test_normalize_merges_outlines_into_one_set() {
        let a = RawOutline::new(square_commands());
        let mut b_commands = square_commands();
        for command in &mut b_commands {
            if let PathCommand::MoveTo(p) | PathCommand::LineTo(p) = command {
                *p += Vec2::new(5.0, 5.0);
            }
        }
        let b = RawOutline::new(b_commands);

        let paths = normalize(&[a, b]).unwrap();
        assert_eq!(paths.contour_count(), 2);
        // Both contours live in the same group, same frame.
        assert!(paths.contours()[1].start().x >= 5.0);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(normalize(&[]), Err(Error::EmptyInput)));

        // Outlines with no usable contours count as empty too.
        let hollow = RawOutline::new(vec![PathCommand::MoveTo(Vec2::ZERO)]);
        assert!(matches!(normalize(&[hollow]), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_explicit_closing_edge_is_dropped() {
        let commands = vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 1.0)),
            PathCommand::LineTo(Vec2::new(0.0, 0.0)), // explicit return to start
            PathCommand::Close,
        ];
        let paths = normalize(&[RawOutline::new(commands)]).unwrap();
        let contour = &paths.contours()[0];
        assert_eq!(contour.segments().len(), 2);
        assert_eq!(contour.points().len(), 3);
    }

    #[test]
    fn test_coincident_points_are_deduplicated() {
        let commands = vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 0.0)), // duplicate
            PathCommand::LineTo(Vec2::new(0.5, 1.0)),
            PathCommand::Close,
        ];
        let paths = normalize(&[RawOutline::new(commands)]).unwrap();
        assert_eq!(paths.contours()[0].points().len(), 3);
    }

    #[test]
    fn test_self_intersecting_contour_is_rejected() {
        // Bowtie: edges (0,0)-(1,1) and (1,0)-(0,1) cross.
        let commands = vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::LineTo(Vec2::new(1.0, 1.0)),
            PathCommand::LineTo(Vec2::new(1.0, 0.0)),
            PathCommand::LineTo(Vec2::new(0.0, 1.0)),
            PathCommand::Close,
        ];
        let result = normalize(&[RawOutline::new(commands)]);
        assert!(matches!(result, Err(Error::SelfIntersecting { contour: 0 })));
    }

    #[test]
    fn test_fill_rule_is_discarded() {
        let nonzero = RawOutline {
            commands: square_commands(),
            fill: FillRule::NonZero,
        };
        let evenodd = RawOutline {
            commands: square_commands(),
            fill: FillRule::EvenOdd,
        };

        let a = normalize(&[nonzero]).unwrap();
        let b = normalize(&[evenodd]).unwrap();
        assert_eq!(a.contours()[0].points(), b.contours()[0].points());
    }

    #[test]
    fn test_curved_contour_keeps_segments() {
        let commands = vec![
            PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
            PathCommand::CurveTo {
                c1: Vec2::new(0.5, 1.0),
                c2: Vec2::new(1.5, 1.0),
                to: Vec2::new(2.0, 0.0),
            },
            PathCommand::LineTo(Vec2::new(1.0, -1.0)),
            PathCommand::Close,
        ];
        let paths = normalize(&[RawOutline::new(commands)]).unwrap();
        let contour = &paths.contours()[0];
        assert_eq!(contour.segments().len(), 2);
        assert!(matches!(contour.segments()[0], Segment::Cubic { .. }));
    }
}
