//! Boundary-aware planar queries.
//!
//! Pure functions over a [`Boundary`]: containment, distance to the outline
//! and the fade alpha used to blend the mesh out past the edge.

use super::boundary::Boundary;
use super::geometry::{smoothstep, PlanarPoint};

/// Half-width of the band around the outline over which the fade goes 0 → 1.
pub const FADE_WIDTH: f32 = 0.25;

/// Unsigned distance to the nearest outline edge plus the containment flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryDistance {
    pub distance: f32,
    pub inside: bool,
}

impl BoundaryDistance {
    /// Positive inside the outline, negative outside.
    pub fn signed(&self) -> f32 {
        if self.inside {
            self.distance
        } else {
            -self.distance
        }
    }
}

/// Even-odd ray casting along +x. Points exactly on an edge may land on
/// either side.
pub fn point_in_polygon(p: PlanarPoint, boundary: &Boundary) -> bool {
    if !boundary.is_valid() {
        return false;
    }

    let mut inside = false;
    for (a, b) in boundary.edges() {
        if (a.z > p.z) != (b.z > p.z) {
            let crossing_x = (b.x - a.x) * (p.z - a.z) / (b.z - a.z) + a.x;
            if p.x < crossing_x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Squared distance from `p` to the segment `a → b`.
pub fn point_segment_distance_squared(p: PlanarPoint, a: PlanarPoint, b: PlanarPoint) -> f32 {
    let length_sq = a.distance_squared(b);
    if length_sq == 0.0 {
        return p.distance_squared(a);
    }

    let t = (((p.x - a.x) * (b.x - a.x) + (p.z - a.z) * (b.z - a.z)) / length_sq).clamp(0.0, 1.0);
    let projection = PlanarPoint::new(a.x + t * (b.x - a.x), a.z + t * (b.z - a.z));
    p.distance_squared(projection)
}

/// Minimum distance to any outline edge. A degenerate outline reports
/// distance 0, outside.
pub fn signed_distance(p: PlanarPoint, boundary: &Boundary) -> BoundaryDistance {
    if !boundary.is_valid() {
        return BoundaryDistance {
            distance: 0.0,
            inside: false,
        };
    }

    let min_sq = boundary
        .edges()
        .map(|(a, b)| point_segment_distance_squared(p, a, b))
        .fold(f32::INFINITY, f32::min);

    BoundaryDistance {
        distance: min_sq.sqrt(),
        inside: point_in_polygon(p, boundary),
    }
}

/// Alpha for a vertex near the outline: 0 beyond `fade_width` outside, 1
/// beyond `fade_width` inside, smooth across the edge. Without a usable
/// outline everything is fully visible.
pub fn boundary_fade(p: PlanarPoint, boundary: &Boundary, fade_width: f32) -> f32 {
    if !boundary.is_valid() {
        return 1.0;
    }
    let signed = signed_distance(p, boundary).signed();
    if fade_width <= 0.0 {
        return if signed > 0.0 { 1.0 } else { 0.0 };
    }
    smoothstep(-fade_width, fade_width, signed)
}
