// 果岭轮廓生成

use super::geometry::PlanarPoint;
use super::noise::{NoiseConfig, NoiseGenerator};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Larger side of every generated outline's bounding box after rescaling.
pub const MAX_BOUNDARY_EXTENT: f32 = 9.5;

/// Lower bound on the noise factor, keeps radii positive so the outline
/// never folds over itself.
pub const MIN_RADIUS_FACTOR: f64 = 0.1;

/// Shape parameters for one outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Diameter of the base ellipse along x
    pub width: f32,
    /// Diameter of the base ellipse along z
    pub length: f32,
    /// Noise amplitude applied to the radius, 0 gives a clean ellipse
    pub irregularity: f32,
    pub point_count: usize,
    pub noise_offset: f32,
    /// Added to the ellipse radius before the noise factor
    pub radius_offset: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            width: 10.0,
            length: 10.0,
            irregularity: 0.3,
            point_count: 300,
            noise_offset: 0.0,
            radius_offset: 0.0,
        }
    }
}

/// Closed outline of the green. Edge `i` runs from point `i` to point
/// `(i + 1) % n`; the closing point is never duplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    points: Vec<PlanarPoint>,
}

impl Boundary {
    pub fn new(points: Vec<PlanarPoint>) -> Self {
        Self { points }
    }

    /// An outline with fewer than three points constrains nothing.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
    }

    pub fn points(&self) -> &[PlanarPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates edges as `(start, end)` pairs, closing edge included.
    pub fn edges(&self) -> impl Iterator<Item = (PlanarPoint, PlanarPoint)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// `(min_x, max_x, min_z, max_z)`, or `None` when empty.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().fold(
            (
                f32::INFINITY,
                f32::NEG_INFINITY,
                f32::INFINITY,
                f32::NEG_INFINITY,
            ),
            |(min_x, max_x, min_z, max_z), p| {
                (min_x.min(p.x), max_x.max(p.x), min_z.min(p.z), max_z.max(p.z))
            },
        ))
    }
}

/// Polar radius of an axis-aligned ellipse with semi-axes `a` (x) and `b` (z).
pub fn ellipse_radius(a: f64, b: f64, angle: f64) -> f64 {
    let denominator = ((b * angle.cos()).powi(2) + (a * angle.sin()).powi(2)).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        a * b / denominator
    }
}

/// Builds outlines from shape parameters. Owns the noise state, so a generator
/// returns the same outline for the same parameters every time.
pub struct BoundaryGenerator {
    noise: NoiseGenerator,
}

impl BoundaryGenerator {
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            noise: NoiseGenerator::new(config),
        }
    }

    pub fn generate_from(&self, params: &ShapeParams) -> Boundary {
        self.generate(
            params.width,
            params.length,
            params.irregularity,
            params.point_count,
            params.noise_offset,
            params.radius_offset,
        )
    }

    /// Irregular ellipse, centred on the origin and scaled so its larger
    /// bounding side is [`MAX_BOUNDARY_EXTENT`].
    ///
    /// Non-positive `width`/`length` or fewer than three points yields a
    /// regular polygon on the unit circle instead.
    pub fn generate(
        &self,
        width: f32,
        length: f32,
        irregularity: f32,
        point_count: usize,
        noise_offset: f32,
        radius_offset: f32,
    ) -> Boundary {
        let a = width as f64 / 2.0;
        let b = length as f64 / 2.0;

        if !(a > 0.0) || !(b > 0.0) || point_count <= 2 {
            log::warn!(
                "Invalid outline parameters (width {}, length {}, {} points), using unit polygon",
                width,
                length,
                point_count
            );
            return unit_polygon(point_count);
        }

        let irregularity = irregularity as f64;
        let noise_offset = noise_offset as f64;
        let radius_offset = radius_offset as f64;

        let raw: Vec<(f64, f64)> = (0..point_count)
            .map(|i| {
                let angle = i as f64 / point_count as f64 * TAU;
                let (sin_angle, cos_angle) = angle.sin_cos();

                let radius = ellipse_radius(a, b, angle) + radius_offset;
                let noise_value = self.noise.sample_direction(cos_angle, sin_angle, noise_offset);
                let factor = (1.0 + irregularity * noise_value).max(MIN_RADIUS_FACTOR);
                let radius = radius * factor;

                (radius * cos_angle, radius * sin_angle)
            })
            .collect();

        let (min_x, max_x, min_z, max_z) = raw.iter().fold(
            (
                f64::INFINITY,
                f64::NEG_INFINITY,
                f64::INFINITY,
                f64::NEG_INFINITY,
            ),
            |(min_x, max_x, min_z, max_z), &(x, z)| {
                (min_x.min(x), max_x.max(x), min_z.min(z), max_z.max(z))
            },
        );
        let center_x = (min_x + max_x) / 2.0;
        let center_z = (min_z + max_z) / 2.0;

        let extent = MAX_BOUNDARY_EXTENT as f64;
        let actual_width = max_x - min_x;
        let actual_depth = max_z - min_z;
        let scale_x = if actual_width > 1e-6 { extent / actual_width } else { 1.0 };
        let scale_z = if actual_depth > 1e-6 { extent / actual_depth } else { 1.0 };
        let scale = scale_x.min(scale_z);

        log::debug!(
            "Outline: {} points, raw extent {:.3} x {:.3}, scale {:.4}",
            point_count,
            actual_width,
            actual_depth,
            scale
        );

        Boundary::new(
            raw.into_iter()
                .map(|(x, z)| {
                    PlanarPoint::new(
                        ((x - center_x) * scale) as f32,
                        ((z - center_z) * scale) as f32,
                    )
                })
                .collect(),
        )
    }
}

fn unit_polygon(point_count: usize) -> Boundary {
    Boundary::new(
        (0..point_count)
            .map(|i| {
                let angle = i as f64 / point_count as f64 * TAU;
                PlanarPoint::new(angle.cos() as f32, angle.sin() as f32)
            })
            .collect(),
    )
}
