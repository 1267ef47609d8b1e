//! Slope analysis
//!
//! Per-vertex normals are accumulated from the two triangles of every grid
//! cell, weighted by triangle area, then turned into a slope percentage
//! (`100 * tan(angle to vertical)`), a banded classification and the planar
//! direction of steepest descent.

use super::height_field::HeightField;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Slopes below this percentage count as puttable. Collaborators decide what
/// to do with it (hole placement, area reporting).
pub const PUTTABLE_SLOPE_PERCENT: f32 = 4.0;

/// Planar gradients shorter than this (squared) have no defined direction.
pub const FLAT_EPSILON_SQ: f32 = 1e-8;

pub fn is_puttable(slope_percent: f32) -> bool {
    slope_percent < PUTTABLE_SLOPE_PERCENT
}

/// Slope classes, each one percent wide, the last one open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlopeBand {
    UnderOne,
    OneToTwo,
    TwoToThree,
    ThreeToFour,
    FourToFive,
    FiveToSix,
    SixPlus,
}

impl SlopeBand {
    pub const ALL: [SlopeBand; 7] = [
        SlopeBand::UnderOne,
        SlopeBand::OneToTwo,
        SlopeBand::TwoToThree,
        SlopeBand::ThreeToFour,
        SlopeBand::FourToFive,
        SlopeBand::FiveToSix,
        SlopeBand::SixPlus,
    ];

    /// Bands are half-open on the upper bound: 4.0 is `FourToFive`.
    pub fn from_percent(slope_percent: f32) -> Self {
        if slope_percent < 1.0 {
            SlopeBand::UnderOne
        } else if slope_percent < 2.0 {
            SlopeBand::OneToTwo
        } else if slope_percent < 3.0 {
            SlopeBand::TwoToThree
        } else if slope_percent < 4.0 {
            SlopeBand::ThreeToFour
        } else if slope_percent < 5.0 {
            SlopeBand::FourToFive
        } else if slope_percent < 6.0 {
            SlopeBand::FiveToSix
        } else {
            SlopeBand::SixPlus
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Lower bound of the band in percent
    pub fn lower_bound(self) -> f32 {
        self.index() as f32
    }
}

/// Derived per-vertex slope data. Every array has one entry per vertex of the
/// field it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeField {
    normals: Vec<[f32; 3]>,
    slope_percent: Vec<f32>,
    descent: Vec<Option<[f32; 2]>>,
    bands: Vec<SlopeBand>,
}

/// Everything the analyzer knows about one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSlope {
    pub normal: [f32; 3],
    pub slope_percent: f32,
    /// Unit `(x, z)` direction of steepest descent, `None` on flat ground.
    /// Already points downhill; do not negate it for arrows.
    pub descent: Option<[f32; 2]>,
    pub band: SlopeBand,
}

impl VertexSlope {
    pub fn from_normal(normal: [f32; 3]) -> Self {
        let (gx, gz) = (normal[0], normal[2]);
        let length_sq = gx * gx + gz * gz;

        // Angle between the normal and +y
        let slope_angle = length_sq.sqrt().atan2(normal[1]);
        let slope_percent = (slope_angle.tan() * 100.0).max(0.0);

        // The normal leans toward lower ground; its planar part is the
        // downhill direction.
        let descent = if length_sq < FLAT_EPSILON_SQ {
            None
        } else {
            let length = length_sq.sqrt();
            Some([gx / length, gz / length])
        };

        Self {
            normal,
            slope_percent,
            descent,
            band: SlopeBand::from_percent(slope_percent),
        }
    }
}

impl SlopeField {
    /// Assembles a field from per-vertex records.
    pub fn from_vertices(vertices: Vec<VertexSlope>) -> Self {
        let mut field = Self {
            normals: Vec::with_capacity(vertices.len()),
            slope_percent: Vec::with_capacity(vertices.len()),
            descent: Vec::with_capacity(vertices.len()),
            bands: Vec::with_capacity(vertices.len()),
        };
        for v in vertices {
            field.normals.push(v.normal);
            field.slope_percent.push(v.slope_percent);
            field.descent.push(v.descent);
            field.bands.push(v.band);
        }
        field
    }

    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn slope_percent(&self) -> &[f32] {
        &self.slope_percent
    }

    pub fn descent(&self) -> &[Option<[f32; 2]>] {
        &self.descent
    }

    pub fn bands(&self) -> &[SlopeBand] {
        &self.bands
    }

    pub fn vertex(&self, index: usize) -> VertexSlope {
        VertexSlope {
            normal: self.normals[index],
            slope_percent: self.slope_percent[index],
            descent: self.descent[index],
            band: self.bands[index],
        }
    }

    pub fn is_puttable(&self, index: usize) -> bool {
        is_puttable(self.slope_percent[index])
    }

    /// Vertex count per band, indexed by [`SlopeBand::index`].
    pub fn band_histogram(&self) -> [usize; 7] {
        let mut histogram = [0; 7];
        for band in &self.bands {
            histogram[band.index()] += 1;
        }
        histogram
    }
}

/// Unnormalized face normals of the two triangles of cell `(row, col)`:
/// `(v00, v10, v01)` and `(v10, v11, v01)`. Their length is twice the
/// triangle area, which gives the area weighting for free.
fn cell_face_normals(field: &HeightField, row: usize, col: usize) -> [[f32; 3]; 2] {
    use super::geometry::{cross, sub};

    let v00 = field.vertex(field.index(row, col));
    let v01 = field.vertex(field.index(row, col + 1));
    let v10 = field.vertex(field.index(row + 1, col));
    let v11 = field.vertex(field.index(row + 1, col + 1));

    [
        cross(sub(v10, v00), sub(v01, v00)),
        cross(sub(v11, v10), sub(v01, v10)),
    ]
}

/// Area-weighted vertex normals, one per vertex.
pub fn vertex_normals(field: &HeightField) -> Vec<[f32; 3]> {
    use super::geometry::{add, normalize};

    let rows = field.rows();
    let cols = field.cols();

    let faces: Vec<[[f32; 3]; 2]> = (0..rows * cols)
        .into_par_iter()
        .map(|cell| cell_face_normals(field, cell / cols, cell % cols))
        .collect();
    let face = |row: usize, col: usize| &faces[row * cols + col];

    (0..field.vertex_count())
        .into_par_iter()
        .map(|i| {
            let row = i / (cols + 1);
            let col = i % (cols + 1);
            let mut sum = [0.0_f32; 3];

            // v00 of the cell below-right: first triangle only
            if row < rows && col < cols {
                sum = add(sum, face(row, col)[0]);
            }
            // v01 of the cell to the left: both triangles
            if row < rows && col > 0 {
                let [a, b] = face(row, col - 1);
                sum = add(add(sum, *a), *b);
            }
            // v10 of the cell above: both triangles
            if row > 0 && col < cols {
                let [a, b] = face(row - 1, col);
                sum = add(add(sum, *a), *b);
            }
            // v11 of the cell above-left: second triangle only
            if row > 0 && col > 0 {
                sum = add(sum, face(row - 1, col - 1)[1]);
            }

            normalize(sum).unwrap_or([0.0, 1.0, 0.0])
        })
        .collect()
}

/// Recomputes every derived slope quantity from the current heights.
pub fn analyze(field: &HeightField) -> SlopeField {
    let normals = vertex_normals(field);
    let vertices: Vec<VertexSlope> = normals.into_par_iter().map(VertexSlope::from_normal).collect();
    SlopeField::from_vertices(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_field_has_no_slope() {
        let field = HeightField::from_fn(6, 9, 3.0, 4.5, |_, _| 0.75).unwrap();
        let slope = analyze(&field);
        assert_eq!(slope.len(), field.vertex_count());
        for i in 0..slope.len() {
            let v = slope.vertex(i);
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
            assert_eq!(v.slope_percent, 0.0);
            assert_eq!(v.descent, None);
            assert_eq!(v.band, SlopeBand::UnderOne);
        }
    }

    #[test]
    fn planar_ramp_has_uniform_slope() {
        // 3% grade rising toward +x
        let field = HeightField::from_fn(10, 10, 5.0, 5.0, |x, _| 0.03 * x).unwrap();
        let slope = analyze(&field);
        for i in 0..slope.len() {
            let v = slope.vertex(i);
            assert!((v.slope_percent - 3.0).abs() < 1e-2, "vertex {}: {}", i, v.slope_percent);
            let [dx, dz] = v.descent.expect("ramp has a direction");
            assert!((dx + 1.0).abs() < 1e-4 && dz.abs() < 1e-4, "descent should point to -x");
        }
    }

    #[test]
    fn descent_points_downhill_on_diagonal_ramp() {
        let field = HeightField::from_fn(8, 8, 4.0, 4.0, |x, z| 0.05 * (x + z)).unwrap();
        let slope = analyze(&field);
        let centre = field.index(4, 4);
        let [dx, dz] = slope.descent()[centre].unwrap();
        let expected = -std::f32::consts::FRAC_1_SQRT_2;
        assert!((dx - expected).abs() < 1e-4 && (dz - expected).abs() < 1e-4);
        let p = field.positions()[centre];
        let ahead = field.sample_height(p.x + dx * 0.5, p.z + dz * 0.5);
        assert!(ahead < field.heights()[centre]);
    }

    #[test]
    fn band_boundaries_are_half_open() {
        assert_eq!(SlopeBand::from_percent(0.0), SlopeBand::UnderOne);
        assert_eq!(SlopeBand::from_percent(0.999), SlopeBand::UnderOne);
        assert_eq!(SlopeBand::from_percent(1.0), SlopeBand::OneToTwo);
        assert_eq!(SlopeBand::from_percent(3.999), SlopeBand::ThreeToFour);
        assert_eq!(SlopeBand::from_percent(4.0), SlopeBand::FourToFive);
        assert_eq!(SlopeBand::from_percent(6.0), SlopeBand::SixPlus);
        assert_eq!(SlopeBand::from_percent(250.0), SlopeBand::SixPlus);
        for (i, band) in SlopeBand::ALL.iter().enumerate() {
            assert_eq!(band.index(), i);
        }
        assert!(is_puttable(3.99));
        assert!(!is_puttable(4.0));
    }

    #[test]
    fn histogram_counts_every_vertex() {
        let field = HeightField::from_fn(12, 12, 6.0, 6.0, |x, z| 0.02 * x * x + 0.01 * z).unwrap();
        let slope = analyze(&field);
        let histogram = slope.band_histogram();
        assert_eq!(histogram.iter().sum::<usize>(), field.vertex_count());
        assert!(histogram.iter().filter(|&&n| n > 0).count() > 1);
    }

    #[test]
    fn normals_are_unit_length() {
        let field = HeightField::from_fn(7, 5, 3.0, 2.0, |x, z| (x * 1.3).sin() * (z * 0.7).cos()).unwrap();
        for n in vertex_normals(&field) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
            assert!(n[1] > 0.0);
        }
    }
}
