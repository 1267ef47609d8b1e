//! Contour extraction (marching squares)
//!
//! Every grid cell is tested against every contour level independently; the
//! result is an unordered list of segments with no polyline reconstruction.

use super::geometry::lerp;
use super::height_field::HeightField;
use bytemuck::{Pod, Zeroable};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Default vertical spacing between contour lines
pub const DEFAULT_CONTOUR_STEP: f32 = 0.01;

/// How a cell with four crossings (a saddle) is split into two segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaddleResolution {
    /// Pair crossings in edge order: (e0, e1) and (e2, e3). Cheap, but can
    /// join the wrong sides of a saddle.
    #[default]
    EdgeOrder,
    /// Use the cell-centre average to decide which diagonal corners are
    /// connected.
    CenterSample,
}

/// One iso-height segment, endpoints in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourSegment {
    pub level: f32,
    pub start: [f32; 3],
    pub end: [f32; 3],
}

/// GPU-ready contour vertex, two per segment.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ContourVertex {
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourSet {
    step: f32,
    segments: Vec<ContourSegment>,
}

impl ContourSet {
    pub fn empty(step: f32) -> Self {
        Self {
            step,
            segments: Vec::new(),
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn segments(&self) -> &[ContourSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flattened line-list vertices, start then end of every segment.
    pub fn vertices(&self) -> Vec<ContourVertex> {
        self.segments
            .iter()
            .flat_map(|s| {
                [
                    ContourVertex { position: s.start },
                    ContourVertex { position: s.end },
                ]
            })
            .collect()
    }

    /// Distinct levels present in the set, ascending.
    pub fn levels(&self) -> Vec<f32> {
        let mut levels: Vec<f32> = self.segments.iter().map(|s| s.level).collect();
        levels.sort_by(f32::total_cmp);
        levels.dedup();
        levels
    }
}

/// Contour levels: multiples of `step` from the first one at or above `min`
/// up to `max`. Levels are computed from their index so long runs do not
/// drift.
pub fn contour_levels(min: f32, max: f32, step: f32) -> Vec<f32> {
    if !(step > 0.0 && step.is_finite()) || !(min.is_finite() && max.is_finite()) || max < min {
        return Vec::new();
    }
    let first = (min / step).ceil();
    let mut levels = Vec::new();
    let mut k = 0.0_f32;
    loop {
        let level = (first + k) * step;
        if level > max {
            break;
        }
        levels.push(level);
        k += 1.0;
    }
    levels
}

/// Extracts contour segments with the default saddle handling.
pub fn extract(field: &HeightField, level_step: f32) -> ContourSet {
    extract_with(field, level_step, SaddleResolution::default())
}

pub fn extract_with(field: &HeightField, level_step: f32, saddle: SaddleResolution) -> ContourSet {
    let (min, max) = field.height_range();
    let levels = contour_levels(min, max, level_step);
    if levels.is_empty() {
        if !(level_step > 0.0) {
            log::warn!("Contour step {} is not positive, no contours", level_step);
        }
        return ContourSet::empty(level_step);
    }

    let cols = field.cols();
    let segments: Vec<ContourSegment> = (0..field.rows() * cols)
        .into_par_iter()
        .flat_map_iter(|cell| {
            let corners = cell_corners(field, cell / cols, cell % cols);
            let mut out = Vec::new();
            for &level in &levels {
                march_cell(&corners, level, saddle, &mut out);
            }
            out
        })
        .collect();

    log::debug!(
        "Contours: {} levels, {} segments at step {}",
        levels.len(),
        segments.len(),
        level_step
    );

    ContourSet {
        step: level_step,
        segments,
    }
}

/// Corners in traversal order: (r, c), (r, c+1), (r+1, c+1), (r+1, c).
fn cell_corners(field: &HeightField, row: usize, col: usize) -> [[f32; 3]; 4] {
    [
        field.vertex(field.index(row, col)),
        field.vertex(field.index(row, col + 1)),
        field.vertex(field.index(row + 1, col + 1)),
        field.vertex(field.index(row + 1, col)),
    ]
}

/// Point where edge `a → b` crosses `level`, if it does.
fn edge_crossing(a: [f32; 3], b: [f32; 3], level: f32) -> Option<[f32; 3]> {
    if (a[1] > level) == (b[1] > level) {
        return None;
    }
    let t = (level - a[1]) / (b[1] - a[1]);
    Some([lerp(a[0], b[0], t), level, lerp(a[2], b[2], t)])
}

fn march_cell(
    corners: &[[f32; 3]; 4],
    level: f32,
    saddle: SaddleResolution,
    out: &mut Vec<ContourSegment>,
) {
    let crossings: [Option<[f32; 3]>; 4] =
        std::array::from_fn(|e| edge_crossing(corners[e], corners[(e + 1) % 4], level));
    let found: Vec<[f32; 3]> = crossings.iter().flatten().copied().collect();

    let segment = |start, end| ContourSegment { level, start, end };

    match found.len() {
        2 => out.push(segment(found[0], found[1])),
        4 => {
            let centre = corners.iter().map(|c| c[1]).sum::<f32>() / 4.0;
            let centre_with_first = (centre > level) == (corners[0][1] > level);
            if saddle == SaddleResolution::CenterSample && !centre_with_first {
                // Corners 0 and 2 are cut off from the centre.
                out.push(segment(found[3], found[0]));
                out.push(segment(found[1], found[2]));
            } else {
                out.push(segment(found[0], found[1]));
                out.push(segment(found[2], found[3]));
            }
        }
        _ => {}
    }
}
