// 果岭编辑会话

use crate::config::GreenConfig;
use crate::error::Result;
use crate::terrain::{
    analyze, boundary_fade, deform, extract_with, point_in_polygon, signed_distance, Boundary,
    BoundaryDistance, BoundaryGenerator, ContourSet, DragSession, HeightField, PlanarPoint,
    SaddleResolution, ShapeParams, SlopeField,
};
use rayon::prelude::*;
use std::time::Instant;

/// Markers float this far above the surface they control.
pub const MARKER_HEIGHT_OFFSET: f32 = 1.0;
/// A control grid is at least 2 x 2.
pub const MIN_CONTROL_RESOLUTION: usize = 2;
pub const MAX_HOLES: usize = 3;

/// A draggable control location. Only `height` changes; it follows the
/// surface below plus [`MARKER_HEIGHT_OFFSET`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlMarker {
    pub position: PlanarPoint,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    pub position: PlanarPoint,
    /// Surface height at the time the hole was cut
    pub height: f32,
}

/// Whether a hole may go at a given spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleSite {
    Valid,
    OutsideBoundary,
    /// The nearest vertex is at or above the puttable slope limit.
    TooSteep,
}

impl HoleSite {
    pub fn is_valid(self) -> bool {
        self == HoleSite::Valid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolePlacement {
    /// Index of the new hole
    Placed(usize),
    Rejected(HoleSite),
    LimitReached,
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    marker: usize,
    session: DragSession,
}

/// Owns one green and everything derived from it.
///
/// Mutating operations run the derived passes in a fixed order: deform,
/// slope, contours, fade, marker re-projection. Accessors always see the
/// result of the last complete run.
pub struct GreenSession {
    config: GreenConfig,
    generator: BoundaryGenerator,
    field: HeightField,
    boundary: Boundary,
    slope: SlopeField,
    contours: ContourSet,
    fade: Vec<f32>,
    markers: Vec<ControlMarker>,
    drag: Option<ActiveDrag>,
    holes: Vec<Hole>,
}

impl GreenSession {
    pub fn new(config: GreenConfig) -> Result<Self> {
        config.validate()?;

        let field = HeightField::new(
            config.rows,
            config.cols,
            config.field_width,
            config.field_depth,
        )?;
        Self::with_field(config, field)
    }

    /// Session over an existing field. The field's own grid replaces the
    /// config's rows, columns and extent.
    pub fn with_field(mut config: GreenConfig, field: HeightField) -> Result<Self> {
        config.rows = field.rows();
        config.cols = field.cols();
        config.field_width = field.width();
        config.field_depth = field.depth();
        config.validate()?;

        let generator = BoundaryGenerator::new(config.noise);
        let boundary = generator.generate_from(&config.shape);
        let markers = control_grid(&field, config.control_resolution);

        let mut session = Self {
            slope: SlopeField::from_vertices(Vec::new()),
            contours: ContourSet::empty(config.contour_step),
            fade: Vec::new(),
            config,
            generator,
            field,
            boundary,
            markers,
            drag: None,
            holes: Vec::new(),
        };
        session.refresh_fade();
        session.refresh_surface();

        log::info!(
            "Green session: {}x{} cells, {} outline points, {} markers",
            session.field.rows(),
            session.field.cols(),
            session.boundary.len(),
            session.markers.len()
        );
        Ok(session)
    }

    pub fn config(&self) -> &GreenConfig {
        &self.config
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn slope(&self) -> &SlopeField {
        &self.slope
    }

    pub fn contours(&self) -> &ContourSet {
        &self.contours
    }

    /// Per-vertex boundary alpha
    pub fn fade(&self) -> &[f32] {
        &self.fade
    }

    pub fn markers(&self) -> &[ControlMarker] {
        &self.markers
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    /// Marker currently being dragged
    pub fn dragging(&self) -> Option<usize> {
        self.drag.as_ref().map(|d| d.marker)
    }

    // --- Shape ---

    /// Replaces the outline. Heights are kept; holes are not.
    pub fn regenerate_shape(&mut self, shape: ShapeParams) {
        self.clear_holes();
        self.config.shape = shape;
        self.boundary = self.generator.generate_from(&self.config.shape);
        log::info!(
            "Regenerated outline: {} x {}, irregularity {}, {} points",
            self.config.shape.width,
            self.config.shape.length,
            self.config.shape.irregularity,
            self.boundary.len()
        );
        self.refresh_fade();
    }

    // --- Drag lifecycle ---

    /// Snapshots the field for a drag of `marker`. Returns `false` for an
    /// unknown marker. A drag already in progress is replaced.
    pub fn begin_drag(&mut self, marker: usize) -> bool {
        let Some(control) = self.markers.get(marker) else {
            log::warn!("No control marker {} ({} markers)", marker, self.markers.len());
            return false;
        };
        self.drag = Some(ActiveDrag {
            marker,
            session: DragSession::begin(&self.field, control.height),
        });
        true
    }

    /// Moves the dragged marker to `height` and reshapes the field from the
    /// drag snapshot. No-op without an active drag.
    pub fn drag_to(&mut self, height: f32) -> bool {
        let Some(drag) = &self.drag else {
            log::debug!("drag_to({}) without an active drag", height);
            return false;
        };

        let control = self.markers[drag.marker].position;
        let start = Instant::now();
        let changed = deform(
            &mut self.field,
            control,
            height,
            Some(&drag.session),
            self.config.falloff_radius,
        );
        if !changed {
            return false;
        }
        log::debug!("deform: {:?}", start.elapsed());

        self.clear_holes();
        self.refresh_surface();
        true
    }

    /// Keeps the current heights and forgets the snapshot.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Restores the field to its rest heights.
    pub fn reset_elevation(&mut self) {
        self.clear_holes();
        self.drag = None;
        self.field.reset();
        self.refresh_surface();
    }

    // --- Settings ---

    /// Negative radii are stored as 0, which disables deformation.
    pub fn set_falloff_radius(&mut self, radius: f32) {
        self.config.falloff_radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    }

    /// Non-positive or non-finite steps are ignored; the current step stays.
    pub fn set_contour_step(&mut self, step: f32) {
        if !(step > 0.0 && step.is_finite()) {
            log::warn!(
                "Ignoring contour step {}, keeping {}",
                step,
                self.config.contour_step
            );
            return;
        }
        self.config.contour_step = step;
        self.refresh_contours();
    }

    pub fn set_saddle_resolution(&mut self, saddle: SaddleResolution) {
        self.config.saddle_resolution = saddle;
        self.refresh_contours();
    }

    /// Negative or non-finite widths are stored as 0, a hard edge.
    pub fn set_fade_width(&mut self, width: f32) {
        self.config.fade_width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        self.refresh_fade();
    }

    /// Rebuilds the control grid; any drag in progress is dropped.
    /// Resolutions below [`MIN_CONTROL_RESOLUTION`] are raised to it.
    pub fn set_control_resolution(&mut self, resolution: usize) {
        let resolution = resolution.max(MIN_CONTROL_RESOLUTION);
        self.config.control_resolution = resolution;
        self.drag = None;
        self.markers = control_grid(&self.field, resolution);
    }

    // --- Queries ---

    /// Containment in the outline. Without a usable outline every point
    /// counts as inside.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        !self.boundary.is_valid() || point_in_polygon(PlanarPoint::new(x, z), &self.boundary)
    }

    pub fn signed_distance(&self, x: f32, z: f32) -> BoundaryDistance {
        if !self.boundary.is_valid() {
            return BoundaryDistance {
                distance: 0.0,
                inside: true,
            };
        }
        signed_distance(PlanarPoint::new(x, z), &self.boundary)
    }

    pub fn sample_height(&self, x: f32, z: f32) -> f32 {
        self.field.sample_height(x, z)
    }

    /// Share of in-bounds vertices that are puttable, in percent.
    pub fn puttable_percentage(&self) -> f32 {
        let (inside, puttable) = self
            .field
            .positions()
            .par_iter()
            .enumerate()
            .filter(|(_, p)| self.contains(p.x, p.z))
            .map(|(i, _)| (1_usize, usize::from(self.slope.is_puttable(i))))
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

        if inside == 0 {
            0.0
        } else {
            puttable as f32 / inside as f32 * 100.0
        }
    }

    // --- Holes ---

    pub fn hole_site(&self, x: f32, z: f32) -> HoleSite {
        if !self.contains(x, z) {
            return HoleSite::OutsideBoundary;
        }
        if !self.slope.is_puttable(self.field.nearest_vertex(x, z)) {
            return HoleSite::TooSteep;
        }
        HoleSite::Valid
    }

    pub fn place_hole(&mut self, x: f32, z: f32) -> HolePlacement {
        if self.holes.len() >= MAX_HOLES {
            return HolePlacement::LimitReached;
        }
        let site = self.hole_site(x, z);
        if !site.is_valid() {
            return HolePlacement::Rejected(site);
        }
        self.holes.push(Hole {
            position: PlanarPoint::new(x, z),
            height: self.field.sample_height(x, z),
        });
        HolePlacement::Placed(self.holes.len() - 1)
    }

    pub fn clear_holes(&mut self) {
        self.holes.clear();
    }

    // --- Passes ---

    /// Every pass that depends on heights.
    fn refresh_surface(&mut self) {
        let start = Instant::now();
        self.slope = analyze(&self.field);
        log::debug!("slope: {:?}", start.elapsed());

        self.refresh_contours();
        self.reproject_markers();
    }

    fn refresh_contours(&mut self) {
        let start = Instant::now();
        self.contours = extract_with(
            &self.field,
            self.config.contour_step,
            self.config.saddle_resolution,
        );
        log::debug!("contours: {} segments in {:?}", self.contours.len(), start.elapsed());
    }

    /// Fade depends on planar positions and the outline only.
    fn refresh_fade(&mut self) {
        let start = Instant::now();
        let boundary = &self.boundary;
        let width = self.config.fade_width;
        self.fade = self
            .field
            .positions()
            .par_iter()
            .map(|&p| boundary_fade(p, boundary, width))
            .collect();
        log::debug!("fade: {:?}", start.elapsed());
    }

    fn reproject_markers(&mut self) {
        let field = &self.field;
        for marker in &mut self.markers {
            let surface = field.sample_height(marker.position.x, marker.position.z);
            marker.height = surface + MARKER_HEIGHT_OFFSET;
        }
    }
}

/// `resolution x resolution` markers spanning the field edge to edge, at
/// the surface height plus the marker offset.
pub fn control_grid(field: &HeightField, resolution: usize) -> Vec<ControlMarker> {
    let resolution = resolution.max(MIN_CONTROL_RESOLUTION);
    let step_x = field.width() / (resolution - 1) as f32;
    let step_z = field.depth() / (resolution - 1) as f32;

    (0..resolution)
        .flat_map(|i| {
            (0..resolution).map(move |j| {
                PlanarPoint::new(
                    -field.width() / 2.0 + i as f32 * step_x,
                    -field.depth() / 2.0 + j as f32 * step_z,
                )
            })
        })
        .map(|position| ControlMarker {
            position,
            height: field.sample_height(position.x, position.z) + MARKER_HEIGHT_OFFSET,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{DEFAULT_CONTOUR_STEP, PUTTABLE_SLOPE_PERCENT};

    fn session(segments: usize) -> GreenSession {
        GreenSession::new(GreenConfig::coarse(segments)).unwrap()
    }

    #[test]
    fn new_session_is_flat_and_complete() {
        let green = session(20);
        let vertices = green.field().vertex_count();
        assert_eq!(vertices, 21 * 21);
        assert_eq!(green.slope().len(), vertices);
        assert_eq!(green.fade().len(), vertices);
        assert!(green.contours().is_empty());
        assert_eq!(green.markers().len(), 64);
        assert!(green.markers().iter().all(|m| m.height == MARKER_HEIGHT_OFFSET));
        assert!(green.boundary().is_valid());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GreenConfig {
            cols: 0,
            ..Default::default()
        };
        assert!(GreenSession::new(config).is_err());
    }

    #[test]
    fn control_grid_spans_the_field() {
        let field = HeightField::new(4, 4, 10.0, 6.0).unwrap();
        let markers = control_grid(&field, 3);
        assert_eq!(markers.len(), 9);
        assert_eq!(markers[0].position, PlanarPoint::new(-5.0, -3.0));
        assert_eq!(markers[4].position, PlanarPoint::new(0.0, 0.0));
        assert_eq!(markers[8].position, PlanarPoint::new(5.0, 3.0));

        // Resolution below 2 is raised to 2.
        assert_eq!(control_grid(&field, 0).len(), 4);
    }

    #[test]
    fn drag_raises_the_field_and_follows_with_markers() {
        let mut green = session(20);
        // 8x8 grid: marker (3, 3) sits near the centre
        let marker = 3 * 8 + 3;
        let start_height = green.markers()[marker].height;

        assert!(!green.drag_to(start_height + 1.0), "no drag yet");
        assert!(green.begin_drag(marker));
        assert_eq!(green.dragging(), Some(marker));
        assert!(green.drag_to(start_height + 0.5));

        let (min, max) = green.field().height_range();
        assert!(min >= 0.0);
        assert!(max > 0.4 && max <= 0.5 + 1e-6);
        assert!(!green.contours().is_empty());

        let m = green.markers()[marker];
        let surface = green.sample_height(m.position.x, m.position.z);
        assert!((m.height - surface - MARKER_HEIGHT_OFFSET).abs() < 1e-5);

        // The drag is cumulative from the snapshot, not incremental.
        assert!(green.drag_to(start_height + 0.5));
        let (_, again) = green.field().height_range();
        assert!((again - max).abs() < 1e-6);

        green.end_drag();
        assert_eq!(green.dragging(), None);
        assert!(!green.drag_to(start_height + 2.0));
    }

    #[test]
    fn unknown_marker_cannot_be_dragged() {
        let mut green = session(10);
        assert!(!green.begin_drag(1000));
        assert_eq!(green.dragging(), None);
    }

    #[test]
    fn reset_restores_rest_heights() {
        let mut green = session(16);
        green.begin_drag(0);
        let h = green.markers()[0].height;
        green.drag_to(h + 1.0);
        assert!(green.field().height_range().1 > 0.0);

        green.reset_elevation();
        assert_eq!(green.field().height_range(), (0.0, 0.0));
        assert_eq!(green.dragging(), None);
        assert!(green.contours().is_empty());
        assert!(green.markers().iter().all(|m| m.height == MARKER_HEIGHT_OFFSET));
    }

    #[test]
    fn degenerate_outline_contains_everything() {
        let mut green = session(8);
        green.regenerate_shape(ShapeParams {
            point_count: 2,
            ..Default::default()
        });
        assert!(!green.boundary().is_valid());
        assert!(green.contains(100.0, -100.0));
        let d = green.signed_distance(3.0, 3.0);
        assert_eq!(d.distance, 0.0);
        assert!(d.inside);
        assert!(green.fade().iter().all(|&a| a == 1.0));
    }

    #[test]
    fn flat_green_is_fully_puttable() {
        let green = session(20);
        assert_eq!(green.puttable_percentage(), 100.0);
    }

    #[test]
    fn steep_green_is_not_puttable() {
        let field = HeightField::from_fn(20, 20, 10.0, 10.0, |x, _| 0.1 * x).unwrap();
        let green = GreenSession::with_field(GreenConfig::default(), field).unwrap();
        assert!(green.slope().slope_percent().iter().all(|&s| s > PUTTABLE_SLOPE_PERCENT));
        assert_eq!(green.puttable_percentage(), 0.0);
        assert_eq!(green.hole_site(0.0, 0.0), HoleSite::TooSteep);
    }

    #[test]
    fn holes_are_limited_and_cleared_by_edits() {
        let mut green = session(20);
        assert_eq!(green.hole_site(20.0, 0.0), HoleSite::OutsideBoundary);
        assert_eq!(
            green.place_hole(20.0, 0.0),
            HolePlacement::Rejected(HoleSite::OutsideBoundary)
        );

        for (i, x) in [-1.0, 0.0, 1.0].into_iter().enumerate() {
            assert_eq!(green.place_hole(x, 0.0), HolePlacement::Placed(i));
        }
        assert_eq!(green.place_hole(0.0, 1.0), HolePlacement::LimitReached);
        assert_eq!(green.holes().len(), MAX_HOLES);

        green.begin_drag(0);
        let h = green.markers()[0].height;
        green.drag_to(h + 0.2);
        assert!(green.holes().is_empty());

        green.place_hole(0.0, 0.0);
        green.reset_elevation();
        assert!(green.holes().is_empty());

        green.place_hole(0.0, 0.0);
        green.regenerate_shape(ShapeParams::default());
        assert!(green.holes().is_empty());
    }

    #[test]
    fn setters_keep_the_config_valid() {
        let field = HeightField::from_fn(10, 10, 10.0, 10.0, |x, _| 0.05 * (x + 5.0)).unwrap();
        let mut green = GreenSession::with_field(GreenConfig::default(), field).unwrap();
        let segments = green.contours().len();

        for step in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            green.set_contour_step(step);
            assert!(green.config().validate().is_ok(), "step {}", step);
            assert_eq!(green.config().contour_step, DEFAULT_CONTOUR_STEP);
            assert_eq!(green.contours().len(), segments);
        }

        for radius in [-1.0, f32::NAN, f32::INFINITY] {
            green.set_falloff_radius(radius);
            assert!(green.config().validate().is_ok(), "radius {}", radius);
        }

        for width in [-0.3, f32::NAN, f32::INFINITY] {
            green.set_fade_width(width);
            assert!(green.config().validate().is_ok(), "fade width {}", width);
        }

        for resolution in [0, 1] {
            green.set_control_resolution(resolution);
            let stored = green.config().control_resolution;
            assert_eq!(stored, MIN_CONTROL_RESOLUTION);
            assert_eq!(green.markers().len(), stored * stored);
        }

        // The session's own config rebuilds an equivalent session.
        let rebuilt = GreenSession::new(green.config().clone()).unwrap();
        assert_eq!(rebuilt.markers().len(), green.markers().len());
        assert_eq!(rebuilt.config(), green.config());
    }

    #[test]
    fn contour_step_change_reextracts() {
        let field = HeightField::from_fn(10, 10, 10.0, 10.0, |x, _| 0.05 * (x + 5.0)).unwrap();
        let mut green = GreenSession::with_field(GreenConfig::default(), field).unwrap();
        let fine = green.contours().len();
        green.set_contour_step(0.1);
        let coarse = green.contours().len();
        assert!(coarse > 0 && coarse < fine);
        assert_eq!(green.contours().step(), 0.1);
    }
}
