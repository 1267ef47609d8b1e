// 局部高度变形

use super::geometry::PlanarPoint;
use super::height_field::HeightField;
use rayon::prelude::*;

/// Weight of an edit at squared planar distance `dist_sq` from its centre.
pub trait Falloff {
    fn weight(&self, dist_sq: f32) -> f32;
}

/// Gaussian bump with `sigma^2 = radius^2 / 6`, so the weight is about 5% at
/// `radius` and 1 at the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFalloff {
    sigma_sq: f32,
}

impl GaussianFalloff {
    /// `None` for a zero or non-finite radius; there is no bump to apply.
    pub fn new(radius: f32) -> Option<Self> {
        let sigma_sq = radius * radius / 6.0;
        (sigma_sq > 0.0 && sigma_sq.is_finite()).then_some(Self { sigma_sq })
    }
}

impl Falloff for GaussianFalloff {
    #[inline]
    fn weight(&self, dist_sq: f32) -> f32 {
        (-dist_sq / (2.0 * self.sigma_sq)).exp()
    }
}

/// Snapshot taken when a drag starts. Every update of the drag is computed
/// from this snapshot, never from the already-deformed field.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    start_height: f32,
    base_heights: Vec<f32>,
}

impl DragSession {
    pub fn begin(field: &HeightField, start_height: f32) -> Self {
        Self {
            start_height,
            base_heights: field.heights().to_vec(),
        }
    }

    pub fn start_height(&self) -> f32 {
        self.start_height
    }

    pub fn base_heights(&self) -> &[f32] {
        &self.base_heights
    }
}

/// Raises (or lowers) the field around `control` by the control's total
/// displacement since the drag began, weighted by a Gaussian of
/// `falloff_radius`.
///
/// Returns `false` without touching the field when there is no session, the
/// radius is zero, or the session was taken from a differently sized field.
/// Normals, slopes and contours are stale afterwards.
pub fn deform(
    field: &mut HeightField,
    control: PlanarPoint,
    control_height_now: f32,
    session: Option<&DragSession>,
    falloff_radius: f32,
) -> bool {
    let Some(session) = session else {
        return false;
    };
    let Some(falloff) = GaussianFalloff::new(falloff_radius) else {
        log::warn!("Ignoring deformation with falloff radius {}", falloff_radius);
        return false;
    };
    if session.base_heights.len() != field.vertex_count() {
        log::warn!(
            "Drag snapshot has {} heights, field has {} vertices; ignoring",
            session.base_heights.len(),
            field.vertex_count()
        );
        return false;
    }

    let total_delta = control_height_now - session.start_height;
    apply_falloff(field, control, total_delta, &session.base_heights, &falloff);
    true
}

/// `height = base + total_delta * weight` for every vertex.
pub fn apply_falloff<F: Falloff + Sync>(
    field: &mut HeightField,
    control: PlanarPoint,
    total_delta: f32,
    base_heights: &[f32],
    falloff: &F,
) {
    let (positions, heights) = field.split_mut();
    heights
        .par_iter_mut()
        .zip(positions.par_iter())
        .zip(base_heights.par_iter())
        .for_each(|((height, &position), &base)| {
            let weight = falloff.weight(position.distance_squared(control));
            *height = base + total_delta * weight;
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bumpy() -> HeightField {
        HeightField::from_fn(8, 8, 4.0, 4.0, |x, z| 0.1 * x.sin() + 0.05 * z).unwrap()
    }

    #[test]
    fn no_session_is_a_noop() {
        let mut field = bumpy();
        let before = field.clone();
        assert!(!deform(&mut field, PlanarPoint::ORIGIN, 3.0, None, 1.0));
        assert_eq!(field, before);
    }

    #[test]
    fn zero_radius_is_a_noop() {
        let mut field = bumpy();
        let before = field.clone();
        let session = DragSession::begin(&field, 1.0);
        assert!(!deform(&mut field, PlanarPoint::ORIGIN, 3.0, Some(&session), 0.0));
        assert_eq!(field, before);
    }

    #[test]
    fn zero_delta_leaves_heights_unchanged() {
        let mut field = bumpy();
        let before = field.heights().to_vec();
        let session = DragSession::begin(&field, 1.5);
        assert!(deform(&mut field, PlanarPoint::new(0.5, 0.5), 1.5, Some(&session), 2.0));
        assert_eq!(field.heights(), &before[..]);
    }

    #[test]
    fn repeated_updates_do_not_accumulate() {
        let mut field = bumpy();
        let session = DragSession::begin(&field, 1.0);
        let control = PlanarPoint::new(-0.5, 1.0);

        deform(&mut field, control, 1.4, Some(&session), 1.5);
        let first = field.heights().to_vec();
        deform(&mut field, control, 1.4, Some(&session), 1.5);
        assert_eq!(field.heights(), &first[..]);

        // Going back to the start height undoes the drag exactly.
        deform(&mut field, control, 1.0, Some(&session), 1.5);
        assert_eq!(field.heights(), session.base_heights());
    }

    #[test]
    fn weight_is_one_at_centre_and_decreasing() {
        let falloff = GaussianFalloff::new(2.0).unwrap();
        assert_eq!(falloff.weight(0.0), 1.0);
        let mut previous = 1.0;
        for i in 1..40 {
            let d = i as f32 * 0.1;
            let w = falloff.weight(d * d);
            assert!(w < previous && w > 0.0, "weight not decreasing at distance {}", d);
            previous = w;
        }
        assert!(GaussianFalloff::new(0.0).is_none());
        assert!(GaussianFalloff::new(f32::NAN).is_none());
    }

    #[test]
    fn mismatched_snapshot_is_ignored() {
        let small = HeightField::new(2, 2, 1.0, 1.0).unwrap();
        let session = DragSession::begin(&small, 0.0);
        let mut field = bumpy();
        let before = field.clone();
        assert!(!deform(&mut field, PlanarPoint::ORIGIN, 1.0, Some(&session), 1.0));
        assert_eq!(field, before);
    }
}
