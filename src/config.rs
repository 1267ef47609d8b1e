use crate::error::{Result, TerrainError};
use crate::terrain::{NoiseConfig, SaddleResolution, ShapeParams, DEFAULT_CONTOUR_STEP, FADE_WIDTH};
use serde::{Deserialize, Serialize};

/// Side length of the default square field
pub const DEFAULT_FIELD_SIZE: f32 = 10.0;
/// Cells per side of the default field
pub const DEFAULT_SEGMENTS: usize = 100;

/// Flat configuration record for a green session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreenConfig {
    /// Physical size of the height field along x
    pub field_width: f32,
    /// Physical size of the height field along z
    pub field_depth: f32,
    /// Cells along z
    pub rows: usize,
    /// Cells along x
    pub cols: usize,

    pub shape: ShapeParams,
    pub noise: NoiseConfig,

    /// Radius of influence of a control drag
    pub falloff_radius: f32,
    /// Control markers per side
    pub control_resolution: usize,
    /// Vertical spacing of contour lines
    pub contour_step: f32,
    pub saddle_resolution: SaddleResolution,
    /// Half-width of the fade band around the outline
    pub fade_width: f32,
}

impl Default for GreenConfig {
    fn default() -> Self {
        Self {
            field_width: DEFAULT_FIELD_SIZE,
            field_depth: DEFAULT_FIELD_SIZE,
            rows: DEFAULT_SEGMENTS,
            cols: DEFAULT_SEGMENTS,
            shape: ShapeParams::default(),
            noise: NoiseConfig::default(),
            falloff_radius: 2.0,
            control_resolution: 8,
            contour_step: DEFAULT_CONTOUR_STEP,
            saddle_resolution: SaddleResolution::EdgeOrder,
            fade_width: FADE_WIDTH,
        }
    }
}

impl GreenConfig {
    /// Small field for tests and quick previews
    pub fn coarse(segments: usize) -> Self {
        Self {
            rows: segments,
            cols: segments,
            ..Default::default()
        }
    }

    /// Checks the parts of the config that the engine cannot fall back from.
    ///
    /// Shape parameters are not checked here: a bad outline falls back to the
    /// unit polygon instead.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(TerrainError::InvalidGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !(self.field_width > 0.0 && self.field_width.is_finite())
            || !(self.field_depth > 0.0 && self.field_depth.is_finite())
        {
            return Err(TerrainError::InvalidExtent {
                width: self.field_width,
                depth: self.field_depth,
            });
        }
        if !(self.falloff_radius >= 0.0 && self.falloff_radius.is_finite()) {
            return Err(TerrainError::InvalidConfig(format!(
                "falloff radius must be non-negative, got {}",
                self.falloff_radius
            )));
        }
        if !(self.contour_step > 0.0 && self.contour_step.is_finite()) {
            return Err(TerrainError::InvalidConfig(format!(
                "contour step must be positive, got {}",
                self.contour_step
            )));
        }
        if !(self.fade_width >= 0.0 && self.fade_width.is_finite()) {
            return Err(TerrainError::InvalidConfig(format!(
                "fade width must be non-negative, got {}",
                self.fade_width
            )));
        }
        Ok(())
    }
}
