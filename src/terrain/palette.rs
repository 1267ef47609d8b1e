use super::slope::{SlopeBand, SlopeField};
use serde::{Deserialize, Serialize};

/// RGBA in [0, 1] from a `0xRRGGBB` literal, fully opaque.
pub const fn rgb_hex(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Overlay colour for vertices where a hole may go
pub const PLACEMENT_VALID: [f32; 4] = rgb_hex(0x4CAF50);
/// Overlay colour for vertices that are too steep for a hole
pub const PLACEMENT_INVALID: [f32; 4] = rgb_hex(0x808080);

/// One colour per slope band, blues for flat ground through greens to the
/// warm colours past the puttable limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandPalette {
    colors: [[f32; 4]; 7],
}

impl Default for BandPalette {
    fn default() -> Self {
        Self {
            colors: [
                rgb_hex(0x87CEFA), // light blue
                rgb_hex(0x4169E1), // royal blue
                rgb_hex(0x39FF14), // neon green
                rgb_hex(0x006400), // dark green
                rgb_hex(0xFF0000), // red
                rgb_hex(0xFFA500), // orange
                rgb_hex(0xFF69B4), // hot pink
            ],
        }
    }
}

impl BandPalette {
    pub fn new(colors: [[f32; 4]; 7]) -> Self {
        Self { colors }
    }

    pub fn color(&self, band: SlopeBand) -> [f32; 4] {
        self.colors[band.index()]
    }

    /// Per-vertex band colours with the alpha channel taken from `alpha`
    /// (usually the boundary fade).
    pub fn vertex_colors(&self, slope: &SlopeField, alpha: &[f32]) -> Vec<[f32; 4]> {
        debug_assert_eq!(slope.len(), alpha.len());
        slope
            .bands()
            .iter()
            .zip(alpha)
            .map(|(&band, &a)| with_alpha(self.color(band), a))
            .collect()
    }
}

pub fn placement_color(valid: bool) -> [f32; 4] {
    if valid {
        PLACEMENT_VALID
    } else {
        PLACEMENT_INVALID
    }
}

/// Valid/invalid placement overlay, faded like the slope colours.
pub fn placement_colors(slope: &SlopeField, alpha: &[f32]) -> Vec<[f32; 4]> {
    debug_assert_eq!(slope.len(), alpha.len());
    (0..slope.len())
        .zip(alpha)
        .map(|(i, &a)| with_alpha(placement_color(slope.is_puttable(i)), a))
        .collect()
}

fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}
