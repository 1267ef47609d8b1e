use noise::{NoiseFn, Simplex};
use serde::{Deserialize, Serialize};

/// Sampling frequency used when walking the outline's unit circle through
/// noise space. Low enough that the outline gets broad lobes, not wiggles.
pub const OUTLINE_NOISE_FREQUENCY: f64 = 0.7;

/// Configuration for the coherent noise behind the green outline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Random seed for reproducible generation
    pub seed: u32,

    /// Multiplier applied to the unit-circle coordinates before sampling.
    /// Typical range: 0.3 - 1.5
    pub frequency: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            frequency: OUTLINE_NOISE_FREQUENCY,
        }
    }
}

impl NoiseConfig {
    pub fn new(seed: u32, frequency: f64) -> Self {
        Self { seed, frequency }
    }

    /// Same frequency as the default, fresh random seed
    pub fn random() -> Self {
        Self {
            seed: rand::random(),
            ..Default::default()
        }
    }
}

/// Simplex noise sampler. Holds all of the noise state, so two generators
/// built from the same config return identical values.
pub struct NoiseGenerator {
    source: Simplex,
    frequency: f64,
}

impl NoiseGenerator {
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            source: Simplex::new(config.seed),
            frequency: config.frequency,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Raw noise at the given noise-space coordinates, in [-1, 1]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        self.source.get([x, y]).clamp(-1.0, 1.0)
    }

    /// Noise for a direction on the unit circle, shifted by `offset` along
    /// both axes so that different offsets give unrelated outlines.
    pub fn sample_direction(&self, cos_angle: f64, sin_angle: f64, offset: f64) -> f64 {
        self.sample(
            cos_angle * self.frequency + offset,
            sin_angle * self.frequency + offset,
        )
    }
}
