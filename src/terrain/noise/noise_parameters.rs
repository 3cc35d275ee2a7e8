// src/terrain/noise/noise_parameters.rs
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

/// How the raw octave sum of a layer is mapped into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationBound {
    /// Sum of every octave's amplitude, the largest value the octave sum can reach.
    #[default]
    Theoretical,
    /// A hand-picked upper bound; sums above it clamp to 1.
    Fixed(f32),
}

impl NormalizationBound {
    /// Upper end of the inverse-lerp range for the given layer.
    pub fn upper_bound(&self, layer: &NoiseLayerConfig) -> f32 {
        match *self {
            NormalizationBound::Fixed(bound) => bound,
            NormalizationBound::Theoretical => {
                let mut amplitude = layer.amplitude;
                let mut total = 0.0;
                for _ in 0..layer.octaves {
                    total += amplitude;
                    amplitude *= layer.persistence;
                }
                total
            }
        }
    }
}

/// Base gradient-noise primitive summed by every octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NoiseType {
    #[default]
    Perlin,
    Simplex,
}

// --- Main Parameter Struct ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseLayerConfig {
    pub name: String,
    pub noise_type: NoiseType,
    /// Explicit seed. Layers without one get their own seed derived from the
    /// run's master seed.
    pub seed: Option<u32>,
    /// Derive a fresh seed for this layer from the master seed every run.
    pub random_seed: bool,
    pub frequency: f32,
    pub amplitude: f32,
    pub lacunarity: f32,
    pub persistence: f32,
    pub octaves: u32,
    /// World units per noise period at frequency 1.
    pub scale: f32,
    pub height_scale: f32,
}

impl Default for NoiseLayerConfig {
    fn default() -> Self {
        Self {
            name: "layer".to_string(),
            noise_type: NoiseType::Perlin,
            seed: None,
            random_seed: false,
            frequency: 1.0,
            amplitude: 1.0,
            lacunarity: 2.0,
            persistence: 0.5,
            octaves: 4,
            scale: 50.0,
            height_scale: 1.0,
        }
    }
}

impl NoiseLayerConfig {
    pub fn named(name: &str, scale: f32, height_scale: f32) -> Self {
        Self {
            name: name.to_string(),
            scale,
            height_scale,
            ..Self::default()
        }
    }

    pub fn validate(&self, index: usize) -> Result<()> {
        let fail = |reason: &str| TerrainError::InvalidNoiseLayer {
            index,
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.octaves == 0 {
            return Err(fail("octaves must be at least 1"));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(fail("scale must be a positive number"));
        }
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(fail("frequency must be a positive number"));
        }
        if !(self.amplitude.is_finite() && self.amplitude > 0.0) {
            return Err(fail("amplitude must be a positive number"));
        }
        if !(self.lacunarity.is_finite() && self.lacunarity > 0.0) {
            return Err(fail("lacunarity must be a positive number"));
        }
        if !(self.persistence.is_finite() && self.persistence >= 0.0) {
            return Err(fail("persistence must not be negative"));
        }
        if !self.height_scale.is_finite() {
            return Err(fail("height_scale must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theoretical_bound_sums_octave_amplitudes() {
        let layer = NoiseLayerConfig {
            amplitude: 2.0,
            persistence: 0.5,
            octaves: 3,
            ..NoiseLayerConfig::default()
        };
        // 2 + 1 + 0.5
        assert_eq!(NormalizationBound::Theoretical.upper_bound(&layer), 3.5);
        assert_eq!(NormalizationBound::Fixed(8.0).upper_bound(&layer), 8.0);
    }

    #[test]
    fn rejects_degenerate_layers() {
        let zero_octaves = NoiseLayerConfig { octaves: 0, ..NoiseLayerConfig::default() };
        assert!(matches!(
            zero_octaves.validate(3),
            Err(TerrainError::InvalidNoiseLayer { index: 3, .. })
        ));

        let flat_scale = NoiseLayerConfig { scale: 0.0, ..NoiseLayerConfig::default() };
        assert!(flat_scale.validate(0).is_err());

        assert!(NoiseLayerConfig::default().validate(0).is_ok());
    }
}
