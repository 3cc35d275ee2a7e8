// src/terrain/falloff.rs
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FalloffShape {
    Square,
    #[default]
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FalloffConfig {
    pub shape: FalloffShape,
    /// Curve exponent of the square falloff.
    pub param_a: f32,
    /// Curve offset of the square falloff.
    pub param_b: f32,
}

impl Default for FalloffConfig {
    fn default() -> Self {
        Self {
            shape: FalloffShape::Circle,
            param_a: 3.0,
            param_b: 2.2,
        }
    }
}

impl FalloffConfig {
    pub fn validate(&self) -> Result<()> {
        if self.shape == FalloffShape::Square {
            if !(self.param_a.is_finite() && self.param_a > 0.0) {
                return Err(TerrainError::InvalidFalloff(format!(
                    "param_a must be positive, got {}",
                    self.param_a
                )));
            }
            if !(self.param_b.is_finite() && self.param_b > 0.0) {
                return Err(TerrainError::InvalidFalloff(format!(
                    "param_b must be positive, got {}",
                    self.param_b
                )));
            }
        }
        Ok(())
    }
}

/// Square falloff of one normalized coordinate in `[0, 1]`.
#[inline]
pub fn square_falloff(value: f32, a: f32, b: f32) -> f32 {
    let pa = value.powf(a);
    let pb = (b - b * value).powf(a);
    if pa + pb <= 0.0 {
        return 0.0;
    }
    pa / (pa + pb)
}

#[inline]
pub fn circle_falloff(x: usize, z: usize, width: usize, height: usize) -> f32 {
    let cx = width as f32 / 2.0;
    let cz = height as f32 / 2.0;
    let dx = x as f32 - cx;
    let dz = z as f32 - cz;
    (dx * dx + dz * dz).sqrt() / cx
}

/// Precomputed attenuation values, row-major (`z * width + x`).
#[derive(Debug, Clone, PartialEq)]
pub struct FalloffField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl FalloffField {
    pub fn build(width: usize, height: usize, config: &FalloffConfig) -> Self {
        let mut values = vec![0.0f32; width * height];
        if width == 0 || height == 0 {
            return Self { width, height, values };
        }

        let FalloffConfig { shape, param_a, param_b } = *config;
        values
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(z, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = match shape {
                        FalloffShape::Square => {
                            let nx = (x as f32 / width as f32 * 2.0 - 1.0).abs();
                            let nz = (z as f32 / height as f32 * 2.0 - 1.0).abs();
                            square_falloff(nx.max(nz), param_a, param_b)
                        }
                        FalloffShape::Circle => circle_falloff(x, z, width, height),
                    };
                }
            });

        Self { width, height, values }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, x: i32, z: i32) -> Option<f32> {
        if x < 0 || z < 0 {
            return None;
        }
        let (x, z) = (x as usize, z as usize);
        if x >= self.width || z >= self.height {
            return None;
        }
        self.values.get(z * self.width + x).copied()
    }

    /// Lookup with coordinates clamped to the field edge. An empty field reads as 0.
    pub fn sample_clamped(&self, x: i32, z: i32) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let cx = x.clamp(0, self.width as i32 - 1);
        let cz = z.clamp(0, self.height as i32 - 1);
        self.get(cx, cz).unwrap_or(0.0)
    }
}
