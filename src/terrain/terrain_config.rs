// src/terrain/terrain_config.rs
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};
use crate::terrain::curve::{self, Keyframe};
use crate::terrain::falloff::FalloffConfig;
use crate::terrain::noise::noise_manager::{self, SeedSetting};
use crate::terrain::noise::{NoiseLayerConfig, NormalizationBound};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// Enumerate the whole map at the start of the run.
    Eager,
    /// Generate the 3x3 neighborhood around the agent's cell.
    #[default]
    OnDemand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub map_size: u32,
    pub chunk_size: u32,
    pub seed: u32,
    /// Re-roll the master seed at the start of every run instead of using `seed`.
    pub random_seed: bool,
    /// Distance between the island border and the map edge.
    pub border_margin: f32,
    pub policy: SchedulingPolicy,
    /// Multiply the curved height by the raw elevation sample once more.
    pub sharpen_pass: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            map_size: 2000,
            chunk_size: 200,
            seed: 1337,
            random_seed: true,
            border_margin: 4.0,
            policy: SchedulingPolicy::OnDemand,
            sharpen_pass: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NoiseSettings {
    pub normalization: NormalizationBound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Worker threads for the build pool; 0 picks from the CPU count.
    pub max_threads: usize,
    /// Warn when a single chunk build takes longer than this. 0 disables the check.
    pub slow_build_warn_ms: u64,
    pub error_history: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        let cpu_count = num_cpus::get();
        Self {
            // leave one core for the tick loop
            max_threads: std::cmp::max(1, cpu_count.saturating_sub(1)),
            slow_build_warn_ms: 250,
            error_history: 100,
        }
    }
}

/// Everything a generation run reads, as loaded from `chunkland.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub map: MapSettings,
    pub falloff: FalloffConfig,
    pub noise: NoiseSettings,
    pub noise_layers: Vec<NoiseLayerConfig>,
    pub curve: Vec<Keyframe>,
    pub runtime: RuntimeSettings,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            map: MapSettings::default(),
            falloff: FalloffConfig::default(),
            noise: NoiseSettings::default(),
            noise_layers: vec![
                NoiseLayerConfig::named("elevation", 50.0, 10.0),
                NoiseLayerConfig::named("modulation", 20.0, 1.0),
            ],
            curve: curve::linear_keys(),
            runtime: RuntimeSettings::default(),
        }
    }
}

impl TerrainConfig {
    pub fn seed_setting(&self) -> SeedSetting {
        if self.map.random_seed {
            SeedSetting::Random
        } else {
            SeedSetting::Fixed(self.map.seed)
        }
    }

    /// Checks everything except the map layout, which is validated per request.
    pub fn validate_generation(&self) -> Result<()> {
        noise_manager::validate_layers(&self.noise_layers)?;
        curve::validate_keys(&self.curve)?;
        self.falloff.validate()?;
        if let NormalizationBound::Fixed(bound) = self.noise.normalization {
            if !(bound.is_finite() && bound > 0.0) {
                return Err(TerrainError::InvalidNormalization(bound));
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        MapLayout::new(self.map.map_size, self.map.chunk_size, self.map.border_margin)?;
        self.validate_generation()
    }
}

/// Validated geometry of one run's map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapLayout {
    pub map_size: u32,
    pub chunk_size: u32,
    pub cells_per_row: u32,
    pub border_margin: f32,
}

impl MapLayout {
    pub fn new(map_size: u32, chunk_size: u32, border_margin: f32) -> Result<Self> {
        if map_size == 0 {
            return Err(TerrainError::InvalidMapSize(map_size));
        }
        if chunk_size == 0 {
            return Err(TerrainError::InvalidChunkSize(chunk_size));
        }
        if map_size % chunk_size != 0 {
            return Err(TerrainError::MapSizeNotMultipleOfChunkSize { map_size, chunk_size });
        }
        let radius = (map_size / 2) as f32 - border_margin;
        if !border_margin.is_finite() || radius <= 0.0 {
            return Err(TerrainError::InvalidBorderMargin { margin: border_margin, map_size });
        }
        Ok(Self {
            map_size,
            chunk_size,
            cells_per_row: map_size / chunk_size,
            border_margin,
        })
    }

    pub fn total_cells(&self) -> usize {
        self.cells_per_row as usize * self.cells_per_row as usize
    }

    /// Side of the falloff field; one extra sample per chunk covers the shared edges.
    pub fn falloff_size(&self) -> usize {
        self.map_size as usize + self.cells_per_row as usize
    }
}
