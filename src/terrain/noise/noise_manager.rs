// src/terrain/noise/noise_manager.rs
use log::debug;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::noise_parameters::{NoiseLayerConfig, NormalizationBound};
use super::noise_utils::NoiseLayer;
use crate::error::{Result, TerrainError};

/// Exclusive upper bound for a re-rolled master seed.
pub const RANDOM_SEED_RANGE: u32 = 100_000;

/// Minimum number of layers a height pipeline needs (base elevation plus modulation).
pub const MIN_NOISE_LAYERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSetting {
    Fixed(u32),
    Random,
}

impl SeedSetting {
    /// Turn the setting into a concrete master seed for one run.
    pub fn resolve(self) -> u32 {
        match self {
            SeedSetting::Fixed(seed) => seed,
            SeedSetting::Random => rand::rng().random_range(0..RANDOM_SEED_RANGE),
        }
    }
}

/// Owns the resolved noise layers for a single generation run.
#[derive(Debug, Clone)]
pub struct NoiseManager {
    master_seed: u32,
    layers: Vec<NoiseLayer>,
}

impl NoiseManager {
    pub fn new(
        configs: &[NoiseLayerConfig],
        master_seed: u32,
        normalization: NormalizationBound,
    ) -> Result<Self> {
        validate_layers(configs)?;
        let seeds = resolve_layer_seeds(configs, master_seed);

        let layers = configs
            .iter()
            .zip(seeds)
            .map(|(cfg, seed)| {
                debug!("NoiseManager: layer '{}' uses seed {}", cfg.name, seed);
                NoiseLayer::new(cfg.clone(), seed, normalization)
            })
            .collect();

        Ok(Self { master_seed, layers })
    }

    pub fn master_seed(&self) -> u32 {
        self.master_seed
    }

    pub fn layers(&self) -> &[NoiseLayer] {
        &self.layers
    }

    pub fn into_layers(self) -> Vec<NoiseLayer> {
        self.layers
    }
}

pub fn validate_layers(configs: &[NoiseLayerConfig]) -> Result<()> {
    if configs.len() < MIN_NOISE_LAYERS {
        return Err(TerrainError::NotEnoughNoiseLayers { found: configs.len() });
    }
    for (index, cfg) in configs.iter().enumerate() {
        cfg.validate(index)?;
    }
    Ok(())
}

/// Per-layer seeds for a master seed. An explicit seed wins unless the layer asks for
/// `random_seed`; every other layer draws from a ChaCha stream keyed by the master
/// seed. One value is drawn per layer regardless, so a derived seed depends only on
/// the layer's index.
pub fn resolve_layer_seeds(configs: &[NoiseLayerConfig], master_seed: u32) -> Vec<u32> {
    let mut stream = ChaCha8Rng::seed_from_u64(u64::from(master_seed));
    configs
        .iter()
        .map(|cfg| {
            let derived = stream.next_u32();
            match (cfg.random_seed, cfg.seed) {
                (false, Some(seed)) => seed,
                _ => derived,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layers() -> Vec<NoiseLayerConfig> {
        vec![
            NoiseLayerConfig::named("elevation", 50.0, 10.0),
            NoiseLayerConfig::named("modulation", 20.0, 1.0),
        ]
    }

    #[test]
    fn rejects_fewer_than_two_layers() {
        let one = vec![NoiseLayerConfig::default()];
        let err = NoiseManager::new(&one, 1, NormalizationBound::Theoretical).unwrap_err();
        assert!(matches!(err, TerrainError::NotEnoughNoiseLayers { found: 1 }));
    }

    #[test]
    fn seed_resolution_rules() {
        let mut layers = two_layers();
        layers[0].seed = Some(77);
        layers[1].random_seed = true;

        let first = resolve_layer_seeds(&layers, 1337);
        let again = resolve_layer_seeds(&layers, 1337);
        assert_eq!(first, again);
        assert_eq!(first[0], 77);

        let other = resolve_layer_seeds(&layers, 1338);
        assert_ne!(first[1], other[1]);

        // unseeded layers still get distinct, reproducible seeds
        let derived = resolve_layer_seeds(&two_layers(), 5);
        assert_eq!(derived, resolve_layer_seeds(&two_layers(), 5));
        assert_ne!(derived[0], derived[1]);
    }

    #[test]
    fn random_master_seed_stays_in_range() {
        for _ in 0..50 {
            assert!(SeedSetting::Random.resolve() < RANDOM_SEED_RANGE);
        }
        assert_eq!(SeedSetting::Fixed(12).resolve(), 12);
    }
}
