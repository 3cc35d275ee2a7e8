pub mod noise_parameters;
pub mod noise_manager;
pub mod noise_utils;

pub use noise_parameters::{NoiseLayerConfig, NoiseType, NormalizationBound};
pub use noise_manager::{NoiseManager, SeedSetting};
pub use noise_utils::NoiseLayer;
