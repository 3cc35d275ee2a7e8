use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TerrainError>;

/// Everything that can refuse a generation run or a configuration load.
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("map size must be positive, got {0}")]
    InvalidMapSize(u32),
    #[error("chunk size must be positive, got {0}")]
    InvalidChunkSize(u32),
    #[error("map size {map_size} is not a multiple of chunk size {chunk_size}")]
    MapSizeNotMultipleOfChunkSize { map_size: u32, chunk_size: u32 },
    #[error("at least 2 noise layers are required (elevation + modulation), found {found}")]
    NotEnoughNoiseLayers { found: usize },
    #[error("noise layer {index} ({name}): {reason}")]
    InvalidNoiseLayer { index: usize, name: String, reason: String },
    #[error("fixed normalization bound must be positive, got {0}")]
    InvalidNormalization(f32),
    #[error("height curve: {0}")]
    InvalidCurve(String),
    #[error("falloff: {0}")]
    InvalidFalloff(String),
    #[error("world border margin {margin} leaves no terrain on a map of size {map_size}")]
    InvalidBorderMargin { margin: f32, map_size: u32 },
    #[error("no config path set, nowhere to save the configuration")]
    NoConfigPath,
    #[error("failed to read or write config: {0}")]
    ConfigIo(#[from] io::Error),
    #[error("failed to parse TOML config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl TerrainError {
    /// Configuration problems are detected before a run starts and leave all
    /// scheduler state untouched.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            TerrainError::ThreadPool(_) | TerrainError::ConfigIo(_) | TerrainError::NoConfigPath
        )
    }
}
