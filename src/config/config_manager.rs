// src/config/config_manager.rs
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{Result, TerrainError};
use crate::terrain::terrain_config::TerrainConfig;

pub const DEFAULT_CONFIG_PATH: &str = "chunkland.toml";

// Configuration Manager: owns the loaded TerrainConfig and where it came from
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    current_config: TerrainConfig,
    config_path: Option<PathBuf>, // Path used for loading/saving
}

impl ConfigurationManager {
    pub fn with_config(config: TerrainConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            current_config: config,
            config_path,
        }
    }

    pub fn from_toml_str(source: &str) -> Result<TerrainConfig> {
        Ok(toml::from_str(source)?)
    }

    // Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("ConfigurationManager: loading config from {:?}", path_ref);
        let config_str = fs::read_to_string(path_ref)?;
        let config = Self::from_toml_str(&config_str)?;

        Ok(Self {
            current_config: config,
            config_path: Some(path_ref.to_path_buf()),
        })
    }

    /// Like [`load_from_file`](Self::load_from_file), but falls back to defaults
    /// when the file is missing or unreadable. The path is kept for saving.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path_ref = path.as_ref();
        match Self::load_from_file(path_ref) {
            Ok(manager) => manager,
            Err(e) => {
                warn!(
                    "ConfigurationManager: failed to load {:?}: {}. Using default configuration.",
                    path_ref, e
                );
                Self::with_config(TerrainConfig::default(), Some(path_ref.to_path_buf()))
            }
        }
    }

    // Save configuration to the stored path
    pub fn save_to_file(&self) -> Result<()> {
        let Some(path) = &self.config_path else {
            warn!("ConfigurationManager: cannot save configuration, no config path set");
            return Err(TerrainError::NoConfigPath);
        };
        info!("ConfigurationManager: saving config to {:?}", path);
        let toml_string = toml::to_string_pretty(&self.current_config)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn set_config_path<P: AsRef<Path>>(&mut self, path: P) {
        self.config_path = Some(path.as_ref().to_path_buf());
    }

    // Update configuration (Applies a whole new config struct)
    pub fn update_config(&mut self, updates: TerrainConfig) {
        self.current_config = updates;
    }

    pub fn get_config_mut(&mut self) -> &mut TerrainConfig {
        &mut self.current_config
    }

    pub fn get_config(&self) -> &TerrainConfig {
        &self.current_config
    }

    pub fn validate(&self) -> Result<()> {
        self.current_config.validate()
    }
}
