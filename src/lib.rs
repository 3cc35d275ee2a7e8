//! Chunked procedural heightmap terrain.
//!
//! Noise layers, a falloff field and a circular world border are combined
//! into square terrain chunks that a [`terrain::ChunkScheduler`] builds and
//! hands out one per tick, either for the whole map or around a moving agent.

pub mod config;
pub mod core;
pub mod error;
pub mod terrain;
pub mod threading;
pub mod utils;

pub use crate::error::{Result, TerrainError};
pub use crate::config::config_manager::ConfigurationManager;
pub use crate::terrain::chunk_scheduler::{ChunkScheduler, GenerationRequest, SchedulerState};
pub use crate::terrain::mesh_builder::{ChunkDescriptor, ChunkMeshData};
pub use crate::terrain::terrain_config::TerrainConfig;
