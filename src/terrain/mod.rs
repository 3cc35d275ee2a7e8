// Export all components from the terrain module
pub mod border;
pub mod chunk_scheduler;
pub mod curve;
pub mod falloff;
pub mod generation_grid;
pub mod generation_timing;
pub mod generation_utils;
pub mod mesh_builder;
pub mod noise;
pub mod terrain_config;

// Re-export main types for easier access
pub use border::BorderShaper;
pub use chunk_scheduler::{ChunkScheduler, GenerationReport, GenerationRequest, SchedulerState};
pub use curve::{HeightCurve, Keyframe};
pub use falloff::{FalloffConfig, FalloffField, FalloffShape};
pub use generation_grid::{CellState, GenerationStateGrid, MarkOutcome};
pub use mesh_builder::{ChunkDescriptor, ChunkMeshBuilder, ChunkMeshData};
pub use terrain_config::{MapLayout, SchedulingPolicy, TerrainConfig};
