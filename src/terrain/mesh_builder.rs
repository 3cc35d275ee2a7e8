// src/terrain/mesh_builder.rs
use std::sync::Arc;

use rayon::prelude::*;
use uuid::Uuid;

use crate::error::{Result, TerrainError};
use crate::terrain::border::BorderShaper;
use crate::terrain::curve::HeightCurve;
use crate::terrain::falloff::FalloffField;
use crate::terrain::generation_utils::{vertices_per_side, MeshTemplates};
use crate::terrain::noise::noise_manager::MIN_NOISE_LAYERS;
use crate::terrain::noise::NoiseLayer;

/// Work item handed from the scheduler to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkDescriptor {
    /// Row-major cell index, `cz * cells_per_row + cx`.
    pub chunk_id: usize,
    pub cell: [i32; 2],
    /// Lower-left world corner.
    pub world_position: [i32; 2],
    pub chunk_size: u32,
}

impl ChunkDescriptor {
    pub fn for_cell(cx: i32, cz: i32, cells_per_row: u32, chunk_size: u32) -> Self {
        Self {
            chunk_id: cz as usize * cells_per_row as usize + cx as usize,
            cell: [cx, cz],
            world_position: [cx * chunk_size as i32, cz * chunk_size as i32],
            chunk_size,
        }
    }
}

/// A finished chunk. Ownership passes to whoever turns it into a drawable mesh.
#[derive(Debug, Clone)]
pub struct ChunkMeshData {
    pub run_id: Uuid,
    pub chunk_id: usize,
    pub world_position: [i32; 2],
    /// Chunk-local positions, row-major.
    pub vertices: Vec<[f32; 3]>,
    pub uvs: Arc<[[f32; 2]]>,
    pub triangle_indices: Arc<[u32]>,
    /// Range of the pre-border height over this chunk.
    pub min_height: f32,
    pub max_height: f32,
}

impl ChunkMeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }
}

/// Height pipeline for one run. Immutable once built and shared across build threads.
pub struct ChunkMeshBuilder {
    run_id: Uuid,
    elevation: NoiseLayer,
    modulation: NoiseLayer,
    falloff: Arc<FalloffField>,
    curve: HeightCurve,
    border: BorderShaper,
    templates: MeshTemplates,
    sharpen_pass: bool,
}

impl ChunkMeshBuilder {
    pub fn new(
        run_id: Uuid,
        layers: Vec<NoiseLayer>,
        falloff: Arc<FalloffField>,
        curve: HeightCurve,
        border: BorderShaper,
        templates: MeshTemplates,
    ) -> Result<Self> {
        if layers.len() < MIN_NOISE_LAYERS {
            return Err(TerrainError::NotEnoughNoiseLayers { found: layers.len() });
        }
        // Only the first two layers feed the height; extras are accepted and ignored.
        let mut layers = layers.into_iter();
        let (Some(elevation), Some(modulation)) = (layers.next(), layers.next()) else {
            return Err(TerrainError::NotEnoughNoiseLayers { found: 0 });
        };

        Ok(Self {
            run_id,
            elevation,
            modulation,
            falloff,
            curve,
            border,
            templates,
            sharpen_pass: true,
        })
    }

    pub fn with_sharpen_pass(mut self, enabled: bool) -> Self {
        self.sharpen_pass = enabled;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn chunk_size(&self) -> u32 {
        self.templates.chunk_size()
    }

    pub fn border(&self) -> &BorderShaper {
        &self.border
    }

    /// Height at an integer world position before border shaping.
    pub fn terrain_height(&self, world_x: i32, world_z: i32) -> f32 {
        let base = self.elevation.sample(world_x, world_z);

        let mut h = (base - self.falloff.sample_clamped(world_x, world_z)).clamp(0.0, 1.0);
        h *= self.modulation.sample(world_x, world_z);
        h = self.curve.evaluate(h) * self.elevation.height_scale();

        if self.sharpen_pass {
            h *= base;
        }
        h
    }

    pub fn build_chunk(&self, descriptor: &ChunkDescriptor) -> ChunkMeshData {
        let side = vertices_per_side(self.chunk_size());
        let [origin_x, origin_z] = descriptor.world_position;
        let mut vertices = vec![[0.0f32; 3]; side * side];

        let (min_height, max_height) = vertices
            .par_chunks_mut(side)
            .enumerate()
            .map(|(z, row)| {
                let mut lo = f32::INFINITY;
                let mut hi = f32::NEG_INFINITY;
                let world_z = origin_z + z as i32;
                for (x, vertex) in row.iter_mut().enumerate() {
                    let world_x = origin_x + x as i32;
                    let h = self.terrain_height(world_x, world_z);
                    lo = lo.min(h);
                    hi = hi.max(h);
                    *vertex = self.border.shape(
                        [world_x as f32, world_z as f32],
                        [x as f32, z as f32],
                        h,
                    );
                }
                (lo, hi)
            })
            .reduce(
                || (f32::INFINITY, f32::NEG_INFINITY),
                |a, b| (a.0.min(b.0), a.1.max(b.1)),
            );

        ChunkMeshData {
            run_id: self.run_id,
            chunk_id: descriptor.chunk_id,
            world_position: descriptor.world_position,
            vertices,
            uvs: self.templates.uvs(),
            triangle_indices: self.templates.triangles(),
            min_height,
            max_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::falloff::FalloffConfig;
    use crate::terrain::noise::{NoiseLayerConfig, NormalizationBound};

    fn layers(seed: u32) -> Vec<NoiseLayer> {
        vec![
            NoiseLayer::new(NoiseLayerConfig::named("elevation", 50.0, 10.0), seed, NormalizationBound::Theoretical),
            NoiseLayer::new(NoiseLayerConfig::named("modulation", 20.0, 1.0), seed + 1, NormalizationBound::Theoretical),
        ]
    }

    fn builder(map_size: u32, chunk_size: u32) -> ChunkMeshBuilder {
        let cells = map_size / chunk_size;
        let field_size = (map_size + cells) as usize;
        let falloff = FalloffField::build(field_size, field_size, &FalloffConfig::default());
        ChunkMeshBuilder::new(
            Uuid::new_v4(),
            layers(7),
            Arc::new(falloff),
            HeightCurve::default(),
            BorderShaper::for_map(map_size, 4.0),
            MeshTemplates::new(chunk_size),
        )
        .unwrap()
    }

    #[test]
    fn needs_two_layers() {
        let mut one = layers(1);
        one.truncate(1);
        let result = ChunkMeshBuilder::new(
            Uuid::new_v4(),
            one,
            Arc::new(FalloffField::build(4, 4, &FalloffConfig::default())),
            HeightCurve::default(),
            BorderShaper::new([2.0, 2.0], 1.0),
            MeshTemplates::new(2),
        );
        assert!(matches!(result, Err(TerrainError::NotEnoughNoiseLayers { found: 1 })));
    }

    #[test]
    fn chunk_shape_and_shared_templates() {
        let builder = builder(80, 40);
        let desc = ChunkDescriptor::for_cell(1, 0, 2, 40);
        assert_eq!(desc.world_position, [40, 0]);
        assert_eq!(desc.chunk_id, 1);

        let a = builder.build_chunk(&desc);
        let b = builder.build_chunk(&ChunkDescriptor::for_cell(0, 1, 2, 40));
        assert_eq!(a.vertex_count(), 41 * 41);
        assert_eq!(a.triangle_indices.len(), 40 * 40 * 6);
        assert!(Arc::ptr_eq(&a.uvs, &b.uvs));
        assert!(a.min_height <= a.max_height);
    }

    #[test]
    fn builds_are_deterministic() {
        let builder = builder(80, 40);
        let desc = ChunkDescriptor::for_cell(1, 1, 2, 40);
        let a = builder.build_chunk(&desc);
        let b = builder.build_chunk(&desc);
        assert_eq!(a.vertices, b.vertices);
    }

    #[test]
    fn inland_vertices_keep_the_pipeline_height() {
        let builder = builder(80, 40);
        let desc = ChunkDescriptor::for_cell(0, 0, 2, 40);
        let chunk = builder.build_chunk(&desc);
        // (40, 40) is the world center
        let idx = 40 * 41 + 40;
        assert_eq!(chunk.vertices[idx][1], builder.terrain_height(40, 40));
        assert_eq!(chunk.vertices[idx][0], 40.0);
        assert_eq!(chunk.vertices[idx][2], 40.0);
    }

    #[test]
    fn sharpen_pass_can_be_disabled() {
        let sharp = builder(80, 40);
        let soft = builder(80, 40).with_sharpen_pass(false);
        // the sharpen pass multiplies by a value in [0, 1]
        for (x, z) in [(30, 30), (40, 45), (50, 38)] {
            assert!(sharp.terrain_height(x, z) <= soft.terrain_height(x, z) + 1e-6);
        }
    }
}
