// src/terrain/generation_utils.rs
use std::sync::Arc;

/// Vertices along one edge of a chunk (a chunk of size N has N + 1 per side).
#[inline]
pub fn vertices_per_side(chunk_size: u32) -> usize {
    chunk_size as usize + 1
}

#[inline]
pub fn vertex_index(x: u32, z: u32, chunk_size: u32) -> usize {
    z as usize * vertices_per_side(chunk_size) + x as usize
}

/// Per-vertex UVs in row-major order, `(x / chunk_size, z / chunk_size)`.
pub fn chunk_uv_list(chunk_size: u32) -> Vec<[f32; 2]> {
    if chunk_size == 0 {
        return Vec::new();
    }
    let side = vertices_per_side(chunk_size);
    let mut uvs = Vec::with_capacity(side * side);
    for z in 0..=chunk_size {
        for x in 0..=chunk_size {
            uvs.push([x as f32 / chunk_size as f32, z as f32 / chunk_size as f32]);
        }
    }
    uvs
}

/// Two triangles per grid quad, six indices each.
pub fn chunk_triangle_indices(chunk_size: u32) -> Vec<u32> {
    let quads = chunk_size as usize * chunk_size as usize;
    let mut indices = Vec::with_capacity(quads * 6);
    let side = chunk_size + 1;

    let mut vert: u32 = 0;
    for _z in 0..chunk_size {
        for _x in 0..chunk_size {
            // Triangle 1 (this -> next row -> right)
            indices.push(vert);
            indices.push(vert + side);
            indices.push(vert + 1);
            // Triangle 2 (right -> next row -> next row right)
            indices.push(vert + 1);
            indices.push(vert + side);
            indices.push(vert + side + 1);
            vert += 1;
        }
        // skip the last vertex of the row
        vert += 1;
    }

    indices
}

/// UV and index lists shared by every chunk of a run.
#[derive(Debug, Clone)]
pub struct MeshTemplates {
    chunk_size: u32,
    uvs: Arc<[[f32; 2]]>,
    triangles: Arc<[u32]>,
}

impl MeshTemplates {
    pub fn new(chunk_size: u32) -> Self {
        Self {
            chunk_size,
            uvs: chunk_uv_list(chunk_size).into(),
            triangles: chunk_triangle_indices(chunk_size).into(),
        }
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn uvs(&self) -> Arc<[[f32; 2]]> {
        Arc::clone(&self.uvs)
    }

    pub fn triangles(&self) -> Arc<[u32]> {
        Arc::clone(&self.triangles)
    }
}
