use cgmath::Vector3;

use crate::data_structures::vertex::{CUBE_INDICES, CUBE_VERTICES, VERTICES_PER_CUBE, Vertex};

/// Z coordinate of the grid's centre. The player starts at the origin and
/// looks down -Z towards it.
pub const GRID_DEPTH: f32 = -100.0;

/// Parameters the vertex buffer is generated from. Whenever these differ from
/// what was last uploaded the buffer has to be rebuilt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridParams {
    /// Cubes along each axis.
    pub size: u32,
    /// Distance between neighbouring cube centres.
    pub stride: f32,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            size: 1,
            stride: 4.0,
        }
    }
}

impl GridParams {
    pub fn cube_count(&self) -> usize {
        let size = self.size as usize;
        size * size * size
    }

    pub fn vertex_count(&self) -> usize {
        self.cube_count() * VERTICES_PER_CUBE
    }

    /// Position of cube `(x, y, z)`. The half-size is an integer division, so
    /// even sizes are not perfectly centred.
    pub fn offset(&self, x: u32, y: u32, z: u32) -> Vector3<f32> {
        let half = (self.size / 2) as f32;
        Vector3::new(
            self.stride * (x as f32 - half),
            self.stride * (y as f32 - half),
            GRID_DEPTH + self.stride * (z as f32 - half),
        )
    }
}

/**
 * A `BlockGrid` is a size³ lattice of unit cubes with their offsets baked into
 * the vertex data, so the whole grid goes out in a single non-indexed draw.
 */
#[derive(Clone, Debug)]
pub struct BlockGrid {
    pub params: GridParams,
    pub vertices: Vec<Vertex>,
}

impl BlockGrid {
    /// Cube `(x, y, z)` lands at slot `size²·z + size·y + x`.
    pub fn new(params: GridParams) -> Self {
        let size = params.size;
        let mut vertices = Vec::with_capacity(params.vertex_count());
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    let offset = params.offset(x, y, z);
                    vertices.extend(
                        CUBE_INDICES
                            .iter()
                            .map(|&i| CUBE_VERTICES[i as usize].translated(offset)),
                    );
                }
            }
        }
        Self { params, vertices }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn cube(&self, x: u32, y: u32, z: u32) -> &[Vertex] {
        let size = self.params.size as usize;
        let slot = size * size * z as usize + size * y as usize + x as usize;
        &self.vertices[slot * VERTICES_PER_CUBE..(slot + 1) * VERTICES_PER_CUBE]
    }
}
