//! Interleaved vertex layout and the unit cube it is used for.

use std::mem;

/// A single vertex as stored in the GPU buffer.
///
/// `position.w` is always 1 and `normal.w` always 0 so the same model matrix
/// can transform both in the vertex shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    pub tex_coords: [f32; 2],
}

/// Describes one attribute inside the interleaved [`Vertex`] buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute name in the vertex shader.
    pub name: &'static str,
    pub components: i32,
    pub offset: i32,
}

impl Vertex {
    pub const STRIDE: i32 = mem::size_of::<Vertex>() as i32;

    pub const ATTRIBUTES: [VertexAttribute; 3] = [
        VertexAttribute {
            name: "aVertex",
            components: 4,
            offset: mem::offset_of!(Vertex, position) as i32,
        },
        VertexAttribute {
            name: "aNormal",
            components: 4,
            offset: mem::offset_of!(Vertex, normal) as i32,
        },
        VertexAttribute {
            name: "aTexCoord",
            components: 2,
            offset: mem::offset_of!(Vertex, tex_coords) as i32,
        },
    ];

    const fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position: [position[0], position[1], position[2], 1.0],
            normal: [normal[0], normal[1], normal[2], 0.0],
            tex_coords,
        }
    }

    pub fn translated(mut self, offset: cgmath::Vector3<f32>) -> Self {
        self.position[0] += offset.x;
        self.position[1] += offset.y;
        self.position[2] += offset.z;
        self
    }
}

/// Four corners per face: front, back, left, right, top, bottom.
pub const CUBE_VERTICES: [Vertex; 24] = [
    // Front
    Vertex::new([-1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 0.0]),
    Vertex::new([1.0, -1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 0.0]),
    Vertex::new([-1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [0.0, 1.0]),
    Vertex::new([1.0, 1.0, -1.0], [0.0, 0.0, -1.0], [1.0, 1.0]),
    // Back
    Vertex::new([1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    Vertex::new([-1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
    Vertex::new([1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
    Vertex::new([-1.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
    // Left
    Vertex::new([-1.0, -1.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 0.0]),
    Vertex::new([-1.0, -1.0, -1.0], [-1.0, 0.0, 0.0], [1.0, 0.0]),
    Vertex::new([-1.0, 1.0, 1.0], [-1.0, 0.0, 0.0], [0.0, 1.0]),
    Vertex::new([-1.0, 1.0, -1.0], [-1.0, 0.0, 0.0], [1.0, 1.0]),
    // Right
    Vertex::new([1.0, -1.0, -1.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
    Vertex::new([1.0, -1.0, 1.0], [1.0, 0.0, 0.0], [1.0, 0.0]),
    Vertex::new([1.0, 1.0, -1.0], [1.0, 0.0, 0.0], [0.0, 1.0]),
    Vertex::new([1.0, 1.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0]),
    // Top
    Vertex::new([-1.0, 1.0, -1.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
    Vertex::new([1.0, 1.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
    Vertex::new([-1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]),
    Vertex::new([1.0, 1.0, 1.0], [0.0, 1.0, 0.0], [1.0, 1.0]),
    // Bottom
    Vertex::new([-1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [0.0, 0.0]),
    Vertex::new([1.0, -1.0, 1.0], [0.0, -1.0, 0.0], [1.0, 0.0]),
    Vertex::new([-1.0, -1.0, -1.0], [0.0, -1.0, 0.0], [0.0, 1.0]),
    Vertex::new([1.0, -1.0, -1.0], [0.0, -1.0, 0.0], [1.0, 1.0]),
];

/// Two triangles per face into [`CUBE_VERTICES`].
pub const CUBE_INDICES: [u8; 36] = [
    0, 1, 2, 3, 2, 1, // Front
    4, 5, 6, 7, 6, 5, // Back
    8, 9, 10, 11, 10, 9, // Left
    12, 13, 14, 15, 14, 13, // Right
    16, 17, 18, 19, 18, 17, // Top
    20, 21, 22, 23, 22, 21, // Bottom
];

pub const VERTICES_PER_CUBE: usize = CUBE_INDICES.len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 40);
        let offsets: Vec<_> = Vertex::ATTRIBUTES.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 16, 32]);
    }

    #[test]
    fn every_face_points_away_from_the_centre() {
        for face in CUBE_INDICES.chunks(6) {
            for &index in face {
                let v = CUBE_VERTICES[index as usize];
                let dot: f32 = (0..3).map(|i| v.position[i] * v.normal[i]).sum();
                assert_eq!(dot, 1.0, "vertex {index} has an inward normal");
            }
        }
    }
}
