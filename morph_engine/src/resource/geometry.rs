/// Hard-coded mesh: two textured quads, one behind the other

use bytemuck::{Pod, Zeroable};

/// Vertex format for the mesh
///
/// Layout is fixed by the vertex shader: position at location 0, color at 1,
/// texture coordinate at 2.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub const fn new(pos: [f32; 3], color: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { pos, color, tex_coord }
    }

    /// Binding and attribute descriptions matching this struct
    pub fn layout() -> VertexLayout {
        VertexLayout {
            bindings: vec![VertexBinding {
                binding: 0,
                stride: std::mem::size_of::<Vertex>() as u32,
                input_rate: VertexInputRate::Vertex,
            }],
            attributes: vec![
                VertexAttribute {
                    location: 0,
                    binding: 0,
                    format: BufferFormat::R32G32B32_SFLOAT,
                    offset: std::mem::offset_of!(Vertex, pos) as u32,
                },
                VertexAttribute {
                    location: 1,
                    binding: 0,
                    format: BufferFormat::R32G32B32_SFLOAT,
                    offset: std::mem::offset_of!(Vertex, color) as u32,
                },
                VertexAttribute {
                    location: 2,
                    binding: 0,
                    format: BufferFormat::R32G32_SFLOAT,
                    offset: std::mem::offset_of!(Vertex, tex_coord) as u32,
                },
            ],
        }
    }
}

const RED: [f32; 3] = [1.0, 0.0, 0.0];
const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Front quad at z = 0, back quad at z = -0.5
pub const VERTICES: [Vertex; 8] = [
    Vertex::new([-0.5, -0.5, 0.0], RED, [1.0, 0.0]),
    Vertex::new([0.5, -0.5, 0.0], GREEN, [0.0, 0.0]),
    Vertex::new([0.5, 0.5, 0.0], BLUE, [0.0, 1.0]),
    Vertex::new([-0.5, 0.5, 0.0], WHITE, [1.0, 1.0]),

    Vertex::new([-0.5, -0.5, -0.5], RED, [0.0, 0.0]),
    Vertex::new([0.5, -0.5, -0.5], GREEN, [1.0, 0.0]),
    Vertex::new([0.5, 0.5, -0.5], BLUE, [1.0, 1.0]),
    Vertex::new([-0.5, 0.5, -0.5], WHITE, [0.0, 1.0]),
];

/// Two triangles per quad, 16-bit
pub const INDICES: [u16; 12] = [
    0, 1, 2, 2, 3, 0,
    4, 5, 6, 6, 7, 4,
];

pub const INDEX_COUNT: u32 = INDICES.len() as u32;

// ============================================================================
// Vertex layout
// ============================================================================

/// Attribute data formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum BufferFormat {
    R32G32_SFLOAT,      // vec2 (8 bytes)
    R32G32B32_SFLOAT,   // vec3 (12 bytes)
}

impl BufferFormat {
    /// Size in bytes of one element
    pub fn size(&self) -> u32 {
        match self {
            BufferFormat::R32G32_SFLOAT => 8,
            BufferFormat::R32G32B32_SFLOAT => 12,
        }
    }
}

/// Vertex input rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInputRate {
    /// Data is per-vertex
    Vertex,
    /// Data is per-instance
    Instance,
}

/// Vertex attribute description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute location in shader
    pub location: u32,
    pub binding: u32,
    pub format: BufferFormat,
    /// Offset in bytes from the start of the vertex
    pub offset: u32,
}

/// Vertex binding description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBinding {
    pub binding: u32,
    /// Stride in bytes between consecutive elements
    pub stride: u32,
    pub input_rate: VertexInputRate,
}

/// Vertex input layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    pub bindings: Vec<VertexBinding>,
    pub attributes: Vec<VertexAttribute>,
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
