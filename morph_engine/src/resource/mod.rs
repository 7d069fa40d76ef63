//! Resource module
//!
//! CPU-side data the viewer hands to the GPU: the two-quad mesh, the per-frame
//! uniform block, SPIR-V shader code and the decoded texture.

pub mod geometry;
pub mod uniforms;
pub mod shader;
pub mod texture;

pub use geometry::{
    Vertex, VERTICES, INDICES, INDEX_COUNT,
    BufferFormat, VertexInputRate, VertexBinding, VertexAttribute, VertexLayout,
};
pub use uniforms::UniformBufferObject;
pub use shader::{ShaderCode, ShaderStage, SPIRV_MAGIC};
pub use texture::TextureData;
