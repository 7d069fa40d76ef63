/// Per-frame uniform block (binding 0, vertex stage)

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::Extent2D;

/// Camera eye position
pub const EYE: Vec3 = Vec3::new(2.0, 2.0, 2.0);

/// Vertical field of view, passed to the projection unconverted
pub const FOV_Y: f32 = 45.0;

pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 10.0;

/// Model, view and projection matrices, column-major
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformBufferObject {
    pub model: Mat4,
    pub view: Mat4,
    pub proj: Mat4,
}

impl UniformBufferObject {
    /// Matrices for a swapchain of the given extent
    ///
    /// The projection's Y axis is flipped to match Vulkan clip space.
    pub fn new(extent: Extent2D) -> Self {
        let mut proj = Mat4::perspective_rh(FOV_Y, extent.aspect_ratio(), Z_NEAR, Z_FAR);
        proj.y_axis.y *= -1.0;

        Self {
            model: Mat4::IDENTITY,
            view: Mat4::look_at_rh(EYE, Vec3::ZERO, Vec3::Y),
            proj,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
#[path = "uniforms_tests.rs"]
mod tests;
