//! Unit tests for uniforms.rs

use glam::{Mat4, Vec4};

use crate::renderer::Extent2D;
use crate::resource::uniforms::*;

#[test]
fn test_size_is_three_matrices() {
    let ubo = UniformBufferObject::new(Extent2D::new(800, 600));
    assert_eq!(std::mem::size_of::<UniformBufferObject>(), 192);
    assert_eq!(ubo.as_bytes().len(), 192);
}

#[test]
fn test_model_is_identity() {
    let ubo = UniformBufferObject::new(Extent2D::new(800, 600));
    assert_eq!(ubo.model, Mat4::IDENTITY);
}

#[test]
fn test_view_looks_at_origin() {
    let ubo = UniformBufferObject::new(Extent2D::new(800, 600));
    let origin = ubo.view * Vec4::new(0.0, 0.0, 0.0, 1.0);
    let expected_distance = EYE.length();

    assert!(origin.x.abs() < 1e-5);
    assert!(origin.y.abs() < 1e-5);
    assert!((origin.z + expected_distance).abs() < 1e-5);
}

#[test]
fn test_projection_flips_y() {
    let ubo = UniformBufferObject::new(Extent2D::new(800, 600));
    let mut unflipped = Mat4::perspective_rh(FOV_Y, 800.0 / 600.0, Z_NEAR, Z_FAR);
    assert!(ubo.proj.y_axis.y < 0.0);

    unflipped.y_axis.y *= -1.0;
    assert_eq!(ubo.proj, unflipped);
}

#[test]
fn test_projection_depends_on_aspect() {
    let wide = UniformBufferObject::new(Extent2D::new(1600, 600));
    let square = UniformBufferObject::new(Extent2D::new(600, 600));
    assert_ne!(wide.proj.x_axis.x, square.proj.x_axis.x);
    assert_eq!(wide.view, square.view);
}
