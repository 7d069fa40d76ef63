//! Unit tests for upload.rs

use crate::error::Error;
use crate::renderer::image_layout::ImageLayout;
use crate::renderer::mock_driver::MockUploadDevice;
use crate::renderer::upload::*;
use crate::resource::{TextureData, INDICES, VERTICES};

// ============================================================================
// BUFFERS
// ============================================================================

#[test]
fn test_vertex_upload_round_trip() {
    let mut device = MockUploadDevice::new();
    let bytes: &[u8] = bytemuck::cast_slice(&VERTICES);

    let buffer = upload_buffer(&mut device, bytes, BufferUsage::VERTEX).unwrap();

    assert_eq!(device.read_back(buffer), bytes);
    assert_eq!(device.buffer_usage(buffer), BufferUsage::VERTEX | BufferUsage::TRANSFER_DST);
    assert_eq!(device.live_staging_buffers(), 0);
}

#[test]
fn test_index_upload_round_trip() {
    let mut device = MockUploadDevice::new();
    let bytes: &[u8] = bytemuck::cast_slice(&INDICES);

    let buffer = upload_buffer(&mut device, bytes, BufferUsage::INDEX).unwrap();
    assert_eq!(device.read_back(buffer), bytes);
}

#[test]
fn test_upload_call_sequence() {
    let mut device = MockUploadDevice::new();
    upload_buffer(&mut device, &[1, 2, 3, 4], BufferUsage::VERTEX).unwrap();

    assert_eq!(device.calls, vec![
        "create_staging_buffer",
        "write_staging",
        "create_device_buffer",
        "copy_buffer",
        "destroy_staging_buffer",
    ]);
}

#[test]
fn test_empty_upload_is_rejected() {
    let mut device = MockUploadDevice::new();
    let result = upload_buffer(&mut device, &[], BufferUsage::INDEX);

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert!(device.calls.is_empty());
}

#[test]
fn test_staging_freed_when_copy_fails() {
    let mut device = MockUploadDevice::new();
    device.fail_on = Some("copy_buffer");

    let result = upload_buffer(&mut device, &[9; 64], BufferUsage::VERTEX);

    assert!(matches!(result, Err(Error::BackendError(_))));
    assert_eq!(device.live_staging_buffers(), 0);
}

#[test]
fn test_staging_freed_when_write_fails() {
    let mut device = MockUploadDevice::new();
    device.fail_on = Some("write_staging");

    assert!(upload_buffer(&mut device, &[9; 64], BufferUsage::VERTEX).is_err());
    assert_eq!(device.live_staging_buffers(), 0);
    assert!(!device.calls.contains(&"create_device_buffer".to_string()));
}

// ============================================================================
// TEXTURES
// ============================================================================

fn checker(width: u32, height: u32) -> TextureData {
    let pixels = (0..width * height)
        .flat_map(|i| if i % 2 == 0 { [255, 255, 255, 255] } else { [0, 0, 0, 255] })
        .collect();
    TextureData::from_rgba8(width, height, pixels).unwrap()
}

#[test]
fn test_texture_upload_ends_shader_readable() {
    let mut device = MockUploadDevice::new();
    let texture = checker(4, 4);

    let image = upload_texture(&mut device, &texture).unwrap();

    assert_eq!(device.image_layout(image), ImageLayout::ShaderReadOnlyOptimal);
    assert_eq!(device.image_pixels(image), texture.pixels);
    assert_eq!(device.live_staging_buffers(), 0);
}

#[test]
fn test_texture_transitions_bracket_the_copy() {
    let mut device = MockUploadDevice::new();
    upload_texture(&mut device, &checker(2, 2)).unwrap();

    let tail: Vec<&str> = device.calls.iter().skip(3).map(|s| s.as_str()).collect();
    assert_eq!(tail, vec![
        "transition_image",
        "copy_buffer_to_image",
        "transition_image",
        "destroy_staging_buffer",
    ]);
}

#[test]
fn test_texture_size_mismatch_is_rejected() {
    let mut device = MockUploadDevice::new();
    let texture = TextureData { width: 4, height: 4, pixels: vec![0; 10] };

    let result = upload_texture(&mut device, &texture);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert!(device.calls.is_empty());
}

#[test]
fn test_staging_freed_when_texture_copy_fails() {
    let mut device = MockUploadDevice::new();
    device.fail_on = Some("copy_buffer_to_image");

    assert!(upload_texture(&mut device, &checker(2, 2)).is_err());
    assert_eq!(device.live_staging_buffers(), 0);
}
