/// Staging uploads into device-local memory
///
/// Both buffers and textures go through a host-visible staging buffer, a one-time
/// copy command and a blocking queue-idle wait. The staging buffer never outlives
/// the call, even when a step fails.

use bitflags::bitflags;
use crate::error::{Error, Result};
use crate::renderer::image_layout::ImageLayout;
use crate::resource::TextureData;

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        const TRANSFER_SRC = 1 << 0;
        const TRANSFER_DST = 1 << 1;
        const UNIFORM = 1 << 2;
        const INDEX = 1 << 3;
        const VERTEX = 1 << 4;
    }
}

/// GPU operations the upload algorithm is built from
///
/// Every `copy_*` and `transition_image` call records a one-time command buffer,
/// submits it, and blocks until the queue is idle.
pub trait UploadDevice {
    type Buffer;
    type Image;

    /// Host-visible, host-coherent buffer usable as a transfer source
    fn create_staging_buffer(&mut self, size: u64) -> Result<Self::Buffer>;

    /// Copy bytes into a staging buffer through its mapping
    fn write_staging(&mut self, staging: &Self::Buffer, data: &[u8]) -> Result<()>;

    /// Device-local buffer (`usage` already includes TRANSFER_DST)
    fn create_device_buffer(&mut self, size: u64, usage: BufferUsage) -> Result<Self::Buffer>;

    fn copy_buffer(&mut self, src: &Self::Buffer, dst: &Self::Buffer, size: u64) -> Result<()>;

    /// Device-local RGBA8 image usable as transfer destination and sampled image
    fn create_device_image(&mut self, width: u32, height: u32) -> Result<Self::Image>;

    fn transition_image(&mut self, image: &Self::Image, old: ImageLayout, new: ImageLayout) -> Result<()>;

    fn copy_buffer_to_image(&mut self, src: &Self::Buffer, dst: &Self::Image, width: u32, height: u32) -> Result<()>;

    /// Destroy a staging buffer and free its memory
    fn destroy_staging_buffer(&mut self, staging: Self::Buffer);
}

fn stage<D: UploadDevice>(device: &mut D, data: &[u8], what: &str) -> Result<D::Buffer> {
    if data.is_empty() {
        crate::engine_error!("morph::upload", "Refusing to upload empty {}", what);
        return Err(Error::InvalidResource(format!("cannot upload empty {}", what)));
    }

    let staging = device.create_staging_buffer(data.len() as u64)?;
    if let Err(e) = device.write_staging(&staging, data) {
        device.destroy_staging_buffer(staging);
        return Err(e);
    }
    Ok(staging)
}

/// Upload `data` into a new device-local buffer
///
/// # Errors
///
/// `Error::InvalidResource` for empty data; otherwise whatever the device reports.
pub fn upload_buffer<D: UploadDevice>(device: &mut D, data: &[u8], usage: BufferUsage) -> Result<D::Buffer> {
    let size = data.len() as u64;
    let staging = stage(device, data, "buffer")?;

    let result = device
        .create_device_buffer(size, usage | BufferUsage::TRANSFER_DST)
        .and_then(|dst| device.copy_buffer(&staging, &dst, size).map(|_| dst));

    device.destroy_staging_buffer(staging);

    if result.is_ok() {
        crate::engine_debug!("morph::upload", "Uploaded {} bytes ({:?})", size, usage);
    }
    result
}

/// Upload decoded RGBA8 pixels into a new shader-readable image
///
/// Layouts: UNDEFINED → TRANSFER_DST_OPTIMAL → (copy) → SHADER_READ_ONLY_OPTIMAL.
pub fn upload_texture<D: UploadDevice>(device: &mut D, texture: &TextureData) -> Result<D::Image> {
    let expected = texture.width as usize * texture.height as usize * 4;
    if texture.pixels.len() != expected {
        crate::engine_error!(
            "morph::upload",
            "Texture {}x{} has {} bytes, expected {}",
            texture.width, texture.height, texture.pixels.len(), expected
        );
        return Err(Error::InvalidResource("texture size does not match its pixel data".to_string()));
    }

    let staging = stage(device, &texture.pixels, "texture")?;

    let result = device.create_device_image(texture.width, texture.height).and_then(|image| {
        device.transition_image(&image, ImageLayout::Undefined, ImageLayout::TransferDstOptimal)?;
        device.copy_buffer_to_image(&staging, &image, texture.width, texture.height)?;
        device.transition_image(&image, ImageLayout::TransferDstOptimal, ImageLayout::ShaderReadOnlyOptimal)?;
        Ok(image)
    });

    device.destroy_staging_buffer(staging);

    if result.is_ok() {
        crate::engine_debug!("morph::upload", "Uploaded texture {}x{}", texture.width, texture.height);
    }
    result
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
