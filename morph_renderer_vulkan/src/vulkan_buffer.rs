/// Buffers - staging uploads and persistently mapped uniform buffers

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use gpu_allocator::MemoryLocation;
use morph_engine::morph::{Error, Result};
use morph_engine::morph::render::{
    BufferUsage, ImageLayout, ResourceKind, TeardownStack, TransitionBarrier, UploadDevice,
};
use morph_engine::{engine_err, engine_error};
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::buffer_usage_to_vk;
use crate::vulkan_texture::{create_image, record_transition, TEXTURE_FORMAT};

/// Vulkan buffer handle
///
/// Staging buffers keep their allocation until `destroy_staging_buffer`.
/// Device buffers hand it to the teardown stack at creation, leaving `None`.
pub struct VulkanBuffer {
    pub(crate) buffer: vk::Buffer,
    pub(crate) allocation: Option<Allocation>,
    pub(crate) size: u64,
}

/// Create a buffer and bind fresh memory at `location`
unsafe fn create_buffer(
    ctx: &GpuContext,
    name: &str,
    size: u64,
    usage: vk::BufferUsageFlags,
    location: MemoryLocation,
) -> Result<(vk::Buffer, Allocation)> {
    let buffer_create_info = vk::BufferCreateInfo::default()
        .size(size)
        .usage(usage)
        .sharing_mode(vk::SharingMode::EXCLUSIVE);

    let buffer = ctx.device.create_buffer(&buffer_create_info, None)
        .map_err(|e| engine_err!("morph::vulkan", "Failed to create {} of size {} bytes: {:?}", name, size, e))?;

    let requirements = ctx.device.get_buffer_memory_requirements(buffer);
    let allocation = match ctx.allocate(name, requirements, location, true) {
        Ok(allocation) => allocation,
        Err(e) => {
            ctx.device.destroy_buffer(buffer, None);
            return Err(e);
        }
    };

    if let Err(e) = ctx.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
        ctx.device.destroy_buffer(buffer, None);
        ctx.free(allocation);
        return Err(engine_err!("morph::vulkan", "Failed to bind memory of {}: {:?}", name, e));
    }

    Ok((buffer, allocation))
}

/// `UploadDevice` over a live GPU context
///
/// Objects that outlive the upload (device buffers, images) are registered on
/// `teardown` under `label` as soon as they exist.
pub(crate) struct Uploader<'a> {
    ctx: &'a Arc<GpuContext>,
    teardown: &'a mut TeardownStack,
    label: &'a str,
}

impl<'a> Uploader<'a> {
    pub fn new(ctx: &'a Arc<GpuContext>, teardown: &'a mut TeardownStack, label: &'a str) -> Self {
        Self { ctx, teardown, label }
    }
}

impl UploadDevice for Uploader<'_> {
    type Buffer = VulkanBuffer;
    type Image = vk::Image;

    fn create_staging_buffer(&mut self, size: u64) -> Result<VulkanBuffer> {
        let (buffer, allocation) = unsafe {
            create_buffer(
                self.ctx,
                "staging buffer",
                size,
                vk::BufferUsageFlags::TRANSFER_SRC,
                MemoryLocation::CpuToGpu,
            )?
        };
        Ok(VulkanBuffer { buffer, allocation: Some(allocation), size })
    }

    fn write_staging(&mut self, staging: &VulkanBuffer, data: &[u8]) -> Result<()> {
        if data.len() as u64 > staging.size {
            engine_error!("morph::vulkan", "{} bytes do not fit a {} byte staging buffer", data.len(), staging.size);
            return Err(Error::InvalidResource("staging buffer too small".to_string()));
        }
        let mapped = staging.allocation.as_ref()
            .and_then(Allocation::mapped_ptr)
            .ok_or_else(|| engine_err!("morph::vulkan", "Staging buffer is not mapped"))?;

        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.as_ptr() as *mut u8, data.len());
        }
        Ok(())
    }

    fn create_device_buffer(&mut self, size: u64, usage: BufferUsage) -> Result<VulkanBuffer> {
        let (buffer, allocation) = unsafe {
            create_buffer(
                self.ctx,
                self.label,
                size,
                buffer_usage_to_vk(usage),
                MemoryLocation::GpuOnly,
            )?
        };

        let release_ctx = Arc::clone(self.ctx);
        self.teardown.push(ResourceKind::Buffer, self.label, move || unsafe {
            release_ctx.device.destroy_buffer(buffer, None);
            release_ctx.free(allocation);
        });

        Ok(VulkanBuffer { buffer, allocation: None, size })
    }

    fn copy_buffer(&mut self, src: &VulkanBuffer, dst: &VulkanBuffer, size: u64) -> Result<()> {
        let region = vk::BufferCopy { src_offset: 0, dst_offset: 0, size };
        self.ctx.one_time_commands(|device, cb| unsafe {
            device.cmd_copy_buffer(cb, src.buffer, dst.buffer, &[region]);
        })
    }

    fn create_device_image(&mut self, width: u32, height: u32) -> Result<vk::Image> {
        create_image(
            self.ctx,
            self.label,
            width,
            height,
            TEXTURE_FORMAT,
            vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED,
            self.teardown,
        )
    }

    fn transition_image(&mut self, image: &vk::Image, old: ImageLayout, new: ImageLayout) -> Result<()> {
        let barrier = TransitionBarrier::new(old, new, false)?;
        let image = *image;
        self.ctx.one_time_commands(|device, cb| record_transition(device, cb, image, &barrier))
    }

    fn copy_buffer_to_image(&mut self, src: &VulkanBuffer, dst: &vk::Image, width: u32, height: u32) -> Result<()> {
        let region = vk::BufferImageCopy::default()
            .buffer_offset(0)
            .buffer_row_length(0)
            .buffer_image_height(0)
            .image_subresource(vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: 0,
                base_array_layer: 0,
                layer_count: 1,
            })
            .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
            .image_extent(vk::Extent3D { width, height, depth: 1 });

        let dst = *dst;
        self.ctx.one_time_commands(|device, cb| unsafe {
            device.cmd_copy_buffer_to_image(
                cb,
                src.buffer,
                dst,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );
        })
    }

    fn destroy_staging_buffer(&mut self, mut staging: VulkanBuffer) {
        unsafe {
            self.ctx.device.destroy_buffer(staging.buffer, None);
        }
        if let Some(allocation) = staging.allocation.take() {
            self.ctx.free(allocation);
        }
    }
}

/// Host-visible uniform buffer, mapped for its whole lifetime
pub(crate) struct MappedBuffer {
    pub buffer: vk::Buffer,
    ptr: NonNull<c_void>,
    pub size: u64,
}

impl MappedBuffer {
    /// Create a uniform buffer of `size` bytes and register its release under `label`
    pub fn new_uniform(
        ctx: &Arc<GpuContext>,
        label: String,
        size: u64,
        teardown: &mut TeardownStack,
    ) -> Result<Self> {
        let (buffer, allocation) = unsafe {
            create_buffer(ctx, &label, size, vk::BufferUsageFlags::UNIFORM_BUFFER, MemoryLocation::CpuToGpu)?
        };

        let ptr = match allocation.mapped_ptr() {
            Some(ptr) => ptr,
            None => {
                unsafe { ctx.device.destroy_buffer(buffer, None) };
                ctx.free(allocation);
                return Err(engine_err!("morph::vulkan", "Uniform buffer '{}' is not host visible", label));
            }
        };

        let release_ctx = Arc::clone(ctx);
        teardown.push(ResourceKind::Buffer, label, move || unsafe {
            release_ctx.device.destroy_buffer(buffer, None);
            release_ctx.free(allocation);
        });

        Ok(Self { buffer, ptr, size })
    }

    /// Overwrite the start of the buffer with `data`
    pub fn write(&self, data: &[u8]) -> Result<()> {
        if data.len() as u64 > self.size {
            engine_error!("morph::vulkan", "{} bytes do not fit a {} byte uniform buffer", data.len(), self.size);
            return Err(Error::InvalidResource("uniform data larger than its buffer".to_string()));
        }
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), self.ptr.as_ptr() as *mut u8, data.len());
        }
        Ok(())
    }
}
