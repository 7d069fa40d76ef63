/// Images, views, the texture sampler and the depth target

use ash::vk;
use gpu_allocator::MemoryLocation;
use morph_engine::morph::{Error, Result};
use morph_engine::morph::render::{
    DepthFormat, ImageLayout, ResourceKind, TeardownStack, TransitionBarrier,
};
use morph_engine::{engine_debug, engine_error};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{
    access_mask_to_vk, depth_format_to_vk, image_aspects_to_vk, image_layout_to_vk,
    pipeline_stages_to_vk,
};

/// Format of the uploaded texture
pub(crate) const TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_UNORM;

/// 2D view over the single mip level and layer of `image`
pub(crate) fn create_image_view(
    device: &ash::Device,
    image: vk::Image,
    format: vk::Format,
    aspect_mask: vk::ImageAspectFlags,
) -> Result<vk::ImageView> {
    let create_info = vk::ImageViewCreateInfo::default()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .components(vk::ComponentMapping {
            r: vk::ComponentSwizzle::IDENTITY,
            g: vk::ComponentSwizzle::IDENTITY,
            b: vk::ComponentSwizzle::IDENTITY,
            a: vk::ComponentSwizzle::IDENTITY,
        })
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        });

    unsafe {
        device.create_image_view(&create_info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create image view: {:?}", e);
            Error::InitializationFailed(format!("Failed to create image view: {:?}", e))
        })
    }
}

/// Device-local 2D image with optimal tiling, bound to fresh memory
///
/// The image and its memory are registered together on `teardown`.
pub(crate) fn create_image(
    ctx: &Arc<GpuContext>,
    name: &str,
    width: u32,
    height: u32,
    format: vk::Format,
    usage: vk::ImageUsageFlags,
    teardown: &mut TeardownStack,
) -> Result<vk::Image> {
    unsafe {
        let create_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D { width, height, depth: 1 })
            .mip_levels(1)
            .array_layers(1)
            .format(format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(usage)
            .samples(vk::SampleCountFlags::TYPE_1)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let image = ctx.device.create_image(&create_info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create {}: {:?}", name, e);
            Error::InitializationFailed(format!("Failed to create {}: {:?}", name, e))
        })?;

        let requirements = ctx.device.get_image_memory_requirements(image);
        let allocation = match ctx.allocate(name, requirements, MemoryLocation::GpuOnly, false) {
            Ok(allocation) => allocation,
            Err(e) => {
                ctx.device.destroy_image(image, None);
                return Err(e);
            }
        };

        if let Err(e) = ctx.device.bind_image_memory(image, allocation.memory(), allocation.offset()) {
            engine_error!("morph::vulkan", "Failed to bind memory of {}: {:?}", name, e);
            ctx.device.destroy_image(image, None);
            ctx.free(allocation);
            return Err(Error::InitializationFailed(format!("Failed to bind image memory: {:?}", e)));
        }

        let release_ctx = Arc::clone(ctx);
        teardown.push(ResourceKind::Image, name, move || {
            release_ctx.device.destroy_image(image, None);
            release_ctx.free(allocation);
        });

        Ok(image)
    }
}

/// Record a pipeline barrier moving `image` between the layouts of `barrier`
pub(crate) fn record_transition(
    device: &ash::Device,
    command_buffer: vk::CommandBuffer,
    image: vk::Image,
    barrier: &TransitionBarrier,
) {
    let image_barrier = vk::ImageMemoryBarrier::default()
        .old_layout(image_layout_to_vk(barrier.old_layout))
        .new_layout(image_layout_to_vk(barrier.new_layout))
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: image_aspects_to_vk(barrier.aspect),
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        })
        .src_access_mask(access_mask_to_vk(barrier.src_access))
        .dst_access_mask(access_mask_to_vk(barrier.dst_access));

    unsafe {
        device.cmd_pipeline_barrier(
            command_buffer,
            pipeline_stages_to_vk(barrier.src_stage),
            pipeline_stages_to_vk(barrier.dst_stage),
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[image_barrier],
        );
    }
}

/// Linear, repeating sampler without anisotropy
pub(crate) fn create_sampler(device: &ash::Device, teardown: &mut TeardownStack) -> Result<vk::Sampler> {
    let create_info = vk::SamplerCreateInfo::default()
        .mag_filter(vk::Filter::LINEAR)
        .min_filter(vk::Filter::LINEAR)
        .address_mode_u(vk::SamplerAddressMode::REPEAT)
        .address_mode_v(vk::SamplerAddressMode::REPEAT)
        .address_mode_w(vk::SamplerAddressMode::REPEAT)
        .anisotropy_enable(false)
        .max_anisotropy(1.0)
        .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
        .unnormalized_coordinates(false)
        .compare_enable(false)
        .compare_op(vk::CompareOp::ALWAYS)
        .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
        .mip_lod_bias(0.0)
        .min_lod(0.0)
        .max_lod(0.0);

    unsafe {
        let sampler = device.create_sampler(&create_info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create sampler: {:?}", e);
            Error::InitializationFailed(format!("Failed to create sampler: {:?}", e))
        })?;
        let release_device = device.clone();
        teardown.push(ResourceKind::Sampler, "sampler", move || {
            release_device.destroy_sampler(sampler, None);
        });
        Ok(sampler)
    }
}

/// View over the uploaded texture
pub(crate) fn create_texture_view(
    device: &ash::Device,
    image: vk::Image,
    teardown: &mut TeardownStack,
) -> Result<vk::ImageView> {
    let view = create_image_view(device, image, TEXTURE_FORMAT, vk::ImageAspectFlags::COLOR)?;
    let release_device = device.clone();
    teardown.push(ResourceKind::ImageView, "texture view", move || unsafe {
        release_device.destroy_image_view(view, None);
    });
    Ok(view)
}

/// Depth image sized to the swapchain, already in DEPTH_STENCIL_ATTACHMENT_OPTIMAL
///
/// Returns the view; the image itself is only reachable through the teardown stack.
pub(crate) fn create_depth_target(
    ctx: &Arc<GpuContext>,
    format: DepthFormat,
    extent: vk::Extent2D,
    teardown: &mut TeardownStack,
) -> Result<vk::ImageView> {
    let vk_format = depth_format_to_vk(format);
    let image = create_image(
        ctx,
        "depth image",
        extent.width,
        extent.height,
        vk_format,
        vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
        teardown,
    )?;

    let view = create_image_view(&ctx.device, image, vk_format, image_aspects_to_vk(format.view_aspect()))?;
    let release_device = ctx.device.clone();
    teardown.push(ResourceKind::ImageView, "depth view", move || unsafe {
        release_device.destroy_image_view(view, None);
    });

    let barrier = TransitionBarrier::new(
        ImageLayout::Undefined,
        ImageLayout::DepthStencilAttachmentOptimal,
        format.has_stencil(),
    )?;
    ctx.one_time_commands(|device, cb| record_transition(device, cb, image, &barrier))?;

    engine_debug!("morph::vulkan", "Depth target {:?} {}x{}", format, extent.width, extent.height);
    Ok(view)
}
