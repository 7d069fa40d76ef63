/// Descriptor pool and the per-image descriptor sets
///
/// Sets are freed with their pool; nothing releases them individually.

use ash::vk;
use morph_engine::morph::{Error, Result};
use morph_engine::morph::render::{ResourceKind, TeardownStack};
use morph_engine::morph::resource::UniformBufferObject;
use morph_engine::engine_error;

use crate::vulkan_buffer::MappedBuffer;

/// Pool sized for exactly one set per swapchain image
pub(crate) fn create_descriptor_pool(
    device: &ash::Device,
    image_count: u32,
    teardown: &mut TeardownStack,
) -> Result<vk::DescriptorPool> {
    let pool_sizes = [
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::UNIFORM_BUFFER,
            descriptor_count: image_count,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: image_count,
        },
    ];
    let info = vk::DescriptorPoolCreateInfo::default()
        .pool_sizes(&pool_sizes)
        .max_sets(image_count);

    unsafe {
        let pool = device.create_descriptor_pool(&info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create descriptor pool: {:?}", e);
            Error::InitializationFailed(format!("Failed to create descriptor pool: {:?}", e))
        })?;
        let release_device = device.clone();
        teardown.push(ResourceKind::DescriptorPool, "descriptor pool", move || {
            release_device.destroy_descriptor_pool(pool, None);
        });
        Ok(pool)
    }
}

/// One set per uniform buffer, each pointing at its buffer and the shared texture
pub(crate) fn create_descriptor_sets(
    device: &ash::Device,
    pool: vk::DescriptorPool,
    layout: vk::DescriptorSetLayout,
    uniform_buffers: &[MappedBuffer],
    texture_view: vk::ImageView,
    sampler: vk::Sampler,
) -> Result<Vec<vk::DescriptorSet>> {
    let layouts = vec![layout; uniform_buffers.len()];
    let alloc_info = vk::DescriptorSetAllocateInfo::default()
        .descriptor_pool(pool)
        .set_layouts(&layouts);

    unsafe {
        let sets = device.allocate_descriptor_sets(&alloc_info).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to allocate descriptor sets: {:?}", e);
            Error::InitializationFailed(format!("Failed to allocate descriptor sets: {:?}", e))
        })?;

        let image_info = [vk::DescriptorImageInfo {
            sampler,
            image_view: texture_view,
            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        }];

        for (&set, uniform) in sets.iter().zip(uniform_buffers) {
            let buffer_info = [vk::DescriptorBufferInfo {
                buffer: uniform.buffer,
                offset: 0,
                range: std::mem::size_of::<UniformBufferObject>() as u64,
            }];

            let writes = [
                vk::WriteDescriptorSet::default()
                    .dst_set(set)
                    .dst_binding(0)
                    .dst_array_element(0)
                    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                    .buffer_info(&buffer_info),
                vk::WriteDescriptorSet::default()
                    .dst_set(set)
                    .dst_binding(1)
                    .dst_array_element(0)
                    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .image_info(&image_info),
            ];
            device.update_descriptor_sets(&writes, &[]);
        }

        Ok(sets)
    }
}
