/// Frame resources - framebuffers, pre-recorded command buffers, sync objects
///
/// `FrameResources` implements `FrameDriver`: fences and semaphores are indexed by
/// frame slot, command buffers and uniform buffers by swapchain image index.

use ash::vk;
use morph_engine::morph::{Error, Result};
use morph_engine::morph::render::{FrameDriver, ResourceKind, TeardownStack, MAX_FRAMES_IN_FLIGHT};
use morph_engine::morph::resource::{UniformBufferObject, INDEX_COUNT};
use morph_engine::{engine_err, engine_error, engine_warn};

use crate::vulkan_buffer::MappedBuffer;

/// Per-slot synchronization objects
pub(crate) struct FrameSync {
    pub image_available: vk::Semaphore,
    pub render_done: vk::Semaphore,
    pub in_flight: vk::Fence,
}

/// Everything a recorded frame binds
pub(crate) struct DrawBindings<'a> {
    pub render_pass: vk::RenderPass,
    pub pipeline: vk::Pipeline,
    pub pipeline_layout: vk::PipelineLayout,
    pub vertex_buffer: vk::Buffer,
    pub index_buffer: vk::Buffer,
    pub descriptor_sets: &'a [vk::DescriptorSet],
    pub framebuffers: &'a [vk::Framebuffer],
    pub extent: vk::Extent2D,
}

/// Pool for both one-time upload commands and the per-image command buffers
pub(crate) fn create_command_pool(
    device: &ash::Device,
    queue_family: u32,
    teardown: &mut TeardownStack,
) -> Result<vk::CommandPool> {
    let create_info = vk::CommandPoolCreateInfo::default().queue_family_index(queue_family);

    unsafe {
        let pool = device.create_command_pool(&create_info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create command pool: {:?}", e);
            Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
        })?;
        let release_device = device.clone();
        teardown.push(ResourceKind::CommandPool, "command pool", move || {
            release_device.destroy_command_pool(pool, None);
        });
        Ok(pool)
    }
}

/// One framebuffer per swapchain view, each sharing the depth view
pub(crate) fn create_framebuffers(
    device: &ash::Device,
    render_pass: vk::RenderPass,
    color_views: &[vk::ImageView],
    depth_view: vk::ImageView,
    extent: vk::Extent2D,
    teardown: &mut TeardownStack,
) -> Result<Vec<vk::Framebuffer>> {
    let mut framebuffers = Vec::with_capacity(color_views.len());
    for (i, &color_view) in color_views.iter().enumerate() {
        let attachments = [color_view, depth_view];
        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        unsafe {
            let framebuffer = device.create_framebuffer(&create_info, None).map_err(|e| {
                engine_error!("morph::vulkan", "Failed to create framebuffer {}: {:?}", i, e);
                Error::InitializationFailed(format!("Failed to create framebuffer: {:?}", e))
            })?;
            let release_device = device.clone();
            teardown.push(ResourceKind::Framebuffer, format!("framebuffer {}", i), move || {
                release_device.destroy_framebuffer(framebuffer, None);
            });
            framebuffers.push(framebuffer);
        }
    }
    Ok(framebuffers)
}

/// Allocate one command buffer per framebuffer and record the whole frame into it
///
/// Recorded once; every frame resubmits the buffer of the acquired image.
pub(crate) fn record_command_buffers(
    device: &ash::Device,
    command_pool: vk::CommandPool,
    bindings: &DrawBindings<'_>,
) -> Result<Vec<vk::CommandBuffer>> {
    let alloc_info = vk::CommandBufferAllocateInfo::default()
        .command_pool(command_pool)
        .level(vk::CommandBufferLevel::PRIMARY)
        .command_buffer_count(bindings.framebuffers.len() as u32);

    unsafe {
        let command_buffers = device.allocate_command_buffers(&alloc_info).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to allocate command buffers: {:?}", e);
            Error::InitializationFailed(format!("Failed to allocate command buffers: {:?}", e))
        })?;

        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue { float32: [0.0, 0.0, 0.0, 1.0] },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue { depth: 1.0, stencil: 0 },
            },
        ];

        for (i, &command_buffer) in command_buffers.iter().enumerate() {
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::SIMULTANEOUS_USE);
            device.begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| engine_err!("morph::vulkan", "Failed to begin command buffer {}: {:?}", i, e))?;

            let render_pass_begin = vk::RenderPassBeginInfo::default()
                .render_pass(bindings.render_pass)
                .framebuffer(bindings.framebuffers[i])
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent: bindings.extent,
                })
                .clear_values(&clear_values);

            device.cmd_begin_render_pass(command_buffer, &render_pass_begin, vk::SubpassContents::INLINE);
            device.cmd_bind_pipeline(command_buffer, vk::PipelineBindPoint::GRAPHICS, bindings.pipeline);
            device.cmd_bind_vertex_buffers(command_buffer, 0, &[bindings.vertex_buffer], &[0]);
            device.cmd_bind_index_buffer(command_buffer, bindings.index_buffer, 0, vk::IndexType::UINT16);
            device.cmd_bind_descriptor_sets(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                bindings.pipeline_layout,
                0,
                &[bindings.descriptor_sets[i]],
                &[],
            );
            device.cmd_draw_indexed(command_buffer, INDEX_COUNT, 1, 0, 0, 0);
            device.cmd_end_render_pass(command_buffer);

            device.end_command_buffer(command_buffer)
                .map_err(|e| engine_err!("morph::vulkan", "Failed to record command buffer {}: {:?}", i, e))?;
        }

        Ok(command_buffers)
    }
}

/// Two semaphores and one signaled fence per frame slot
pub(crate) fn create_sync_objects(device: &ash::Device, teardown: &mut TeardownStack) -> Result<Vec<FrameSync>> {
    let semaphore_info = vk::SemaphoreCreateInfo::default();
    let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

    let mut sync = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
    for slot in 0..MAX_FRAMES_IN_FLIGHT {
        unsafe {
            let image_available = device.create_semaphore(&semaphore_info, None).map_err(|e| {
                engine_error!("morph::vulkan", "Failed to create image-available semaphore: {:?}", e);
                Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
            })?;
            let release_device = device.clone();
            teardown.push(ResourceKind::Semaphore, format!("image available {}", slot), move || {
                release_device.destroy_semaphore(image_available, None);
            });

            let render_done = device.create_semaphore(&semaphore_info, None).map_err(|e| {
                engine_error!("morph::vulkan", "Failed to create render-done semaphore: {:?}", e);
                Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
            })?;
            let release_device = device.clone();
            teardown.push(ResourceKind::Semaphore, format!("render done {}", slot), move || {
                release_device.destroy_semaphore(render_done, None);
            });

            let in_flight = device.create_fence(&fence_info, None).map_err(|e| {
                engine_error!("morph::vulkan", "Failed to create fence: {:?}", e);
                Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
            })?;
            let release_device = device.clone();
            teardown.push(ResourceKind::Fence, format!("in flight {}", slot), move || {
                release_device.destroy_fence(in_flight, None);
            });

            sync.push(FrameSync { image_available, render_done, in_flight });
        }
    }
    Ok(sync)
}

/// GPU side of the frame loop
pub(crate) struct FrameResources {
    pub device: ash::Device,
    pub queue: vk::Queue,
    pub swapchain_loader: ash::khr::swapchain::Device,
    pub swapchain: vk::SwapchainKHR,
    pub command_buffers: Vec<vk::CommandBuffer>,
    pub uniform_buffers: Vec<MappedBuffer>,
    pub sync: Vec<FrameSync>,
}

impl FrameResources {
    fn slot(&self, slot: usize) -> Result<&FrameSync> {
        self.sync.get(slot)
            .ok_or_else(|| engine_err!("morph::vulkan", "Frame slot {} out of range", slot))
    }
}

impl FrameDriver for FrameResources {
    fn wait_for_fence(&mut self, slot: usize) -> Result<()> {
        let fence = self.slot(slot)?.in_flight;
        unsafe {
            self.device.wait_for_fences(&[fence], true, u64::MAX)
                .map_err(|e| engine_err!("morph::vulkan", "Failed to wait for fence of slot {}: {:?}", slot, e))
        }
    }

    fn reset_fence(&mut self, slot: usize) -> Result<()> {
        let fence = self.slot(slot)?.in_flight;
        unsafe {
            self.device.reset_fences(&[fence])
                .map_err(|e| engine_err!("morph::vulkan", "Failed to reset fence of slot {}: {:?}", slot, e))
        }
    }

    fn acquire_next_image(&mut self, slot: usize) -> Result<u32> {
        let semaphore = self.slot(slot)?.image_available;
        unsafe {
            let (image_index, suboptimal) = self.swapchain_loader
                .acquire_next_image(self.swapchain, u64::MAX, semaphore, vk::Fence::null())
                .map_err(|e| engine_err!("morph::vulkan", "Failed to acquire next swapchain image: {:?}", e))?;
            if suboptimal {
                engine_warn!("morph::vulkan", "Swapchain is suboptimal for the surface");
            }
            Ok(image_index)
        }
    }

    fn update_uniforms(&mut self, image_index: u32, ubo: &UniformBufferObject) -> Result<()> {
        self.uniform_buffers.get(image_index as usize)
            .ok_or_else(|| engine_err!("morph::vulkan", "No uniform buffer for image {}", image_index))?
            .write(ubo.as_bytes())
    }

    fn submit(&mut self, slot: usize, image_index: u32) -> Result<()> {
        let sync = self.slot(slot)?;
        let command_buffer = *self.command_buffers.get(image_index as usize)
            .ok_or_else(|| engine_err!("morph::vulkan", "No command buffer for image {}", image_index))?;

        let wait_semaphores = [sync.image_available];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [command_buffer];
        let signal_semaphores = [sync.render_done];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device.queue_submit(self.queue, &[submit_info], sync.in_flight)
                .map_err(|e| engine_err!("morph::vulkan", "Failed to submit frame for image {}: {:?}", image_index, e))
        }
    }

    fn present(&mut self, slot: usize, image_index: u32) -> Result<()> {
        let wait_semaphores = [self.slot(slot)?.render_done];
        let swapchains = [self.swapchain];
        let image_indices = [image_index];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        unsafe {
            let suboptimal = self.swapchain_loader
                .queue_present(self.queue, &present_info)
                .map_err(|e| engine_err!("morph::vulkan", "Failed to present image {}: {:?}", image_index, e))?;
            if suboptimal {
                engine_warn!("morph::vulkan", "Presented to a suboptimal swapchain");
            }
            Ok(())
        }
    }

    fn wait_idle(&mut self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle()
                .map_err(|e| engine_err!("morph::vulkan", "Failed to wait for device idle: {:?}", e))
        }
    }
}
