/// GpuContext - Shared GPU state for resource creation and one-time commands
///
/// Contains everything needed after the logical device exists:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - The single graphics/compute/present queue
/// - The command pool used for both one-time and per-image command buffers

use morph_engine::morph::{Error, Result};
use morph_engine::{engine_err, engine_error};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator};
use gpu_allocator::{AllocationError, MemoryLocation};
use std::sync::{Arc, Mutex};

/// Shared GPU context
///
/// Shared (via `Arc`) with every teardown closure that frees memory, so the
/// closures never outlive the handles they use.
///
/// Note: nothing here is destroyed on drop. The device, the allocator and the
/// command pool are released by the renderer's teardown stack.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    /// `None` once the teardown stack has released it
    pub allocator: Arc<Mutex<Option<Allocator>>>,

    /// Queue used for submission, presentation and uploads
    pub queue: vk::Queue,

    pub command_pool: vk::CommandPool,
}

impl GpuContext {
    pub fn new(
        device: ash::Device,
        allocator: Arc<Mutex<Option<Allocator>>>,
        queue: vk::Queue,
        command_pool: vk::CommandPool,
    ) -> Arc<Self> {
        Arc::new(Self {
            device,
            allocator,
            queue,
            command_pool,
        })
    }

    /// Allocate memory for a resource
    ///
    /// `linear` is true for buffers and false for optimally tiled images.
    pub fn allocate(
        &self,
        name: &str,
        requirements: vk::MemoryRequirements,
        location: MemoryLocation,
        linear: bool,
    ) -> Result<Allocation> {
        let mut guard = self.allocator.lock()
            .map_err(|_| engine_err!("morph::vulkan", "GPU allocator lock poisoned"))?;
        let allocator = guard.as_mut()
            .ok_or_else(|| engine_err!("morph::vulkan", "GPU allocator already released"))?;

        allocator.allocate(&AllocationCreateDesc {
            name,
            requirements,
            location,
            linear,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        })
        .map_err(|e| match e {
            AllocationError::OutOfMemory => {
                let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                engine_error!("morph::vulkan", "Out of GPU memory for '{}' (required: {:.2} MB)", name, size_mb);
                Error::OutOfMemory
            }
            other => engine_err!("morph::vulkan", "Failed to allocate memory for '{}': {:?}", name, other),
        })
    }

    /// Return memory to the allocator
    ///
    /// Does nothing once the allocator is gone; its pages went with it.
    pub fn free(&self, allocation: Allocation) {
        if let Ok(mut guard) = self.allocator.lock() {
            if let Some(allocator) = guard.as_mut() {
                allocator.free(allocation).ok();
            }
        }
    }

    /// Record, submit and wait for a one-time command buffer
    ///
    /// Blocks until the queue is idle. The command buffer is freed on every path.
    pub fn one_time_commands<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        unsafe {
            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_pool(self.command_pool)
                .command_buffer_count(1);

            let command_buffer = self.device.allocate_command_buffers(&alloc_info)
                .map_err(|e| engine_err!("morph::vulkan", "Failed to allocate one-time command buffer: {:?}", e))?
                .into_iter()
                .next()
                .ok_or_else(|| engine_err!("morph::vulkan", "Driver returned no command buffer"))?;

            let result = self.submit_one_time(command_buffer, record);
            self.device.free_command_buffers(self.command_pool, &[command_buffer]);
            result
        }
    }

    unsafe fn submit_one_time<F>(&self, command_buffer: vk::CommandBuffer, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        self.device.begin_command_buffer(command_buffer, &begin_info)
            .map_err(|e| engine_err!("morph::vulkan", "Failed to begin one-time command buffer: {:?}", e))?;

        record(&self.device, command_buffer);

        self.device.end_command_buffer(command_buffer)
            .map_err(|e| engine_err!("morph::vulkan", "Failed to end one-time command buffer: {:?}", e))?;

        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        self.device.queue_submit(self.queue, &[submit_info], vk::Fence::null())
            .map_err(|e| engine_err!("morph::vulkan", "Failed to submit one-time commands: {:?}", e))?;
        self.device.queue_wait_idle(self.queue)
            .map_err(|e| engine_err!("morph::vulkan", "Failed to wait for queue idle: {:?}", e))?;
        Ok(())
    }
}
