/// Mock GPU driver for unit tests (no GPU required)
///
/// Implements the capability, upload and frame traits on plain memory so the
/// lifecycle logic can be exercised end to end. The frame driver models fences and
/// semaphores closely enough to catch slot/image index mix-ups.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::engine_bail;
use crate::renderer::device_selection::{CapabilityQuery, DeviceInfo};
use crate::renderer::frame_loop::{FrameDriver, MAX_FRAMES_IN_FLIGHT};
use crate::renderer::image_layout::{ImageLayout, TransitionBarrier};
use crate::renderer::teardown::{ResourceKind, TeardownStack};
use crate::renderer::upload::{BufferUsage, UploadDevice};
use crate::resource::UniformBufferObject;

// ============================================================================
// Mock Capabilities
// ============================================================================

/// Device list with index handles
#[derive(Debug, Default)]
pub struct MockCapabilities {
    pub devices: Vec<DeviceInfo>,
    pub fail_enumeration: bool,
}

impl MockCapabilities {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self { devices, fail_enumeration: false }
    }
}

impl CapabilityQuery for MockCapabilities {
    type Device = usize;

    fn enumerate_devices(&self) -> Result<Vec<usize>> {
        if self.fail_enumeration {
            engine_bail!("morph::mock", "Device enumeration failed");
        }
        Ok((0..self.devices.len()).collect())
    }

    fn device_info(&self, device: usize) -> Result<DeviceInfo> {
        self.devices
            .get(device)
            .cloned()
            .ok_or_else(|| Error::InvalidResource(format!("no device {}", device)))
    }
}

// ============================================================================
// Mock Upload Device
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockBufferHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockImageHandle(pub usize);

#[derive(Debug)]
struct MockBufferMemory {
    bytes: Vec<u8>,
    usage: BufferUsage,
    staging: bool,
    destroyed: bool,
}

#[derive(Debug)]
struct MockImageMemory {
    width: u32,
    height: u32,
    layout: ImageLayout,
    pixels: Vec<u8>,
}

/// Upload target backed by host vectors
#[derive(Debug, Default)]
pub struct MockUploadDevice {
    buffers: Vec<MockBufferMemory>,
    images: Vec<MockImageMemory>,
    /// Name of the operation that should fail (e.g. "copy_buffer")
    pub fail_on: Option<&'static str>,
    /// Every call, in order
    pub calls: Vec<String>,
}

impl MockUploadDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&mut self, op: &'static str) -> Result<()> {
        self.calls.push(op.to_string());
        if self.fail_on == Some(op) {
            engine_bail!("morph::mock", "{} failed", op);
        }
        Ok(())
    }

    /// Staging buffers created and not yet destroyed
    pub fn live_staging_buffers(&self) -> usize {
        self.buffers.iter().filter(|b| b.staging && !b.destroyed).count()
    }

    pub fn read_back(&self, buffer: MockBufferHandle) -> Vec<u8> {
        self.buffers[buffer.0].bytes.clone()
    }

    pub fn buffer_usage(&self, buffer: MockBufferHandle) -> BufferUsage {
        self.buffers[buffer.0].usage
    }

    pub fn image_pixels(&self, image: MockImageHandle) -> Vec<u8> {
        self.images[image.0].pixels.clone()
    }

    pub fn image_layout(&self, image: MockImageHandle) -> ImageLayout {
        self.images[image.0].layout
    }

    fn alloc(&mut self, size: u64, usage: BufferUsage, staging: bool) -> MockBufferHandle {
        self.buffers.push(MockBufferMemory {
            bytes: vec![0; size as usize],
            usage,
            staging,
            destroyed: false,
        });
        MockBufferHandle(self.buffers.len() - 1)
    }
}

impl UploadDevice for MockUploadDevice {
    type Buffer = MockBufferHandle;
    type Image = MockImageHandle;

    fn create_staging_buffer(&mut self, size: u64) -> Result<MockBufferHandle> {
        self.check("create_staging_buffer")?;
        Ok(self.alloc(size, BufferUsage::TRANSFER_SRC, true))
    }

    fn write_staging(&mut self, staging: &MockBufferHandle, data: &[u8]) -> Result<()> {
        self.check("write_staging")?;
        let memory = &mut self.buffers[staging.0];
        if data.len() > memory.bytes.len() {
            engine_bail!("morph::mock", "write of {} bytes into {}", data.len(), memory.bytes.len());
        }
        memory.bytes[..data.len()].copy_from_slice(data);
        Ok(())
    }

    fn create_device_buffer(&mut self, size: u64, usage: BufferUsage) -> Result<MockBufferHandle> {
        self.check("create_device_buffer")?;
        Ok(self.alloc(size, usage, false))
    }

    fn copy_buffer(&mut self, src: &MockBufferHandle, dst: &MockBufferHandle, size: u64) -> Result<()> {
        self.check("copy_buffer")?;
        if !self.buffers[dst.0].usage.contains(BufferUsage::TRANSFER_DST) {
            engine_bail!("morph::mock", "copy into a buffer without TRANSFER_DST");
        }
        let size = size as usize;
        let bytes = self.buffers[src.0].bytes[..size].to_vec();
        self.buffers[dst.0].bytes[..size].copy_from_slice(&bytes);
        Ok(())
    }

    fn create_device_image(&mut self, width: u32, height: u32) -> Result<MockImageHandle> {
        self.check("create_device_image")?;
        self.images.push(MockImageMemory {
            width,
            height,
            layout: ImageLayout::Undefined,
            pixels: vec![0; width as usize * height as usize * 4],
        });
        Ok(MockImageHandle(self.images.len() - 1))
    }

    fn transition_image(&mut self, image: &MockImageHandle, old: ImageLayout, new: ImageLayout) -> Result<()> {
        self.check("transition_image")?;
        let barrier = TransitionBarrier::new(old, new, false)?;
        let memory = &mut self.images[image.0];
        if memory.layout != barrier.old_layout {
            engine_bail!("morph::mock", "image is in {:?}, not {:?}", memory.layout, old);
        }
        memory.layout = barrier.new_layout;
        Ok(())
    }

    fn copy_buffer_to_image(&mut self, src: &MockBufferHandle, dst: &MockImageHandle, width: u32, height: u32) -> Result<()> {
        self.check("copy_buffer_to_image")?;
        let bytes = self.buffers[src.0].bytes.clone();
        let memory = &mut self.images[dst.0];
        if memory.layout != ImageLayout::TransferDstOptimal {
            engine_bail!("morph::mock", "copy into image in {:?}", memory.layout);
        }
        if (memory.width, memory.height) != (width, height) {
            engine_bail!("morph::mock", "copy extent mismatch");
        }
        let len = memory.pixels.len();
        memory.pixels.copy_from_slice(&bytes[..len]);
        Ok(())
    }

    fn destroy_staging_buffer(&mut self, staging: MockBufferHandle) {
        self.calls.push("destroy_staging_buffer".to_string());
        self.buffers[staging.0].destroyed = true;
    }
}

// ============================================================================
// Mock Frame Driver
// ============================================================================

/// Swapchain and sync-object simulator
///
/// Fences start signaled. A submit leaves its fence pending until the CPU waits
/// on it, which is when the simulated GPU completes that frame.
#[derive(Debug)]
pub struct MockFrameDriver {
    image_count: u32,
    next_image: u32,
    fence_signaled: [bool; MAX_FRAMES_IN_FLIGHT],
    pending_submit: [Option<u64>; MAX_FRAMES_IN_FLIGHT],
    image_available: [bool; MAX_FRAMES_IN_FLIGHT],
    render_done: [bool; MAX_FRAMES_IN_FLIGHT],
    in_flight: usize,
    /// Largest number of submitted but unfinished frames ever seen
    pub max_in_flight: usize,
    pub acquires: u64,
    pub submits: u64,
    pub presents: u64,
    /// Image index of every uniform write
    pub uniform_writes: Vec<u32>,
    /// (slot, image) of every submit
    pub submissions: Vec<(usize, u32)>,
    /// (wait number, submit completed by it) for every fence wait that blocked
    pub completions: Vec<(u64, u64)>,
    pub fence_waits: u64,
    /// Forces the next acquire to report an index past the swapchain
    pub return_bad_index: bool,
    pub idle: bool,
}

impl MockFrameDriver {
    pub fn new(image_count: u32) -> Self {
        Self {
            image_count,
            next_image: 0,
            fence_signaled: [true; MAX_FRAMES_IN_FLIGHT],
            pending_submit: [None; MAX_FRAMES_IN_FLIGHT],
            image_available: [false; MAX_FRAMES_IN_FLIGHT],
            render_done: [false; MAX_FRAMES_IN_FLIGHT],
            in_flight: 0,
            max_in_flight: 0,
            acquires: 0,
            submits: 0,
            presents: 0,
            uniform_writes: Vec::new(),
            submissions: Vec::new(),
            completions: Vec::new(),
            fence_waits: 0,
            return_bad_index: false,
            idle: true,
        }
    }
}

impl FrameDriver for MockFrameDriver {
    fn wait_for_fence(&mut self, slot: usize) -> Result<()> {
        let wait = self.fence_waits;
        self.fence_waits += 1;
        if !self.fence_signaled[slot] {
            self.fence_signaled[slot] = true;
            self.in_flight -= 1;
            if let Some(submit) = self.pending_submit[slot].take() {
                self.completions.push((wait, submit));
            }
        }
        Ok(())
    }

    fn reset_fence(&mut self, slot: usize) -> Result<()> {
        if !self.fence_signaled[slot] {
            engine_bail!("morph::mock", "reset of a fence still in use (slot {})", slot);
        }
        self.fence_signaled[slot] = false;
        Ok(())
    }

    fn acquire_next_image(&mut self, slot: usize) -> Result<u32> {
        if self.image_available[slot] {
            engine_bail!("morph::mock", "image-available semaphore {} signaled twice", slot);
        }
        self.acquires += 1;
        self.image_available[slot] = true;

        if self.return_bad_index {
            return Ok(self.image_count);
        }
        let index = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count;
        Ok(index)
    }

    fn update_uniforms(&mut self, image_index: u32, _ubo: &UniformBufferObject) -> Result<()> {
        if image_index >= self.image_count {
            engine_bail!("morph::mock", "uniform buffer {} does not exist", image_index);
        }
        self.uniform_writes.push(image_index);
        Ok(())
    }

    fn submit(&mut self, slot: usize, image_index: u32) -> Result<()> {
        if !self.image_available[slot] {
            engine_bail!("morph::mock", "submit waits on unsignaled semaphore {}", slot);
        }
        if self.fence_signaled[slot] {
            engine_bail!("morph::mock", "submit with a fence that was not reset (slot {})", slot);
        }
        self.image_available[slot] = false;
        self.render_done[slot] = true;
        self.pending_submit[slot] = Some(self.submits);
        self.submits += 1;
        self.submissions.push((slot, image_index));
        self.in_flight += 1;
        self.max_in_flight = self.max_in_flight.max(self.in_flight);
        self.idle = false;
        Ok(())
    }

    fn present(&mut self, slot: usize, _image_index: u32) -> Result<()> {
        if !self.render_done[slot] {
            engine_bail!("morph::mock", "present waits on unsignaled semaphore {}", slot);
        }
        self.render_done[slot] = false;
        self.presents += 1;
        Ok(())
    }

    fn wait_idle(&mut self) -> Result<()> {
        self.fence_signaled = [true; MAX_FRAMES_IN_FLIGHT];
        self.pending_submit = [None; MAX_FRAMES_IN_FLIGHT];
        self.in_flight = 0;
        self.idle = true;
        Ok(())
    }
}

// ============================================================================
// Teardown Recorder
// ============================================================================

/// Records release labels in the order the stack runs them
#[derive(Debug, Clone, Default)]
pub struct TeardownRecorder {
    released: Rc<RefCell<Vec<String>>>,
}

impl TeardownRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, stack: &mut TeardownStack, kind: ResourceKind, label: &str) {
        let released = Rc::clone(&self.released);
        let name = label.to_string();
        stack.push(kind, label, move || released.borrow_mut().push(name));
    }

    pub fn released(&self) -> Vec<String> {
        self.released.borrow().clone()
    }
}

#[cfg(test)]
#[path = "mock_driver_tests.rs"]
mod tests;
