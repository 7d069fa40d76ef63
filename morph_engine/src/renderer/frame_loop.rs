/// Frame loop state machine
///
/// Two counters drive a frame and they must never be mixed up:
/// - the frame slot (`0..MAX_FRAMES_IN_FLIGHT`) selects fences and semaphores;
/// - the acquired image index selects the uniform buffer, descriptor set,
///   command buffer and framebuffer.

use crate::error::{Error, Result};
use crate::resource::UniformBufferObject;

/// Number of frames the CPU may record ahead of the GPU
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// GPU operations behind one frame
///
/// `slot` arguments index per-slot sync objects; `image_index` arguments index
/// per-swapchain-image resources.
pub trait FrameDriver {
    /// Block until the slot's fence is signaled (no timeout)
    fn wait_for_fence(&mut self, slot: usize) -> Result<()>;

    fn reset_fence(&mut self, slot: usize) -> Result<()>;

    /// Acquire the next presentable image, signaling the slot's
    /// image-available semaphore
    fn acquire_next_image(&mut self, slot: usize) -> Result<u32>;

    /// Write the uniform buffer owned by `image_index`
    fn update_uniforms(&mut self, image_index: u32, ubo: &UniformBufferObject) -> Result<()>;

    /// Submit the command buffer of `image_index`: wait on image-available at the
    /// color-attachment-output stage, signal render-done and the slot's fence
    fn submit(&mut self, slot: usize, image_index: u32) -> Result<()>;

    /// Present `image_index` after the slot's render-done semaphore
    fn present(&mut self, slot: usize, image_index: u32) -> Result<()>;

    /// Block until the device has no pending work
    fn wait_idle(&mut self) -> Result<()>;
}

/// Where a frame slot is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Acquiring,
    Submitted,
    Presented,
}

/// What one `draw_frame` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based count of the frame
    pub frame_number: u64,
    pub slot: usize,
    pub image_index: u32,
}

/// CPU-side frame pacing
#[derive(Debug)]
pub struct FrameLoop {
    image_count: u32,
    current_slot: usize,
    frames_presented: u64,
    slot_states: [FrameState; MAX_FRAMES_IN_FLIGHT],
}

impl FrameLoop {
    /// # Arguments
    ///
    /// * `image_count` - Number of swapchain images (bounds every acquired index)
    pub fn new(image_count: u32) -> Result<Self> {
        if image_count == 0 {
            crate::engine_error!("morph::frame", "Swapchain has no images");
            return Err(Error::InvalidResource("swapchain has no images".to_string()));
        }
        Ok(Self {
            image_count,
            current_slot: 0,
            frames_presented: 0,
            slot_states: [FrameState::Idle; MAX_FRAMES_IN_FLIGHT],
        })
    }

    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn image_count(&self) -> u32 {
        self.image_count
    }

    pub fn slot_state(&self, slot: usize) -> Option<FrameState> {
        self.slot_states.get(slot).copied()
    }

    /// Run one iteration: wait, reset, acquire, update uniforms, submit, present,
    /// advance the slot
    pub fn draw_frame<D: FrameDriver>(&mut self, driver: &mut D, ubo: &UniformBufferObject) -> Result<FrameReport> {
        let slot = self.current_slot;

        driver.wait_for_fence(slot)?;
        driver.reset_fence(slot)?;
        self.slot_states[slot] = FrameState::Idle;

        self.slot_states[slot] = FrameState::Acquiring;
        let image_index = driver.acquire_next_image(slot)?;
        if image_index >= self.image_count {
            crate::engine_error!(
                "morph::frame",
                "Acquired image {} but the swapchain has {} images",
                image_index, self.image_count
            );
            return Err(Error::InvalidResource(format!("image index {} out of range", image_index)));
        }

        driver.update_uniforms(image_index, ubo)?;

        driver.submit(slot, image_index)?;
        self.slot_states[slot] = FrameState::Submitted;

        driver.present(slot, image_index)?;
        self.slot_states[slot] = FrameState::Presented;

        let report = FrameReport {
            frame_number: self.frames_presented,
            slot,
            image_index,
        };
        crate::engine_trace!("morph::frame", "frame {} slot {} image {}", report.frame_number, slot, image_index);

        self.frames_presented += 1;
        self.current_slot = (slot + 1) % MAX_FRAMES_IN_FLIGHT;
        Ok(report)
    }

    /// Wait for the device to drain; must run before any resource is destroyed
    pub fn finish<D: FrameDriver>(&mut self, driver: &mut D) -> Result<()> {
        driver.wait_idle()?;
        self.slot_states = [FrameState::Idle; MAX_FRAMES_IN_FLIGHT];
        crate::engine_debug!("morph::frame", "Device idle after {} frames", self.frames_presented);
        Ok(())
    }
}

#[cfg(test)]
#[path = "frame_loop_tests.rs"]
mod tests;
