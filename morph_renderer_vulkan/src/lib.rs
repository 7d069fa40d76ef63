/*!
# Morph - Vulkan Renderer Backend

Vulkan implementation of the morph viewer, built on `ash` for the API bindings,
`ash-window` for surface creation and `gpu-allocator` for memory management.

The backend plugs the core traits of `morph_engine` into live Vulkan objects:
- `CapabilityQuery` over the instance and surface (physical device selection)
- `UploadDevice` over staging buffers and one-time command buffers
- `FrameDriver` over the swapchain, fences and semaphores

# Example

```no_run
use morph_renderer_vulkan::VulkanRenderer;
use morph_engine::morph::Config;
use morph_engine::morph::render::Extent2D;
# fn run(window: &winit::window::Window) -> morph_engine::morph::Result<()> {
let config = Config::default();
let mut renderer = VulkanRenderer::new(window, Extent2D::new(800, 600), &config)?;
renderer.draw_frame()?;
renderer.finish()?;
# Ok(()) }
```
*/

mod vulkan;
mod vulkan_context;
mod vulkan_device;
mod vulkan_format;
mod vulkan_swapchain;
mod vulkan_pipeline;
mod vulkan_buffer;
mod vulkan_texture;
mod vulkan_descriptor_set;
mod vulkan_frame;
mod debug;

pub use vulkan::VulkanRenderer;

// Re-export debug utilities
pub use debug::{get_validation_stats, print_validation_stats_report, ValidationStats};
