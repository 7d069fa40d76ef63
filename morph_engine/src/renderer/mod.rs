/// Renderer module - GPU lifecycle logic behind backend-neutral traits

// Module declarations
pub mod device_selection;
pub mod swapchain_plan;
pub mod image_layout;
pub mod upload;
pub mod frame_loop;
pub mod teardown;

#[cfg(test)]
pub(crate) mod mock_driver;

// Re-export everything
pub use device_selection::*;
pub use swapchain_plan::*;
pub use image_layout::*;
pub use upload::*;
pub use frame_loop::*;
pub use teardown::*;
