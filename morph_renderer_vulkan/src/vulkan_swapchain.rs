/// Swapchain - presentable images and their views
///
/// Created once at startup. The window cannot be resized, so there is no recreation path.

use ash::vk;
use morph_engine::morph::{Error, Result};
use morph_engine::morph::render::{Extent2D, ResourceKind, SwapchainPlan, TeardownStack};
use morph_engine::{engine_debug, engine_error};

use crate::vulkan_format::{
    capabilities_from_vk, color_format_to_vk, color_space_to_vk, extent_to_vk,
    present_mode_from_vk, present_mode_to_vk, surface_format_from_vk,
};
use crate::vulkan_texture::create_image_view;

/// Vulkan swapchain and one view per image
pub(crate) struct Swapchain {
    pub loader: ash::khr::swapchain::Device,
    pub handle: vk::SwapchainKHR,
    pub format: vk::Format,
    pub extent: vk::Extent2D,
    pub image_views: Vec<vk::ImageView>,
    pub plan: SwapchainPlan,
}

impl Swapchain {
    /// Query the surface, resolve a `SwapchainPlan`, create the swapchain and its views
    ///
    /// # Arguments
    ///
    /// * `window` - Window size, used only when the surface leaves the extent open
    /// * `teardown` - Receives the swapchain, then each image view
    pub fn new(
        instance: &ash::Instance,
        device: &ash::Device,
        physical_device: vk::PhysicalDevice,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        window: Extent2D,
        teardown: &mut TeardownStack,
    ) -> Result<Self> {
        unsafe {
            let capabilities = surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface)
                .map_err(|e| {
                    engine_error!("morph::vulkan", "Failed to get surface capabilities: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
                })?;

            let vk_formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(|e| {
                    engine_error!("morph::vulkan", "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;

            let vk_modes = surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .map_err(|e| {
                    engine_error!("morph::vulkan", "Failed to query present modes: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get present modes: {:?}", e))
                })?;

            let formats: Vec<_> = vk_formats.iter().copied().map(surface_format_from_vk).collect();
            let modes: Vec<_> = vk_modes.iter().copied().filter_map(present_mode_from_vk).collect();
            let plan = SwapchainPlan::new(&capabilities_from_vk(&capabilities), &formats, &modes, window)?;

            let format = color_format_to_vk(plan.surface_format.format);
            let extent = extent_to_vk(plan.extent);

            let create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(surface)
                .min_image_count(plan.image_count)
                .image_format(format)
                .image_color_space(color_space_to_vk(plan.surface_format.color_space))
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode_to_vk(plan.present_mode))
                .clipped(true);

            let loader = ash::khr::swapchain::Device::new(instance, device);
            let handle = loader
                .create_swapchain(&create_info, None)
                .map_err(|e| {
                    engine_error!("morph::vulkan", "Failed to create swapchain: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
                })?;
            let release_loader = loader.clone();
            teardown.push(ResourceKind::Swapchain, "swapchain", move || {
                release_loader.destroy_swapchain(handle, None);
            });

            let images = loader
                .get_swapchain_images(handle)
                .map_err(|e| {
                    engine_error!("morph::vulkan", "Failed to get swapchain images: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
                })?;
            engine_debug!(
                "morph::vulkan",
                "Swapchain has {} images (requested {})",
                images.len(), plan.image_count
            );

            let mut image_views = Vec::with_capacity(images.len());
            for (i, &image) in images.iter().enumerate() {
                let view = create_image_view(device, image, format, vk::ImageAspectFlags::COLOR)?;
                let release_device = device.clone();
                teardown.push(ResourceKind::ImageView, format!("image view {}", i), move || {
                    release_device.destroy_image_view(view, None);
                });
                image_views.push(view);
            }

            Ok(Self {
                loader,
                handle,
                format,
                extent,
                image_views,
                plan,
            })
        }
    }

    /// Number of images the driver actually created
    pub fn image_count(&self) -> u32 {
        self.image_views.len() as u32
    }
}
