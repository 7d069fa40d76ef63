/// Physical device queries and logical device creation

use ash::vk;
use morph_engine::morph::{Error, Result};
use morph_engine::morph::render::{CapabilityQuery, DeviceInfo, DeviceKind, QueueFamilyInfo};
use morph_engine::{engine_debug, engine_error, engine_err};
use std::ffi::CStr;

/// `CapabilityQuery` over a live instance and surface
pub(crate) struct VulkanCapabilityQuery<'a> {
    pub instance: &'a ash::Instance,
    pub surface_loader: &'a ash::khr::surface::Instance,
    pub surface: vk::SurfaceKHR,
}

pub(crate) fn device_kind_from_vk(device_type: vk::PhysicalDeviceType) -> DeviceKind {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => DeviceKind::DiscreteGpu,
        vk::PhysicalDeviceType::INTEGRATED_GPU => DeviceKind::IntegratedGpu,
        vk::PhysicalDeviceType::VIRTUAL_GPU => DeviceKind::VirtualGpu,
        vk::PhysicalDeviceType::CPU => DeviceKind::Cpu,
        _ => DeviceKind::Other,
    }
}

impl CapabilityQuery for VulkanCapabilityQuery<'_> {
    type Device = vk::PhysicalDevice;

    fn enumerate_devices(&self) -> Result<Vec<vk::PhysicalDevice>> {
        unsafe {
            self.instance.enumerate_physical_devices()
                .map_err(|e| engine_err!("morph::vulkan", "Failed to enumerate physical devices: {:?}", e))
        }
    }

    fn device_info(&self, device: vk::PhysicalDevice) -> Result<DeviceInfo> {
        unsafe {
            let properties = self.instance.get_physical_device_properties(device);
            let name = CStr::from_ptr(properties.device_name.as_ptr())
                .to_string_lossy()
                .into_owned();

            let families = self.instance.get_physical_device_queue_family_properties(device);
            let mut queue_families = Vec::with_capacity(families.len());
            for (index, family) in families.iter().enumerate() {
                let present = self.surface_loader
                    .get_physical_device_surface_support(device, index as u32, self.surface)
                    .map_err(|e| engine_err!("morph::vulkan", "Failed to query surface support on '{}': {:?}", name, e))?;
                queue_families.push(QueueFamilyInfo {
                    graphics: family.queue_flags.contains(vk::QueueFlags::GRAPHICS),
                    compute: family.queue_flags.contains(vk::QueueFlags::COMPUTE),
                    present,
                    queue_count: family.queue_count,
                });
            }

            let extensions = self.instance.enumerate_device_extension_properties(device)
                .map_err(|e| engine_err!("morph::vulkan", "Failed to enumerate extensions of '{}': {:?}", name, e))?;
            let supports_swapchain = extensions.iter().any(|ext| {
                CStr::from_ptr(ext.extension_name.as_ptr()) == ash::khr::swapchain::NAME
            });

            Ok(DeviceInfo {
                name,
                kind: device_kind_from_vk(properties.device_type),
                queue_families,
                supports_swapchain,
            })
        }
    }
}

/// Logical device with one queue from `queue_family` and the swapchain extension
///
/// No optional device features are enabled.
pub(crate) fn create_logical_device(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    queue_family: u32,
) -> Result<(ash::Device, vk::Queue)> {
    unsafe {
        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&queue_priorities)];

        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
        let device_features = vk::PhysicalDeviceFeatures::default();

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names)
            .enabled_features(&device_features);

        let device = instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| {
                engine_error!("morph::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })?;

        let queue = device.get_device_queue(queue_family, 0);
        engine_debug!("morph::vulkan", "Logical device created on queue family {}", queue_family);
        Ok((device, queue))
    }
}

/// Whether `format` can back an optimally tiled depth attachment
pub(crate) fn supports_depth_attachment(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    format: vk::Format,
) -> bool {
    let properties = unsafe { instance.get_physical_device_format_properties(physical_device, format) };
    properties.optimal_tiling_features
        .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
}
