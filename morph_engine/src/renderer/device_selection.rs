/// Physical device selection
///
/// Devices are reached through the `CapabilityQuery` trait so the ranking logic can
/// be exercised without a GPU. Every enumerated device is scored; the best eligible
/// one wins and ties keep enumeration order.

use crate::error::{Error, Result};

/// Kind of physical device, as reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    DiscreteGpu,
    IntegratedGpu,
    VirtualGpu,
    Cpu,
    Other,
}

impl DeviceKind {
    /// Base score of the device kind
    pub fn score(&self) -> u32 {
        match self {
            DeviceKind::DiscreteGpu => 1000,
            DeviceKind::IntegratedGpu => 100,
            DeviceKind::VirtualGpu => 50,
            DeviceKind::Cpu => 10,
            DeviceKind::Other => 1,
        }
    }
}

/// Capabilities of one queue family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueFamilyInfo {
    pub graphics: bool,
    pub compute: bool,
    /// Can present to the target surface
    pub present: bool,
    pub queue_count: u32,
}

impl QueueFamilyInfo {
    /// Graphics, compute and present on a single queue
    pub fn is_universal(&self) -> bool {
        self.graphics && self.compute && self.present && self.queue_count > 0
    }
}

/// Everything the selector needs to know about a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub kind: DeviceKind,
    pub queue_families: Vec<QueueFamilyInfo>,
    /// VK_KHR_swapchain is available
    pub supports_swapchain: bool,
}

/// Capability-query interface implemented by GPU backends (and test mocks)
pub trait CapabilityQuery {
    /// Backend device handle
    type Device: Copy;

    /// List every physical device visible to the instance
    fn enumerate_devices(&self) -> Result<Vec<Self::Device>>;

    /// Describe one device relative to the target surface
    fn device_info(&self, device: Self::Device) -> Result<DeviceInfo>;
}

/// Outcome of device selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSelection<D> {
    pub device: D,
    pub name: String,
    pub queue_family_index: u32,
    pub score: u32,
}

/// Index of the first queue family with graphics, compute and present support
pub fn find_queue_family(families: &[QueueFamilyInfo]) -> Option<u32> {
    families
        .iter()
        .position(QueueFamilyInfo::is_universal)
        .map(|index| index as u32)
}

/// Score a device, or `None` when it cannot run the viewer at all
pub fn score_device(info: &DeviceInfo) -> Option<(u32, u32)> {
    if !info.supports_swapchain {
        return None;
    }
    let family = find_queue_family(&info.queue_families)?;
    Some((info.kind.score(), family))
}

/// Rank every enumerated device and pick the best eligible one
///
/// # Errors
///
/// `Error::NotFound` when no device is enumerated or none is eligible.
pub fn select_device<Q: CapabilityQuery>(query: &Q) -> Result<DeviceSelection<Q::Device>> {
    let devices = query.enumerate_devices()?;
    if devices.is_empty() {
        crate::engine_error!("morph::device", "No Vulkan-capable GPU found");
        return Err(Error::NotFound("no physical device".to_string()));
    }

    let mut best: Option<DeviceSelection<Q::Device>> = None;

    for device in devices {
        let info = query.device_info(device)?;

        for (index, family) in info.queue_families.iter().enumerate() {
            crate::engine_debug!(
                "morph::device",
                "{} family {}: G: {}, C: {}, P: {}, count: {}",
                info.name, index,
                family.graphics as u8, family.compute as u8, family.present as u8,
                family.queue_count
            );
        }

        match score_device(&info) {
            Some((score, queue_family_index)) => {
                crate::engine_debug!("morph::device", "Candidate '{}' ({:?}) score {}", info.name, info.kind, score);
                let better = best.as_ref().map_or(true, |current| score > current.score);
                if better {
                    best = Some(DeviceSelection {
                        device,
                        name: info.name,
                        queue_family_index,
                        score,
                    });
                }
            }
            None => {
                crate::engine_debug!(
                    "morph::device",
                    "Skipping '{}': needs VK_KHR_swapchain and a graphics+compute+present queue family",
                    info.name
                );
            }
        }
    }

    match best {
        Some(selection) => {
            crate::engine_info!(
                "morph::device",
                "Selected '{}' (queue family {})",
                selection.name, selection.queue_family_index
            );
            Ok(selection)
        }
        None => {
            crate::engine_error!("morph::device", "No device offers a graphics+compute+present queue family");
            Err(Error::NotFound("suitable physical device".to_string()))
        }
    }
}

#[cfg(test)]
#[path = "device_selection_tests.rs"]
mod tests;
