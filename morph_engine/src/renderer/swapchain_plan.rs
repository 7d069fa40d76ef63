/// Swapchain policy: surface format, present mode, extent and image count
///
/// Backends translate their surface queries into these types, call
/// `SwapchainPlan::new`, and create the swapchain from the result.

use crate::error::{Error, Result};

/// 2D extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, as used by the projection matrix
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Surface pixel formats the selector distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum ColorFormat {
    /// The surface has no preferred format
    UNDEFINED,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    /// Anything the viewer never picks
    Other,
}

/// Surface color spaces the selector distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    SrgbNonlinear,
    Other,
}

/// One (format, color space) pair offered by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFormat {
    pub format: ColorFormat,
    pub color_space: ColorSpace,
}

/// Presentation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    Immediate,
    Mailbox,
    Fifo,
    FifoRelaxed,
}

/// Subset of the surface capabilities the policy reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub min_image_count: u32,
    /// Zero means "no limit"
    pub max_image_count: u32,
    /// `u32::MAX` in both fields means the window size decides
    pub current_extent: Extent2D,
    pub min_image_extent: Extent2D,
    pub max_image_extent: Extent2D,
}

/// Format the swapchain is always created with
pub const PREFERRED_SURFACE_FORMAT: SurfaceFormat = SurfaceFormat {
    format: ColorFormat::B8G8R8A8_UNORM,
    color_space: ColorSpace::SrgbNonlinear,
};

/// Image count: `min + 1`, capped to `max` when the surface has a limit
pub fn choose_image_count(caps: &SurfaceCapabilities) -> u32 {
    let desired = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        desired.min(caps.max_image_count)
    } else {
        desired
    }
}

/// Accept an UNDEFINED entry (any format allowed) or an explicit
/// B8G8R8A8_UNORM / sRGB non-linear entry; both resolve to the preferred format
pub fn choose_surface_format(formats: &[SurfaceFormat]) -> Result<SurfaceFormat> {
    formats
        .iter()
        .find(|f| f.format == ColorFormat::UNDEFINED || **f == PREFERRED_SURFACE_FORMAT)
        .map(|_| PREFERRED_SURFACE_FORMAT)
        .ok_or_else(|| {
            crate::engine_error!("morph::swapchain", "No B8G8R8A8_UNORM/sRGB surface format among {} formats", formats.len());
            Error::NotFound("suitable surface format".to_string())
        })
}

/// FIFO is the only mode the viewer uses
pub fn choose_present_mode(modes: &[PresentMode]) -> Result<PresentMode> {
    if modes.contains(&PresentMode::Fifo) {
        Ok(PresentMode::Fifo)
    } else {
        crate::engine_error!("morph::swapchain", "Surface does not report FIFO present mode ({:?})", modes);
        Err(Error::NotFound("FIFO present mode".to_string()))
    }
}

/// Use the surface extent, or clamp the window size when the surface leaves it open
pub fn choose_extent(caps: &SurfaceCapabilities, window: Extent2D) -> Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    Extent2D {
        width: window.width.clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: window.height.clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}

/// Resolved swapchain parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainPlan {
    pub surface_format: SurfaceFormat,
    pub present_mode: PresentMode,
    pub extent: Extent2D,
    pub image_count: u32,
}

impl SwapchainPlan {
    pub fn new(
        caps: &SurfaceCapabilities,
        formats: &[SurfaceFormat],
        present_modes: &[PresentMode],
        window: Extent2D,
    ) -> Result<Self> {
        crate::engine_info!(
            "morph::swapchain",
            "surface formats: {}, surface present modes: {}",
            formats.len(), present_modes.len()
        );
        if formats.is_empty() || present_modes.is_empty() {
            crate::engine_error!("morph::swapchain", "Surface reports no formats or no present modes");
            return Err(Error::InitializationFailed("surface has no formats or present modes".to_string()));
        }

        let surface_format = choose_surface_format(formats)?;
        let present_mode = choose_present_mode(present_modes)?;
        let extent = choose_extent(caps, window);
        let image_count = choose_image_count(caps);

        crate::engine_info!("morph::swapchain", "target extent w: {}, h {}", extent.width, extent.height);
        crate::engine_info!(
            "morph::swapchain",
            "image count min: {}, max: {}, chosen: {}",
            caps.min_image_count, caps.max_image_count, image_count
        );

        Ok(Self { surface_format, present_mode, extent, image_count })
    }
}

#[cfg(test)]
#[path = "swapchain_plan_tests.rs"]
mod tests;
