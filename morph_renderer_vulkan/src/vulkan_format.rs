/// Conversions between engine types and Vulkan types

use ash::vk;
use morph_engine::morph::render::{
    AccessMask, BufferUsage, ColorFormat, ColorSpace, DepthFormat, Extent2D, ImageAspects,
    ImageLayout, PipelineStages, PresentMode, SurfaceCapabilities, SurfaceFormat,
};
use morph_engine::morph::resource::{BufferFormat, ShaderStage, VertexInputRate, VertexLayout};

// ===== ENGINE -> VULKAN =====

pub(crate) fn color_format_to_vk(format: ColorFormat) -> vk::Format {
    match format {
        ColorFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        ColorFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        ColorFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        ColorFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        ColorFormat::UNDEFINED | ColorFormat::Other => vk::Format::UNDEFINED,
    }
}

pub(crate) fn color_space_to_vk(space: ColorSpace) -> vk::ColorSpaceKHR {
    match space {
        ColorSpace::SrgbNonlinear | ColorSpace::Other => vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }
}

pub(crate) fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
    }
}

pub(crate) fn depth_format_to_vk(format: DepthFormat) -> vk::Format {
    match format {
        DepthFormat::D32_SFLOAT => vk::Format::D32_SFLOAT,
        DepthFormat::D32_SFLOAT_S8_UINT => vk::Format::D32_SFLOAT_S8_UINT,
        DepthFormat::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
    }
}

pub(crate) fn image_layout_to_vk(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::TransferDstOptimal => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        ImageLayout::ShaderReadOnlyOptimal => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ImageLayout::DepthStencilAttachmentOptimal => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

pub(crate) fn access_mask_to_vk(mask: AccessMask) -> vk::AccessFlags {
    let mut flags = vk::AccessFlags::empty();
    if mask.contains(AccessMask::TRANSFER_WRITE) {
        flags |= vk::AccessFlags::TRANSFER_WRITE;
    }
    if mask.contains(AccessMask::SHADER_READ) {
        flags |= vk::AccessFlags::SHADER_READ;
    }
    if mask.contains(AccessMask::DEPTH_STENCIL_ATTACHMENT_READ) {
        flags |= vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ;
    }
    if mask.contains(AccessMask::DEPTH_STENCIL_ATTACHMENT_WRITE) {
        flags |= vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE;
    }
    if mask.contains(AccessMask::COLOR_ATTACHMENT_READ) {
        flags |= vk::AccessFlags::COLOR_ATTACHMENT_READ;
    }
    if mask.contains(AccessMask::COLOR_ATTACHMENT_WRITE) {
        flags |= vk::AccessFlags::COLOR_ATTACHMENT_WRITE;
    }
    flags
}

pub(crate) fn pipeline_stages_to_vk(stages: PipelineStages) -> vk::PipelineStageFlags {
    let mut flags = vk::PipelineStageFlags::empty();
    if stages.contains(PipelineStages::TOP_OF_PIPE) {
        flags |= vk::PipelineStageFlags::TOP_OF_PIPE;
    }
    if stages.contains(PipelineStages::TRANSFER) {
        flags |= vk::PipelineStageFlags::TRANSFER;
    }
    if stages.contains(PipelineStages::FRAGMENT_SHADER) {
        flags |= vk::PipelineStageFlags::FRAGMENT_SHADER;
    }
    if stages.contains(PipelineStages::EARLY_FRAGMENT_TESTS) {
        flags |= vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS;
    }
    if stages.contains(PipelineStages::COLOR_ATTACHMENT_OUTPUT) {
        flags |= vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT;
    }
    flags
}

pub(crate) fn image_aspects_to_vk(aspects: ImageAspects) -> vk::ImageAspectFlags {
    let mut flags = vk::ImageAspectFlags::empty();
    if aspects.contains(ImageAspects::COLOR) {
        flags |= vk::ImageAspectFlags::COLOR;
    }
    if aspects.contains(ImageAspects::DEPTH) {
        flags |= vk::ImageAspectFlags::DEPTH;
    }
    if aspects.contains(ImageAspects::STENCIL) {
        flags |= vk::ImageAspectFlags::STENCIL;
    }
    flags
}

pub(crate) fn buffer_usage_to_vk(usage: BufferUsage) -> vk::BufferUsageFlags {
    let mut flags = vk::BufferUsageFlags::empty();
    if usage.contains(BufferUsage::TRANSFER_SRC) {
        flags |= vk::BufferUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(BufferUsage::TRANSFER_DST) {
        flags |= vk::BufferUsageFlags::TRANSFER_DST;
    }
    if usage.contains(BufferUsage::UNIFORM) {
        flags |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }
    if usage.contains(BufferUsage::INDEX) {
        flags |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if usage.contains(BufferUsage::VERTEX) {
        flags |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    flags
}

pub(crate) fn buffer_format_to_vk(format: BufferFormat) -> vk::Format {
    match format {
        BufferFormat::R32G32_SFLOAT => vk::Format::R32G32_SFLOAT,
        BufferFormat::R32G32B32_SFLOAT => vk::Format::R32G32B32_SFLOAT,
    }
}

pub(crate) fn shader_stage_to_vk(stage: ShaderStage) -> vk::ShaderStageFlags {
    match stage {
        ShaderStage::Vertex => vk::ShaderStageFlags::VERTEX,
        ShaderStage::Fragment => vk::ShaderStageFlags::FRAGMENT,
    }
}

/// Binding and attribute descriptions for a vertex layout
pub(crate) fn vertex_layout_to_vk(
    layout: &VertexLayout,
) -> (Vec<vk::VertexInputBindingDescription>, Vec<vk::VertexInputAttributeDescription>) {
    let bindings = layout.bindings.iter()
        .map(|b| vk::VertexInputBindingDescription {
            binding: b.binding,
            stride: b.stride,
            input_rate: match b.input_rate {
                VertexInputRate::Vertex => vk::VertexInputRate::VERTEX,
                VertexInputRate::Instance => vk::VertexInputRate::INSTANCE,
            },
        })
        .collect();

    let attributes = layout.attributes.iter()
        .map(|a| vk::VertexInputAttributeDescription {
            location: a.location,
            binding: a.binding,
            format: buffer_format_to_vk(a.format),
            offset: a.offset,
        })
        .collect();

    (bindings, attributes)
}

pub(crate) fn extent_to_vk(extent: Extent2D) -> vk::Extent2D {
    vk::Extent2D { width: extent.width, height: extent.height }
}

// ===== VULKAN -> ENGINE =====

pub(crate) fn color_format_from_vk(format: vk::Format) -> ColorFormat {
    match format {
        vk::Format::UNDEFINED => ColorFormat::UNDEFINED,
        vk::Format::B8G8R8A8_UNORM => ColorFormat::B8G8R8A8_UNORM,
        vk::Format::B8G8R8A8_SRGB => ColorFormat::B8G8R8A8_SRGB,
        vk::Format::R8G8B8A8_UNORM => ColorFormat::R8G8B8A8_UNORM,
        vk::Format::R8G8B8A8_SRGB => ColorFormat::R8G8B8A8_SRGB,
        _ => ColorFormat::Other,
    }
}

pub(crate) fn surface_format_from_vk(format: vk::SurfaceFormatKHR) -> SurfaceFormat {
    SurfaceFormat {
        format: color_format_from_vk(format.format),
        color_space: if format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR {
            ColorSpace::SrgbNonlinear
        } else {
            ColorSpace::Other
        },
    }
}

/// `None` for modes the engine never selects
pub(crate) fn present_mode_from_vk(mode: vk::PresentModeKHR) -> Option<PresentMode> {
    match mode {
        vk::PresentModeKHR::IMMEDIATE => Some(PresentMode::Immediate),
        vk::PresentModeKHR::MAILBOX => Some(PresentMode::Mailbox),
        vk::PresentModeKHR::FIFO => Some(PresentMode::Fifo),
        vk::PresentModeKHR::FIFO_RELAXED => Some(PresentMode::FifoRelaxed),
        _ => None,
    }
}

pub(crate) fn extent_from_vk(extent: vk::Extent2D) -> Extent2D {
    Extent2D::new(extent.width, extent.height)
}

pub(crate) fn capabilities_from_vk(caps: &vk::SurfaceCapabilitiesKHR) -> SurfaceCapabilities {
    SurfaceCapabilities {
        min_image_count: caps.min_image_count,
        max_image_count: caps.max_image_count,
        current_extent: extent_from_vk(caps.current_extent),
        min_image_extent: extent_from_vk(caps.min_image_extent),
        max_image_extent: extent_from_vk(caps.max_image_extent),
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
