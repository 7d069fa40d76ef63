//! Unit tests for Vulkan format conversion functions
//!
//! Pure mappings, no GPU required.

use super::*;
use morph_engine::morph::resource::Vertex;

// ============================================================================
// SURFACE FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_preferred_surface_format_maps_to_bgra_srgb_nonlinear() {
    use morph_engine::morph::render::PREFERRED_SURFACE_FORMAT;
    assert_eq!(color_format_to_vk(PREFERRED_SURFACE_FORMAT.format), vk::Format::B8G8R8A8_UNORM);
    assert_eq!(color_space_to_vk(PREFERRED_SURFACE_FORMAT.color_space), vk::ColorSpaceKHR::SRGB_NONLINEAR);
}

#[test]
fn test_unknown_vk_format_becomes_other() {
    assert_eq!(color_format_from_vk(vk::Format::A2B10G10R10_UNORM_PACK32), ColorFormat::Other);
    assert_eq!(color_format_from_vk(vk::Format::UNDEFINED), ColorFormat::UNDEFINED);
}

#[test]
fn test_surface_format_from_vk_keeps_color_space() {
    let format = surface_format_from_vk(vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT,
    });
    assert_eq!(format.format, ColorFormat::B8G8R8A8_SRGB);
    assert_eq!(format.color_space, ColorSpace::Other);
}

// ============================================================================
// PRESENT MODE CONVERSION TESTS
// ============================================================================

#[test]
fn test_present_modes_map_both_ways() {
    for mode in [PresentMode::Immediate, PresentMode::Mailbox, PresentMode::Fifo, PresentMode::FifoRelaxed] {
        assert_eq!(present_mode_from_vk(present_mode_to_vk(mode)), Some(mode));
    }
    assert_eq!(present_mode_from_vk(vk::PresentModeKHR::SHARED_DEMAND_REFRESH), None);
}

// ============================================================================
// LAYOUT / BARRIER CONVERSION TESTS
// ============================================================================

#[test]
fn test_image_layouts() {
    assert_eq!(image_layout_to_vk(ImageLayout::Undefined), vk::ImageLayout::UNDEFINED);
    assert_eq!(image_layout_to_vk(ImageLayout::TransferDstOptimal), vk::ImageLayout::TRANSFER_DST_OPTIMAL);
    assert_eq!(image_layout_to_vk(ImageLayout::ShaderReadOnlyOptimal), vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
    assert_eq!(
        image_layout_to_vk(ImageLayout::DepthStencilAttachmentOptimal),
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    );
    assert_eq!(image_layout_to_vk(ImageLayout::PresentSrc), vk::ImageLayout::PRESENT_SRC_KHR);
}

#[test]
fn test_depth_barrier_masks() {
    use morph_engine::morph::render::TransitionBarrier;
    let barrier = TransitionBarrier::new(
        ImageLayout::Undefined,
        ImageLayout::DepthStencilAttachmentOptimal,
        true,
    ).unwrap();

    assert_eq!(access_mask_to_vk(barrier.src_access), vk::AccessFlags::empty());
    assert_eq!(
        access_mask_to_vk(barrier.dst_access),
        vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE
    );
    assert_eq!(pipeline_stages_to_vk(barrier.src_stage), vk::PipelineStageFlags::TOP_OF_PIPE);
    assert_eq!(pipeline_stages_to_vk(barrier.dst_stage), vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS);
    assert_eq!(
        image_aspects_to_vk(barrier.aspect),
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    );
}

#[test]
fn test_texture_barrier_masks() {
    use morph_engine::morph::render::TransitionBarrier;
    let barrier = TransitionBarrier::new(
        ImageLayout::TransferDstOptimal,
        ImageLayout::ShaderReadOnlyOptimal,
        false,
    ).unwrap();

    assert_eq!(access_mask_to_vk(barrier.src_access), vk::AccessFlags::TRANSFER_WRITE);
    assert_eq!(access_mask_to_vk(barrier.dst_access), vk::AccessFlags::SHADER_READ);
    assert_eq!(pipeline_stages_to_vk(barrier.src_stage), vk::PipelineStageFlags::TRANSFER);
    assert_eq!(pipeline_stages_to_vk(barrier.dst_stage), vk::PipelineStageFlags::FRAGMENT_SHADER);
    assert_eq!(image_aspects_to_vk(barrier.aspect), vk::ImageAspectFlags::COLOR);
}

#[test]
fn test_depth_formats() {
    assert_eq!(depth_format_to_vk(DepthFormat::D32_SFLOAT), vk::Format::D32_SFLOAT);
    assert_eq!(depth_format_to_vk(DepthFormat::D32_SFLOAT_S8_UINT), vk::Format::D32_SFLOAT_S8_UINT);
    assert_eq!(depth_format_to_vk(DepthFormat::D24_UNORM_S8_UINT), vk::Format::D24_UNORM_S8_UINT);
}

// ============================================================================
// BUFFER / VERTEX CONVERSION TESTS
// ============================================================================

#[test]
fn test_buffer_usage_flags() {
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::VERTEX | BufferUsage::TRANSFER_DST),
        vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
    );
    assert_eq!(buffer_usage_to_vk(BufferUsage::UNIFORM), vk::BufferUsageFlags::UNIFORM_BUFFER);
    assert_eq!(buffer_usage_to_vk(BufferUsage::INDEX), vk::BufferUsageFlags::INDEX_BUFFER);
    assert_eq!(buffer_usage_to_vk(BufferUsage::TRANSFER_SRC), vk::BufferUsageFlags::TRANSFER_SRC);
}

#[test]
fn test_vertex_layout_descriptions() {
    let (bindings, attributes) = vertex_layout_to_vk(&Vertex::layout());

    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].stride, 32);
    assert_eq!(bindings[0].input_rate, vk::VertexInputRate::VERTEX);

    let formats: Vec<_> = attributes.iter().map(|a| (a.location, a.format, a.offset)).collect();
    assert_eq!(formats, vec![
        (0, vk::Format::R32G32B32_SFLOAT, 0),
        (1, vk::Format::R32G32B32_SFLOAT, 12),
        (2, vk::Format::R32G32_SFLOAT, 24),
    ]);
}

#[test]
fn test_shader_stages() {
    assert_eq!(shader_stage_to_vk(ShaderStage::Vertex), vk::ShaderStageFlags::VERTEX);
    assert_eq!(shader_stage_to_vk(ShaderStage::Fragment), vk::ShaderStageFlags::FRAGMENT);
}

// ============================================================================
// CAPABILITIES
// ============================================================================

#[test]
fn test_capabilities_from_vk() {
    let caps = vk::SurfaceCapabilitiesKHR {
        min_image_count: 2,
        max_image_count: 0,
        current_extent: vk::Extent2D { width: 800, height: 600 },
        min_image_extent: vk::Extent2D { width: 1, height: 1 },
        max_image_extent: vk::Extent2D { width: 4096, height: 4096 },
        ..Default::default()
    };
    let converted = capabilities_from_vk(&caps);
    assert_eq!(converted.min_image_count, 2);
    assert_eq!(converted.max_image_count, 0);
    assert_eq!(converted.current_extent, Extent2D::new(800, 600));
    assert_eq!(extent_to_vk(converted.max_image_extent), caps.max_image_extent);
}
