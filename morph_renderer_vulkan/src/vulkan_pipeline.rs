/// Render pass, descriptor set layout and the fixed graphics pipeline

use ash::vk;
use morph_engine::morph::{Error, Result};
use morph_engine::morph::render::{ResourceKind, TeardownStack};
use morph_engine::morph::resource::{ShaderCode, Vertex};
use morph_engine::{engine_debug, engine_error};
use std::ffi::CStr;

use crate::vulkan_format::{shader_stage_to_vk, vertex_layout_to_vk};

const SHADER_ENTRY_POINT: &CStr = c"main";

/// Pipeline and the layout it was created with
pub(crate) struct GraphicsPipeline {
    pub layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
}

/// One color attachment presented at the end and one depth attachment discarded at the end
pub(crate) fn create_render_pass(
    device: &ash::Device,
    color_format: vk::Format,
    depth_format: vk::Format,
    teardown: &mut TeardownStack,
) -> Result<vk::RenderPass> {
    let attachments = [
        vk::AttachmentDescription::default()
            .format(color_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR),
        vk::AttachmentDescription::default()
            .format(depth_format)
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::DONT_CARE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL),
    ];

    let color_attachment_ref = vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    let depth_attachment_ref = vk::AttachmentReference::default()
        .attachment(1)
        .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

    let subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(std::slice::from_ref(&color_attachment_ref))
        .depth_stencil_attachment(&depth_attachment_ref);

    let dependency = vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE);

    let render_pass_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(std::slice::from_ref(&subpass))
        .dependencies(std::slice::from_ref(&dependency));

    unsafe {
        let render_pass = device.create_render_pass(&render_pass_info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create render pass: {:?}", e);
            Error::InitializationFailed(format!("Failed to create render pass: {:?}", e))
        })?;
        let release_device = device.clone();
        teardown.push(ResourceKind::RenderPass, "render pass", move || {
            release_device.destroy_render_pass(render_pass, None);
        });
        Ok(render_pass)
    }
}

/// binding 0: uniform buffer (vertex), binding 1: combined image sampler (fragment)
pub(crate) fn create_descriptor_set_layout(
    device: &ash::Device,
    teardown: &mut TeardownStack,
) -> Result<vk::DescriptorSetLayout> {
    let bindings = [
        vk::DescriptorSetLayoutBinding::default()
            .binding(0)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::VERTEX),
        vk::DescriptorSetLayoutBinding::default()
            .binding(1)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::FRAGMENT),
    ];
    let layout_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);

    unsafe {
        let layout = device.create_descriptor_set_layout(&layout_info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create descriptor set layout: {:?}", e);
            Error::InitializationFailed(format!("Failed to create descriptor set layout: {:?}", e))
        })?;
        let release_device = device.clone();
        teardown.push(ResourceKind::DescriptorSetLayout, "descriptor set layout", move || {
            release_device.destroy_descriptor_set_layout(layout, None);
        });
        Ok(layout)
    }
}

fn create_shader_module(device: &ash::Device, code: &ShaderCode) -> Result<vk::ShaderModule> {
    let create_info = vk::ShaderModuleCreateInfo::default().code(&code.words);
    unsafe {
        device.create_shader_module(&create_info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create {:?} shader module: {:?}", code.stage, e);
            Error::InitializationFailed(format!("Failed to create shader module: {:?}", e))
        })
    }
}

/// Build the one pipeline the viewer draws with
///
/// Shader modules only live for the duration of this call.
pub(crate) fn create_graphics_pipeline(
    device: &ash::Device,
    render_pass: vk::RenderPass,
    set_layout: vk::DescriptorSetLayout,
    extent: vk::Extent2D,
    vertex_shader: &ShaderCode,
    fragment_shader: &ShaderCode,
    teardown: &mut TeardownStack,
) -> Result<GraphicsPipeline> {
    unsafe {
        let set_layouts = [set_layout];
        let layout_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);
        let layout = device.create_pipeline_layout(&layout_info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create pipeline layout: {:?}", e);
            Error::InitializationFailed(format!("Failed to create pipeline layout: {:?}", e))
        })?;
        let release_device = device.clone();
        teardown.push(ResourceKind::PipelineLayout, "pipeline layout", move || {
            release_device.destroy_pipeline_layout(layout, None);
        });

        let vertex_module = create_shader_module(device, vertex_shader)?;
        let fragment_module = match create_shader_module(device, fragment_shader) {
            Ok(module) => module,
            Err(e) => {
                device.destroy_shader_module(vertex_module, None);
                return Err(e);
            }
        };

        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(shader_stage_to_vk(vertex_shader.stage))
                .module(vertex_module)
                .name(SHADER_ENTRY_POINT),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(shader_stage_to_vk(fragment_shader.stage))
                .module(fragment_module)
                .name(SHADER_ENTRY_POINT),
        ];

        let (vertex_bindings, vertex_attributes) = vertex_layout_to_vk(&Vertex::layout());
        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        let viewports = [vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }];
        let scissors = [vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        }];
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(&viewports)
            .scissors(&scissors);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::BACK)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(true)
            .depth_write_enable(true)
            .depth_compare_op(vk::CompareOp::LESS)
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(false)];
        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .depth_stencil_state(&depth_stencil_state)
            .color_blend_state(&color_blend_state)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(0);

        let result = device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None);

        device.destroy_shader_module(vertex_module, None);
        device.destroy_shader_module(fragment_module, None);

        let pipeline = result
            .map_err(|(_, e)| {
                engine_error!("morph::vulkan", "Failed to create graphics pipeline: {:?}", e);
                Error::InitializationFailed(format!("Failed to create graphics pipeline: {:?}", e))
            })?
            .into_iter()
            .next()
            .ok_or_else(|| {
                engine_error!("morph::vulkan", "Driver returned no pipeline");
                Error::InitializationFailed("Driver returned no pipeline".to_string())
            })?;

        let release_device = device.clone();
        teardown.push(ResourceKind::Pipeline, "pipeline", move || {
            release_device.destroy_pipeline(pipeline, None);
        });

        engine_debug!("morph::vulkan", "Graphics pipeline created ({}x{})", extent.width, extent.height);
        Ok(GraphicsPipeline { layout, pipeline })
    }
}
