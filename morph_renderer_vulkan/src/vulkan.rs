/// VulkanRenderer - owns every GPU object of the viewer
///
/// Construction runs the whole setup sequence. Each object is pushed on the
/// renderer's `TeardownStack` right after it is created, so a failure at any step
/// releases what already exists and a normal drop releases everything in reverse.

use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use morph_engine::morph::{Config, Error, Result};
use morph_engine::morph::render::{
    find_depth_format, select_device, upload_buffer, upload_texture, BufferUsage, Extent2D,
    FrameLoop, FrameReport, ResourceKind, TeardownStack,
};
use morph_engine::morph::resource::{
    ShaderCode, ShaderStage, TextureData, UniformBufferObject, INDICES, VERTICES,
};
use morph_engine::{engine_debug, engine_err, engine_error, engine_info};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::{CStr, CString};
use std::sync::{Arc, Mutex};

use crate::vulkan_buffer::{MappedBuffer, Uploader};
use crate::vulkan_context::GpuContext;
use crate::vulkan_descriptor_set::{create_descriptor_pool, create_descriptor_sets};
use crate::vulkan_device::{create_logical_device, supports_depth_attachment, VulkanCapabilityQuery};
use crate::vulkan_format::depth_format_to_vk;
use crate::vulkan_frame::{
    create_command_pool, create_framebuffers, create_sync_objects, record_command_buffers,
    DrawBindings, FrameResources,
};
use crate::vulkan_pipeline::{create_descriptor_set_layout, create_graphics_pipeline, create_render_pass};
use crate::vulkan_swapchain::Swapchain;
use crate::vulkan_texture::{create_depth_target, create_sampler, create_texture_view};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Whether validation is compiled in and requested
fn validation_enabled(config: &Config) -> bool {
    cfg!(feature = "vulkan-validation") && config.enable_validation
}

/// Vulkan renderer for the two-quad scene
pub struct VulkanRenderer {
    frames: FrameLoop,
    driver: FrameResources,
    ubo: UniformBufferObject,
    extent: Extent2D,
    teardown: TeardownStack,
    /// Kept alive for the allocator and the teardown closures
    _ctx: Arc<GpuContext>,
    /// Must outlive the instance
    _entry: ash::Entry,
}

impl VulkanRenderer {
    /// Create every GPU object needed to draw the scene into `window`
    ///
    /// # Arguments
    ///
    /// * `window` - Window providing display and window handles
    /// * `window_extent` - Current inner size of the window in pixels
    /// * `config` - Application, validation and asset settings
    ///
    /// # Errors
    ///
    /// `Error::IncompatibleDriver` when no ICD accepts the instance, `NotFound` for a
    /// missing asset or capability, `InitializationFailed` for any failing API call.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        window_extent: Extent2D,
        config: &Config,
    ) -> Result<Self> {
        let entry = unsafe { ash::Entry::load() }.map_err(|e| {
            engine_error!("morph::vulkan", "Failed to load Vulkan library: {:?}", e);
            Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
        })?;

        // Declared after `entry` so a failed setup releases before the loader unloads
        let mut teardown = TeardownStack::new();
        let validation = validation_enabled(config);

        // ===== INSTANCE =====
        log_instance_support(&entry);

        let display_handle = window.display_handle().map_err(|e| {
            engine_error!("morph::vulkan", "Failed to get display handle: {}", e);
            Error::InitializationFailed(format!("Failed to get display handle: {}", e))
        })?;
        let window_handle = window.window_handle().map_err(|e| {
            engine_error!("morph::vulkan", "Failed to get window handle: {}", e);
            Error::InitializationFailed(format!("Failed to get window handle: {}", e))
        })?;

        let instance = create_instance(&entry, display_handle.as_raw(), config, validation)?;
        let release_instance = instance.clone();
        teardown.push(ResourceKind::Instance, "instance", move || unsafe {
            release_instance.destroy_instance(None);
        });

        // ===== DEBUG MESSENGER =====
        if validation {
            create_debug_messenger(&entry, &instance, config, &mut teardown)?;
        }

        // ===== SURFACE =====
        let surface = unsafe {
            ash_window::create_surface(&entry, &instance, display_handle.as_raw(), window_handle.as_raw(), None)
        }
        .map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create surface: {:?}", e);
            Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
        })?;
        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
        let release_surface_loader = surface_loader.clone();
        teardown.push(ResourceKind::Surface, "surface", move || unsafe {
            release_surface_loader.destroy_surface(surface, None);
        });

        // ===== DEVICE =====
        let selection = select_device(&VulkanCapabilityQuery {
            instance: &instance,
            surface_loader: &surface_loader,
            surface,
        })?;
        let physical_device = selection.device;
        engine_info!(
            "morph::vulkan",
            "Using '{}' (queue family {}, score {})",
            selection.name, selection.queue_family_index, selection.score
        );

        let (device, queue) = create_logical_device(&instance, physical_device, selection.queue_family_index)?;
        let release_device = device.clone();
        teardown.push(ResourceKind::Device, "device", move || unsafe {
            release_device.destroy_device(None);
        });

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create GPU allocator: {:?}", e);
            Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
        })?;
        let allocator = Arc::new(Mutex::new(Some(allocator)));
        let release_allocator = Arc::clone(&allocator);
        teardown.push(ResourceKind::Allocator, "allocator", move || {
            if let Ok(mut guard) = release_allocator.lock() {
                drop(guard.take());
            }
        });

        // ===== SWAPCHAIN =====
        let swapchain = Swapchain::new(
            &instance,
            &device,
            physical_device,
            &surface_loader,
            surface,
            window_extent,
            &mut teardown,
        )?;
        let extent = swapchain.plan.extent;

        // ===== PIPELINE =====
        let depth_format = find_depth_format(|format| {
            supports_depth_attachment(&instance, physical_device, depth_format_to_vk(format))
        })?;
        let render_pass = create_render_pass(&device, swapchain.format, depth_format_to_vk(depth_format), &mut teardown)?;
        let set_layout = create_descriptor_set_layout(&device, &mut teardown)?;

        let vertex_shader = ShaderCode::load(&config.vertex_shader_path, ShaderStage::Vertex)?;
        let fragment_shader = ShaderCode::load(&config.fragment_shader_path, ShaderStage::Fragment)?;
        let pipeline = create_graphics_pipeline(
            &device,
            render_pass,
            set_layout,
            swapchain.extent,
            &vertex_shader,
            &fragment_shader,
            &mut teardown,
        )?;

        let command_pool = create_command_pool(&device, selection.queue_family_index, &mut teardown)?;
        let ctx = GpuContext::new(device.clone(), allocator, queue, command_pool);

        // ===== TEXTURE =====
        let texture = TextureData::load(&config.texture_path)?;
        let texture_image = upload_texture(&mut Uploader::new(&ctx, &mut teardown, "texture image"), &texture)?;
        let texture_view = create_texture_view(&device, texture_image, &mut teardown)?;
        let sampler = create_sampler(&device, &mut teardown)?;

        // ===== DEPTH / FRAMEBUFFERS =====
        let depth_view = create_depth_target(&ctx, depth_format, swapchain.extent, &mut teardown)?;
        let framebuffers = create_framebuffers(
            &device,
            render_pass,
            &swapchain.image_views,
            depth_view,
            swapchain.extent,
            &mut teardown,
        )?;

        // ===== GEOMETRY / UNIFORMS =====
        let vertex_buffer = upload_buffer(
            &mut Uploader::new(&ctx, &mut teardown, "vertex buffer"),
            bytemuck::cast_slice(&VERTICES),
            BufferUsage::VERTEX,
        )?;
        let index_buffer = upload_buffer(
            &mut Uploader::new(&ctx, &mut teardown, "index buffer"),
            bytemuck::cast_slice(&INDICES),
            BufferUsage::INDEX,
        )?;

        let ubo_size = std::mem::size_of::<UniformBufferObject>() as u64;
        let uniform_buffers = (0..swapchain.image_count())
            .map(|i| MappedBuffer::new_uniform(&ctx, format!("uniform buffer {}", i), ubo_size, &mut teardown))
            .collect::<Result<Vec<_>>>()?;

        // ===== DESCRIPTORS / COMMANDS =====
        let descriptor_pool = create_descriptor_pool(&device, swapchain.image_count(), &mut teardown)?;
        let descriptor_sets = create_descriptor_sets(
            &device,
            descriptor_pool,
            set_layout,
            &uniform_buffers,
            texture_view,
            sampler,
        )?;

        let command_buffers = record_command_buffers(&device, command_pool, &DrawBindings {
            render_pass,
            pipeline: pipeline.pipeline,
            pipeline_layout: pipeline.layout,
            vertex_buffer: vertex_buffer.buffer,
            index_buffer: index_buffer.buffer,
            descriptor_sets: &descriptor_sets,
            framebuffers: &framebuffers,
            extent: swapchain.extent,
        })?;

        let sync = create_sync_objects(&device, &mut teardown)?;

        let frames = FrameLoop::new(swapchain.image_count())?;
        engine_info!(
            "morph::vulkan",
            "Renderer ready: {} swapchain images, {}x{}, {} objects",
            swapchain.image_count(), extent.width, extent.height, teardown.len()
        );

        Ok(Self {
            frames,
            driver: FrameResources {
                device,
                queue,
                swapchain_loader: swapchain.loader,
                swapchain: swapchain.handle,
                command_buffers,
                uniform_buffers,
                sync,
            },
            ubo: UniformBufferObject::new(extent),
            extent,
            teardown,
            _ctx: ctx,
            _entry: entry,
        })
    }

    /// Draw one frame
    pub fn draw_frame(&mut self) -> Result<FrameReport> {
        self.frames.draw_frame(&mut self.driver, &self.ubo)
    }

    /// Wait until the GPU is idle; call before dropping the window
    pub fn finish(&mut self) -> Result<()> {
        self.frames.finish(&mut self.driver)
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames.frames_presented()
    }

    pub fn image_count(&self) -> u32 {
        self.frames.image_count()
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    /// Kinds of the live GPU objects, in creation order
    pub fn resource_kinds(&self) -> Vec<ResourceKind> {
        self.teardown.kinds()
    }
}

impl Drop for VulkanRenderer {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.driver.device.device_wait_idle() {
                engine_error!("morph::vulkan", "device_wait_idle failed during teardown: {:?}", e);
            }
        }
        let released = self.teardown.release_all();
        engine_debug!("morph::vulkan", "Released {} GPU objects", released);
    }
}

/// Log the instance extensions and layers the loader offers
fn log_instance_support(entry: &ash::Entry) {
    unsafe {
        match entry.enumerate_instance_extension_properties(None) {
            Ok(extensions) => {
                engine_debug!("morph::vulkan", "{} instance extensions", extensions.len());
                for ext in &extensions {
                    let name = CStr::from_ptr(ext.extension_name.as_ptr()).to_string_lossy();
                    engine_debug!("morph::vulkan", "  {}", name);
                }
            }
            Err(e) => engine_debug!("morph::vulkan", "Could not enumerate instance extensions: {:?}", e),
        }
        match entry.enumerate_instance_layer_properties() {
            Ok(layers) => {
                engine_debug!("morph::vulkan", "{} instance layers", layers.len());
                for layer in &layers {
                    let name = CStr::from_ptr(layer.layer_name.as_ptr()).to_string_lossy();
                    engine_debug!("morph::vulkan", "  {}", name);
                }
            }
            Err(e) => engine_debug!("morph::vulkan", "Could not enumerate instance layers: {:?}", e),
        }
    }
}

fn create_instance(
    entry: &ash::Entry,
    display_handle: raw_window_handle::RawDisplayHandle,
    config: &Config,
    validation: bool,
) -> Result<ash::Instance> {
    let app_name = CString::new(config.app_name.as_str())
        .map_err(|_| engine_err!("morph::vulkan", "Application name contains a NUL byte"))?;
    let (major, minor, patch) = config.app_version;

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, major, minor, patch))
        .engine_name(&app_name)
        .engine_version(vk::make_api_version(0, major, minor, patch))
        .api_version(vk::API_VERSION_1_0);

    let mut extension_names = ash_window::enumerate_required_extensions(display_handle)
        .map_err(|e| {
            engine_error!("morph::vulkan", "Failed to get required extensions: {}", e);
            Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
        })?
        .to_vec();
    if validation {
        extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
    }

    let layer_names = if validation {
        vec![VALIDATION_LAYER.as_ptr()]
    } else {
        vec![]
    };

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_layer_names(&layer_names)
        .enabled_extension_names(&extension_names);

    unsafe {
        entry.create_instance(&create_info, None).map_err(|e| match e {
            vk::Result::ERROR_INCOMPATIBLE_DRIVER => {
                engine_error!("morph::vulkan", "cant find a compatible vulkan ICD");
                Error::IncompatibleDriver
            }
            other => {
                engine_error!("morph::vulkan", "Failed to create Vulkan instance: {:?}", other);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", other))
            }
        })
    }
}

fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
    config: &Config,
    teardown: &mut TeardownStack,
) -> Result<()> {
    crate::debug::init_debug_config(crate::debug::Config {
        severity: config.debug_severity,
    });

    let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(crate::debug::requested_severities())
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

    let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);
    unsafe {
        let messenger = debug_utils.create_debug_utils_messenger(&debug_info, None).map_err(|e| {
            engine_error!("morph::vulkan", "Failed to create debug messenger: {:?}", e);
            Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
        })?;
        teardown.push(ResourceKind::DebugMessenger, "debug messenger", move || {
            debug_utils.destroy_debug_utils_messenger(messenger, None);
        });
    }
    Ok(())
}
