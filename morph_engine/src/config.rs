/// Application configuration

use std::path::PathBuf;
use crate::log::LogSeverity;

/// Validation layer message filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    /// Only errors
    ErrorsOnly,
    /// Errors and warnings
    ErrorsAndWarnings,
    /// Everything, including info and verbose messages
    All,
}

impl Default for DebugSeverity {
    fn default() -> Self {
        DebugSeverity::ErrorsAndWarnings
    }
}

/// Window settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Swapchain recreation is not supported, so this stays false
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "morph".to_string(),
            width: 800,
            height: 600,
            resizable: false,
        }
    }
}

/// Values exported to the Vulkan loader before the first API call
///
/// Defaults come from the build environment (`MORPH_VK_ICD_FILENAMES`,
/// `MORPH_VK_LAYER_PATH`) so a build can be pinned to a local SDK.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoaderEnvironment {
    /// Value for `VK_ICD_FILENAMES`
    pub icd_filenames: Option<String>,
    /// Value for `VK_LAYER_PATH`
    pub layer_path: Option<String>,
}

impl LoaderEnvironment {
    /// Loader values captured at build time
    pub fn from_build_env() -> Self {
        Self {
            icd_filenames: option_env!("MORPH_VK_ICD_FILENAMES").map(str::to_string),
            layer_path: option_env!("MORPH_VK_LAYER_PATH").map(str::to_string),
        }
    }
}

/// Top-level configuration consumed by the engine, the backend and the binary
#[derive(Debug, Clone)]
pub struct Config {
    /// Application name reported to the driver
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    pub window: WindowConfig,
    /// Enable VK_LAYER_KHRONOS_validation and the debug messenger
    pub enable_validation: bool,
    pub debug_severity: DebugSeverity,
    pub vertex_shader_path: PathBuf,
    pub fragment_shader_path: PathBuf,
    pub texture_path: PathBuf,
    /// Minimum severity printed by the default logger
    pub log_severity: LogSeverity,
    pub loader: LoaderEnvironment,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "my_vulkan_app".to_string(),
            app_version: (1, 0, 0),
            window: WindowConfig::default(),
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::default(),
            vertex_shader_path: PathBuf::from("../shaders/vert.spv"),
            fragment_shader_path: PathBuf::from("../shaders/frag.spv"),
            texture_path: PathBuf::from("../textures/sample_tex.jpg"),
            log_severity: if cfg!(debug_assertions) { LogSeverity::Debug } else { LogSeverity::Info },
            loader: LoaderEnvironment::from_build_env(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
