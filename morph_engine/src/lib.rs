/*!
# Morph Engine

Core types and lifecycle logic for the morph viewer.

This crate holds everything about drawing the two-quad demo that does not touch a GPU
API directly. The Vulkan backend (`morph_renderer_vulkan`) plugs into the seams defined
here and the demo binary wires the two together.

## Architecture

- **CapabilityQuery**: physical device enumeration and scored selection
- **SwapchainPlan**: surface format, present mode, extent and image count policy
- **UploadDevice**: staging-buffer upload and image layout transitions
- **FrameDriver**: the per-frame wait / acquire / submit / present state machine
- **TeardownStack**: reverse-order release of every GPU object
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod renderer;
pub mod resource;

// Main morph namespace module
pub mod morph {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Application configuration
    pub use crate::config::{Config, WindowConfig, LoaderEnvironment, DebugSeverity};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are exported at the crate root
    }

    // Render sub-module with lifecycle types
    pub mod render {
        pub use crate::renderer::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }
}

// Re-export math library at crate root
pub use glam;
