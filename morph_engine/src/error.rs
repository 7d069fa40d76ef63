//! Error types for the morph engine
//!
//! Every failure in this program is fatal: setup errors, missing capabilities,
//! unsupported layout transitions and frame loop errors all bubble up to the binary,
//! which logs them and exits with status 1.

use std::fmt;

use crate::renderer::ImageLayout;

/// Result type for morph engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Morph engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (unexpected Vulkan result code, lock poisoning, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (empty buffer, malformed shader, out-of-range image index, etc.)
    InvalidResource(String),

    /// Initialization failed (instance, device, swapchain, pipeline)
    InitializationFailed(String),

    /// A required file or capability does not exist
    /// (asset file, GPU, queue family, surface format, depth format)
    NotFound(String),

    /// Image layout transition pair outside the known set
    UnsupportedLayoutTransition {
        from: ImageLayout,
        to: ImageLayout,
    },

    /// No Vulkan ICD compatible with the requested instance
    IncompatibleDriver,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::UnsupportedLayoutTransition { from, to } => {
                write!(f, "Unsupported layout transition: {:?} -> {:?}", from, to)
            }
            Error::IncompatibleDriver => write!(f, "cant find a compatible vulkan ICD"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
