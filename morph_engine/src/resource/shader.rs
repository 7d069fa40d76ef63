/// SPIR-V shader code loading

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// First word of every SPIR-V module
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Pipeline stage a module is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Validated SPIR-V words, ready for shader module creation
///
/// The entry point is always `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderCode {
    pub stage: ShaderStage,
    pub words: Vec<u32>,
}

impl ShaderCode {
    pub const ENTRY_POINT: &'static str = "main";

    /// Read and validate a SPIR-V file
    ///
    /// # Errors
    ///
    /// `Error::NotFound` if the file does not exist, `Error::InvalidResource` if its
    /// contents are not SPIR-V.
    pub fn load<P: AsRef<Path>>(path: P, stage: ShaderStage) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            crate::engine_error!("morph::shader", "Failed to read {}: {}", path.display(), e);
            if e.kind() == io::ErrorKind::NotFound {
                Error::NotFound(format!("shader file {}", path.display()))
            } else {
                Error::BackendError(format!("cannot read {}: {}", path.display(), e))
            }
        })?;

        let code = Self::from_bytes(&bytes, stage)?;
        crate::engine_debug!(
            "morph::shader",
            "Loaded {:?} shader {} ({} words)",
            stage, path.display(), code.words.len()
        );
        Ok(code)
    }

    /// Validate raw bytes as little-endian SPIR-V
    pub fn from_bytes(bytes: &[u8], stage: ShaderStage) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidResource("shader code is empty".to_string()));
        }
        if bytes.len() % 4 != 0 {
            return Err(Error::InvalidResource(format!(
                "shader code length {} is not a multiple of 4", bytes.len()
            )));
        }

        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        if words[0] != SPIRV_MAGIC {
            return Err(Error::InvalidResource(format!(
                "bad SPIR-V magic number {:#010x}", words[0]
            )));
        }

        Ok(Self { stage, words })
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
