/// Texture decoding (RGBA8)

use std::path::Path;

use crate::error::{Error, Result};

/// Decoded texture pixels, 4 bytes per pixel, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Decode an image file and convert it to RGBA8
    ///
    /// # Errors
    ///
    /// `Error::NotFound` if the file does not exist, `Error::InvalidResource` if it
    /// cannot be decoded or has no pixels.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            crate::engine_error!("morph::texture", "Texture file {} does not exist", path.display());
            return Err(Error::NotFound(format!("texture file {}", path.display())));
        }

        let image = image::open(path).map_err(|e| {
            crate::engine_error!("morph::texture", "Failed to decode {}: {}", path.display(), e);
            Error::InvalidResource(format!("cannot decode {}: {}", path.display(), e))
        })?;

        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        let texture = Self::from_rgba8(width, height, rgba.into_raw())?;

        crate::engine_debug!("morph::texture", "Loaded texture {} ({}x{})", path.display(), width, height);
        Ok(texture)
    }

    /// Wrap already-decoded RGBA8 pixels
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidResource("texture has no pixels".to_string()));
        }
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(Error::InvalidResource(format!(
                "{} bytes for a {}x{} RGBA8 texture", pixels.len(), width, height
            )));
        }
        Ok(Self { width, height, pixels })
    }

    /// Size in bytes of the pixel data
    pub fn byte_size(&self) -> u64 {
        self.pixels.len() as u64
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
