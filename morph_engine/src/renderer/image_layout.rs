/// Image layouts, layout transition barriers and depth format selection

use bitflags::bitflags;
use crate::error::{Error, Result};

/// Image layouts used by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    /// Contents undefined (initial state of every new image)
    Undefined,
    /// Destination of a transfer (buffer → image copy)
    TransferDstOptimal,
    /// Sampled by a shader
    ShaderReadOnlyOptimal,
    /// Bound as the depth/stencil attachment
    DepthStencilAttachmentOptimal,
    /// Handed to the presentation engine
    PresentSrc,
}

bitflags! {
    /// Memory access scopes of a barrier
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessMask: u32 {
        const TRANSFER_WRITE = 1 << 0;
        const SHADER_READ = 1 << 1;
        const DEPTH_STENCIL_ATTACHMENT_READ = 1 << 2;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 1 << 3;
        const COLOR_ATTACHMENT_READ = 1 << 4;
        const COLOR_ATTACHMENT_WRITE = 1 << 5;
    }
}

bitflags! {
    /// Pipeline stages a barrier synchronizes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStages: u32 {
        const TOP_OF_PIPE = 1 << 0;
        const TRANSFER = 1 << 1;
        const FRAGMENT_SHADER = 1 << 2;
        const EARLY_FRAGMENT_TESTS = 1 << 3;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 4;
    }
}

bitflags! {
    /// Image aspects covered by a barrier or a view
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageAspects: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Everything a backend needs to record one image memory barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionBarrier {
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
    pub src_access: AccessMask,
    pub dst_access: AccessMask,
    pub src_stage: PipelineStages,
    pub dst_stage: PipelineStages,
    pub aspect: ImageAspects,
}

impl TransitionBarrier {
    /// Build the barrier for `old → new`
    ///
    /// Only three transitions are known: staging a texture, publishing it to the
    /// fragment shader, and preparing the depth attachment. Anything else fails with
    /// `Error::UnsupportedLayoutTransition`.
    ///
    /// # Arguments
    ///
    /// * `has_stencil` - Whether the image format carries a stencil component
    ///   (only consulted for depth targets)
    pub fn new(old: ImageLayout, new: ImageLayout, has_stencil: bool) -> Result<Self> {
        use ImageLayout::*;

        let (src_access, dst_access, src_stage, dst_stage) = match (old, new) {
            (Undefined, TransferDstOptimal) => (
                AccessMask::empty(),
                AccessMask::TRANSFER_WRITE,
                PipelineStages::TOP_OF_PIPE,
                PipelineStages::TRANSFER,
            ),
            (TransferDstOptimal, ShaderReadOnlyOptimal) => (
                AccessMask::TRANSFER_WRITE,
                AccessMask::SHADER_READ,
                PipelineStages::TRANSFER,
                PipelineStages::FRAGMENT_SHADER,
            ),
            (Undefined, DepthStencilAttachmentOptimal) => (
                AccessMask::empty(),
                AccessMask::DEPTH_STENCIL_ATTACHMENT_READ | AccessMask::DEPTH_STENCIL_ATTACHMENT_WRITE,
                PipelineStages::TOP_OF_PIPE,
                PipelineStages::EARLY_FRAGMENT_TESTS,
            ),
            _ => {
                crate::engine_error!("morph::layout", "Unsupported layout transition {:?} -> {:?}", old, new);
                return Err(Error::UnsupportedLayoutTransition { from: old, to: new });
            }
        };

        let aspect = if new == DepthStencilAttachmentOptimal {
            if has_stencil {
                ImageAspects::DEPTH | ImageAspects::STENCIL
            } else {
                ImageAspects::DEPTH
            }
        } else {
            ImageAspects::COLOR
        };

        Ok(Self {
            old_layout: old,
            new_layout: new,
            src_access,
            dst_access,
            src_stage,
            dst_stage,
            aspect,
        })
    }
}

// ============================================================================
// Depth format selection
// ============================================================================

/// Depth formats the viewer can render with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum DepthFormat {
    D32_SFLOAT,
    D32_SFLOAT_S8_UINT,
    D24_UNORM_S8_UINT,
}

impl DepthFormat {
    /// Candidates in order of preference
    pub const CANDIDATES: [DepthFormat; 3] = [
        DepthFormat::D32_SFLOAT,
        DepthFormat::D32_SFLOAT_S8_UINT,
        DepthFormat::D24_UNORM_S8_UINT,
    ];

    pub fn has_stencil(&self) -> bool {
        matches!(self, DepthFormat::D32_SFLOAT_S8_UINT | DepthFormat::D24_UNORM_S8_UINT)
    }

    /// Aspects of a view over the whole depth image
    ///
    /// Sampling views only cover depth, even for combined formats.
    pub fn view_aspect(&self) -> ImageAspects {
        ImageAspects::DEPTH
    }
}

/// Pick the first candidate the device supports as an optimally tiled
/// depth/stencil attachment
///
/// # Arguments
///
/// * `supports_attachment` - Returns true when optimal tiling of the format has the
///   DEPTH_STENCIL_ATTACHMENT feature
pub fn find_depth_format<F>(supports_attachment: F) -> Result<DepthFormat>
where
    F: Fn(DepthFormat) -> bool,
{
    DepthFormat::CANDIDATES
        .into_iter()
        .find(|&format| supports_attachment(format))
        .ok_or_else(|| {
            crate::engine_error!("morph::layout", "No supported depth format among {:?}", DepthFormat::CANDIDATES);
            Error::NotFound("could not find supported depth format".to_string())
        })
}

#[cfg(test)]
#[path = "image_layout_tests.rs"]
mod tests;
