/// Reverse-order release of GPU objects
///
/// Every GPU object is registered on a `TeardownStack` right after it is created.
/// Releasing pops the stack, so objects are destroyed in exact reverse creation
/// order: children before the parents they were created from.

use std::fmt;

/// Category of a released object, used for logging and ordering checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Instance,
    DebugMessenger,
    Surface,
    Device,
    Allocator,
    Swapchain,
    ImageView,
    RenderPass,
    DescriptorSetLayout,
    PipelineLayout,
    Pipeline,
    CommandPool,
    Image,
    Sampler,
    Framebuffer,
    Buffer,
    DescriptorPool,
    Semaphore,
    Fence,
}

struct TeardownEntry {
    kind: ResourceKind,
    label: String,
    release: Box<dyn FnOnce()>,
}

/// LIFO of release actions
///
/// Dropping the stack releases whatever is left.
#[derive(Default)]
pub struct TeardownStack {
    entries: Vec<TeardownEntry>,
}

impl TeardownStack {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register the release of an object that was just created
    pub fn push<F>(&mut self, kind: ResourceKind, label: impl Into<String>, release: F)
    where
        F: FnOnce() + 'static,
    {
        let label = label.into();
        crate::engine_trace!("morph::teardown", "+ {:?} '{}'", kind, label);
        self.entries.push(TeardownEntry {
            kind,
            label,
            release: Box::new(release),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered kinds, in creation order
    pub fn kinds(&self) -> Vec<ResourceKind> {
        self.entries.iter().map(|e| e.kind).collect()
    }

    /// Release everything, newest first
    ///
    /// # Returns
    ///
    /// The number of objects released (0 on every call after the first)
    pub fn release_all(&mut self) -> usize {
        let count = self.entries.len();
        while let Some(entry) = self.entries.pop() {
            crate::engine_trace!("morph::teardown", "- {:?} '{}'", entry.kind, entry.label);
            (entry.release)();
        }
        count
    }
}

impl fmt::Debug for TeardownStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.kind, e.label.as_str())))
            .finish()
    }
}

impl Drop for TeardownStack {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
#[path = "teardown_tests.rs"]
mod tests;
