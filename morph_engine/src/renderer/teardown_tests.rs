//! Unit tests for teardown.rs

use crate::renderer::mock_driver::TeardownRecorder;
use crate::renderer::teardown::{ResourceKind, TeardownStack};

#[test]
fn test_release_all_runs_in_reverse_order() {
    let recorder = TeardownRecorder::new();
    let mut stack = TeardownStack::new();

    recorder.register(&mut stack, ResourceKind::Instance, "instance");
    recorder.register(&mut stack, ResourceKind::Device, "device");
    recorder.register(&mut stack, ResourceKind::Swapchain, "swapchain");

    assert_eq!(stack.len(), 3);
    assert_eq!(stack.release_all(), 3);
    assert_eq!(recorder.released(), vec!["swapchain", "device", "instance"]);
    assert!(stack.is_empty());
}

#[test]
fn test_release_all_is_idempotent() {
    let recorder = TeardownRecorder::new();
    let mut stack = TeardownStack::new();
    recorder.register(&mut stack, ResourceKind::Fence, "fence");

    assert_eq!(stack.release_all(), 1);
    assert_eq!(stack.release_all(), 0);
    assert_eq!(recorder.released(), vec!["fence"]);
}

#[test]
fn test_drop_releases_remaining_entries() {
    let recorder = TeardownRecorder::new();
    {
        let mut stack = TeardownStack::new();
        recorder.register(&mut stack, ResourceKind::Buffer, "vertex buffer");
        recorder.register(&mut stack, ResourceKind::Buffer, "index buffer");
    }
    assert_eq!(recorder.released(), vec!["index buffer", "vertex buffer"]);
}

#[test]
fn test_entries_pushed_after_release_are_released_later() {
    let recorder = TeardownRecorder::new();
    let mut stack = TeardownStack::new();
    recorder.register(&mut stack, ResourceKind::Semaphore, "a");
    stack.release_all();
    recorder.register(&mut stack, ResourceKind::Semaphore, "b");
    drop(stack);
    assert_eq!(recorder.released(), vec!["a", "b"]);
}

#[test]
fn test_kinds_are_reported_in_creation_order() {
    let mut stack = TeardownStack::new();
    stack.push(ResourceKind::Instance, "instance", || {});
    stack.push(ResourceKind::Surface, "surface", || {});
    assert_eq!(stack.kinds(), vec![ResourceKind::Instance, ResourceKind::Surface]);
    assert!(format!("{:?}", stack).contains("Surface"));
}
