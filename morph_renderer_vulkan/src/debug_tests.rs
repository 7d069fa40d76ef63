//! Unit tests for debug.rs

use super::*;

// ============================================================================
// Threshold
// ============================================================================

#[test]
fn test_default_threshold_keeps_warnings_and_errors() {
    let threshold = DebugSeverity::default();
    assert!(passes_threshold(threshold, vk::DebugUtilsMessageSeverityFlagsEXT::ERROR));
    assert!(passes_threshold(threshold, vk::DebugUtilsMessageSeverityFlagsEXT::WARNING));
    assert!(!passes_threshold(threshold, vk::DebugUtilsMessageSeverityFlagsEXT::INFO));
    assert!(!passes_threshold(threshold, vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
}

#[test]
fn test_errors_only_drops_warnings() {
    assert!(passes_threshold(DebugSeverity::ErrorsOnly, vk::DebugUtilsMessageSeverityFlagsEXT::ERROR));
    assert!(!passes_threshold(DebugSeverity::ErrorsOnly, vk::DebugUtilsMessageSeverityFlagsEXT::WARNING));
}

#[test]
fn test_all_keeps_verbose() {
    assert!(passes_threshold(DebugSeverity::All, vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
}

#[test]
fn test_all_severities_are_requested() {
    let requested = requested_severities();
    assert!(requested.contains(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE));
    assert!(requested.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR));
}

// ============================================================================
// Severity mapping
// ============================================================================

#[test]
fn test_log_severity_mapping() {
    assert_eq!(log_severity(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR), LogSeverity::Error);
    assert_eq!(log_severity(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING), LogSeverity::Warn);
    assert_eq!(log_severity(vk::DebugUtilsMessageSeverityFlagsEXT::INFO), LogSeverity::Info);
    assert_eq!(log_severity(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE), LogSeverity::Trace);
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn test_message_tracker_counts_repeats() {
    let mut tracker = MessageTracker::default();
    assert_eq!(tracker.track_message("a"), 1);
    assert_eq!(tracker.track_message("a"), 2);
    assert_eq!(tracker.track_message("b"), 1);
    assert_eq!(tracker.repeated(), 1);
}

#[test]
fn test_stats_total() {
    let stats = ValidationStats { errors: 1, warnings: 2, info: 3, verbose: 4 };
    assert_eq!(stats.total(), 10);
}
