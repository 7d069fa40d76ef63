/// Vulkan Debug Messenger - Forwards validation layer messages to the engine logger
///
/// Messages below the configured threshold are dropped. Everything that passes is
/// counted, grouped by text, and logged as `validation layer: <message>`.

use ash::vk;
use colored::*;
use morph_engine::morph::{DebugSeverity, Engine};
use morph_engine::morph::log::LogSeverity;
use rustc_hash::FxHashMap;
use std::ffi::CStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Global debug configuration (shared across callbacks)
static DEBUG_CONFIG: Mutex<Option<Config>> = Mutex::new(None);

/// Global validation statistics
static VALIDATION_STATS: ValidationStatsTracker = ValidationStatsTracker::new();

/// Global message tracker for grouping identical messages
static MESSAGE_TRACKER: Mutex<Option<MessageTracker>> = Mutex::new(None);

/// Debug configuration for the callback
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub severity: DebugSeverity,
}

/// Counters of forwarded validation messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

struct ValidationStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

impl ValidationStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
        }
    }

    fn counter(&self, severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> &AtomicU32 {
        if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
            &self.errors
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
            &self.warnings
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
            &self.info
        } else {
            &self.verbose
        }
    }

    fn get_stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.verbose.store(0, Ordering::Relaxed);
    }
}

#[derive(Default)]
struct MessageTracker {
    messages: FxHashMap<String, u32>,
}

impl MessageTracker {
    fn track_message(&mut self, message: &str) -> u32 {
        let count = self.messages.entry(message.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    fn repeated(&self) -> usize {
        self.messages.values().filter(|&&count| count > 1).count()
    }
}

/// Install the callback configuration and reset the counters
pub fn init_debug_config(config: Config) {
    VALIDATION_STATS.reset();

    if let Ok(mut tracker) = MESSAGE_TRACKER.lock() {
        *tracker = Some(MessageTracker::default());
    }
    if let Ok(mut current) = DEBUG_CONFIG.lock() {
        *current = Some(config);
    }
}

pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS.get_stats()
}

/// Severities requested from the messenger
///
/// All of them are requested; the callback applies the threshold.
pub fn requested_severities() -> vk::DebugUtilsMessageSeverityFlagsEXT {
    vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
}

/// Whether a message of `severity` passes `threshold`
pub fn passes_threshold(threshold: DebugSeverity, severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> bool {
    match threshold {
        DebugSeverity::ErrorsOnly => severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR),
        DebugSeverity::ErrorsAndWarnings => {
            severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR)
                || severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING)
        }
        DebugSeverity::All => true,
    }
}

/// Engine log severity used for a validation message
pub fn log_severity(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> LogSeverity {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        LogSeverity::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        LogSeverity::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        LogSeverity::Info
    } else {
        LogSeverity::Trace
    }
}

/// Print a summary of forwarded validation messages
pub fn print_validation_stats_report() {
    let stats = get_validation_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No validation messages".green().bold());
        return;
    }

    println!("\n{}", "=== Validation Statistics Report ===".bright_blue().bold());

    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    if stats.verbose > 0 {
        println!("  {} {}", "Verbose:".bright_black(), stats.verbose);
    }
    println!("  {} {}", "Total:".white().bold(), stats.total());

    if let Ok(guard) = MESSAGE_TRACKER.lock() {
        let repeated = guard.as_ref().map(MessageTracker::repeated).unwrap_or(0);
        if repeated > 0 {
            println!("\n  {} {} message(s) appeared multiple times", "ℹ".cyan(), repeated);
        }
    }

    println!("{}\n", "====================================".bright_blue().bold());
}

/// Vulkan debug messenger callback
///
/// Always returns `vk::FALSE`: the triggering call is never aborted.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    let threshold = match DEBUG_CONFIG.lock() {
        Ok(guard) => match *guard {
            Some(config) => config.severity,
            None => return vk::FALSE,
        },
        Err(_) => return vk::FALSE,
    };

    if !passes_threshold(threshold, message_severity) || p_callback_data.is_null() {
        return vk::FALSE;
    }

    let callback_data = *p_callback_data;
    let message = if callback_data.p_message.is_null() {
        "No message".into()
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    VALIDATION_STATS.counter(message_severity).fetch_add(1, Ordering::Relaxed);

    let occurrence = match MESSAGE_TRACKER.lock() {
        Ok(mut guard) => guard.get_or_insert_with(MessageTracker::default).track_message(&message),
        Err(_) => 1,
    };

    let repeat = if occurrence > 1 { format!(" [×{}]", occurrence) } else { String::new() };
    Engine::log(
        log_severity(message_severity),
        "morph::validation",
        format!("validation layer: {}{}", message, repeat),
    );

    vk::FALSE
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
