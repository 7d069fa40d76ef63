/// Morph Engine - process-wide services
///
/// This module owns the global logger and the Vulkan loader environment. Both must
/// be in place before the first graphics API call, so `Engine::initialize()` is the
/// first thing the binary runs.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::config::{Config, LoaderEnvironment};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Loader variable receiving the ICD manifest list
pub const ICD_FILENAMES_VAR: &str = "VK_ICD_FILENAMES";

/// Loader variable receiving the explicit layer search path
pub const LAYER_PATH_VAR: &str = "VK_LAYER_PATH";

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

// ===== PUBLIC API =====

/// Process-wide engine services
///
/// # Example
///
/// ```no_run
/// use morph_engine::morph::{Config, Engine};
///
/// let config = Config::default();
/// Engine::initialize(&config);
/// ```
pub struct Engine;

impl Engine {
    /// Prepare the process for rendering
    ///
    /// Installs a `DefaultLogger` filtered at `config.log_severity` and exports the
    /// Vulkan loader variables. Must run before any Vulkan entry point is loaded.
    pub fn initialize(config: &Config) {
        Self::set_logger(DefaultLogger::new(config.log_severity));
        Self::apply_loader_environment(&config.loader);
    }

    /// Export `VK_ICD_FILENAMES` / `VK_LAYER_PATH` for the Vulkan loader
    ///
    /// Unset fields leave the current process environment untouched.
    ///
    /// # Returns
    ///
    /// The number of variables written
    pub fn apply_loader_environment(loader: &LoaderEnvironment) -> usize {
        let mut written = 0;
        for (name, value) in [
            (ICD_FILENAMES_VAR, loader.icd_filenames.as_deref()),
            (LAYER_PATH_VAR, loader.layer_path.as_deref()),
        ] {
            if let Some(value) = value {
                std::env::set_var(name, value);
                crate::engine_debug!("morph::Engine", "{}={}", name, value);
                written += 1;
            }
        }
        written
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// # Example
    ///
    /// ```no_run
    /// use morph_engine::morph::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger::default());
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error!, engine_err! and engine_bail!.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
