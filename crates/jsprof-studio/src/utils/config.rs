//! Configuration and constants for the profile processor.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Url prefix marking a frame as native code
pub const NATIVE_URL_PREFIX: &str = "native ";

/// Exact url of frames produced by the engine's runtime call stats
pub const NATIVE_RUNTIME_URL: &str = "native V8Runtime";

// Function names the profiler gives its pseudo nodes
pub const IDLE_FUNCTION_NAME: &str = "(idle)";
pub const PROGRAM_FUNCTION_NAME: &str = "(program)";
pub const GC_FUNCTION_NAME: &str = "(garbage collector)";

/// Trace events that bracket JS execution and therefore parent sampled frames
pub const JS_INVOCATION_EVENTS: &[&str] = &[
    "RunMicrotasks",
    "FunctionCall",
    "EvaluateScript",
    "v8.evaluateModule",
    "EventDispatch",
    "V8.Execute",
];

/// Event marking one top-level task of the renderer main loop
pub const TOP_LEVEL_EVENT: &str = "RunTask";

/// Category used for every event this tool constructs
pub const TIMELINE_CATEGORY: &str = "disabled-by-default-devtools.timeline";

/// Process id written into generated traces
pub const DEFAULT_PID: u32 = 1;

/// Default config file looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "jsprof.toml";

/// Options controlling which frames survive stack filtering
///
/// Loaded from TOML (every key optional):
///
/// ```toml
/// show_all_events = false
/// show_runtime_call_stats = true
/// show_native_functions = false
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Disable filtering altogether
    pub show_all_events: bool,

    /// Keep runtime frames that belong to a native group (Parse, Compile)
    pub show_runtime_call_stats: bool,

    /// Keep frames whose url marks them as native
    pub show_native_functions: bool,
}

impl ProcessorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_all_events(mut self, show: bool) -> Self {
        self.show_all_events = show;
        self
    }

    pub fn with_runtime_call_stats(mut self, show: bool) -> Self {
        self.show_runtime_call_stats = show;
        self
    }

    pub fn with_native_functions(mut self, show: bool) -> Self {
        self.show_native_functions = show;
        self
    }

    /// Replace each option that has an explicit value, e.g. from the command line
    pub fn with_overrides(
        self,
        all_events: Option<bool>,
        runtime_call_stats: Option<bool>,
        native_functions: Option<bool>,
    ) -> Self {
        Self {
            show_all_events: all_events.unwrap_or(self.show_all_events),
            show_runtime_call_stats: runtime_call_stats.unwrap_or(self.show_runtime_call_stats),
            show_native_functions: native_functions.unwrap_or(self.show_native_functions),
        }
    }
}

/// Load processor options from a TOML file
///
/// # Errors
/// * `ConfigError::ReadFailed` - If file cannot be read
/// * `ConfigError::ParseFailed` - If TOML is invalid
pub fn load_config(path: impl AsRef<Path>) -> Result<ProcessorConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ProcessorConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "show_runtime_call_stats = true").unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.show_runtime_call_stats);
        assert!(!config.show_all_events);
        assert!(!config.show_native_functions);
    }

    #[test]
    fn test_overrides_turn_file_options_off() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "show_all_events = true").unwrap();
        writeln!(file, "show_native_functions = true").unwrap();

        let config = load_config(file.path())
            .unwrap()
            .with_overrides(Some(false), Some(true), None);
        assert!(!config.show_all_events);
        assert!(config.show_runtime_call_stats);
        assert!(config.show_native_functions);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "show_all_events = \"yes\"").unwrap();

        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn test_load_missing_config() {
        let result = load_config("/nonexistent/jsprof.toml");
        assert!(matches!(result, Err(ConfigError::ReadFailed(_))));
    }
}
