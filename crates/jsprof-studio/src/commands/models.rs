use crate::utils::config::ProcessorConfig;
use std::path::PathBuf;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Path to the `.cpuprofile` to convert
    pub input: PathBuf,

    /// Output path for the frame trace JSON
    pub output: PathBuf,

    /// Recorded trace whose complete events bracket JS execution
    pub invocations: Option<PathBuf>,

    /// Thread the profile belongs to (defaults to the invocations' thread)
    pub thread_id: Option<u32>,

    /// Stack filtering options
    pub config: ProcessorConfig,

    /// Also write the sample events
    pub include_samples: bool,

    /// Leave frames open at the end of the profile instead of closing them
    pub leave_open: bool,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Number of functions listed in the summary
    pub top_functions: usize,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from("timeline.json"),
            invocations: None,
            thread_id: None,
            config: ProcessorConfig::default(),
            include_samples: false,
            leave_open: false,
            print_summary: false,
            top_functions: 20,
        }
    }
}

/// Arguments for the wrap command
#[derive(Debug, Clone)]
pub struct WrapArgs {
    /// Path to the `.cpuprofile` to wrap
    pub input: PathBuf,

    /// Output path for the fake trace JSON
    pub output: PathBuf,

    pub thread_id: u32,

    /// Thread name metadata (defaults to `Thread {thread_id}`)
    pub thread_name: Option<String>,

    /// Emit a `TracingStartedInPage` event
    pub inject_page_event: bool,
}

impl Default for WrapArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from("trace.json"),
            thread_id: 1,
            thread_name: None,
            inject_page_event: true,
        }
    }
}
