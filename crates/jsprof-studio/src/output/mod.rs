//! Output writers for synthesized timelines.
//!
//! This module handles writing data to disk in trace-event format:
//! - Frame intervals as complete (`X`) events
//! - Optional sample events as instants (`I`)
//! - Fake traces wrapping a standalone `.cpuprofile`
//! - Terminal summaries

pub mod fake_trace;
pub mod json;
pub mod terminal;

// Re-export main functions
pub use fake_trace::{fake_trace_events, FakeTraceOptions};
pub use json::{
    build_trace_file, read_invocations, read_trace, write_trace, TraceEventPayload, TraceFile,
    TraceMetadata,
};
pub use terminal::render_timeline_summary;

use crate::utils::error::OutputError;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
