//! Wrap command implementation.
//!
//! Embeds a standalone `.cpuprofile` in a minimal trace so trace viewers
//! can open it.

use crate::commands::models::WrapArgs;
use crate::output::{fake_trace_events, write_trace, FakeTraceOptions, TraceFile, TraceMetadata};
use crate::parser::read_cpuprofile;
use anyhow::{Context, Result};
use log::{debug, info};

/// Execute the wrap command
///
/// **Public** - main entry point called from main.rs
pub fn execute_wrap(args: WrapArgs) -> Result<()> {
    info!("Loading profile: {}", args.input.display());
    let (raw, profile) = read_cpuprofile(&args.input)
        .with_context(|| format!("Failed to load profile {}", args.input.display()))?;
    debug!("Profile spans {:.1} us", profile.end_time() - profile.start_time());

    let options = FakeTraceOptions {
        thread_id: args.thread_id,
        inject_page_event: args.inject_page_event,
        thread_name: args.thread_name,
    };

    let trace = TraceFile {
        trace_events: fake_trace_events(Some(&raw), &options),
        metadata: TraceMetadata::new(Some(args.input.display().to_string())),
    };

    write_trace(&trace, &args.output).context("Failed to write trace JSON")?;
    info!("✓ Trace written to: {}", args.output.display());

    Ok(())
}
