//! Convert command implementation.
//!
//! The convert command:
//! 1. Loads the `.cpuprofile`
//! 2. Loads recorded invocation events, if any
//! 3. Materializes sample stacks
//! 4. Synthesizes frame intervals
//! 5. Calculates metrics
//! 6. Writes the trace JSON

use crate::aggregator::{calculate_frame_distribution, calculate_function_stats};
use crate::commands::models::ConvertArgs;
use crate::output::{build_trace_file, read_invocations, render_timeline_summary, write_trace};
use crate::parser::read_cpuprofile;
use crate::timeline::{generate_frame_events, materialize_samples, merge_events, EndOfStream};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Convert command arguments
///
/// # Returns
/// Ok if conversion succeeds, Err with context if any step fails
///
/// # Errors
/// * Profile or invocation file cannot be read or parsed
/// * Output file cannot be written
///
/// # Example
/// ```ignore
/// let args = ConvertArgs {
///     input: PathBuf::from("app.cpuprofile"),
///     output: PathBuf::from("timeline.json"),
///     print_summary: true,
///     ..ConvertArgs::default()
/// };
///
/// execute_convert(args)?;
/// ```
pub fn execute_convert(args: ConvertArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Loading profile: {}", args.input.display());
    let (_, profile) = read_cpuprofile(&args.input)
        .with_context(|| format!("Failed to load profile {}", args.input.display()))?;

    debug!(
        "Profile: {} nodes, {} samples",
        profile.nodes().len(),
        profile.samples().len()
    );

    let invocations = match &args.invocations {
        Some(path) => {
            info!("Loading invocation events: {}", path.display());
            read_invocations(path, args.thread_id)
                .with_context(|| format!("Failed to load invocations {}", path.display()))?
        }
        None => Vec::new(),
    };
    if args.invocations.is_some() && invocations.is_empty() {
        warn!("No complete events found in the invocation trace");
    }

    let thread_id = args
        .thread_id
        .or_else(|| invocations.first().map(|e| e.thread_id))
        .unwrap_or(0);

    let total = invocations.len();
    let invocations: Vec<_> = invocations
        .into_iter()
        .filter(|e| e.thread_id == thread_id)
        .collect();
    if invocations.len() < total {
        warn!(
            "Ignoring {} invocation events not on thread {}",
            total - invocations.len(),
            thread_id
        );
    }

    info!("Materializing sample stacks...");
    let samples = materialize_samples(&profile, thread_id);

    info!("Synthesizing frames...");
    let events = merge_events(invocations, samples.clone());
    let end = if args.leave_open {
        EndOfStream::LeaveOpen
    } else {
        EndOfStream::CloseAt(profile.end_time())
    };
    let timeline = generate_frame_events(&events, args.config, end);

    let distribution = calculate_frame_distribution(&timeline);
    info!("Frame distribution: {}", distribution.summary());

    let source = args.input.display().to_string();
    let trace = build_trace_file(
        &timeline,
        args.include_samples.then_some(samples.as_slice()),
        Some(source.clone()),
    );
    write_trace(&trace, &args.output).context("Failed to write trace JSON")?;
    info!("✓ Trace written to: {}", args.output.display());

    if args.print_summary {
        let functions = calculate_function_stats(&timeline, args.top_functions);
        println!(
            "{}",
            render_timeline_summary(&source, &distribution, &timeline.stats, &functions)
        );
    }

    info!(
        "Conversion completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &ConvertArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input profile path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input profile not found: {}", args.input.display());
    }

    if let Some(path) = &args.invocations {
        if !path.is_file() {
            anyhow::bail!("Invocation trace not found: {}", path.display());
        }
    }

    crate::output::validate_path(&args.output)?;

    if args.top_functions == 0 {
        anyhow::bail!("top_functions must be greater than 0");
    }

    if args.top_functions > 1000 {
        anyhow::bail!("top_functions is too large (max 1000)");
    }

    Ok(())
}
