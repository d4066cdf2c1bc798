//! jsprof CLI
//!
//! Turns sampled JavaScript CPU profiles (`.cpuprofile`) into per-call-frame
//! timeline traces.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;
use std::path::{Path, PathBuf};

use jsprof_studio::commands::{
    display_version, execute_convert, execute_wrap, validate_args, validate_profile_file,
    ConvertArgs, WrapArgs,
};
use jsprof_studio::utils::config::DEFAULT_CONFIG_FILE;
use jsprof_studio::utils::{load_config, ProcessorConfig};

/// jsprof - call-frame timelines from JavaScript CPU profiles
#[derive(Parser, Debug)]
#[command(name = "jsprof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a profile into a frame timeline trace
    Convert {
        /// Path to the .cpuprofile
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the trace JSON (placed in artifacts/ by default)
        #[arg(short, long, default_value = "artifacts/timeline.json")]
        output: PathBuf,

        /// Recorded trace whose complete events bracket JS execution
        #[arg(long)]
        invocations: Option<PathBuf>,

        /// Thread id of the profile
        #[arg(long)]
        thread: Option<u32>,

        /// Processor config file (TOML); jsprof.toml is used when present
        #[arg(short, long, env = "JSPROF_CONFIG")]
        config: Option<PathBuf>,

        /// Keep every frame, disabling stack filtering (`=false` turns a config file setting off)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        all_events: Option<bool>,

        /// Keep runtime Parse/Compile frames (`=false` turns a config file setting off)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        runtime_call_stats: Option<bool>,

        /// Keep native frames (`=false` turns a config file setting off)
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        native_functions: Option<bool>,

        /// Include sample events in the output
        #[arg(long)]
        samples: bool,

        /// Leave frames open at the end of the profile
        #[arg(long)]
        leave_open: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Number of functions listed in the summary
        #[arg(long, default_value = "20")]
        top_functions: usize,
    },

    /// Wrap a profile in a minimal trace that trace viewers can open
    Wrap {
        /// Path to the .cpuprofile
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the trace JSON (placed in artifacts/ by default)
        #[arg(short, long, default_value = "artifacts/trace.json")]
        output: PathBuf,

        /// Thread id written into the trace
        #[arg(long, default_value = "1")]
        thread: u32,

        /// Thread name (defaults to "Thread <id>")
        #[arg(long)]
        thread_name: Option<String>,

        /// Do not emit the TracingStartedInPage event
        #[arg(long)]
        no_page_event: bool,
    },

    /// Validate a .cpuprofile file
    Validate {
        /// Path to profile file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Convert {
            input,
            output,
            invocations,
            thread,
            config,
            all_events,
            runtime_call_stats,
            native_functions,
            samples,
            leave_open,
            summary,
            top_functions,
        } => {
            let processor_config = resolve_config(config.as_deref())?.with_overrides(
                all_events,
                runtime_call_stats,
                native_functions,
            );
            debug!("Processor config: {:?}", processor_config);

            let args = ConvertArgs {
                input,
                output: in_artifacts(output),
                invocations,
                thread_id: thread,
                config: processor_config,
                include_samples: samples,
                leave_open,
                print_summary: summary,
                top_functions,
            };

            // Validate args first
            validate_args(&args)?;

            execute_convert(args)?;
        }

        Commands::Wrap {
            input,
            output,
            thread,
            thread_name,
            no_page_event,
        } => {
            execute_wrap(WrapArgs {
                input,
                output: in_artifacts(output),
                thread_id: thread,
                thread_name,
                inject_page_event: !no_page_event,
            })?;
        }

        Commands::Validate { file } => {
            validate_profile_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Ensure outputs go to artifacts/ if no directory is specified
fn in_artifacts(path: PathBuf) -> PathBuf {
    if path.parent().map(|p| p.as_os_str().is_empty()).unwrap_or(true) {
        PathBuf::from("artifacts").join(path)
    } else {
        path
    }
}

/// Load the explicit config file, else jsprof.toml if present, else defaults
fn resolve_config(path: Option<&Path>) -> Result<ProcessorConfig> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load_config(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE)),
        None => Ok(ProcessorConfig::default()),
    }
}
