use crate::parser::read_cpuprofile;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a `.cpuprofile` file and report what it contains
pub fn validate_profile_file(file_path: PathBuf) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let (_, profile) = read_cpuprofile(&file_path)
        .with_context(|| format!("Invalid profile {}", file_path.display()))?;

    let unresolved = (0..profile.samples().len())
        .filter(|&i| profile.node_by_index(i).is_none())
        .count();
    let yes_no = |present: bool| if present { "yes" } else { "no" };

    println!("✓ Valid cpuprofile JSON");
    println!("  Nodes: {}", profile.nodes().len());
    println!("  Samples: {}", profile.samples().len());
    println!("  Unresolved samples: {}", unresolved);
    println!(
        "  Duration: {:.1} ms",
        (profile.end_time() - profile.start_time()) / 1000.0
    );
    println!("  Idle node: {}", yes_no(profile.idle_node().is_some()));
    println!("  Program node: {}", yes_no(profile.program_node().is_some()));
    println!("  GC node: {}", yes_no(profile.gc_node().is_some()));

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("jsprof v{}", env!("CARGO_PKG_VERSION"));
    println!("Trace Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Turns sampled JavaScript CPU profiles into call-frame timelines.");
    println!("https://github.com/jsprof/jsprof");
}
