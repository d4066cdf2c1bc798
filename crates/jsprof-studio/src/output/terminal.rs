//! Terminal output rendering for converted timelines.

use crate::aggregator::{FrameDistribution, FunctionStats};
use crate::timeline::SynthesisStats;
use colored::*;

/// Render a human-readable summary of a conversion for the terminal
pub fn render_timeline_summary(
    source: &str,
    distribution: &FrameDistribution,
    stats: &SynthesisStats,
    functions: &[FunctionStats],
) -> String {
    let mut out = String::new();

    out.push_str(&render_header(source));
    out.push_str(&render_distribution(distribution));
    out.push_str(&render_functions(functions));
    out.push_str(&render_status(stats));

    out
}

fn render_header(source: &str) -> String {
    let mut out = String::new();
    out.push_str("\n📊 ");
    out.push_str(&"JS Profile Timeline Summary".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    out.push_str(&format!("Profile: {}\n", source));
    out.push_str("---------------------------------------------------\n\n");
    out
}

fn render_distribution(distribution: &FrameDistribution) -> String {
    format!(
        "Frames:     {}\nTotal time: {:.1} ms\nMax depth:  {}\nMedian:     {:.1} us\n",
        distribution.frame_count,
        distribution.total_time / 1000.0,
        distribution.max_depth,
        distribution.median_duration
    )
}

fn render_functions(functions: &[FunctionStats]) -> String {
    let mut out = String::new();

    if !functions.is_empty() {
        out.push_str("\nTop Functions by Self Time:\n");
        for f in functions {
            out.push_str(&format!(
                "  {:>10.1} ms {:>10.1} ms  {} ({})\n",
                f.self_time / 1000.0,
                f.total_time / 1000.0,
                display_name(f),
                shorten_url(&f.url)
            ));
        }
    }
    out
}

fn render_status(stats: &SynthesisStats) -> String {
    let mut out = String::new();
    out.push_str("\n---------------------------------------------------\n");

    if stats.fake_invocations_opened > 0 {
        out.push_str(&format!(
            "ℹ️  {} sample run(s) outside any invocation\n",
            stats.fake_invocations_opened
        ));
    }

    let status_msg = if stats.clamped_truncations > 0 {
        format!(
            "⚠️  STATUS: {} inconsistent stack transition(s) clamped",
            stats.clamped_truncations
        )
        .yellow()
        .bold()
    } else if stats.open_frames > 0 {
        format!("✅ STATUS: OK ({} frames left open)", stats.open_frames)
            .green()
            .bold()
    } else {
        "✅ STATUS: OK".green().bold()
    };
    out.push_str(&status_msg.to_string());
    out.push('\n');
    out
}

fn display_name(f: &FunctionStats) -> &str {
    if f.function_name.is_empty() {
        "(anonymous)"
    } else {
        &f.function_name
    }
}

fn shorten_url(url: &str) -> String {
    if url.is_empty() {
        return "-".to_string();
    }
    match url.rsplit('/').next() {
        Some(file) if !file.is_empty() => file.to_string(),
        _ => url.to_string(),
    }
}
