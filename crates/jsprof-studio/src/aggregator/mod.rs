//! Aggregation of frame timelines into metrics.
//!
//! This module summarizes synthesized frames into:
//! - Per-function total and self time
//! - Frame duration statistics

pub mod metrics;

// Re-export main types and functions
pub use metrics::{
    calculate_frame_distribution, calculate_function_stats, frame_parents, FrameDistribution,
    FunctionStats,
};
