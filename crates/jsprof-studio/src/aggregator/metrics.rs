//! Calculate per-function metrics from a synthesized frame timeline.
//!
//! Self time is what remains of a frame's duration once its direct children
//! are subtracted. Total time counts only the outermost frame of a recursive
//! run, so recursion never counts the same interval twice.

use crate::parser::CallFrame;
use crate::timeline::{FrameEvent, FrameId, FrameTimeline};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Time spent in one function across the timeline
///
/// **Public** - returned from calculate_function_stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionStats {
    pub function_name: String,
    pub url: String,
    pub line_number: i64,

    /// Inclusive time in microseconds
    pub total_time: f64,

    /// Exclusive time in microseconds
    pub self_time: f64,

    /// Number of frame intervals attributed to this function
    pub frame_count: usize,
}

/// Resolve each frame's parent frame
///
/// A frame opened at depth `d` is parented by the most recent frame opened at
/// depth `d - 1` on the same thread, which is still on the active stack at
/// that moment.
pub fn frame_parents(frames: &[FrameEvent]) -> Vec<Option<FrameId>> {
    let mut last_at_depth: HashMap<u32, Vec<FrameId>> = HashMap::new();

    frames
        .iter()
        .map(|frame| {
            let chain = last_at_depth.entry(frame.thread_id).or_default();
            chain.truncate(frame.depth);
            let parent = if frame.depth > 0 {
                chain.get(frame.depth - 1).copied()
            } else {
                None
            };
            chain.push(frame.id);
            parent
        })
        .collect()
}

/// Aggregate frames into per-function statistics
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `timeline` - Output of the frame synthesizer
/// * `top_n` - Number of functions to return
///
/// # Returns
/// Vector of function stats, sorted by self time (descending)
pub fn calculate_function_stats(timeline: &FrameTimeline, top_n: usize) -> Vec<FunctionStats> {
    let frames = &timeline.frames;
    let parents = frame_parents(frames);

    let mut self_times: Vec<f64> = frames.iter().map(FrameEvent::duration).collect();
    for (frame, parent) in frames.iter().zip(&parents) {
        if let Some(parent) = parent {
            self_times[parent.0] -= frame.duration();
        }
    }

    let mut by_function: HashMap<FunctionKey, FunctionStats> = HashMap::new();
    for (i, frame) in frames.iter().enumerate() {
        let key = FunctionKey::of(&frame.call_frame);
        let recursive = has_ancestor(frames, &parents, i, &key);

        let stats = by_function
            .entry(key)
            .or_insert_with(|| FunctionStats {
                function_name: frame.call_frame.function_name.clone(),
                url: frame.call_frame.url.clone(),
                line_number: frame.call_frame.line_number,
                total_time: 0.0,
                self_time: 0.0,
                frame_count: 0,
            });

        stats.self_time += self_times[i].max(0.0);
        stats.frame_count += 1;
        if !recursive {
            stats.total_time += frame.duration();
        }
    }

    debug!(
        "Aggregated {} frames into {} functions",
        frames.len(),
        by_function.len()
    );

    let mut stats: Vec<FunctionStats> = by_function.into_values().collect();
    stats.sort_by(|a, b| {
        b.self_time
            .total_cmp(&a.self_time)
            .then_with(|| a.function_name.cmp(&b.function_name))
            .then_with(|| a.line_number.cmp(&b.line_number))
    });
    stats.truncate(top_n);
    stats
}

/// Identity used to group frames by function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FunctionKey {
    script_id: String,
    function_name: String,
    line_number: i64,
}

impl FunctionKey {
    fn of(frame: &CallFrame) -> Self {
        Self {
            script_id: frame.script_id.clone(),
            function_name: frame.function_name.clone(),
            line_number: frame.line_number,
        }
    }
}

fn has_ancestor(
    frames: &[FrameEvent],
    parents: &[Option<FrameId>],
    index: usize,
    key: &FunctionKey,
) -> bool {
    let mut current = parents[index];
    while let Some(id) = current {
        if FunctionKey::of(&frames[id.0].call_frame) == *key {
            return true;
        }
        current = parents[id.0];
    }
    false
}

/// Calculate frame duration statistics
///
/// **Public** - provides summary statistics
pub fn calculate_frame_distribution(timeline: &FrameTimeline) -> FrameDistribution {
    let frames = &timeline.frames;
    if frames.is_empty() {
        return FrameDistribution::default();
    }

    let total_time: f64 = frames
        .iter()
        .filter(|f| f.depth == 0)
        .map(FrameEvent::duration)
        .sum();

    let mut durations: Vec<f64> = frames.iter().map(FrameEvent::duration).collect();
    durations.sort_by(f64::total_cmp);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    let median = durations[durations.len() / 2];

    FrameDistribution {
        total_time,
        frame_count: frames.len(),
        max_depth: frames.iter().map(|f| f.depth).max().unwrap_or(0),
        mean_duration: mean,
        median_duration: median,
        open_frames: frames.iter().filter(|f| !f.closed).count(),
    }
}

/// Frame duration statistics
///
/// **Public** - returned from calculate_frame_distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDistribution {
    /// Time covered by outermost frames, in microseconds
    pub total_time: f64,

    pub frame_count: usize,

    /// Deepest depth any frame was opened at
    pub max_depth: usize,

    pub mean_duration: f64,
    pub median_duration: f64,

    /// Frames still open at the end of the stream
    pub open_frames: usize,
}

impl FrameDistribution {
    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.1}us | Frames: {} | Max depth: {} | Mean: {:.1}us | Median: {:.1}us | Open: {}",
            self.total_time,
            self.frame_count,
            self.max_depth,
            self.mean_duration,
            self.median_duration,
            self.open_frames
        )
    }
}
