//! The profile processor: sampled stacks in, call-frame intervals out.
//!
//! Two passes cooperate:
//! - [`materialize_samples`] turns profiler samples into instant events that
//!   carry their full call stack
//! - [`generate_frame_events`] diffs consecutive stacks inside invocation
//!   brackets and emits one interval per call frame
//!
//! # Example
//! ```ignore
//! use jsprof_studio::timeline::{build_timeline, EndOfStream};
//! use jsprof_studio::utils::ProcessorConfig;
//!
//! let config = ProcessorConfig::default();
//! let timeline = build_timeline(&profile, Vec::new(), config, EndOfStream::LeaveOpen);
//! println!("{} frames", timeline.frames.len());
//! ```

pub mod event;
pub mod filter;
pub mod frame_builder;
pub mod sample_stacks;
pub mod walker;

pub use event::{FrameEvent, FrameId, FrameKind, Phase, SampleKind, Timestamp, TraceEvent};
pub use filter::{FrameOrigin, NativeGroup, StackFilter};
pub use frame_builder::{
    generate_frame_events, EndOfStream, FrameTimeline, FrameTimelineBuilder, SynthesisStats,
};
pub use sample_stacks::{classify_sample, materialize_samples, StackCache};
pub use walker::{for_each_event, merge_events, EventVisitor};

use crate::parser::ProfileModel;
use crate::utils::config::ProcessorConfig;

/// Run both passes over one thread's profile
///
/// `invocations` are externally recorded duration events. Only those on the
/// thread of the first one are kept and merged with the samples.
pub fn build_timeline(
    profile: &ProfileModel,
    invocations: Vec<TraceEvent>,
    config: ProcessorConfig,
    end: EndOfStream,
) -> FrameTimeline {
    let thread_id = invocations.first().map_or(0, |e| e.thread_id);
    let invocations: Vec<TraceEvent> = invocations
        .into_iter()
        .filter(|e| e.thread_id == thread_id)
        .collect();
    let samples = materialize_samples(profile, thread_id);
    let events = merge_events(invocations, samples);
    generate_frame_events(&events, config, end)
}
