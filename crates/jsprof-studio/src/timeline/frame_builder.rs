//! Synthesize call-frame intervals from sampled stacks.
//!
//! The builder keeps one open frame per depth of the currently active stack.
//! Each frame-bearing event is diffed against that stack: frames that still
//! match are extended, the rest are closed, and the new suffix is opened.
//!
//! Invocation events lock the stack: while one is open, truncation never
//! goes shallower than the depth recorded when it started. Samples seen with
//! no enclosing invocation open a *fake* invocation so traces captured
//! mid-execution still produce frames.

use super::event::{FrameEvent, FrameId, FrameKind, SampleKind, Timestamp, TraceEvent};
use super::filter::StackFilter;
use super::walker::{for_each_event, EventVisitor};
use crate::parser::CallFrame;
use crate::utils::config::{ProcessorConfig, TOP_LEVEL_EVENT};
use log::{debug, error};
use serde::{Deserialize, Serialize};

/// What to do with frames still open when the stream ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndOfStream {
    /// Return them as they are (`closed == false`, end = last extension)
    LeaveOpen,
    /// Close them, and any fake invocation, at the given time
    CloseAt(Timestamp),
}

/// Counters describing one synthesis pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisStats {
    pub fake_invocations_opened: usize,
    pub fake_invocations_closed: usize,

    /// Truncations clamped because the input was inconsistent
    pub clamped_truncations: usize,

    /// Frames left open by [`EndOfStream::LeaveOpen`]
    pub open_frames: usize,
}

/// Output of a synthesis pass
#[derive(Debug, Clone, Default)]
pub struct FrameTimeline {
    /// Frames in creation order; `frames[i].id == FrameId(i)`
    pub frames: Vec<FrameEvent>,
    pub stats: SynthesisStats,
}

impl FrameTimeline {
    pub fn frame(&self, id: FrameId) -> &FrameEvent {
        &self.frames[id.0]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Stateful frame synthesizer, fed through [`EventVisitor`]
#[derive(Debug)]
pub struct FrameTimelineBuilder {
    filter: StackFilter,
    frames: Vec<FrameEvent>,
    active_stack: Vec<FrameId>,
    lock_stack: Vec<usize>,
    fake_invocation: bool,
    ordinal: u32,
    stats: SynthesisStats,
}

impl FrameTimelineBuilder {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            filter: StackFilter::new(config),
            frames: Vec::new(),
            active_stack: Vec::new(),
            lock_stack: Vec::new(),
            fake_invocation: false,
            ordinal: 0,
            stats: SynthesisStats::default(),
        }
    }

    /// Depth of the active stack
    pub fn depth(&self) -> usize {
        self.active_stack.len()
    }

    /// Shallowest depth truncation may currently reach
    pub fn lock_floor(&self) -> usize {
        self.lock_stack.last().copied().unwrap_or(0)
    }

    pub fn is_fake_invocation_active(&self) -> bool {
        self.fake_invocation
    }

    /// Frames currently on the active stack, outermost first
    pub fn active_frames(&self) -> impl Iterator<Item = &FrameEvent> + '_ {
        self.active_stack.iter().map(|id| &self.frames[id.0])
    }

    /// Every frame created so far
    pub fn frames(&self) -> &[FrameEvent] {
        &self.frames
    }

    pub fn stats(&self) -> &SynthesisStats {
        &self.stats
    }

    /// Finish the pass, resolving the end-of-stream boundary explicitly
    pub fn finish(mut self, end: EndOfStream) -> FrameTimeline {
        if let EndOfStream::CloseAt(time) = end {
            if self.fake_invocation {
                self.close_fake_invocation(time);
            }
            for id in self.active_stack.drain(..) {
                self.frames[id.0].close(time);
            }
            self.lock_stack.clear();
        }

        self.stats.open_frames = self.active_stack.len();
        debug!(
            "Synthesized {} frames ({} left open)",
            self.frames.len(),
            self.stats.open_frames
        );

        FrameTimeline {
            frames: self.frames,
            stats: self.stats,
        }
    }

    fn next_ordinal(&mut self) -> u32 {
        self.ordinal += 1;
        self.ordinal
    }

    fn open_fake_invocation(&mut self, event: &TraceEvent, ordinal: u32) {
        self.fake_invocation = true;
        self.stats.fake_invocations_opened += 1;
        let depth_before = self.active_stack.len();
        self.extract_stack(event, ordinal);
        self.lock_stack.push(depth_before);
    }

    fn close_fake_invocation(&mut self, time: Timestamp) {
        let depth = self.lock_stack.pop().unwrap_or(0);
        self.truncate(depth, time);
        self.fake_invocation = false;
        self.stats.fake_invocations_closed += 1;
    }

    /// Close every frame from `depth` up; frames below it stay open but
    /// cover at least `time`
    fn truncate(&mut self, depth: usize, time: Timestamp) {
        let mut depth = depth;

        if let Some(&locked) = self.lock_stack.last() {
            if depth < locked {
                error!(
                    "Child stack is shallower ({}) than the parent stack ({}) at {}",
                    depth, locked, time
                );
                self.stats.clamped_truncations += 1;
                depth = locked;
            }
        }

        if self.active_stack.len() < depth {
            error!(
                "Trying to truncate higher than the current stack size at {}",
                time
            );
            self.stats.clamped_truncations += 1;
            depth = self.active_stack.len();
        }

        for (k, id) in self.active_stack.iter().enumerate() {
            let frame = &mut self.frames[id.0];
            if k < depth {
                frame.extend_to(time);
            } else {
                frame.close(time);
            }
        }
        self.active_stack.truncate(depth);
    }

    /// Diff the event's stack against the active stack
    fn extract_stack(&mut self, event: &TraceEvent, ordinal: u32) {
        let sample_kind = event.sample_kind();

        let mut call_frames: Vec<CallFrame> = match (sample_kind, &event.stack) {
            (Some(_), Some(stack)) => stack.iter().rev().cloned().collect(),
            (Some(_), None) => Vec::new(),
            (None, _) => self
                .active_frames()
                .map(|frame| frame.call_frame.clone())
                .collect(),
        };
        self.filter.apply(&mut call_frames);

        let end_time = event.end_time.unwrap_or(event.start_time);
        let min_frames = call_frames.len().min(self.active_stack.len());

        let mut i = self.lock_floor();
        while i < min_frames {
            let frame = &mut self.frames[self.active_stack[i].0];
            if !call_frames[i].same_frame(&frame.call_frame) {
                break;
            }
            frame.extend_to(end_time);
            i += 1;
        }

        self.truncate(i, event.start_time);

        let kind = sample_kind.map_or(FrameKind::Frame, SampleKind::frame_kind);
        for call_frame in call_frames.into_iter().skip(i) {
            let id = FrameId(self.frames.len());
            self.frames.push(FrameEvent {
                id,
                kind,
                start_time: event.start_time,
                end_time,
                depth: self.active_stack.len(),
                ordinal,
                thread_id: event.thread_id,
                call_frame,
                closed: false,
            });
            self.active_stack.push(id);
        }
    }
}

impl EventVisitor for FrameTimelineBuilder {
    fn on_start(&mut self, event: &TraceEvent) {
        if self.fake_invocation {
            self.close_fake_invocation(event.start_time);
        }
        let ordinal = self.next_ordinal();
        self.extract_stack(event, ordinal);
        // For the duration of the event we cannot go beyond the stack associated with it
        self.lock_stack.push(self.active_stack.len());
    }

    fn on_end(&mut self, event: &TraceEvent) {
        let end_time = event.end_time.unwrap_or(event.start_time);
        if self.fake_invocation {
            self.close_fake_invocation(end_time);
        }
        match self.lock_stack.pop() {
            Some(depth) => self.truncate(depth, end_time),
            None => {
                error!("Unbalanced end of {} at {}", event.name, end_time);
                self.truncate(0, end_time);
            }
        }
    }

    fn on_instant(&mut self, event: &TraceEvent, parent: Option<&TraceEvent>) {
        let ordinal = self.next_ordinal();

        if parent.is_some_and(TraceEvent::is_js_invocation) || self.fake_invocation {
            self.extract_stack(event, ordinal);
        } else if event.sample_kind().is_some()
            && event.stack.as_ref().is_some_and(|stack| !stack.is_empty())
            && self.active_stack.is_empty()
        {
            // Tracing may have started half-way through a JS invocation;
            // pretend there is a top-level one
            self.open_fake_invocation(event, ordinal);
        }
    }
}

/// Run the synthesizer over a merged, time-ordered stream
///
/// Events ending before the first top-level task (or before 0 when there is
/// none) are ignored.
///
/// **Public** - main entry point of the synthesizer
pub fn generate_frame_events(
    events: &[TraceEvent],
    config: ProcessorConfig,
    end: EndOfStream,
) -> FrameTimeline {
    let start_time = events
        .iter()
        .find(|event| event.name == TOP_LEVEL_EVENT)
        .map_or(0.0, |event| event.start_time);

    let mut builder = FrameTimelineBuilder::new(config);
    for_each_event(events, start_time, &mut builder);
    builder.finish(end)
}
