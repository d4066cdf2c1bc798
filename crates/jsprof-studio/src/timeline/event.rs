//! Timeline event types consumed and produced by the profile processor.
//!
//! All times are microseconds, matching the trace-event `ts` field.

use crate::parser::CallFrame;
use crate::utils::config::JS_INVOCATION_EVENTS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Microseconds since the profile's clock origin
pub type Timestamp = f64;

/// Trace-event phase of a [`TraceEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// `ph: "X"`, has a duration
    #[serde(rename = "X")]
    Complete,
    /// `ph: "I"`
    #[serde(rename = "I")]
    Instant,
    /// `ph: "M"`
    #[serde(rename = "M")]
    Metadata,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Complete => "X",
            Phase::Instant => "I",
            Phase::Metadata => "M",
        }
    }
}

/// Classification of a materialized sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Sample,
    SystemSample,
    IdleSample,
}

impl SampleKind {
    pub fn name(self) -> &'static str {
        match self {
            SampleKind::Sample => "JSSample",
            SampleKind::SystemSample => "JSSystemSample",
            SampleKind::IdleSample => "JSIdleSample",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "JSSample" => Some(SampleKind::Sample),
            "JSSystemSample" => Some(SampleKind::SystemSample),
            "JSIdleSample" => Some(SampleKind::IdleSample),
            _ => None,
        }
    }

    /// Kind of the frames opened for samples of this kind
    pub fn frame_kind(self) -> FrameKind {
        match self {
            SampleKind::Sample => FrameKind::Frame,
            SampleKind::SystemSample => FrameKind::SystemFrame,
            SampleKind::IdleSample => FrameKind::IdleFrame,
        }
    }
}

/// Classification of a synthesized frame interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    #[serde(rename = "JSFrame")]
    Frame,
    #[serde(rename = "JSSystemFrame")]
    SystemFrame,
    #[serde(rename = "JSIdleFrame")]
    IdleFrame,
}

impl FrameKind {
    pub fn name(self) -> &'static str {
        match self {
            FrameKind::Frame => "JSFrame",
            FrameKind::SystemFrame => "JSSystemFrame",
            FrameKind::IdleFrame => "JSIdleFrame",
        }
    }
}

/// One event of the merged input stream
///
/// Samples carry their call stack leaf first; invocation and other
/// duration events carry none.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    pub name: String,
    pub phase: Phase,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub thread_id: u32,
    pub stack: Option<Arc<[CallFrame]>>,
}

impl TraceEvent {
    pub fn instant(name: impl Into<String>, time: Timestamp) -> Self {
        Self {
            name: name.into(),
            phase: Phase::Instant,
            start_time: time,
            end_time: None,
            thread_id: 0,
            stack: None,
        }
    }

    pub fn complete(name: impl Into<String>, start_time: Timestamp, end_time: Timestamp) -> Self {
        Self {
            name: name.into(),
            phase: Phase::Complete,
            start_time,
            end_time: Some(end_time),
            thread_id: 0,
            stack: None,
        }
    }

    pub fn sample(kind: SampleKind, time: Timestamp, stack: Arc<[CallFrame]>) -> Self {
        Self {
            stack: Some(stack),
            ..Self::instant(kind.name(), time)
        }
    }

    pub fn with_thread(mut self, thread_id: u32) -> Self {
        self.thread_id = thread_id;
        self
    }

    /// Length of the event, `None` for events without an end
    pub fn duration(&self) -> Option<f64> {
        self.end_time.map(|end| end - self.start_time)
    }

    pub fn sample_kind(&self) -> Option<SampleKind> {
        SampleKind::from_name(&self.name)
    }

    /// Whether this event brackets JS execution
    pub fn is_js_invocation(&self) -> bool {
        JS_INVOCATION_EVENTS.contains(&self.name.as_str())
            || self.name.starts_with("v8")
            || self.name.starts_with("V8")
    }
}

/// Stable identity of a frame: its position in the output list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub usize);

/// One call frame's lifetime on the active stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEvent {
    pub id: FrameId,
    pub kind: FrameKind,
    pub start_time: Timestamp,
    pub end_time: Timestamp,

    /// Index on the active stack when opened (0 = outermost)
    pub depth: usize,

    /// Ordinal of the event that opened this frame
    pub ordinal: u32,

    pub thread_id: u32,
    pub call_frame: CallFrame,

    /// Set once the frame has been truncated off the active stack
    pub closed: bool,
}

impl FrameEvent {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Finalize the end time; never earlier than the start
    pub(crate) fn close(&mut self, time: Timestamp) {
        debug_assert!(!self.closed, "frame {:?} closed twice", self.id);
        self.end_time = time.max(self.start_time);
        self.closed = true;
    }

    /// Push the end time out to `time` if it is later
    pub(crate) fn extend_to(&mut self, time: Timestamp) {
        self.end_time = self.end_time.max(time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_names() {
        assert!(TraceEvent::complete("FunctionCall", 0.0, 1.0).is_js_invocation());
        assert!(TraceEvent::complete("v8.run", 0.0, 1.0).is_js_invocation());
        assert!(TraceEvent::complete("V8.RunMicrotasks", 0.0, 1.0).is_js_invocation());
        assert!(!TraceEvent::complete("Layout", 0.0, 1.0).is_js_invocation());
        assert!(!TraceEvent::complete("JSRoot", 0.0, 1.0).is_js_invocation());
    }

    #[test]
    fn test_sample_kind_round_trip_names() {
        for kind in [
            SampleKind::Sample,
            SampleKind::SystemSample,
            SampleKind::IdleSample,
        ] {
            assert_eq!(SampleKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(SampleKind::from_name("JSFrame"), None);
        assert_eq!(SampleKind::IdleSample.frame_kind(), FrameKind::IdleFrame);
    }

    #[test]
    fn test_close_never_precedes_start() {
        let mut frame = FrameEvent {
            id: FrameId(0),
            kind: FrameKind::Frame,
            start_time: 10.0,
            end_time: 10.0,
            depth: 0,
            ordinal: 1,
            thread_id: 0,
            call_frame: CallFrame::new("f", "1", "a.js", 0, 0),
            closed: false,
        };
        frame.close(5.0);
        assert_eq!(frame.end_time, 10.0);
        assert!(frame.closed);
    }
}
