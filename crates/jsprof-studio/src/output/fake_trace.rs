//! Wrap a standalone `.cpuprofile` in a minimal trace.
//!
//! Trace viewers expect page and thread metadata around a profile. The fake
//! trace provides those, a `JSRoot` event spanning the profile, and the
//! profile itself as a `CpuProfile` instant at its end time.

use super::json::TraceEventPayload;
use crate::parser::RawCpuProfile;
use crate::timeline::Phase;
use crate::utils::config::{DEFAULT_PID, TIMELINE_CATEGORY};
use serde_json::json;

/// Options for [`fake_trace_events`]
#[derive(Debug, Clone, Default)]
pub struct FakeTraceOptions {
    pub thread_id: u32,

    /// Emit a `TracingStartedInPage` metadata event first
    pub inject_page_event: bool,

    /// Defaults to `Thread {thread_id}`
    pub thread_name: Option<String>,
}

/// Build the trace events for one profile
///
/// **Public** - used by the wrap command
///
/// Without a profile only the metadata events are produced.
pub fn fake_trace_events(
    profile: Option<&RawCpuProfile>,
    options: &FakeTraceOptions,
) -> Vec<TraceEventPayload> {
    let event = |name: &str, cat: &str, ph: Phase, ts: f64, dur: f64, args: serde_json::Value| {
        TraceEventPayload {
            name: name.to_string(),
            cat: cat.to_string(),
            ph: ph.as_str().to_string(),
            ts,
            dur: (dur != 0.0).then_some(dur),
            pid: DEFAULT_PID,
            tid: options.thread_id,
            s: None,
            args,
        }
    };

    let mut events = Vec::new();

    if options.inject_page_event {
        events.push(event(
            "TracingStartedInPage",
            TIMELINE_CATEGORY,
            Phase::Metadata,
            0.0,
            0.0,
            json!({ "data": { "sessionId": "1" } }),
        ));
    }

    let thread_name = options
        .thread_name
        .clone()
        .unwrap_or_else(|| format!("Thread {}", options.thread_id));
    events.push(event(
        "thread_name",
        "__metadata",
        Phase::Metadata,
        0.0,
        0.0,
        json!({ "name": thread_name }),
    ));

    let Some(profile) = profile else {
        return events;
    };

    events.push(event(
        "JSRoot",
        "toplevel",
        Phase::Complete,
        profile.start_time,
        profile.end_time - profile.start_time,
        json!({}),
    ));
    events.push(event(
        "CpuProfile",
        TIMELINE_CATEGORY,
        Phase::Instant,
        profile.end_time,
        0.0,
        json!({ "data": { "cpuProfile": profile } }),
    ));

    events
}
