use jsprof_studio::output::{
    build_trace_file, read_invocations, read_trace, validate_path, write_trace, TraceEventPayload,
};
use jsprof_studio::parser::CallFrame;
use jsprof_studio::timeline::{
    FrameEvent, FrameId, FrameKind, FrameTimeline, SampleKind, SynthesisStats, TraceEvent,
};
use jsprof_studio::utils::config::SCHEMA_VERSION;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn create_test_timeline() -> FrameTimeline {
    let frame = |id: usize, name: &str, depth: usize, start: f64, end: f64, closed: bool| {
        FrameEvent {
            id: FrameId(id),
            kind: FrameKind::Frame,
            start_time: start,
            end_time: end,
            depth,
            ordinal: id as u32 + 1,
            thread_id: 4,
            call_frame: CallFrame::new(name, "7", "https://app.test/main.js", 12, 3),
            closed,
        }
    };

    FrameTimeline {
        frames: vec![
            frame(0, "main", 0, 10.0, 40.0, false),
            frame(1, "helper", 1, 20.0, 30.0, true),
        ],
        stats: SynthesisStats {
            fake_invocations_opened: 1,
            open_frames: 1,
            ..SynthesisStats::default()
        },
    }
}

#[test]
fn test_write_and_read_trace() {
    let trace = build_trace_file(&create_test_timeline(), None, Some("app.cpuprofile".to_string()));
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    // Write
    write_trace(&trace, path).unwrap();

    // Read back
    let loaded = read_trace(path).unwrap();

    assert_eq!(loaded.metadata.version, SCHEMA_VERSION);
    assert_eq!(loaded.metadata.source.as_deref(), Some("app.cpuprofile"));
    assert_eq!(loaded.metadata.frame_count, 2);
    assert_eq!(loaded.metadata.stats.unwrap().fake_invocations_opened, 1);
    assert_eq!(loaded.trace_events, trace.trace_events);
}

#[test]
fn test_frames_become_complete_events() {
    let trace = build_trace_file(&create_test_timeline(), None, None);

    let main = &trace.trace_events[0];
    assert_eq!(main.name, "JSFrame");
    assert_eq!(main.ph, "X");
    assert_eq!(main.ts, 10.0);
    assert_eq!(main.dur, Some(30.0));
    assert_eq!(main.tid, 4);
    assert_eq!(main.args["data"]["functionName"], "main");
    assert_eq!(main.args["data"]["scriptId"], "7");
    assert_eq!(main.args["open"], true);

    let helper = &trace.trace_events[1];
    assert!(helper.args.get("open").is_none());
}

#[test]
fn test_samples_included_in_time_order() {
    let stack: Arc<[CallFrame]> = vec![CallFrame::new("helper", "7", "main.js", 12, 3)].into();
    let samples = vec![
        TraceEvent::sample(SampleKind::Sample, 5.0, Arc::clone(&stack)),
        TraceEvent::sample(SampleKind::IdleSample, 25.0, stack),
    ];

    let trace = build_trace_file(&create_test_timeline(), Some(&samples), None);
    let order: Vec<(&str, f64)> = trace
        .trace_events
        .iter()
        .map(|e| (e.name.as_str(), e.ts))
        .collect();
    assert_eq!(
        order,
        vec![
            ("JSSample", 5.0),
            ("JSFrame", 10.0),
            ("JSFrame", 20.0),
            ("JSIdleSample", 25.0)
        ]
    );

    let first: &TraceEventPayload = &trace.trace_events[0];
    assert_eq!(first.ph, "I");
    assert_eq!(first.s.as_deref(), Some("t"));
    assert_eq!(first.args["data"]["stackTrace"][0]["functionName"], "helper");
}

#[test]
fn test_read_invocations_from_object_form() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        json!({
            "traceEvents": [
                { "name": "FunctionCall", "ph": "X", "ts": 100, "dur": 50, "pid": 1, "tid": 2 },
                { "name": "EvaluateScript", "ph": "X", "ts": 300, "dur": 10, "pid": 1, "tid": 3 },
                {
                    "name": "thread_name",
                    "ph": "M",
                    "pid": 1,
                    "tid": 2,
                    "args": { "name": "main" }
                },
                { "name": "Mark", "ph": "I", "ts": 120, "pid": 1, "tid": 2 }
            ]
        })
    )
    .unwrap();

    let all = read_invocations(file.path(), None).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "FunctionCall");
    assert_eq!(all[0].start_time, 100.0);
    assert_eq!(all[0].end_time, Some(150.0));
    assert_eq!(all[0].thread_id, 2);

    let thread_3 = read_invocations(file.path(), Some(3)).unwrap();
    assert_eq!(thread_3.len(), 1);
    assert_eq!(thread_3[0].name, "EvaluateScript");
}

#[test]
fn test_read_invocations_from_array_form() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "{}",
        json!([{ "name": "V8.Execute", "ph": "X", "ts": 1.5, "dur": 2.5, "tid": 1 }])
    )
    .unwrap();

    let events = read_invocations(file.path(), None).unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].is_js_invocation());
    assert_eq!(events[0].end_time, Some(4.0));
}

#[test]
fn test_validate_output_path_empty() {
    let result = validate_path(Path::new(""));
    assert!(result.is_err());
}

#[test]
fn test_validate_output_path_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = validate_path(temp_dir.path());
    assert!(result.is_err());
}

#[test]
fn test_write_creates_parent_dirs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let nested_path = temp_dir.path().join("nested").join("dir").join("timeline.json");

    let trace = build_trace_file(&create_test_timeline(), None, None);
    write_trace(&trace, &nested_path).unwrap();

    assert!(nested_path.exists());
}

#[test]
fn test_read_trace_missing_file() {
    assert!(read_trace("/nonexistent/timeline.json").is_err());
}
