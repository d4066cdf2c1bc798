use jsprof_studio::aggregator::{calculate_frame_distribution, calculate_function_stats};
use jsprof_studio::parser::parse_cpuprofile;
use jsprof_studio::timeline::{build_timeline, EndOfStream, FrameTimeline, TraceEvent};
use jsprof_studio::utils::ProcessorConfig;
use serde_json::json;

fn create_test_timeline() -> FrameTimeline {
    // (root) -> main -> { parse, render -> layout }
    let profile = parse_cpuprofile(&json!({
        "nodes": [
            { "id": 1, "callFrame": { "functionName": "(root)" }, "children": [2] },
            {
                "id": 2,
                "callFrame": { "functionName": "main", "scriptId": 1, "lineNumber": 1 },
                "children": [3, 4]
            },
            { "id": 3, "callFrame": { "functionName": "parse", "scriptId": 1, "lineNumber": 10 } },
            {
                "id": 4,
                "callFrame": { "functionName": "render", "scriptId": 1, "lineNumber": 20 },
                "children": [5]
            },
            { "id": 5, "callFrame": { "functionName": "layout", "scriptId": 1, "lineNumber": 30 } }
        ],
        "startTime": 0,
        "endTime": 100,
        // t = 0, 10, 20, 30, 40, 50, 60
        "samples": [2, 3, 3, 4, 5, 5, 2],
        "timeDeltas": [0, 10, 10, 10, 10, 10, 10]
    }))
    .unwrap();

    build_timeline(
        &profile,
        vec![TraceEvent::complete("FunctionCall", 0.0, 70.0)],
        ProcessorConfig::default(),
        EndOfStream::LeaveOpen,
    )
}

#[test]
fn test_function_stats_from_profile() {
    let stats = calculate_function_stats(&create_test_timeline(), 10);

    let rows: Vec<(&str, f64, f64, usize)> = stats
        .iter()
        .map(|s| (s.function_name.as_str(), s.self_time, s.total_time, s.frame_count))
        .collect();

    // main [0,70], parse [10,30], render [30,60], layout [40,60]; ties by name
    assert_eq!(
        rows,
        vec![
            ("layout", 20.0, 20.0, 1),
            ("main", 20.0, 70.0, 1),
            ("parse", 20.0, 20.0, 1),
            ("render", 10.0, 30.0, 1),
        ]
    );
}

#[test]
fn test_frame_distribution_from_profile() {
    let dist = calculate_frame_distribution(&create_test_timeline());

    assert_eq!(dist.frame_count, 4);
    assert_eq!(dist.total_time, 70.0);
    assert_eq!(dist.max_depth, 2);
    assert_eq!(dist.open_frames, 0);
}
