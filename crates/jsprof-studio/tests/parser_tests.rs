use jsprof_studio::parser::{parse_cpuprofile, read_cpuprofile, NodeIndex};
use jsprof_studio::utils::error::ParseError;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn create_test_profile() -> serde_json::Value {
    json!({
        "nodes": [
            {
                "id": 1,
                "callFrame": {
                    "functionName": "(root)",
                    "scriptId": 0,
                    "url": "",
                    "lineNumber": -1,
                    "columnNumber": -1
                },
                "hitCount": 0,
                "children": [2, 3]
            },
            {
                "id": 2,
                "callFrame": {
                    "functionName": "main",
                    "scriptId": 12,
                    "url": "file:///app.js",
                    "lineNumber": 4,
                    "columnNumber": 10
                },
                "hitCount": 1,
                "children": [4]
            },
            {
                "id": 3,
                "callFrame": {
                    "functionName": "(idle)",
                    "scriptId": "0",
                    "url": "",
                    "lineNumber": -1,
                    "columnNumber": -1
                },
                "hitCount": 1
            },
            {
                "id": 4,
                "callFrame": {
                    "functionName": "render",
                    "scriptId": "12",
                    "url": "file:///app.js",
                    "lineNumber": 20,
                    "columnNumber": 2
                },
                "hitCount": 2
            }
        ],
        "startTime": 1000,
        "endTime": 1040,
        "samples": [2, 4, 4, 3],
        "timeDeltas": [5, 10, 10, 10]
    })
}

#[test]
fn test_parse_children_links() {
    let profile = parse_cpuprofile(&create_test_profile()).unwrap();

    assert_eq!(profile.nodes().len(), 4);
    assert_eq!(profile.root(), Some(NodeIndex(0)));

    let render = profile.node(NodeIndex(3));
    assert_eq!(render.parent, Some(NodeIndex(1)));
    assert_eq!(render.depth, 2);
    assert_eq!(profile.node(NodeIndex(1)).depth, 1);
}

#[test]
fn test_script_id_number_or_string() {
    let profile = parse_cpuprofile(&create_test_profile()).unwrap();
    assert_eq!(profile.node(NodeIndex(1)).call_frame.script_id, "12");
    assert_eq!(profile.node(NodeIndex(3)).call_frame.script_id, "12");
}

#[test]
fn test_timestamps_accumulate_deltas() {
    let profile = parse_cpuprofile(&create_test_profile()).unwrap();
    assert_eq!(profile.timestamps(), &[1005.0, 1015.0, 1025.0, 1035.0]);
}

#[test]
fn test_missing_deltas_spread_evenly() {
    let mut raw = create_test_profile();
    raw["timeDeltas"] = json!([]);

    let profile = parse_cpuprofile(&raw).unwrap();
    assert_eq!(profile.timestamps(), &[1000.0, 1010.0, 1020.0, 1030.0]);
}

#[test]
fn test_mismatched_deltas_rejected() {
    let mut raw = create_test_profile();
    raw["timeDeltas"] = json!([1, 2]);

    assert!(matches!(
        parse_cpuprofile(&raw),
        Err(ParseError::InvalidFormat(_))
    ));
}

#[test]
fn test_sentinels_found_by_name() {
    let profile = parse_cpuprofile(&create_test_profile()).unwrap();
    assert_eq!(profile.idle_node(), Some(NodeIndex(2)));
    assert_eq!(profile.program_node(), None);
    assert_eq!(profile.gc_node(), None);
}

#[test]
fn test_parent_field_links() {
    let raw = json!({
        "nodes": [
            { "id": 10, "callFrame": { "functionName": "(root)" } },
            { "id": 11, "parent": 10, "callFrame": { "functionName": "a" } },
            { "id": 12, "parent": 11, "callFrame": { "functionName": "b" } }
        ],
        "startTime": 0,
        "endTime": 2,
        "samples": [12, 11],
        "timeDeltas": [1, 1]
    });

    let profile = parse_cpuprofile(&raw).unwrap();
    assert_eq!(profile.node(NodeIndex(2)).depth, 2);
    assert_eq!(profile.node_by_index(0), Some(NodeIndex(2)));
    assert_eq!(profile.node(NodeIndex(2)).call_frame.line_number, -1);
}

#[test]
fn test_unknown_sample_id_resolves_to_none() {
    let mut raw = create_test_profile();
    raw["samples"] = json!([2, 77, 4, 3]);

    let profile = parse_cpuprofile(&raw).unwrap();
    assert_eq!(profile.node_by_index(1), None);
    assert_eq!(profile.node_by_index(2), Some(NodeIndex(3)));
}

#[test]
fn test_duplicate_node_id_rejected() {
    let mut raw = create_test_profile();
    raw["nodes"][3]["id"] = json!(2);

    assert!(parse_cpuprofile(&raw).is_err());
}

#[test]
fn test_cycle_rejected() {
    let raw = json!({
        "nodes": [
            { "id": 1, "parent": 2, "callFrame": { "functionName": "a" } },
            { "id": 2, "parent": 1, "callFrame": { "functionName": "b" } }
        ],
        "startTime": 0,
        "endTime": 0,
        "samples": [],
        "timeDeltas": []
    });

    assert!(matches!(
        parse_cpuprofile(&raw),
        Err(ParseError::InvalidFormat(_))
    ));
}

#[test]
fn test_non_object_rejected() {
    assert!(parse_cpuprofile(&json!([1, 2, 3])).is_err());
}

#[test]
fn test_read_cpuprofile_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", create_test_profile()).unwrap();

    let (raw, profile) = read_cpuprofile(file.path()).unwrap();
    assert_eq!(raw.nodes.len(), 4);
    assert_eq!(profile.samples(), &[2, 4, 4, 3]);
    assert_eq!(profile.end_time(), 1040.0);
}

#[test]
fn test_read_cpuprofile_missing_file() {
    assert!(matches!(
        read_cpuprofile("/nonexistent/app.cpuprofile"),
        Err(ParseError::IoError(_))
    ));
}
