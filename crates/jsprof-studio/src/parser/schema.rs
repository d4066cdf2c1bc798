//! Schema definitions for V8 `.cpuprofile` data.
//!
//! These mirror the JSON written by the profiler (camelCase keys) and are
//! also serialized back out when a profile is embedded into a trace.

use serde::{Deserialize, Deserializer, Serialize};

/// A single call frame of the profiled program
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    /// Function name, empty for anonymous functions
    #[serde(default)]
    pub function_name: String,

    /// Engine script identifier (number or string in the wild)
    #[serde(default, deserialize_with = "deserialize_script_id")]
    pub script_id: String,

    /// Script url, or a `native ...` marker for engine frames
    #[serde(default)]
    pub url: String,

    /// 0-based line, -1 when unknown
    #[serde(default = "unknown_position")]
    pub line_number: i64,

    /// 0-based column, -1 when unknown
    #[serde(default = "unknown_position")]
    pub column_number: i64,
}

impl CallFrame {
    pub fn new(
        function_name: impl Into<String>,
        script_id: impl Into<String>,
        url: impl Into<String>,
        line_number: i64,
        column_number: i64,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            script_id: script_id.into(),
            url: url.into(),
            line_number,
            column_number,
        }
    }

    /// Frame identity used when diffing stacks.
    ///
    /// Url and column are ignored: two frames on the same line of the same
    /// script and function are the same frame.
    pub fn same_frame(&self, other: &CallFrame) -> bool {
        self.script_id == other.script_id
            && self.function_name == other.function_name
            && self.line_number == other.line_number
    }
}

fn unknown_position() -> i64 {
    -1
}

fn deserialize_script_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScriptId {
        Number(i64),
        Text(String),
    }

    Ok(match ScriptId::deserialize(deserializer)? {
        ScriptId::Number(n) => n.to_string(),
        ScriptId::Text(s) => s,
    })
}

/// Top-level `.cpuprofile` document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCpuProfile {
    /// Call tree nodes
    pub nodes: Vec<RawProfileNode>,

    /// Profile start in microseconds
    pub start_time: f64,

    /// Profile end in microseconds
    pub end_time: f64,

    /// Leaf node id of every sample
    #[serde(default)]
    pub samples: Vec<u64>,

    /// Microseconds between consecutive samples (first is relative to start)
    #[serde(default)]
    pub time_deltas: Vec<f64>,
}

/// A node of the call tree as written by the profiler
///
/// Standalone profiles link nodes through `children`; profiles extracted
/// from traces use `parent` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfileNode {
    pub id: u64,

    pub call_frame: CallFrame,

    #[serde(default)]
    pub hit_count: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
}
