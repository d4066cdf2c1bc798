//! Trace-event JSON output writer.
//!
//! Writes synthesized frames (and optionally the samples they came from) as
//! a `{"traceEvents": [...], "metadata": {...}}` document that trace viewers
//! load directly.

use crate::timeline::{FrameEvent, FrameTimeline, Phase, SynthesisStats, TraceEvent};
use crate::utils::config::{DEFAULT_PID, SCHEMA_VERSION, TIMELINE_CATEGORY};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// One entry of `traceEvents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEventPayload {
    pub name: String,

    #[serde(default)]
    pub cat: String,

    pub ph: String,

    /// Start time in microseconds
    #[serde(default)]
    pub ts: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dur: Option<f64>,

    #[serde(default)]
    pub pid: u32,

    #[serde(default)]
    pub tid: u32,

    /// Scope of instant events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,

    #[serde(default)]
    pub args: serde_json::Value,
}

impl TraceEventPayload {
    /// Complete event for one synthesized frame
    ///
    /// `args.data` is the call frame. Frames left open carry `args.open`.
    pub fn from_frame(frame: &FrameEvent) -> Self {
        let mut args = json!({ "data": frame.call_frame });
        if !frame.closed {
            args["open"] = json!(true);
        }

        Self {
            name: frame.kind.name().to_string(),
            cat: TIMELINE_CATEGORY.to_string(),
            ph: Phase::Complete.as_str().to_string(),
            ts: frame.start_time,
            dur: Some(frame.duration()),
            pid: DEFAULT_PID,
            tid: frame.thread_id,
            s: None,
            args,
        }
    }

    /// Instant event for one materialized sample, stack leaf first
    pub fn from_sample(event: &TraceEvent) -> Self {
        let stack = event.stack.as_deref().unwrap_or(&[]);

        Self {
            name: event.name.clone(),
            cat: TIMELINE_CATEGORY.to_string(),
            ph: Phase::Instant.as_str().to_string(),
            ts: event.start_time,
            dur: None,
            pid: DEFAULT_PID,
            tid: event.thread_id,
            s: Some("t".to_string()),
            args: json!({ "data": { "stackTrace": stack } }),
        }
    }
}

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Output schema version
    pub version: String,

    /// ISO 8601 generation time
    pub generated_at: String,

    /// Input the trace was built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default)]
    pub frame_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<SynthesisStats>,
}

impl TraceMetadata {
    pub fn new(source: Option<String>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            source,
            frame_count: 0,
            stats: None,
        }
    }
}

/// Trace document written by this crate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceFile {
    #[serde(rename = "traceEvents")]
    pub trace_events: Vec<TraceEventPayload>,

    pub metadata: TraceMetadata,
}

/// Assemble a trace document from a timeline
///
/// **Public** - converts core output to the on-disk schema
///
/// # Arguments
/// * `timeline` - Synthesized frames
/// * `samples` - Sample events to include as instants, if any
/// * `source` - Description of the input, stored in the metadata
pub fn build_trace_file(
    timeline: &FrameTimeline,
    samples: Option<&[TraceEvent]>,
    source: Option<String>,
) -> TraceFile {
    let mut trace_events: Vec<TraceEventPayload> = timeline
        .frames
        .iter()
        .map(TraceEventPayload::from_frame)
        .collect();

    if let Some(samples) = samples {
        trace_events.extend(samples.iter().map(TraceEventPayload::from_sample));
        trace_events.sort_by(|a, b| a.ts.total_cmp(&b.ts));
    }

    let mut metadata = TraceMetadata::new(source);
    metadata.frame_count = timeline.frames.len();
    metadata.stats = Some(timeline.stats);

    TraceFile {
        trace_events,
        metadata,
    }
}

/// Write a trace document to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_trace(trace: &TraceFile, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing trace to: {}", output_path.display());

    super::validate_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, trace).map_err(OutputError::SerializationFailed)?;

    info!(
        "Trace written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Calculate file size in bytes
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a trace document written by [`write_trace`]
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_trace(input_path: impl AsRef<Path>) -> Result<TraceFile, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading trace from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let trace: TraceFile =
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Trace loaded: version {}, {} events",
        trace.metadata.version,
        trace.trace_events.len()
    );

    Ok(trace)
}

/// Either shape a trace-event file may take
#[derive(Deserialize)]
#[serde(untagged)]
enum TraceEventsDocument {
    Array(Vec<TraceEventPayload>),
    Object {
        #[serde(rename = "traceEvents")]
        trace_events: Vec<TraceEventPayload>,
    },
}

/// Read the complete events of a recorded trace as invocation candidates
///
/// Accepts both the bare array and the `{"traceEvents": [...]}` form. Only
/// `X` events with a duration are kept; when `thread_id` is given, only
/// those of that thread.
pub fn read_invocations(
    input_path: impl AsRef<Path>,
    thread_id: Option<u32>,
) -> Result<Vec<TraceEvent>, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading invocation events from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let document: TraceEventsDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::SerializationFailed)?;
    let payloads = match document {
        TraceEventsDocument::Array(events) => events,
        TraceEventsDocument::Object { trace_events } => trace_events,
    };

    let events: Vec<TraceEvent> = payloads
        .into_iter()
        .filter(|p| p.ph == Phase::Complete.as_str())
        .filter(|p| thread_id.map_or(true, |tid| p.tid == tid))
        .filter_map(|p| {
            let dur = p.dur?;
            Some(TraceEvent::complete(p.name, p.ts, p.ts + dur).with_thread(p.tid))
        })
        .collect();

    debug!("Loaded {} invocation candidates", events.len());

    Ok(events)
}
