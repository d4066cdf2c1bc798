//! Profile model built from V8 `.cpuprofile` JSON.
//!
//! Resolves the node tree (parent links, depths), the sentinel nodes the
//! profiler emits for idle / program / GC time, and absolute sample
//! timestamps.

use super::schema::{CallFrame, RawCpuProfile, RawProfileNode};
use crate::utils::config::{GC_FUNCTION_NAME, IDLE_FUNCTION_NAME, PROGRAM_FUNCTION_NAME};
use crate::utils::error::ParseError;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Position of a node inside [`ProfileModel`]'s node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

/// A resolved call tree node
#[derive(Debug, Clone)]
pub struct ProfileNode {
    /// Id the profiler assigned to this node
    pub id: u64,

    /// Parent node, `None` for the root
    pub parent: Option<NodeIndex>,

    /// Distance from the root (root is 0)
    pub depth: usize,

    pub call_frame: CallFrame,
}

/// Read-only profile the timeline core consumes
#[derive(Debug, Clone, Default)]
pub struct ProfileModel {
    nodes: Vec<ProfileNode>,
    index_by_id: HashMap<u64, NodeIndex>,
    root: Option<NodeIndex>,
    idle_node: Option<NodeIndex>,
    program_node: Option<NodeIndex>,
    gc_node: Option<NodeIndex>,
    samples: Vec<u64>,
    timestamps: Vec<f64>,
    start_time: f64,
    end_time: f64,
}

impl ProfileModel {
    /// A profile with no nodes and no samples
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve a raw profile into a model
    ///
    /// Unknown sample ids are kept as they are; the sample materializer
    /// reports and skips them.
    ///
    /// # Errors
    /// * `ParseError::InvalidFormat` - no nodes, duplicate ids, dangling
    ///   parent links, cycles, or timestamp arrays of the wrong length
    pub fn from_raw(raw: &RawCpuProfile) -> Result<Self, ParseError> {
        if raw.nodes.is_empty() {
            return Err(ParseError::InvalidFormat("Profile has no nodes".to_string()));
        }

        let index_by_id = index_nodes(&raw.nodes)?;
        let parents = resolve_parents(&raw.nodes, &index_by_id)?;
        let depths = compute_depths(&parents)?;

        let mut roots = parents
            .iter()
            .enumerate()
            .filter(|(_, parent)| parent.is_none())
            .map(|(i, _)| NodeIndex(i));
        let root = roots.next();
        let extra_roots = roots.count();
        if extra_roots > 0 {
            warn!("Profile has {} detached subtrees besides the root", extra_roots);
        }

        let nodes: Vec<ProfileNode> = raw
            .nodes
            .iter()
            .zip(parents)
            .zip(depths)
            .map(|((node, parent), depth)| ProfileNode {
                id: node.id,
                parent,
                depth,
                call_frame: node.call_frame.clone(),
            })
            .collect();

        let find_sentinel = |name: &str| {
            nodes
                .iter()
                .position(|n| n.call_frame.function_name == name)
                .map(NodeIndex)
        };
        let idle_node = find_sentinel(IDLE_FUNCTION_NAME);
        let program_node = find_sentinel(PROGRAM_FUNCTION_NAME);
        let gc_node = find_sentinel(GC_FUNCTION_NAME);

        let timestamps = compute_timestamps(raw)?;

        debug!(
            "Resolved profile: {} nodes, {} samples",
            nodes.len(),
            raw.samples.len()
        );

        Ok(Self {
            nodes,
            index_by_id,
            root,
            idle_node,
            program_node,
            gc_node,
            samples: raw.samples.clone(),
            timestamps,
            start_time: raw.start_time,
            end_time: raw.end_time,
        })
    }

    /// Resolve the leaf node of sample `i`
    pub fn node_by_index(&self, i: usize) -> Option<NodeIndex> {
        self.samples
            .get(i)
            .and_then(|id| self.index_by_id.get(id))
            .copied()
    }

    pub fn node(&self, index: NodeIndex) -> &ProfileNode {
        &self.nodes[index.0]
    }

    pub fn nodes(&self) -> &[ProfileNode] {
        &self.nodes
    }

    /// Raw sample ids, parallel to [`ProfileModel::timestamps`]
    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    /// Absolute sample times in microseconds
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn idle_node(&self) -> Option<NodeIndex> {
        self.idle_node
    }

    pub fn program_node(&self) -> Option<NodeIndex> {
        self.program_node
    }

    pub fn gc_node(&self) -> Option<NodeIndex> {
        self.gc_node
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Parse a `.cpuprofile` JSON value into a model
///
/// **Public** - main entry point for parsing
pub fn parse_cpuprofile(raw_profile: &serde_json::Value) -> Result<ProfileModel, ParseError> {
    if !raw_profile.is_object() {
        return Err(ParseError::InvalidFormat(
            "Profile must be a JSON object".to_string(),
        ));
    }
    let raw: RawCpuProfile = serde_json::from_value(raw_profile.clone())?;
    ProfileModel::from_raw(&raw)
}

/// Read a `.cpuprofile` from disk
///
/// Returns both the raw document (for re-embedding) and the resolved model.
pub fn read_cpuprofile(
    input_path: impl AsRef<Path>,
) -> Result<(RawCpuProfile, ProfileModel), ParseError> {
    let input_path = input_path.as_ref();

    debug!("Reading profile from: {}", input_path.display());

    let file = File::open(input_path)?;
    let raw: RawCpuProfile = serde_json::from_reader(BufReader::new(file))?;
    let model = ProfileModel::from_raw(&raw)?;

    Ok((raw, model))
}

fn index_nodes(nodes: &[RawProfileNode]) -> Result<HashMap<u64, NodeIndex>, ParseError> {
    let mut index_by_id = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if index_by_id.insert(node.id, NodeIndex(i)).is_some() {
            return Err(ParseError::InvalidFormat(format!(
                "Duplicate node id {}",
                node.id
            )));
        }
    }
    Ok(index_by_id)
}

fn resolve_parents(
    nodes: &[RawProfileNode],
    index_by_id: &HashMap<u64, NodeIndex>,
) -> Result<Vec<Option<NodeIndex>>, ParseError> {
    let lookup = |id: u64| {
        index_by_id
            .get(&id)
            .copied()
            .ok_or_else(|| ParseError::InvalidFormat(format!("Unknown node id {} in tree", id)))
    };

    let mut parents = vec![None; nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        if let Some(parent_id) = node.parent {
            parents[i] = Some(lookup(parent_id)?);
        }
        for &child_id in &node.children {
            let child = lookup(child_id)?;
            parents[child.0] = Some(NodeIndex(i));
        }
    }
    Ok(parents)
}

fn compute_depths(parents: &[Option<NodeIndex>]) -> Result<Vec<usize>, ParseError> {
    let mut depths: Vec<Option<usize>> = vec![None; parents.len()];
    let mut chain = Vec::new();

    for start in 0..parents.len() {
        // Walk up until a node with a known depth (or the root)
        let mut current = Some(NodeIndex(start));
        let mut base = None;
        while let Some(index) = current {
            if let Some(depth) = depths[index.0] {
                base = Some(depth);
                break;
            }
            if chain.len() > parents.len() {
                return Err(ParseError::InvalidFormat(
                    "Cycle in profile node tree".to_string(),
                ));
            }
            chain.push(index);
            current = parents[index.0];
        }

        let mut depth = base.map_or(0, |d| d + 1);
        while let Some(index) = chain.pop() {
            depths[index.0] = Some(depth);
            depth += 1;
        }
    }

    Ok(depths.into_iter().map(|d| d.unwrap_or(0)).collect())
}

fn compute_timestamps(raw: &RawCpuProfile) -> Result<Vec<f64>, ParseError> {
    let count = raw.samples.len();

    if raw.time_deltas.len() == count {
        let mut time = raw.start_time;
        return Ok(raw
            .time_deltas
            .iter()
            .map(|delta| {
                time += delta;
                time
            })
            .collect());
    }

    if raw.time_deltas.is_empty() {
        warn!("Profile has no timeDeltas, spreading samples evenly");
        let step = if count > 0 {
            (raw.end_time - raw.start_time) / count as f64
        } else {
            0.0
        };
        return Ok((0..count)
            .map(|i| raw.start_time + step * i as f64)
            .collect());
    }

    Err(ParseError::InvalidFormat(format!(
        "{} samples but {} time deltas",
        count,
        raw.time_deltas.len()
    )))
}
