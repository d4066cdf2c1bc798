//! Turn profiler samples into instant sample events carrying full stacks.
//!
//! Each sample names only its leaf node; the stack is rebuilt by walking the
//! parent chain. Stacks are memoized per leaf, so consecutive samples on the
//! same node share one allocation.

use super::event::{SampleKind, TraceEvent};
use crate::parser::{CallFrame, NodeIndex, ProfileModel};
use log::{debug, error};
use std::collections::HashMap;
use std::iter;
use std::sync::Arc;

/// Leaf node -> leaf-first call stack, scoped to one materializer run
#[derive(Debug, Default)]
pub struct StackCache {
    stacks: HashMap<NodeIndex, Arc<[CallFrame]>>,
}

impl StackCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack of `node`, built on first request
    ///
    /// The root is not part of any stack.
    pub fn stack_for(&mut self, profile: &ProfileModel, node: NodeIndex) -> Arc<[CallFrame]> {
        if let Some(stack) = self.stacks.get(&node) {
            return Arc::clone(stack);
        }

        let mut frames = Vec::with_capacity(profile.node(node).depth);
        let mut current = profile.node(node);
        while let Some(parent) = current.parent {
            frames.push(current.call_frame.clone());
            current = profile.node(parent);
        }

        let stack: Arc<[CallFrame]> = frames.into();
        self.stacks.insert(node, Arc::clone(&stack));
        stack
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}

/// Classify a sample by its leaf node
pub fn classify_sample(profile: &ProfileModel, node: NodeIndex) -> SampleKind {
    let node = Some(node);
    if node == profile.idle_node() {
        SampleKind::IdleSample
    } else if node == profile.program_node() || node == profile.gc_node() {
        SampleKind::SystemSample
    } else {
        SampleKind::Sample
    }
}

/// Emit one instant sample event per resolvable sample
///
/// **Public** - main entry point of the materializer
///
/// Unresolvable samples are logged and skipped. GC samples have no stack of
/// their own: a run of GC samples shares the stack built for its first
/// sample, which is the GC frame on top of the preceding sample's stack.
pub fn materialize_samples(profile: &ProfileModel, thread_id: u32) -> Vec<TraceEvent> {
    let samples = profile.samples();
    let timestamps = profile.timestamps();
    let gc_node = profile.gc_node();

    let mut cache = StackCache::new();
    let mut events = Vec::with_capacity(samples.len());

    let mut prev_node = profile.root();
    let mut prev_stack: Arc<[CallFrame]> = Arc::from(Vec::new());

    for (i, &timestamp) in timestamps.iter().enumerate().take(samples.len()) {
        let Some(node) = profile.node_by_index(i) else {
            error!("Node with unknown id {} at index {}", samples[i], i);
            continue;
        };

        let stack = if Some(node) == gc_node {
            if prev_node == gc_node {
                Arc::clone(&prev_stack)
            } else {
                iter::once(profile.node(node).call_frame.clone())
                    .chain(prev_stack.iter().cloned())
                    .collect()
            }
        } else {
            cache.stack_for(profile, node)
        };

        let kind = classify_sample(profile, node);
        events.push(TraceEvent::sample(kind, timestamp, Arc::clone(&stack)).with_thread(thread_id));

        prev_node = Some(node);
        prev_stack = stack;
    }

    debug!(
        "Materialized {} sample events ({} distinct stacks)",
        events.len(),
        cache.len()
    );

    events
}
