//! Stack filtering applied before frames are diffed.

use crate::parser::CallFrame;
use crate::utils::config::{ProcessorConfig, NATIVE_RUNTIME_URL, NATIVE_URL_PREFIX};

/// Runtime-call-stats group a native function belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeGroup {
    Parse,
    Compile,
}

impl NativeGroup {
    /// Group by function name prefix
    pub fn of(function_name: &str) -> Option<Self> {
        if function_name.starts_with("Parse") {
            Some(NativeGroup::Parse)
        } else if function_name.starts_with("Compile") || function_name.starts_with("Recompile") {
            Some(NativeGroup::Compile)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NativeGroup::Parse => "Parse",
            NativeGroup::Compile => "Compile",
        }
    }
}

/// Where a frame's code lives, judged from its url
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOrigin {
    /// Engine runtime function reported through runtime call stats
    Runtime,
    /// Any other native function
    Native,
    Script,
}

impl FrameOrigin {
    pub fn of(frame: &CallFrame) -> Self {
        if frame.url == NATIVE_RUNTIME_URL {
            FrameOrigin::Runtime
        } else if frame.url.starts_with(NATIVE_URL_PREFIX) {
            FrameOrigin::Native
        } else {
            FrameOrigin::Script
        }
    }
}

/// Applies a [`ProcessorConfig`] to root-first stacks
#[derive(Debug, Clone, Copy, Default)]
pub struct StackFilter {
    config: ProcessorConfig,
}

impl StackFilter {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Drop hidden frames in place and collapse runs of one native group
    pub fn apply(&self, stack: &mut Vec<CallFrame>) {
        if self.config.show_all_events {
            return;
        }

        let mut previous_group: Option<NativeGroup> = None;
        stack.retain(|frame| {
            let group = match FrameOrigin::of(frame) {
                FrameOrigin::Runtime => {
                    let group = NativeGroup::of(&frame.function_name);
                    if !self.config.show_runtime_call_stats || group.is_none() {
                        return false;
                    }
                    group
                }
                FrameOrigin::Native => {
                    if !self.config.show_native_functions {
                        return false;
                    }
                    None
                }
                FrameOrigin::Script => None,
            };

            if group.is_some() && group == previous_group {
                return false;
            }
            previous_group = group;
            true
        });
    }
}
