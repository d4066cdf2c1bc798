//! Profile parsing and schema definitions.
//!
//! This module handles:
//! - Deserializing V8 `.cpuprofile` JSON
//! - Resolving the call tree into a [`ProfileModel`]
//! - The [`CallFrame`] type shared with the timeline core

pub mod cpuprofile;
pub mod schema;

// Re-export main types
pub use cpuprofile::{parse_cpuprofile, read_cpuprofile, NodeIndex, ProfileModel, ProfileNode};
pub use schema::{CallFrame, RawCpuProfile, RawProfileNode};
