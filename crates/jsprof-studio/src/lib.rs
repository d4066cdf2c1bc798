//! jsprof studio library
//!
//! Turns sampled JavaScript CPU profiles into per-call-frame timeline
//! intervals. This exposes the internal modules for the CLI and for testing.

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod timeline;
pub mod utils;
