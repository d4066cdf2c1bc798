//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod convert;
pub mod models;
pub mod utils;
pub mod wrap;

// Re-export main command functions
pub use convert::{execute_convert, validate_args};
pub use models::{ConvertArgs, WrapArgs};
pub use utils::{display_version, validate_profile_file};
pub use wrap::execute_wrap;
