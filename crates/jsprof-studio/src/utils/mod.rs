//! Utility modules for configuration, error handling, and logging.

pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use config::{load_config, ProcessorConfig};
pub use error::{ConfigError, OutputError, ParseError};
