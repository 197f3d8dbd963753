//! Offline driver for the volctl filters
//!
//! Streams a headerless PCM file through one of the gain elements in
//! fixed-size buffers, the way a pipeline would push buffers through it.

pub mod config;
pub mod error;
pub mod host;
pub mod runner;

pub use config::{CliConfig, CliOverrides};
pub use error::{CliError, Result};
pub use host::LoggingHost;
pub use runner::{process_file, process_stream, ProcessingStats};
