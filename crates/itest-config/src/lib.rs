//! itest unit configuration
//!
//! Every integration-test unit carries a descriptor file, `ExampleInfo.json`,
//! next to its launcher. The descriptor declares:
//! - the execution timeout in seconds (`timeoutSec`, default 300)
//! - the success patterns that must match the captured output (`successRegex`)
//!
//! Unknown fields are ignored so that descriptors can carry data meant for the
//! launcher itself (required environment variables, setup commands, ...).
//!
//! # Example
//!
//! ```no_run
//! use itest_config::UnitConfig;
//! use std::path::Path;
//!
//! let config = UnitConfig::load_from_file(Path::new("integration-tests/ExampleInfo.json")).unwrap();
//! println!("timeout: {}s", config.timeout_secs);
//! ```

pub mod unit;

use std::path::PathBuf;
use thiserror::Error;

/// Descriptor loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {error}", .file.display())]
    IoError {
        file: PathBuf,
        error: std::io::Error,
    },

    #[error("Invalid JSON in {}: {detail}", .file.display())]
    ParseError { file: PathBuf, detail: String },

    #[error("Invalid value for '{field}' in {}: {reason}", .file.display())]
    InvalidValue {
        field: String,
        file: PathBuf,
        reason: String,
    },
}

/// Result type for descriptor operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use unit::{UnitConfig, DEFAULT_TIMEOUT_SECS, DESCRIPTOR_FILE, MAX_TIMEOUT_SECS};
