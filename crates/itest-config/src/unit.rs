//! Unit descriptor (ExampleInfo.json)
//!
//! Handles the per-unit descriptor stored next to each launcher.

use crate::{ConfigError, ConfigResult};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// File name of the descriptor inside a unit's marker directory
pub const DESCRIPTOR_FILE: &str = "ExampleInfo.json";

/// Timeout applied when a descriptor does not declare one
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Largest accepted timeout (one week)
pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Unit configuration from ExampleInfo.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitConfig {
    /// Wall-clock limit for the whole unit, in seconds
    #[serde(rename = "timeoutSec", default = "default_timeout")]
    pub timeout_secs: u64,

    /// Regular expressions that must all match the captured output.
    /// Empty means exit-code-only verification.
    #[serde(rename = "successRegex", default)]
    pub success_patterns: Vec<String>,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            success_patterns: Vec::new(),
        }
    }
}

impl UnitConfig {
    /// Load a descriptor from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError {
                    file: path.to_path_buf(),
                    error: e,
                }
            }
        })?;

        Self::from_json_str(&content, path)
    }

    /// Parse descriptor content; `file` is only used for error messages
    pub fn from_json_str(content: &str, file: &Path) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
                file: file.to_path_buf(),
                detail: e.to_string(),
            })?;

        config.validate(file)?;
        Ok(config)
    }

    /// Validate the descriptor values
    pub fn validate(&self, file: &Path) -> ConfigResult<()> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeoutSec".to_string(),
                file: file.to_path_buf(),
                reason: "timeout must be a positive number of seconds".to_string(),
            });
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "timeoutSec".to_string(),
                file: file.to_path_buf(),
                reason: format!("timeout must not exceed {} seconds", MAX_TIMEOUT_SECS),
            });
        }

        for pattern in &self.success_patterns {
            RegexBuilder::new(pattern)
                .dot_matches_new_line(true)
                .build()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "successRegex".to_string(),
                    file: file.to_path_buf(),
                    reason: format!("'{}' is not a valid regex: {}", pattern, e),
                })?;
        }

        Ok(())
    }

    /// Timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether output patterns take part in verification
    pub fn has_patterns(&self) -> bool {
        !self.success_patterns.is_empty()
    }
}
