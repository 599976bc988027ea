//! CLI configuration via environment variables
//!
//! Every setting here has a matching command-line flag; flags win.

use std::env;
use std::path::PathBuf;

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Executor program (ITEST_EXECUTOR)
    pub executor: Option<PathBuf>,
    /// Worker count (ITEST_WORKERS); unparsable values are ignored
    pub workers: Option<usize>,
    /// Log root (ITEST_LOGS_DIR)
    pub logs_dir: Option<PathBuf>,
    /// Disable colored output (ITEST_NO_COLOR=1 or NO_COLOR=1)
    pub no_color: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            executor: non_empty("ITEST_EXECUTOR").map(PathBuf::from),
            workers: non_empty("ITEST_WORKERS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0),
            logs_dir: non_empty("ITEST_LOGS_DIR").map(PathBuf::from),
            no_color: lookup("ITEST_NO_COLOR").is_some() || lookup("NO_COLOR").is_some(),
        }
    }
}
