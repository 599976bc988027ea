//! Run-wide settings for one invocation

use std::path::PathBuf;

/// Default worker count; units may bind the same ports, so run serially
pub const DEFAULT_WORKERS: usize = 1;

/// Default executor program resolved from PATH
pub const DEFAULT_EXECUTOR: &str = "jbang";

/// Default root for log files
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// How per-unit log files are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// `logs/<unit>_<timestamp>.log`
    #[default]
    Flat,
    /// `logs/run-<timestamp>/<unit>.log`
    Structured,
}

/// Settings shared by the scheduler and runner for a single invocation
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Size of the worker pool
    pub workers: usize,
    /// Echo captured output and extra diagnostics
    pub verbose: bool,
    /// Stream unit output live instead of buffering it to the log file
    pub stream: bool,
    /// Stop dispatching new units after the first failure
    pub fail_fast: bool,
    /// Log file layout
    pub log_mode: LogMode,
    /// Root directory for log files
    pub logs_dir: PathBuf,
    /// Program that executes a launcher
    pub executor: PathBuf,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            verbose: false,
            stream: false,
            fail_fast: false,
            log_mode: LogMode::Flat,
            logs_dir: PathBuf::from(DEFAULT_LOGS_DIR),
            executor: PathBuf::from(DEFAULT_EXECUTOR),
        }
    }
}

impl RunContext {
    /// Set the worker count (at least one)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Enable or disable fail-fast
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Enable or disable live streaming
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Enable or disable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the log layout
    pub fn with_log_mode(mut self, log_mode: LogMode) -> Self {
        self.log_mode = log_mode;
        self
    }

    /// Set the log root directory
    pub fn with_logs_dir(mut self, logs_dir: impl Into<PathBuf>) -> Self {
        self.logs_dir = logs_dir.into();
        self
    }

    /// Set the executor program
    pub fn with_executor(mut self, executor: impl Into<PathBuf>) -> Self {
        self.executor = executor.into();
        self
    }
}
