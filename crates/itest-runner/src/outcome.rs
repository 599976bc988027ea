//! Result of attempting one unit

use crate::discovery::TestUnit;
use std::path::PathBuf;
use std::time::Duration;

/// Message attached to passing outcomes
pub const SUCCESS_MESSAGE: &str = "Success";
/// Message attached to units skipped by fail-fast
pub const CANCELLED_MESSAGE: &str = "Cancelled (fail-fast)";

/// Coarse classification of an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Exit code 0 and every success pattern matched
    Passed,
    /// Configuration, execution or verification failure
    Failed,
    /// The unit exceeded its declared timeout
    TimedOut,
    /// Never started because fail-fast cancelled the run
    Cancelled,
}

/// Outcome of one unit; produced exactly once per attempted unit
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// The unit that was attempted
    pub unit: TestUnit,
    /// Classification
    pub status: OutcomeStatus,
    /// Human-readable reason ("Success", "Exit code 2", ...)
    pub message: String,
    /// Wall-clock time spent on the unit
    pub elapsed: Duration,
    /// Log file holding the captured output, when one was created
    pub log_file: Option<PathBuf>,
}

impl ExecutionOutcome {
    pub fn passed(unit: TestUnit, elapsed: Duration, log_file: Option<PathBuf>) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Passed,
            message: SUCCESS_MESSAGE.to_string(),
            elapsed,
            log_file,
        }
    }

    pub fn failed(
        unit: TestUnit,
        message: impl Into<String>,
        elapsed: Duration,
        log_file: Option<PathBuf>,
    ) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Failed,
            message: message.into(),
            elapsed,
            log_file,
        }
    }

    pub fn timed_out(
        unit: TestUnit,
        timeout_secs: u64,
        elapsed: Duration,
        log_file: Option<PathBuf>,
    ) -> Self {
        Self {
            unit,
            status: OutcomeStatus::TimedOut,
            message: format!("Timeout after {}s", timeout_secs),
            elapsed,
            log_file,
        }
    }

    pub fn cancelled(unit: TestUnit) -> Self {
        Self {
            unit,
            status: OutcomeStatus::Cancelled,
            message: CANCELLED_MESSAGE.to_string(),
            elapsed: Duration::ZERO,
            log_file: None,
        }
    }

    /// Check if this outcome is a pass
    pub fn is_pass(&self) -> bool {
        self.status == OutcomeStatus::Passed
    }

    /// Check if this outcome counts as a failure (cancellations included)
    pub fn is_fail(&self) -> bool {
        !self.is_pass()
    }

    /// Check if the unit was never started
    pub fn is_cancelled(&self) -> bool {
        self.status == OutcomeStatus::Cancelled
    }

    /// Elapsed time in fractional seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}
