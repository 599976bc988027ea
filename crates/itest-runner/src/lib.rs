//! itest orchestration engine
//!
//! Discovers integration-test units, runs each one as an external process
//! under its declared timeout, verifies the outcome and aggregates a report:
//! - Unit discovery (`integration-tests/Run*.java` launchers)
//! - Process execution with buffered or live-streamed output capture
//! - Exit-code and success-pattern verification
//! - Bounded worker pool with fail-fast cancellation
//! - Markdown report rendering and console summaries
//! - Log layout (flat or per-run directories) and log cleanup

pub mod console;
pub mod context;
pub mod discovery;
pub mod display;
pub mod environment;
pub mod error;
pub mod logs;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod scheduler;
pub mod verify;

// Re-export main types
pub use console::ConsoleReporter;
pub use context::{LogMode, RunContext};
pub use discovery::{TestUnit, UnitSuite};
pub use environment::validate_environment;
pub use error::{RunnerError, RunnerResult};
pub use logs::{clean_logs, CleanupStats, LogLayout};
pub use outcome::{ExecutionOutcome, OutcomeStatus};
pub use report::{ReportStats, RunReport};
pub use runner::UnitRunner;
pub use scheduler::Scheduler;
pub use verify::{verify, Verdict};
