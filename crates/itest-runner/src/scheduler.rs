//! Scheduler - run units on a bounded worker pool
//!
//! Units are dispatched onto a rayon pool sized to the configured worker
//! count. Outcomes come back over a channel and are collected in completion
//! order. With fail-fast on, the first failing outcome raises a shared flag;
//! units that have not started yet see it and are cancelled instead of run.

use crate::discovery::TestUnit;
use crate::error::{RunnerError, RunnerResult};
use crate::outcome::ExecutionOutcome;
use crate::report::RunReport;
use crate::runner::UnitRunner;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Dispatches units to a fixed-size worker pool
pub struct Scheduler {
    runner: UnitRunner,
    workers: usize,
    fail_fast: bool,
}

impl Scheduler {
    /// Create a scheduler with one worker and fail-fast off
    pub fn new(runner: UnitRunner) -> Self {
        Self {
            runner,
            workers: 1,
            fail_fast: false,
        }
    }

    /// Set the pool size (at least one)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Enable or disable fail-fast
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Run every unit and collect the report
    pub fn run_all(&self, units: &[TestUnit]) -> RunnerResult<RunReport> {
        self.run_all_with(units, |_| {})
    }

    /// Run every unit, calling `on_outcome` as each one completes
    ///
    /// The callback runs on the calling thread, in completion order.
    pub fn run_all_with<F>(&self, units: &[TestUnit], mut on_outcome: F) -> RunnerResult<RunReport>
    where
        F: FnMut(&ExecutionOutcome),
    {
        let start = Instant::now();
        if units.is_empty() {
            return Ok(RunReport::new(Vec::new(), start.elapsed()));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("itest-worker-{}", i))
            .build()
            .map_err(|e| RunnerError::WorkerPool(e.to_string()))?;

        info!(units = units.len(), workers = self.workers, "starting run");

        let cancelled = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel();
        let mut outcomes = Vec::with_capacity(units.len());

        pool.in_place_scope(|scope| {
            for unit in units {
                let tx = tx.clone();
                let cancelled = &cancelled;
                scope.spawn(move |_| {
                    let outcome = self.attempt(unit, cancelled);
                    // The receiver outlives the scope, so this only fails if
                    // the collecting thread panicked
                    let _ = tx.send(outcome);
                });
            }
            drop(tx);

            for outcome in rx.iter() {
                on_outcome(&outcome);
                outcomes.push(outcome);
            }
        });

        let report = RunReport::new(outcomes, start.elapsed());
        info!(
            passed = report.stats().passed,
            failed = report.stats().failed,
            "run finished in {:.1}s",
            report.total_duration.as_secs_f64()
        );
        Ok(report)
    }

    /// Run one unit unless fail-fast has already tripped
    fn attempt(&self, unit: &TestUnit, cancelled: &AtomicBool) -> ExecutionOutcome {
        if self.fail_fast && cancelled.load(Ordering::SeqCst) {
            debug!(unit = %unit.id(), "cancelled before start");
            return ExecutionOutcome::cancelled(unit.clone());
        }

        let outcome = self.runner.run(unit);
        // Raised before the outcome is sent so that no later dispatch can
        // miss it
        if self.fail_fast && outcome.is_fail() && !cancelled.swap(true, Ordering::SeqCst) {
            warn!(unit = %unit.id(), "fail-fast: cancelling units not yet started");
        }
        outcome
    }
}
