//! Run report - aggregate outcomes and render them as Markdown

use crate::error::{RunnerError, RunnerResult};
use crate::outcome::ExecutionOutcome;
use chrono::Local;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// All outcomes of one invocation, in completion order
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<ExecutionOutcome>,
    /// Wall-clock duration of the whole run
    pub total_duration: Duration,
}

/// Derived counts and timings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportStats {
    pub total: usize,
    pub passed: usize,
    /// Failures, timeouts and cancellations
    pub failed: usize,
    pub passed_pct: f64,
    pub failed_pct: f64,
    /// Mean elapsed seconds per outcome
    pub avg_secs: f64,
    /// Longest elapsed seconds
    pub max_secs: f64,
}

impl RunReport {
    pub fn new(outcomes: Vec<ExecutionOutcome>, total_duration: Duration) -> Self {
        Self {
            outcomes,
            total_duration,
        }
    }

    /// Compute counts, percentages and timings
    pub fn stats(&self) -> ReportStats {
        let total = self.outcomes.len();
        let passed = self.outcomes.iter().filter(|o| o.is_pass()).count();
        let failed = total - passed;

        if total == 0 {
            return ReportStats {
                total,
                passed,
                failed,
                passed_pct: 0.0,
                failed_pct: 0.0,
                avg_secs: 0.0,
                max_secs: 0.0,
            };
        }

        let times = self.outcomes.iter().map(ExecutionOutcome::elapsed_secs);
        let sum: f64 = times.clone().sum();
        let max_secs = times.fold(0.0, f64::max);

        ReportStats {
            total,
            passed,
            failed,
            passed_pct: passed as f64 / total as f64 * 100.0,
            failed_pct: failed as f64 / total as f64 * 100.0,
            avg_secs: sum / total as f64,
            max_secs,
        }
    }

    /// Failed outcomes, in completion order
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionOutcome> {
        self.outcomes.iter().filter(|o| o.is_fail())
    }

    /// Check if every outcome passed
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(ExecutionOutcome::is_pass)
    }

    /// Render the Markdown report stamped with the current local time
    pub fn render(&self) -> String {
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.render_with_timestamp(&generated)
    }

    /// Render the Markdown report with a fixed generation stamp
    pub fn render_with_timestamp(&self, generated: &str) -> String {
        let stats = self.stats();
        let mut lines = vec![
            "# Integration Test Report".to_string(),
            String::new(),
            format!("**Generated**: {}", generated),
            format!("**Total Duration**: {:.1}s", self.total_duration.as_secs_f64()),
            format!("**Average Test Time**: {:.1}s", stats.avg_secs),
            format!("**Longest Test**: {:.1}s", stats.max_secs),
            String::new(),
            "## Summary".to_string(),
            format!("- **Total Tests**: {}", stats.total),
            format!("- **Passed**: {} ({:.1}%)", stats.passed, stats.passed_pct),
            format!("- **Failed**: {} ({:.1}%)", stats.failed, stats.failed_pct),
            String::new(),
            "## Results by Test".to_string(),
        ];

        for outcome in &self.outcomes {
            let status = if outcome.is_pass() { "✅ PASS" } else { "❌ FAIL" };
            lines.push(format!(
                "- **{}**: {} ({:.1}s)",
                outcome.unit.id(),
                status,
                outcome.elapsed_secs()
            ));
            if outcome.is_fail() {
                lines.push(format!("  - Error: {}", outcome.message));
            }
        }

        if stats.failed > 0 {
            lines.push(String::new());
            lines.push("## Failed Tests Details".to_string());
            for outcome in self.failures() {
                lines.push(format!("### {}", outcome.unit.id()));
                lines.push(format!("**Error**: {}", outcome.message));
                if let Some(log) = &outcome.log_file {
                    lines.push(format!("**Log**: `{}`", log.display()));
                }
                lines.push(String::new());
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Write a rendered report to disk
pub fn persist(text: &str, path: &Path) -> RunnerResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|error| RunnerError::ReportWrite {
            path: path.to_path_buf(),
            error,
        })?;
    }
    fs::write(path, text).map_err(|error| RunnerError::ReportWrite {
        path: path.to_path_buf(),
        error,
    })
}
