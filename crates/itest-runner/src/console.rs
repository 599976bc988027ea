//! Console reporter - colored progress lines and the final summary

use crate::outcome::{ExecutionOutcome, OutcomeStatus};
use crate::report::RunReport;
use colored::*;

/// Prints per-unit results as they complete and the closing summary
pub struct ConsoleReporter {
    /// Print cancellations and log locations too
    verbose: bool,
    /// Disable colored output
    no_color: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            no_color: false,
        }
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        if no_color {
            colored::control::set_override(false);
        }
        self
    }

    /// Line for one finished unit
    pub fn outcome_line(&self, outcome: &ExecutionOutcome) -> String {
        let secs = outcome.elapsed_secs();
        match outcome.status {
            OutcomeStatus::Passed => {
                format!("{} {} ({:.1}s)", "✅".green(), outcome.unit.id().bold(), secs)
            }
            OutcomeStatus::Cancelled => format!(
                "{} {}: {}",
                "⏭".yellow(),
                outcome.unit.id(),
                outcome.message.yellow()
            ),
            OutcomeStatus::TimedOut => format!(
                "{} {}: {} ({:.1}s)",
                "⏱".yellow(),
                outcome.unit.id().bold(),
                outcome.message.yellow(),
                secs
            ),
            OutcomeStatus::Failed => format!(
                "{} {}: {} ({:.1}s)",
                "❌".red(),
                outcome.unit.id().bold(),
                outcome.message.red(),
                secs
            ),
        }
    }

    /// Print one finished unit
    pub fn report_outcome(&self, outcome: &ExecutionOutcome) {
        if outcome.is_cancelled() && !self.verbose {
            return;
        }
        println!("{}", self.outcome_line(outcome));
        if self.verbose && outcome.is_fail() {
            if let Some(log) = &outcome.log_file {
                println!("   {} {}", "log:".dimmed(), log.display());
            }
        }
    }

    /// Render the closing summary
    pub fn summary(&self, report: &RunReport) -> String {
        let stats = report.stats();
        let mut lines = vec![
            String::new(),
            "📊 Integration Test Results:".bold().to_string(),
            format!("  Total: {}", stats.total),
            format!("  Passed: {}", stats.passed.to_string().green()),
            format!(
                "  Failed: {}",
                if stats.failed > 0 {
                    stats.failed.to_string().red().bold()
                } else {
                    stats.failed.to_string().normal()
                }
            ),
            format!("  Duration: {:.1}s", report.total_duration.as_secs_f64()),
        ];

        if stats.failed > 0 {
            lines.push(String::new());
            lines.push("💥 Failed Tests:".red().bold().to_string());
            for outcome in report.failures() {
                lines.push(format!("  - {}: {}", outcome.unit.id(), outcome.message));
            }
        } else if stats.total > 0 {
            lines.push("🎉 All integration tests passed!".green().bold().to_string());
        }

        lines.join("\n")
    }

    /// Print the closing summary
    pub fn report_summary(&self, report: &RunReport) {
        println!("{}", self.summary(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::TestUnit;
    use std::path::Path;
    use std::time::Duration;

    fn unit(module: &str) -> TestUnit {
        let path = format!("/repo/{}/integration-tests/RunIt.java", module);
        TestUnit::from_launcher(Path::new(&path)).unwrap()
    }

    fn reporter() -> ConsoleReporter {
        ConsoleReporter::new(true).with_no_color(true)
    }

    #[test]
    fn test_outcome_lines() {
        let r = reporter();
        let pass = ExecutionOutcome::passed(unit("brave"), Duration::from_secs(2), None);
        assert_eq!(r.outcome_line(&pass), "✅ brave/RunIt (2.0s)");

        let fail = ExecutionOutcome::failed(unit("sqlite"), "Exit code 2", Duration::from_secs(1), None);
        assert_eq!(r.outcome_line(&fail), "❌ sqlite/RunIt: Exit code 2 (1.0s)");
    }

    #[test]
    fn test_summary_all_passed() {
        let report = RunReport::new(
            vec![ExecutionOutcome::passed(unit("a"), Duration::from_secs(1), None)],
            Duration::from_secs(1),
        );
        let text = reporter().summary(&report);
        assert!(text.contains("Total: 1"));
        assert!(text.contains("🎉 All integration tests passed!"));
    }

    #[test]
    fn test_summary_lists_failures() {
        let report = RunReport::new(
            vec![
                ExecutionOutcome::passed(unit("a"), Duration::from_secs(1), None),
                ExecutionOutcome::cancelled(unit("b")),
            ],
            Duration::from_secs(1),
        );
        let text = reporter().summary(&report);
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("- b/RunIt: Cancelled (fail-fast)"));
        assert!(!text.contains("All integration tests passed"));
    }

    #[test]
    fn test_report_does_not_panic() {
        let r = reporter();
        let report = RunReport::default();
        r.report_summary(&report);
        r.report_outcome(&ExecutionOutcome::cancelled(unit("c")));
    }
}
