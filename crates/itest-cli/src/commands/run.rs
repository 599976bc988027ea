//! Run command - execute discovered integration tests

use crate::config::Config;
use anyhow::{Context, Result};
use colored::*;
use itest_runner::context::{DEFAULT_EXECUTOR, DEFAULT_LOGS_DIR, DEFAULT_WORKERS};
use itest_runner::{
    report, validate_environment, ConsoleReporter, LogLayout, LogMode, RunContext,
    Scheduler, UnitRunner, UnitSuite,
};
use std::path::PathBuf;

/// Arguments for the run command
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Root directory to search for units
    pub dir: PathBuf,
    /// Case-insensitive module path filter
    pub filter: Option<String>,
    /// Worker count (falls back to ITEST_WORKERS, then 1)
    pub workers: Option<usize>,
    /// Verbose output
    pub verbose: bool,
    /// Stream unit output live
    pub stream: bool,
    /// Stop dispatching after the first failure
    pub fail_fast: bool,
    /// Group logs under one run directory
    pub structured_logs: bool,
    /// Remove old logs and exit
    pub clean_logs: bool,
    /// Write a Markdown report here
    pub report: Option<PathBuf>,
    /// Executor program (falls back to ITEST_EXECUTOR, then jbang)
    pub executor: Option<PathBuf>,
    /// Log root (falls back to ITEST_LOGS_DIR, then ./logs)
    pub logs_dir: Option<PathBuf>,
    /// Disable colored output
    pub no_color: bool,
    /// Extra tools that must be on PATH
    pub require: Vec<String>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            filter: None,
            workers: None,
            verbose: false,
            stream: false,
            fail_fast: false,
            structured_logs: false,
            clean_logs: false,
            report: None,
            executor: None,
            logs_dir: None,
            no_color: false,
            require: Vec::new(),
        }
    }
}

impl RunArgs {
    /// Merge flags over environment configuration
    pub fn context(&self, config: &Config) -> RunContext {
        let log_mode = if self.structured_logs {
            LogMode::Structured
        } else {
            LogMode::Flat
        };

        RunContext::default()
            .with_workers(self.workers.or(config.workers).unwrap_or(DEFAULT_WORKERS))
            .with_verbose(self.verbose)
            .with_stream(self.stream)
            .with_fail_fast(self.fail_fast)
            .with_log_mode(log_mode)
            .with_logs_dir(
                self.logs_dir
                    .clone()
                    .or_else(|| config.logs_dir.clone())
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGS_DIR)),
            )
            .with_executor(
                self.executor
                    .clone()
                    .or_else(|| config.executor.clone())
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_EXECUTOR)),
            )
    }
}

/// Run the run command
///
/// Returns whether every unit passed. Environment problems are errors.
pub fn run(args: RunArgs, config: &Config) -> Result<bool> {
    let no_color = args.no_color || config.no_color;
    let context = args.context(config);

    if args.clean_logs {
        super::clean::run(super::clean::CleanArgs {
            logs_dir: context.logs_dir.clone(),
            no_color,
        })?;
        return Ok(true);
    }

    let reporter = ConsoleReporter::new(context.verbose).with_no_color(no_color);
    println!("{}", "🚀 Starting integration tests".bold());

    let layout = LogLayout::prepare(&context.logs_dir, context.log_mode)?;
    let executor = validate_environment(&context.executor, &args.require)?;

    let mut suite = UnitSuite::discover(&args.dir);
    if let Some(pattern) = &args.filter {
        suite = suite.filter(pattern);
    }

    if suite.is_empty() {
        println!("{}", "⚠️  No integration tests found".yellow());
        if let Some(pattern) = &args.filter {
            println!("Try without filter or check pattern: {}", pattern);
        }
        return Ok(true);
    }

    if context.stream && context.workers > 1 {
        println!(
            "{}",
            "⚠️  Streaming with more than one worker interleaves output".yellow()
        );
    }

    println!(
        "Running {} test{} with {} worker{}",
        suite.len().to_string().bold(),
        if suite.len() == 1 { "" } else { "s" },
        context.workers,
        if context.workers == 1 { "" } else { "s" }
    );

    let runner = UnitRunner::from_context(&context, layout).with_executor(executor);
    let scheduler = Scheduler::new(runner)
        .with_workers(context.workers)
        .with_fail_fast(context.fail_fast);
    let run_report = scheduler.run_all_with(&suite.units, |outcome| reporter.report_outcome(outcome))?;

    reporter.report_summary(&run_report);

    if let Some(path) = &args.report {
        report::persist(&run_report.render(), path)
            .with_context(|| format!("Could not save report to {}", path.display()))?;
        println!("📝 Report saved to {}", path.display());
    }

    Ok(run_report.all_passed())
}
