//! Clean command - remove old log files and run directories

use anyhow::{Context, Result};
use colored::*;
use itest_runner::{clean_logs, CleanupStats};
use std::path::PathBuf;

/// Arguments for the clean command
#[derive(Debug, Clone)]
pub struct CleanArgs {
    /// Log root to clean
    pub logs_dir: PathBuf,
    /// Disable colored output
    pub no_color: bool,
}

/// Run the clean command
pub fn run(args: CleanArgs) -> Result<CleanupStats> {
    if args.no_color {
        colored::control::set_override(false);
    }

    println!("🧹 Cleaning up logs in {}", args.logs_dir.display());
    let stats = clean_logs(&args.logs_dir)
        .with_context(|| format!("Failed to clean {}", args.logs_dir.display()))?;

    if stats.files_removed == 0 && stats.dirs_removed == 0 {
        println!("{}", "No logs to clean".dimmed());
    } else {
        println!(
            "{} Removed {} log file{} and {} run director{}",
            "✅".green(),
            stats.files_removed,
            if stats.files_removed == 1 { "" } else { "s" },
            stats.dirs_removed,
            if stats.dirs_removed == 1 { "y" } else { "ies" }
        );
    }

    for (path, reason) in &stats.failures {
        eprintln!("{} {}: {}", "⚠️  Could not remove".yellow(), path.display(), reason);
    }

    Ok(stats)
}
