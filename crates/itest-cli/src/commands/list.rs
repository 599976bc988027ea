//! List command - show discovered units without running them

use anyhow::Result;
use colored::*;
use itest_config::UnitConfig;
use itest_runner::UnitSuite;
use std::path::PathBuf;

/// Arguments for the list command
#[derive(Debug, Clone)]
pub struct ListArgs {
    /// Root directory to search for units
    pub dir: PathBuf,
    /// Case-insensitive module path filter
    pub filter: Option<String>,
    /// Disable colored output
    pub no_color: bool,
}

/// Run the list command
pub fn run(args: ListArgs) -> Result<UnitSuite> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let mut suite = UnitSuite::discover(&args.dir);
    if let Some(pattern) = &args.filter {
        suite = suite.filter(pattern);
    }

    if suite.is_empty() {
        println!("{}", "No integration tests found.".yellow());
        return Ok(suite);
    }

    println!(
        "Found {} test{}",
        suite.len().to_string().bold(),
        if suite.len() == 1 { "" } else { "s" }
    );
    for unit in &suite.units {
        let detail = match UnitConfig::load_from_file(&unit.descriptor_path()) {
            Ok(config) if config.has_patterns() => format!(
                "timeout {}s, {} pattern{}",
                config.timeout_secs,
                config.success_patterns.len(),
                if config.success_patterns.len() == 1 { "" } else { "s" }
            ),
            Ok(config) => format!("timeout {}s, exit code only", config.timeout_secs),
            Err(e) => e.to_string().red().to_string(),
        };
        println!(
            "  {} {} ({})",
            unit.id().bold(),
            suite.module_path(unit).display().to_string().dimmed(),
            detail
        );
    }

    Ok(suite)
}
