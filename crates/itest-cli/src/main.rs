use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

/// Integration-test orchestrator.
///
/// Discovers `integration-tests/Run*.java` launchers below a directory, runs
/// each one through an executor (jbang by default) under the timeout from its
/// `ExampleInfo.json`, verifies exit codes and success patterns, and reports
/// the results.
///
/// EXAMPLES:
///     itest run                          Run every discovered test
///     itest run -f brave --stream        Run matching tests with live output
///     itest run -w 4 -r report.md        Four workers, save a Markdown report
///     itest list                         Show discovered tests
///     itest clean                        Remove old log files
///
/// ENVIRONMENT VARIABLES:
///     ITEST_EXECUTOR    Executor program (default: jbang)
///     ITEST_WORKERS     Default worker count (default: 1)
///     ITEST_LOGS_DIR    Log root (default: logs)
///     NO_COLOR          Set to disable colored output
///     RUST_LOG          Diagnostic log filter (default: warn)
#[derive(Parser)]
#[command(name = "itest")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run integration tests
    ///
    /// Runs every discovered unit (or the filtered subset) and exits with
    /// status 1 if any unit fails, times out or is cancelled.
    ///
    /// EXAMPLES:
    ///     itest run                            Run all tests serially
    ///     itest run --filter weather           Only modules matching 'weather'
    ///     itest run --fail-fast                Stop after the first failure
    ///     itest run --stream --structured-logs Live output, logs/run-<ts>/
    ///     itest run --report report.md         Save a Markdown report
    #[command(visible_alias = "r")]
    Run {
        /// Verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Filter tests by module path (case-insensitive substring)
        #[arg(long, short = 'f')]
        filter: Option<String>,
        /// Number of parallel workers
        #[arg(long, short = 'w')]
        workers: Option<usize>,
        /// Write a Markdown report to this file
        #[arg(long, short = 'r')]
        report: Option<PathBuf>,
        /// Stop on first failure
        #[arg(long)]
        fail_fast: bool,
        /// Stream live output from tests
        #[arg(long, short = 's')]
        stream: bool,
        /// Use a per-run log directory (logs/run-<timestamp>/)
        #[arg(long)]
        structured_logs: bool,
        /// Clean up old log files and directories, then exit
        #[arg(long)]
        clean_logs: bool,
        /// Directory to search for tests
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Program that executes a launcher
        #[arg(long)]
        executor: Option<PathBuf>,
        /// Root directory for log files
        #[arg(long)]
        logs_dir: Option<PathBuf>,
        /// Disable colored output
        #[arg(long, env = "NO_COLOR")]
        no_color: bool,
        /// Additional tool that must be on PATH (repeatable)
        #[arg(long, value_name = "TOOL")]
        require: Vec<String>,
    },

    /// List discovered integration tests without running them
    ///
    /// EXAMPLES:
    ///     itest list                  List everything
    ///     itest list -f mcp           Only modules matching 'mcp'
    #[command(visible_alias = "ls")]
    List {
        /// Filter tests by module path (case-insensitive substring)
        #[arg(long, short = 'f')]
        filter: Option<String>,
        /// Directory to search for tests
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Disable colored output
        #[arg(long, env = "NO_COLOR")]
        no_color: bool,
    },

    /// Remove old log files and run directories
    ///
    /// Deletes every *.log file below the log root and every run-*
    /// directory directly inside it.
    Clean {
        /// Root directory for log files
        #[arg(long)]
        logs_dir: Option<PathBuf>,
        /// Disable colored output
        #[arg(long, env = "NO_COLOR")]
        no_color: bool,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     itest completions bash > ~/.local/share/bash-completion/completions/itest
    ///     itest completions zsh > ~/.zfunc/_itest
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Install the diagnostic subscriber; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,itest_runner=debug,itest_cli=debug"
    } else {
        "warn"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cli_config = config::Config::from_env();

    match cli.command {
        Commands::Run {
            verbose,
            filter,
            workers,
            report,
            fail_fast,
            stream,
            structured_logs,
            clean_logs,
            dir,
            executor,
            logs_dir,
            no_color,
            require,
        } => {
            init_tracing(verbose);
            let args = commands::run::RunArgs {
                dir,
                filter,
                workers,
                verbose,
                stream,
                fail_fast,
                structured_logs,
                clean_logs,
                report,
                executor,
                logs_dir,
                no_color,
                require,
            };
            if !commands::run::run(args, &cli_config)? {
                std::process::exit(1);
            }
        }
        Commands::List {
            filter,
            dir,
            no_color,
        } => {
            init_tracing(false);
            let args = commands::list::ListArgs {
                dir,
                filter,
                no_color: no_color || cli_config.no_color,
            };
            commands::list::run(args)?;
        }
        Commands::Clean { logs_dir, no_color } => {
            init_tracing(false);
            let args = commands::clean::CleanArgs {
                logs_dir: logs_dir
                    .or(cli_config.logs_dir)
                    .unwrap_or_else(|| PathBuf::from(itest_runner::context::DEFAULT_LOGS_DIR)),
                no_color: no_color || cli_config.no_color,
            };
            commands::clean::run(args)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from([
            "itest",
            "run",
            "-v",
            "-f",
            "brave",
            "-w",
            "3",
            "-r",
            "out.md",
            "--fail-fast",
            "-s",
            "--structured-logs",
            "--require",
            "java",
            "--require",
            "docker",
        ]);
        match cli.command {
            Commands::Run {
                verbose,
                filter,
                workers,
                report,
                fail_fast,
                stream,
                structured_logs,
                require,
                ..
            } => {
                assert!(verbose && fail_fast && stream && structured_logs);
                assert_eq!(filter.as_deref(), Some("brave"));
                assert_eq!(workers, Some(3));
                assert_eq!(report, Some(PathBuf::from("out.md")));
                assert_eq!(require, vec!["java".to_string(), "docker".to_string()]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["itest", "run"]);
        match cli.command {
            Commands::Run {
                workers,
                dir,
                executor,
                clean_logs,
                ..
            } => {
                assert_eq!(workers, None);
                assert_eq!(dir, PathBuf::from("."));
                assert_eq!(executor, None);
                assert!(!clean_logs);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_alias_r_for_run() {
        let cli = Cli::parse_from(["itest", "r", "--fail-fast"]);
        assert!(matches!(cli.command, Commands::Run { fail_fast: true, .. }));
    }

    #[test]
    fn test_alias_ls_for_list() {
        let cli = Cli::parse_from(["itest", "ls", "-f", "mcp"]);
        assert!(matches!(cli.command, Commands::List { .. }));
    }

    #[test]
    fn test_invalid_workers_rejected() {
        assert!(Cli::try_parse_from(["itest", "run", "-w", "many"]).is_err());
    }

    #[test]
    fn test_completions_bash() {
        let cli = Cli::parse_from(["itest", "completions", "bash"]);
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Bash),
            _ => panic!("Expected Completions command"),
        }
    }
}
