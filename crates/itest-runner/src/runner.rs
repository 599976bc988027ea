//! Unit runner - execute one unit as a child process
//!
//! The unit's launcher is handed to the executor program with the module
//! directory as working directory. Combined stdout/stderr always ends up in
//! the unit's log file, which is then verified. Nothing that goes wrong
//! inside a unit escapes as an error: every path produces an
//! [`ExecutionOutcome`].

use crate::context::RunContext;
use crate::discovery::TestUnit;
use crate::display::{render_output_block, render_pattern_check, StreamDisplay};
use crate::logs::LogLayout;
use crate::outcome::ExecutionOutcome;
use crate::verify::verify;
use itest_config::{ConfigError, UnitConfig};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How often a child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long output already in flight is still collected after the child exits
const EXIT_GRACE: Duration = Duration::from_millis(250);

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Exited(i32),
    TimedOut,
}

/// Result of pumping streamed output into the log
enum Pump {
    /// Every pipe closed; the child may still be running
    Drained,
    /// The child exited and its status was collected
    Exited(i32),
    DeadlineReached,
}

/// Runs single units; shared by all workers of a run
#[derive(Debug, Clone)]
pub struct UnitRunner {
    /// Program that executes a launcher
    executor: PathBuf,
    /// Where log files go
    layout: LogLayout,
    /// Stream output live
    stream: bool,
    /// Echo captured output after buffered runs
    verbose: bool,
}

impl UnitRunner {
    /// Create a runner with buffered capture
    pub fn new(executor: impl Into<PathBuf>, layout: LogLayout) -> Self {
        Self {
            executor: executor.into(),
            layout,
            stream: false,
            verbose: false,
        }
    }

    /// Create a runner from the run-wide settings
    pub fn from_context(context: &RunContext, layout: LogLayout) -> Self {
        Self::new(context.executor.clone(), layout)
            .with_stream(context.stream)
            .with_verbose(context.verbose)
    }

    /// Replace the executor, e.g. with its resolved path
    pub fn with_executor(mut self, executor: impl Into<PathBuf>) -> Self {
        self.executor = executor.into();
        self
    }

    /// Enable live streaming
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Load the unit's descriptor and run it
    ///
    /// A missing or malformed descriptor yields a failed outcome with zero
    /// elapsed time; the executor is never started in that case.
    pub fn run(&self, unit: &TestUnit) -> ExecutionOutcome {
        match UnitConfig::load_from_file(&unit.descriptor_path()) {
            Ok(config) => self.run_with_config(unit, &config),
            Err(e) => {
                warn!(unit = %unit.id(), "{}", e);
                ExecutionOutcome::failed(unit.clone(), e.to_string(), Duration::ZERO, None)
            }
        }
    }

    /// Run a unit with an already loaded descriptor
    pub fn run_with_config(&self, unit: &TestUnit, config: &UnitConfig) -> ExecutionOutcome {
        let start = Instant::now();
        let Some(deadline) = start.checked_add(config.timeout()) else {
            let e = ConfigError::InvalidValue {
                field: "timeoutSec".to_string(),
                file: unit.descriptor_path(),
                reason: format!("{}s is out of range", config.timeout_secs),
            };
            warn!(unit = %unit.id(), "{}", e);
            return ExecutionOutcome::failed(unit.clone(), e.to_string(), Duration::ZERO, None);
        };
        let log_file = self.layout.log_file_for(unit);

        if self.stream {
            println!("\n🚀 Running {} (timeout: {}s)", unit.id(), config.timeout_secs);
            println!("📝 Log: {}", log_file.display());
        } else {
            debug!("Running {} → {}", unit.id(), log_file.display());
        }

        let completion = if self.stream {
            self.execute_streaming(unit, config, &log_file, deadline)
        } else {
            self.execute_buffered(unit, &log_file, deadline)
        };

        let code = match completion {
            Ok(Completion::Exited(code)) => code,
            Ok(Completion::TimedOut) => {
                warn!(unit = %unit.id(), "timed out after {}s", config.timeout_secs);
                return ExecutionOutcome::timed_out(
                    unit.clone(),
                    config.timeout_secs,
                    start.elapsed(),
                    Some(log_file),
                );
            }
            Err(e) => {
                return ExecutionOutcome::failed(
                    unit.clone(),
                    format!("Execution error: {}", e),
                    start.elapsed(),
                    log_file.exists().then_some(log_file),
                );
            }
        };

        let captured = match read_log(&log_file) {
            Ok(text) => text,
            Err(e) => {
                return ExecutionOutcome::failed(
                    unit.clone(),
                    format!("Execution error: failed to read {}: {}", log_file.display(), e),
                    start.elapsed(),
                    Some(log_file),
                );
            }
        };

        if self.stream {
            println!("{}", render_output_block(&captured));
            if let Some(check) = render_pattern_check(&captured, &config.success_patterns) {
                println!("{}", check);
            }
        } else if self.verbose {
            debug!("Output from {}:\n{}", unit.id(), captured);
        }

        let verdict = verify(code, &captured, &config.success_patterns);
        let elapsed = start.elapsed();
        if verdict.passed {
            debug!("✅ {} completed in {:.1}s", unit.id(), elapsed.as_secs_f64());
            ExecutionOutcome::passed(unit.clone(), elapsed, Some(log_file))
        } else {
            ExecutionOutcome::failed(unit.clone(), verdict.reason, elapsed, Some(log_file))
        }
    }

    /// Command line for a unit: `<executor> <launcher relative to module>`
    fn command(&self, unit: &TestUnit) -> Command {
        let mut cmd = Command::new(&self.executor);
        cmd.arg(unit.relative_launcher())
            .current_dir(&unit.module_dir)
            .stdin(Stdio::null());
        cmd
    }

    /// Output goes straight to the log file; wait for exit or the deadline
    fn execute_buffered(
        &self,
        unit: &TestUnit,
        log_file: &Path,
        deadline: Instant,
    ) -> io::Result<Completion> {
        let file = File::create(log_file)?;
        let mut child = self
            .command(unit)
            .stdout(Stdio::from(file.try_clone()?))
            .stderr(Stdio::from(file))
            .spawn()?;
        debug!(unit = %unit.id(), pid = child.id(), "spawned");

        wait_until(&mut child, deadline)
    }

    /// Output is pumped line by line into the log and the live display
    fn execute_streaming(
        &self,
        unit: &TestUnit,
        config: &UnitConfig,
        log_file: &Path,
        deadline: Instant,
    ) -> io::Result<Completion> {
        let mut log = BufWriter::new(File::create(log_file)?);
        let mut child = self
            .command(unit)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        debug!(unit = %unit.id(), pid = child.id(), "spawned");

        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            spawn_line_reader(stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_reader(stderr, tx.clone());
        }
        drop(tx);

        let display = StreamDisplay::new(&unit.id(), config.timeout());
        match pump_lines(&rx, &mut child, &mut log, &display, deadline) {
            Ok(Pump::Drained) => {}
            Ok(Pump::Exited(code)) => return Ok(Completion::Exited(code)),
            Ok(Pump::DeadlineReached) => {
                terminate(&mut child)?;
                return Ok(Completion::TimedOut);
            }
            Err(e) => {
                terminate(&mut child)?;
                return Err(e);
            }
        }
        drop(display);

        // Pipes are closed but the child may still be shutting down
        wait_until(&mut child, deadline)
    }
}

/// Forward lines from a pipe until it closes
fn spawn_line_reader<R: Read + Send + 'static>(source: R, tx: Sender<String>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.send(String::from_utf8_lossy(&buf).into_owned()).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

/// Copy lines into the log until every pipe closes, the child exits or the
/// deadline passes
///
/// Pipes can outlive the child when it leaves a background process behind,
/// so the child is polled between short receive slices. Once it has exited,
/// lines still in flight are collected for at most [`EXIT_GRACE`].
fn pump_lines(
    rx: &Receiver<String>,
    child: &mut Child,
    log: &mut impl Write,
    display: &StreamDisplay,
    deadline: Instant,
) -> io::Result<Pump> {
    loop {
        if let Some(status) = child.try_wait()? {
            drain_until(rx, log, display, Instant::now() + EXIT_GRACE)?;
            return Ok(Pump::Exited(exit_code(status)));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(Pump::DeadlineReached);
        }

        match rx.recv_timeout(POLL_INTERVAL.min(deadline - now)) {
            Ok(line) => write_line(log, display, &line)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log.flush()?;
                return Ok(Pump::Drained);
            }
        }
    }
}

/// Collect remaining lines until the pipes close or `until` passes
fn drain_until(
    rx: &Receiver<String>,
    log: &mut impl Write,
    display: &StreamDisplay,
    until: Instant,
) -> io::Result<()> {
    loop {
        let now = Instant::now();
        if now >= until {
            break;
        }
        match rx.recv_timeout(until - now) {
            Ok(line) => write_line(log, display, &line)?,
            Err(_) => break,
        }
    }
    log.flush()
}

fn write_line(log: &mut impl Write, display: &StreamDisplay, line: &str) -> io::Result<()> {
    log.write_all(line.as_bytes())?;
    log.flush()?;
    display.line(line);
    Ok(())
}

/// Wait for the child to exit, killing it once the deadline passes
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Completion> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Completion::Exited(exit_code(status)));
        }

        let now = Instant::now();
        if now >= deadline {
            terminate(child)?;
            return Ok(Completion::TimedOut);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// Kill and reap a child
fn terminate(child: &mut Child) -> io::Result<()> {
    if let Err(e) = child.kill() {
        debug!(pid = child.id(), "kill failed: {}", e);
    }
    child.wait()?;
    Ok(())
}

/// Exit code, or -1 when the child was ended by a signal
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

fn read_log(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
