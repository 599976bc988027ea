//! Scenario tests for the orchestration engine
//!
//! Each unit's launcher is a shell script; `sh` is the executor.

#![cfg(unix)]

use itest_runner::{
    LogLayout, LogMode, OutcomeStatus, RunReport, Scheduler, TestUnit, UnitRunner, UnitSuite,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

struct Fixture {
    root: TempDir,
    logs: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            root: tempdir().unwrap(),
            logs: tempdir().unwrap(),
        }
    }

    fn add(&self, module: &str, script: &str, descriptor: Option<&str>) {
        let marker = self.root.path().join(module).join("integration-tests");
        fs::create_dir_all(&marker).unwrap();
        fs::write(marker.join("RunIt.java"), script).unwrap();
        if let Some(content) = descriptor {
            fs::write(marker.join("ExampleInfo.json"), content).unwrap();
        }
    }

    fn suite(&self) -> UnitSuite {
        UnitSuite::discover(self.root.path())
    }

    fn runner(&self, stream: bool) -> UnitRunner {
        let layout = LogLayout::prepare(self.logs.path(), LogMode::Flat).unwrap();
        UnitRunner::new("sh", layout).with_stream(stream)
    }

    fn run(&self, stream: bool, workers: usize, fail_fast: bool) -> RunReport {
        Scheduler::new(self.runner(stream))
            .with_workers(workers)
            .with_fail_fast(fail_fast)
            .run_all(&self.suite().units)
            .unwrap()
    }
}

fn find<'a>(report: &'a RunReport, module: &str) -> &'a itest_runner::ExecutionOutcome {
    report
        .outcomes
        .iter()
        .find(|o| o.unit.module == module)
        .unwrap()
}

fn single(fixture: &Fixture, stream: bool) -> itest_runner::ExecutionOutcome {
    let report = fixture.run(stream, 1, false);
    assert_eq!(report.outcomes.len(), 1);
    report.outcomes.into_iter().next().unwrap()
}

#[rstest]
#[case::buffered(false)]
#[case::streaming(true)]
fn passing_unit_with_patterns(#[case] stream: bool) {
    let fixture = Fixture::new();
    fixture.add(
        "brave",
        "echo 'Started Application in 1.2s'\necho 'Search results: 3'\n",
        Some(r#"{ "timeoutSec": 30, "successRegex": ["Started Application", "Search results: \\d+"] }"#),
    );

    let outcome = single(&fixture, stream);
    assert_eq!(outcome.status, OutcomeStatus::Passed, "{}", outcome.message);
    assert_eq!(outcome.message, "Success");

    let log = fs::read_to_string(outcome.log_file.unwrap()).unwrap();
    assert!(log.contains("Started Application in 1.2s"));
    assert!(log.contains("Search results: 3"));
}

#[rstest]
#[case::buffered(false)]
#[case::streaming(true)]
fn missing_descriptor_fails_without_running(#[case] stream: bool) {
    let fixture = Fixture::new();
    fixture.add("nodesc", "touch ran\n", None);

    let outcome = single(&fixture, stream);
    assert_eq!(outcome.status, OutcomeStatus::Failed);
    assert!(outcome.message.starts_with("Missing "), "{}", outcome.message);
    assert_eq!(outcome.elapsed, Duration::ZERO);
    assert!(!fixture.root.path().join("nodesc").join("ran").exists());
}

#[rstest]
#[case::buffered(false)]
#[case::streaming(true)]
fn nonzero_exit_ignores_patterns(#[case] stream: bool) {
    let fixture = Fixture::new();
    fixture.add(
        "broken",
        "echo 'Started Application'\nexit 2\n",
        Some(r#"{ "successRegex": ["Started Application"] }"#),
    );

    let outcome = single(&fixture, stream);
    assert_eq!(outcome.message, "Exit code 2");
}

#[rstest]
#[case::buffered(false)]
#[case::streaming(true)]
fn unmatched_pattern_is_listed(#[case] stream: bool) {
    let fixture = Fixture::new();
    fixture.add(
        "weather",
        "echo 'Started Application'\n",
        Some(r#"{ "successRegex": ["Started Application", "Weather: \\w+"] }"#),
    );

    let outcome = single(&fixture, stream);
    assert_eq!(outcome.message, r#"Missing patterns: ["Weather: \\w+"]"#);
}

#[rstest]
#[case::buffered(false)]
#[case::streaming(true)]
fn timeout_kills_child(#[case] stream: bool) {
    let fixture = Fixture::new();
    fixture.add(
        "slow",
        "echo $$ > pid\nexec sleep 5\n",
        Some(r#"{ "timeoutSec": 1 }"#),
    );

    let outcome = single(&fixture, stream);
    assert_eq!(outcome.status, OutcomeStatus::TimedOut);
    assert_eq!(outcome.message, "Timeout after 1s");
    assert!(outcome.elapsed >= Duration::from_secs(1));
    assert!(outcome.elapsed < Duration::from_secs(4));

    // The child was reaped, so its pid no longer names a live process
    let pid = fs::read_to_string(fixture.root.path().join("slow").join("pid")).unwrap();
    let alive = std::process::Command::new("sh")
        .args(["-c", &format!("kill -0 {} 2>/dev/null", pid.trim())])
        .status()
        .unwrap()
        .success();
    assert!(!alive);
}

#[rstest]
#[case::buffered(false)]
#[case::streaming(true)]
fn background_process_does_not_hold_unit_open(#[case] stream: bool) {
    let fixture = Fixture::new();
    fixture.add(
        "daemon",
        "sleep 6 &\necho done\nexit 0\n",
        Some(r#"{ "timeoutSec": 3, "successRegex": ["done"] }"#),
    );

    let outcome = single(&fixture, stream);
    assert_eq!(outcome.status, OutcomeStatus::Passed, "{}", outcome.message);
    assert!(outcome.elapsed < Duration::from_secs(2));
}

#[rstest]
#[case::buffered(false)]
#[case::streaming(true)]
fn huge_timeout_is_reported_not_fatal(#[case] stream: bool) {
    let fixture = Fixture::new();
    fixture.add("huge", "touch ran\n", Some(r#"{ "timeoutSec": 18446744073709551615 }"#));
    fixture.add("fine", "echo ok\n", Some("{}"));

    let report = fixture.run(stream, 1, false);
    assert_eq!(report.outcomes.len(), 2);
    assert!(find(&report, "huge")
        .message
        .starts_with("Invalid value for 'timeoutSec'"));
    assert!(!fixture.root.path().join("huge").join("ran").exists());
    assert!(find(&report, "fine").is_pass());
}

#[test]
fn streaming_keeps_output_order_per_stream() {
    let fixture = Fixture::new();
    fixture.add("lines", "for i in 1 2 3 4 5; do echo line-$i; done\n", Some("{}"));

    let outcome = single(&fixture, true);
    let log = fs::read_to_string(outcome.log_file.unwrap()).unwrap();
    assert_eq!(log, "line-1\nline-2\nline-3\nline-4\nline-5\n");
}

#[test]
fn mixed_run_yields_one_outcome_each() {
    let fixture = Fixture::new();
    fixture.add("a", "echo ok\n", Some("{}"));
    fixture.add("b", "exit 3\n", Some("{}"));
    fixture.add("c", "echo ok\n", None);
    fixture.add("d", "echo ok\n", Some(r#"{ "successRegex": ["nope"] }"#));

    let report = fixture.run(false, 2, false);
    assert_eq!(report.outcomes.len(), 4);
    assert!(find(&report, "a").is_pass());
    assert_eq!(find(&report, "b").message, "Exit code 3");
    assert!(find(&report, "c").message.starts_with("Missing"));
    assert!(find(&report, "d").message.starts_with("Missing patterns"));

    let stats = report.stats();
    assert_eq!((stats.passed, stats.failed), (1, 3));
}

#[test]
fn fail_fast_with_single_worker() {
    let fixture = Fixture::new();
    fixture.add("a", "exit 1\n", Some("{}"));
    fixture.add("b", "touch ran\n", Some("{}"));

    let report = fixture.run(false, 1, true);
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(find(&report, "b").status, OutcomeStatus::Cancelled);
    assert!(!fixture.root.path().join("b").join("ran").exists());
}

#[test]
fn invalid_descriptor_reported() {
    let fixture = Fixture::new();
    fixture.add("bad", "echo ok\n", Some("{ not json"));

    let outcome = single(&fixture, false);
    assert!(outcome.message.starts_with("Invalid JSON in"), "{}", outcome.message);
}

#[test]
fn unit_runs_in_module_directory() {
    let fixture = Fixture::new();
    fixture.add("cwd", "pwd\n", Some("{}"));

    let outcome = single(&fixture, false);
    let log = fs::read_to_string(outcome.log_file.unwrap()).unwrap();
    let expected = fixture.root.path().join("cwd").canonicalize().unwrap();
    assert_eq!(Path::new(log.trim()).canonicalize().unwrap(), expected);
}

#[test]
fn direct_unit_run() {
    let fixture = Fixture::new();
    fixture.add("direct", "echo ok\n", Some("{}"));

    let unit: TestUnit = fixture.suite().units.remove(0);
    let outcome = fixture.runner(false).run(&unit);
    assert!(outcome.is_pass());
}
