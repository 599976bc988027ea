//! Live display for streaming mode
//!
//! Each output line is echoed with a completion estimate derived from the
//! elapsed share of the unit's timeout. The estimate is capped at 99% until
//! the unit actually finishes.
//!
//! Launchers may wrap the application output they captured between a marker
//! line and `---` fences. When the marker is present only that section is
//! shown after the run; otherwise the raw output is shown as is.

use crate::verify::pattern_matches;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Marker line that opens a launcher's captured-output section
pub const CAPTURE_MARKER: &str = "📋 Captured Application Output:";
/// Fence line delimiting the captured-output section
pub const CAPTURE_FENCE: &str = "---";

const MAX_LINE_WIDTH: usize = 80;
const RULE_WIDTH: usize = 60;

/// Completion estimate in percent, capped at 99
pub fn progress_percent(elapsed: Duration, timeout: Duration) -> f64 {
    if timeout.is_zero() {
        return 99.0;
    }
    (elapsed.as_secs_f64() / timeout.as_secs_f64() * 100.0).min(99.0)
}

/// Progress display for one streaming unit
pub struct StreamDisplay {
    bar: ProgressBar,
    timeout: Duration,
    started: Instant,
}

impl StreamDisplay {
    /// Start a display for a unit
    pub fn new(unit_id: &str, timeout: Duration) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {prefix} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_prefix(unit_id.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            timeout,
            started: Instant::now(),
        }
    }

    /// Echo one output line with the current estimate
    pub fn line(&self, line: &str) {
        let percent = progress_percent(self.started.elapsed(), self.timeout);
        self.bar.set_position(percent as u64);

        let clean: String = line.trim().chars().take(MAX_LINE_WIDTH).collect();
        if clean.is_empty() {
            return;
        }
        self.print(&format!("🔄 [{:5.1}%] {}", percent, clean));
    }

    fn print(&self, text: &str) {
        if self.bar.is_hidden() {
            println!("{}", text);
        } else {
            self.bar.println(text);
        }
    }
}

impl Drop for StreamDisplay {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Lines of the launcher's captured-output section, if one is present
pub fn captured_section(output: &str) -> Option<Vec<&str>> {
    let mut lines = output.lines().map(str::trim);
    lines.by_ref().find(|line| *line == CAPTURE_MARKER)?;

    let mut section = Vec::new();
    for line in lines {
        if line == CAPTURE_FENCE {
            if section.is_empty() {
                continue;
            }
            break;
        }
        if !line.is_empty() {
            section.push(line);
        }
    }

    (!section.is_empty()).then_some(section)
}

/// Render the post-run output block shown in streaming mode
pub fn render_output_block(output: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut text = format!("\n📋 Test Output:\n{}\n", rule);

    match captured_section(output) {
        Some(section) => {
            for line in section {
                text.push_str(&format!("  {}\n", line));
            }
        }
        None => {
            text.push_str(output);
            if !output.ends_with('\n') {
                text.push('\n');
            }
        }
    }

    text.push_str(&rule);
    text
}

/// Render the per-pattern FOUND/MISSING listing
pub fn render_pattern_check(output: &str, patterns: &[String]) -> Option<String> {
    if patterns.is_empty() {
        return None;
    }

    let mut text = String::from("\n🔍 Pattern Verification:\n");
    for (i, pattern) in patterns.iter().enumerate() {
        if pattern_matches(pattern, output) {
            text.push_str(&format!("  ✅ Pattern {}: '{}' → FOUND\n", i + 1, pattern));
        } else {
            text.push_str(&format!("  ❌ Pattern {}: '{}' → MISSING\n", i + 1, pattern));
        }
    }
    Some(text)
}
