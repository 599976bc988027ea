//! Outcome verification: exit code first, then success patterns

use regex::RegexBuilder;

/// Pass/fail decision with its reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub reason: String,
}

impl Verdict {
    fn pass() -> Self {
        Self {
            passed: true,
            reason: crate::outcome::SUCCESS_MESSAGE.to_string(),
        }
    }

    fn fail(reason: String) -> Self {
        Self {
            passed: false,
            reason,
        }
    }
}

/// Decide whether a completed unit passed
///
/// A non-zero exit code fails immediately; patterns are not consulted.
/// Otherwise every pattern must match somewhere in `captured`, with `.`
/// matching newlines. All unmatched patterns are listed.
pub fn verify(exit_code: i32, captured: &str, patterns: &[String]) -> Verdict {
    if exit_code != 0 {
        return Verdict::fail(format!("Exit code {}", exit_code));
    }

    let missing = missing_patterns(captured, patterns);
    if missing.is_empty() {
        Verdict::pass()
    } else {
        Verdict::fail(format!("Missing patterns: {:?}", missing))
    }
}

/// Patterns that do not match `captured`; invalid regexes count as missing
pub fn missing_patterns<'a>(captured: &str, patterns: &'a [String]) -> Vec<&'a str> {
    patterns
        .iter()
        .filter(|pattern| !pattern_matches(pattern, captured))
        .map(String::as_str)
        .collect()
}

/// Whether one pattern matches anywhere in the text
pub fn pattern_matches(pattern: &str, captured: &str) -> bool {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()
        .is_ok_and(|re| re.is_match(captured))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exit_code_only() {
        assert!(verify(0, "", &[]).passed);
        assert_eq!(verify(0, "", &[]).reason, "Success");
    }

    #[test]
    fn test_nonzero_exit_skips_patterns() {
        let verdict = verify(2, "Started", &patterns(&["Started"]));
        assert!(!verdict.passed);
        assert_eq!(verdict.reason, "Exit code 2");
    }

    #[test]
    fn test_negative_exit_code() {
        assert_eq!(verify(-1, "", &[]).reason, "Exit code -1");
    }

    #[test]
    fn test_all_patterns_match() {
        let out = "Started Application in 2.1s\nWeather: sunny\n";
        assert!(verify(0, out, &patterns(&["Started Application", "Weather: \\w+"])).passed);
    }

    #[test]
    fn test_pattern_spans_lines() {
        let out = "BEGIN\nmiddle\nEND\n";
        assert!(verify(0, out, &patterns(&["BEGIN.*END"])).passed);
    }

    #[test]
    fn test_lists_every_missing_pattern() {
        let verdict = verify(0, "only this", &patterns(&["alpha", "only", "beta"]));
        assert!(!verdict.passed);
        assert_eq!(verdict.reason, r#"Missing patterns: ["alpha", "beta"]"#);
    }

    #[test]
    fn test_order_does_not_matter() {
        let out = "second then first";
        let a = verify(0, out, &patterns(&["first", "second"]));
        let b = verify(0, out, &patterns(&["second", "first"]));
        assert!(a.passed && b.passed);
    }

    #[test]
    fn test_invalid_regex_counts_as_missing() {
        let verdict = verify(0, "(", &patterns(&["("]));
        assert!(!verdict.passed);
    }
}
