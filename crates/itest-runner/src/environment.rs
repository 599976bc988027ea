//! Environment validation before any unit runs

use crate::error::{RunnerError, RunnerResult};
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Resolve a program the way a shell would
///
/// Names containing a path separator are checked directly; bare names are
/// searched for in `PATH`.
pub fn find_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.is_file().then(|| absolute(program));
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Validate the executor and any extra required tools
///
/// Returns the resolved executor path. The executor must answer
/// `--version` with a zero exit status.
pub fn validate_environment(executor: &Path, required: &[String]) -> RunnerResult<PathBuf> {
    let executor_name = executor.display().to_string();
    let resolved = find_program(executor).ok_or_else(|| RunnerError::executor_not_found(&executor_name))?;
    debug!(executor = %resolved.display(), "resolved executor");

    let status = Command::new(&resolved)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| RunnerError::ExecutorNotFunctional {
            executor: executor_name.clone(),
            reason: e.to_string(),
        })?;

    if !status.success() {
        return Err(RunnerError::ExecutorNotFunctional {
            executor: executor_name,
            reason: format!("'--version' exited with {}", status),
        });
    }

    for tool in required {
        if find_program(Path::new(tool)).is_none() {
            return Err(RunnerError::RequiredToolMissing { tool: tool.clone() });
        }
    }

    info!("Environment validation passed");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executor() {
        let err = validate_environment(Path::new("itest-no-such-program-xyz"), &[]).unwrap_err();
        assert!(matches!(err, RunnerError::ExecutorNotFound { .. }));
        assert!(err.to_string().contains("not found in PATH"));
    }

    #[test]
    fn test_missing_explicit_path() {
        assert!(find_program(Path::new("/nonexistent/bin/jbang")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_program_on_path() {
        assert!(find_program(Path::new("sh")).is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_executor_failing_probe() {
        // `false` ignores its arguments and exits 1
        let err = validate_environment(Path::new("false"), &[]).unwrap_err();
        assert!(matches!(err, RunnerError::ExecutorNotFunctional { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_required_tool_missing() {
        let err = validate_environment(Path::new("true"), &["itest-missing-tool-xyz".to_string()])
            .unwrap_err();
        assert!(matches!(err, RunnerError::RequiredToolMissing { .. }));
    }
}
