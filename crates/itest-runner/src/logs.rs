//! Log file layout and cleanup
//!
//! Every executed unit gets exactly one log file holding its combined
//! stdout/stderr. Files are either written flat into the log root with a
//! timestamp suffix, or grouped under one `run-<timestamp>` directory per
//! invocation.

use crate::context::LogMode;
use crate::discovery::TestUnit;
use crate::error::{RunnerError, RunnerResult};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Prefix of per-invocation log directories
pub const RUN_DIR_PREFIX: &str = "run-";

/// Timestamp used in log file and directory names
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Where this invocation writes its log files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLayout {
    /// Timestamped files directly in the log root
    Flat { dir: PathBuf },
    /// Plain per-unit files inside a single run directory
    RunDirectory { dir: PathBuf },
}

impl LogLayout {
    /// Create the directories for a layout
    pub fn prepare(logs_dir: &Path, mode: LogMode) -> RunnerResult<Self> {
        let layout = match mode {
            LogMode::Flat => Self::Flat {
                dir: logs_dir.to_path_buf(),
            },
            LogMode::Structured => Self::RunDirectory {
                dir: logs_dir.join(format!("{}{}", RUN_DIR_PREFIX, timestamp())),
            },
        };

        fs::create_dir_all(layout.dir()).map_err(|e| RunnerError::log_directory(layout.dir(), e))?;

        if let Self::RunDirectory { dir } = &layout {
            info!("Using structured log directory: {}", dir.display());
        }

        Ok(layout)
    }

    /// Directory holding the log files
    pub fn dir(&self) -> &Path {
        match self {
            Self::Flat { dir } | Self::RunDirectory { dir } => dir,
        }
    }

    /// Log file for a unit
    pub fn log_file_for(&self, unit: &TestUnit) -> PathBuf {
        match self {
            Self::Flat { dir } => dir.join(format!("{}_{}.log", unit.slug(), timestamp())),
            Self::RunDirectory { dir } => dir.join(format!("{}.log", unit.slug())),
        }
    }
}

/// Summary of a cleanup pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupStats {
    /// Log files removed
    pub files_removed: usize,
    /// Run directories removed
    pub dirs_removed: usize,
    /// Paths that could not be removed, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl CleanupStats {
    /// Whether there was nothing to remove
    pub fn is_empty(&self) -> bool {
        self.files_removed == 0 && self.dirs_removed == 0 && self.failures.is_empty()
    }
}

/// Remove `*.log` files and `run-*` directories below the log root
///
/// A missing log root is not an error. Individual removal failures are
/// collected and logged, not returned.
pub fn clean_logs(logs_dir: &Path) -> RunnerResult<CleanupStats> {
    let mut stats = CleanupStats::default();
    if !logs_dir.exists() {
        return Ok(stats);
    }

    let log_files: Vec<PathBuf> = WalkDir::new(logs_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
        .collect();

    let run_dirs: Vec<PathBuf> = fs::read_dir(logs_dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(RUN_DIR_PREFIX))
        .map(|entry| entry.path())
        .collect();

    for file in log_files {
        match fs::remove_file(&file) {
            Ok(()) => stats.files_removed += 1,
            Err(e) => {
                warn!("Failed to remove {}: {}", file.display(), e);
                stats.failures.push((file, e.to_string()));
            }
        }
    }

    for dir in run_dirs {
        match fs::remove_dir_all(&dir) {
            Ok(()) => stats.dirs_removed += 1,
            Err(e) => {
                warn!("Failed to remove {}: {}", dir.display(), e);
                stats.failures.push((dir, e.to_string()));
            }
        }
    }

    Ok(stats)
}
