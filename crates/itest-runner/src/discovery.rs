//! Unit discovery - find integration-test launchers in a directory tree

use itest_config::DESCRIPTOR_FILE;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directory that marks a module's integration tests
pub const MARKER_DIR: &str = "integration-tests";
/// Launcher file name prefix
pub const LAUNCHER_PREFIX: &str = "Run";
/// Launcher file extension
pub const LAUNCHER_EXTENSION: &str = "java";

/// A discovered integration-test unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestUnit {
    /// Name of the owning module (the marker directory's parent)
    pub module: String,
    /// Unit name (launcher file stem, e.g. "RunBrave")
    pub name: String,
    /// Path to the launcher file
    pub launcher: PathBuf,
    /// Module directory; the unit's working directory
    pub module_dir: PathBuf,
}

impl TestUnit {
    /// Build a unit from a launcher path, if it follows the layout convention
    pub fn from_launcher(launcher: &Path) -> Option<Self> {
        if !is_launcher(launcher) {
            return None;
        }

        let marker_dir = launcher.parent()?;
        let module_dir = marker_dir.parent()?;
        let module = module_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| module_dir.display().to_string());
        let name = launcher.file_stem()?.to_string_lossy().into_owned();

        Some(Self {
            module,
            name,
            launcher: launcher.to_path_buf(),
            module_dir: module_dir.to_path_buf(),
        })
    }

    /// Display identifier, `module/unit`
    pub fn id(&self) -> String {
        format!("{}/{}", self.module, self.name)
    }

    /// Identifier safe to use in file names
    pub fn slug(&self) -> String {
        self.id().replace(['/', '\\', ' '], "_")
    }

    /// Launcher path relative to the module directory
    pub fn relative_launcher(&self) -> PathBuf {
        self.launcher
            .strip_prefix(&self.module_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.launcher.clone())
    }

    /// Path of the unit's descriptor file
    pub fn descriptor_path(&self) -> PathBuf {
        match self.launcher.parent() {
            Some(dir) => dir.join(DESCRIPTOR_FILE),
            None => PathBuf::from(DESCRIPTOR_FILE),
        }
    }
}

/// Check whether a path names a launcher inside a marker directory
pub fn is_launcher(path: &Path) -> bool {
    let in_marker_dir = path
        .parent()
        .and_then(Path::file_name)
        .is_some_and(|dir| dir == OsStr::new(MARKER_DIR));
    let has_extension = path.extension() == Some(OsStr::new(LAUNCHER_EXTENSION));
    let has_prefix = path
        .file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.starts_with(LAUNCHER_PREFIX));

    in_marker_dir && has_extension && has_prefix
}

/// The set of discovered units
#[derive(Debug, Default, Clone)]
pub struct UnitSuite {
    /// Root the suite was discovered from
    pub root: PathBuf,
    /// All discovered units
    pub units: Vec<TestUnit>,
}

impl UnitSuite {
    /// Discover all launchers under a directory tree
    pub fn discover(root: &Path) -> Self {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let mut units: Vec<TestUnit> = WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| TestUnit::from_launcher(entry.path()))
            .collect();

        // Sorted for readable listings only; nothing downstream relies on it
        units.sort_by(|a, b| a.launcher.cmp(&b.launcher));

        debug!(root = %root.display(), count = units.len(), "discovered launchers");
        Self { root, units }
    }

    /// Keep units whose module path contains `pattern`, ignoring case
    pub fn filter(&self, pattern: &str) -> Self {
        let needle = pattern.to_lowercase();
        let units = self
            .units
            .iter()
            .filter(|unit| {
                self.module_path(unit)
                    .to_string_lossy()
                    .to_lowercase()
                    .contains(&needle)
            })
            .cloned()
            .collect();

        Self {
            root: self.root.clone(),
            units,
        }
    }

    /// Module directory relative to the discovery root
    pub fn module_path<'a>(&self, unit: &'a TestUnit) -> &'a Path {
        unit.module_dir
            .strip_prefix(&self.root)
            .unwrap_or(&unit.module_dir)
    }

    /// Check if suite has any units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Get count of units
    pub fn len(&self) -> usize {
        self.units.len()
    }
}
