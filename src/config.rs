use crate::flags::RawFlagOverrides;
use crate::toolchain::{ToolKey, ToolchainLocator};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const BUILD_DIR: &str = ".build";
const SRC_DIR: &str = "src";
const LIB_DIR: &str = "lib";

/// Everything one build invocation is configured with.
///
/// Built once from the command line and passed by reference; nothing here
/// changes while the build runs.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub project_dir: PathBuf,
    pub board: String,
    /// SDK installations, highest priority first.
    pub sdk_roots: Vec<PathBuf>,
    pub tool_overrides: BTreeMap<ToolKey, String>,
    pub flags: RawFlagOverrides,
    pub verbose: bool,
}

impl BuildConfig {
    pub fn new(project_dir: impl Into<PathBuf>, board: impl Into<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            board: board.into(),
            sdk_roots: default_sdk_roots(),
            tool_overrides: BTreeMap::new(),
            flags: RawFlagOverrides::default(),
            verbose: false,
        }
    }

    pub fn src_dir(&self) -> PathBuf {
        self.project_dir.join(SRC_DIR)
    }

    /// Project-local libraries, one per subdirectory.
    pub fn lib_dir(&self) -> PathBuf {
        self.project_dir.join(LIB_DIR)
    }

    /// Root of every board's build tree.
    pub fn build_root(&self) -> PathBuf {
        self.project_dir.join(BUILD_DIR)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.build_root().join(&self.board)
    }

    pub fn locator(&self) -> ToolchainLocator {
        self.tool_overrides
            .iter()
            .fold(ToolchainLocator::new(self.sdk_roots.clone()), |locator, (key, value)| {
                locator.with_override(key.as_str(), value.clone())
            })
    }
}

/// Conventional SDK install locations that exist on this machine.
pub fn default_sdk_roots() -> Vec<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/usr/local/share/arduino"),
        PathBuf::from("/usr/share/arduino"),
        PathBuf::from("/Applications/Arduino.app/Contents/Resources/Java"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join("arduino"));
    }
    candidates.into_iter().filter(|p| is_sdk_root(p)).collect()
}

fn is_sdk_root(path: &Path) -> bool {
    path.join("hardware").is_dir()
}
