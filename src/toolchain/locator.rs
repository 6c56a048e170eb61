use crate::error::{BuildError, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::debug;

/// Finds tools and SDK directories under a prioritized list of SDK roots.
///
/// Lookups are cached by key for the lifetime of the locator, which is one
/// build run.
#[derive(Debug, Clone)]
pub struct ToolchainLocator {
    sdk_roots: Vec<PathBuf>,
    overrides: BTreeMap<String, String>,
    search_path: bool,
    cache: HashMap<String, PathBuf>,
}

impl ToolchainLocator {
    pub fn new(sdk_roots: Vec<PathBuf>) -> Self {
        Self {
            sdk_roots,
            overrides: BTreeMap::new(),
            search_path: true,
            cache: HashMap::new(),
        }
    }

    /// Caller-supplied replacement for a tool, keyed like [`Self::locate`].
    ///
    /// A value containing a path separator is used as-is and must exist;
    /// a bare name replaces the candidate binary names.
    pub fn with_override(mut self, tool_key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(tool_key.into(), value.into());
        self
    }

    /// Disable the final `PATH` lookup.
    pub fn without_path_search(mut self) -> Self {
        self.search_path = false;
        self
    }

    pub fn sdk_roots(&self) -> &[PathBuf] {
        &self.sdk_roots
    }

    pub fn locate(
        &mut self,
        tool_key: &str,
        subpaths: &[&str],
        candidates: &[String],
        required: bool,
    ) -> Result<Option<PathBuf>> {
        if let Some(hit) = self.cache.get(tool_key) {
            return Ok(Some(hit.clone()));
        }

        let mut attempted = Vec::new();
        let mut names = candidates.to_vec();

        if let Some(value) = self.overrides.get(tool_key).cloned() {
            let as_path = PathBuf::from(&value);
            if as_path.components().count() > 1 || as_path.is_absolute() {
                if as_path.is_file() {
                    debug!("Using {} override {}", tool_key, as_path.display());
                    return Ok(Some(self.remember(tool_key, as_path)));
                }
                // An explicit path never falls back to the defaults.
                return Err(BuildError::ToolNotFound {
                    tool: value,
                    attempted: vec![as_path],
                });
            } else {
                names = vec![value];
            }
        }

        let found = self.probe_roots(tool_key, subpaths, &names, &mut attempted);
        let found = match found {
            Some(found) => Some(found),
            None if self.search_path => probe_path(&names, &mut attempted),
            None => None,
        };
        if let Some(found) = found {
            return Ok(Some(self.remember(tool_key, found)));
        }

        if required {
            return Err(BuildError::ToolNotFound {
                tool: names.first().cloned().unwrap_or_else(|| tool_key.to_string()),
                attempted,
            });
        }
        Ok(None)
    }

    /// Find a directory below the SDK roots that contains every marker file.
    pub fn locate_dir(
        &mut self,
        dir_key: &str,
        subpaths: &[&str],
        markers: &[&str],
        human_name: &str,
        required: bool,
    ) -> Result<Option<PathBuf>> {
        if let Some(hit) = self.cache.get(dir_key) {
            return Ok(Some(hit.clone()));
        }

        let mut attempted = Vec::new();
        let mut found = None;
        for root in &self.sdk_roots {
            let dir = subpaths.iter().fold(root.clone(), |acc, p| acc.join(p));
            let complete = dir.is_dir() && markers.iter().all(|m| dir.join(m).exists());
            debug!("Probing {} at {}: {}", human_name, dir.display(), complete);
            if complete {
                found = Some(dir);
                break;
            }
            attempted.push(dir);
        }
        if let Some(dir) = found {
            return Ok(Some(self.remember(dir_key, dir)));
        }

        if required {
            return Err(BuildError::SdkComponentNotFound {
                component: human_name.to_string(),
                attempted,
            });
        }
        Ok(None)
    }

    fn probe_roots(
        &self,
        tool_key: &str,
        subpaths: &[&str],
        names: &[String],
        attempted: &mut Vec<PathBuf>,
    ) -> Option<PathBuf> {
        for root in &self.sdk_roots {
            let dir = subpaths.iter().fold(root.clone(), |acc, p| acc.join(p));
            for name in names {
                let candidate = dir.join(name);
                debug!("Probing {} at {}", tool_key, candidate.display());
                if candidate.is_file() {
                    return Some(candidate);
                }
                attempted.push(candidate);
            }
        }
        None
    }

    fn remember(&mut self, key: &str, path: PathBuf) -> PathBuf {
        self.cache.insert(key.to_string(), path.clone());
        path
    }
}

fn probe_path(names: &[String], attempted: &mut Vec<PathBuf>) -> Option<PathBuf> {
    for name in names {
        if let Ok(found) = which::which(name) {
            return Some(found);
        }
        attempted.push(PathBuf::from(format!("PATH:{name}")));
    }
    None
}
