//! Library roots, their include directories and their sources.

pub mod indexer;
pub mod sources;

pub use indexer::{include_dirs, include_flags, list_subdirs, LIBRARY_EXCLUDES};
pub use sources::{collect_sources, SourceFile, SourceKind};

use crate::board::BoardProfile;
use crate::toolchain::SdkLayout;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One candidate or resolved library root, identified by its base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LibraryDirectory {
    path: PathBuf,
    name: String,
}

impl LibraryDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for LibraryDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Every library root a project may use, in lookup priority order: the core,
/// the project's own `lib/` entries, the SDK `libraries/` entries, then the
/// board variant.
///
/// The repository is flat, so a project library shadows an SDK library of
/// the same name.
pub fn candidate_libraries(
    layout: &SdkLayout,
    project_lib_dir: &Path,
    board: &BoardProfile,
) -> Vec<LibraryDirectory> {
    let mut roots = vec![layout.core_dir.clone()];
    if project_lib_dir.is_dir() {
        roots.extend(list_subdirs(project_lib_dir));
    }
    roots.extend(list_subdirs(&layout.libraries_dir));
    if let Some(variant) = layout.variant_dir(board) {
        roots.push(variant);
    }

    let mut seen = HashSet::new();
    let mut libraries = Vec::with_capacity(roots.len());
    for root in roots {
        let library = LibraryDirectory::new(root);
        if seen.insert(library.name().to_string()) {
            libraries.push(library);
        } else {
            debug!("{} shadowed by an earlier library of the same name", library.path().display());
        }
    }
    libraries
}
