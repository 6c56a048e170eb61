use super::indexer::include_dirs;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    C,
    Cpp,
    Asm,
    /// `.ino`/`.pde` sketch, turned into a C++ translation unit first.
    Sketch,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "c" => Some(SourceKind::C),
            "cpp" | "cc" | "cxx" => Some(SourceKind::Cpp),
            "S" => Some(SourceKind::Asm),
            "ino" | "pde" => Some(SourceKind::Sketch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
    /// Path relative to the unit root without extension, `/`-separated.
    pub stem: String,
}

/// Sources of one build unit, taken from the same directories that end up
/// on its include path.
pub fn collect_sources(root: &Path, target_arch: &str) -> Vec<SourceFile> {
    let mut sources = Vec::new();

    for dir in include_dirs(root, target_arch) {
        let files = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file());

        for entry in files {
            let path = entry.into_path();
            let Some(kind) = SourceKind::from_path(&path) else {
                continue;
            };
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let stem = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            sources.push(SourceFile { path, kind, stem });
        }
    }

    sources
}
