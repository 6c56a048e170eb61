use super::LibraryDirectory;
use crate::flags::{include_flag, FlagSet};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Library subdirectories that never take part in a build.
pub const LIBRARY_EXCLUDES: &[&str] = &["examples", "extras"];

const ARCH_DIR: &str = "arch";
const DEFAULT_ARCH: &str = "default";

fn is_excluded(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| LIBRARY_EXCLUDES.contains(&name))
}

fn walker(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(DirEntry::into_path)
}

/// Immediate subdirectories of `dir`, sorted by name, minus excluded ones.
pub fn list_subdirs(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(DirEntry::into_path)
        .collect()
}

/// Every directory of one library that belongs on the include path.
///
/// The root always comes first. A subdirectory named `arch` contributes only
/// the child matching `target_arch`, or failing that its `default` child,
/// plus everything nested under the chosen child. Any other subdirectory is
/// included along with all of its descendants.
pub fn include_dirs(library_root: &Path, target_arch: &str) -> Vec<PathBuf> {
    let mut dirs = vec![library_root.to_path_buf()];

    for subdir in list_subdirs(library_root) {
        let is_arch_dir = subdir
            .file_name()
            .is_some_and(|name| name == ARCH_DIR);

        if is_arch_dir {
            let children = list_subdirs(&subdir);
            let selected = [target_arch, DEFAULT_ARCH].into_iter().find_map(|wanted| {
                children
                    .iter()
                    .find(|child| child.file_name().is_some_and(|n| n == wanted))
                    .cloned()
            });
            if let Some(selected) = selected {
                let nested: Vec<PathBuf> = walker(&selected).collect();
                dirs.push(selected);
                dirs.extend(nested);
            }
        } else {
            let nested: Vec<PathBuf> = walker(&subdir).collect();
            dirs.push(subdir);
            dirs.extend(nested);
        }
    }

    dirs
}

/// `-I` flags for every include directory of every library, in order.
///
/// No deduplication: a directory reachable from two roots is listed twice.
pub fn include_flags(libraries: &[LibraryDirectory], target_arch: &str) -> FlagSet {
    libraries
        .iter()
        .flat_map(|lib| include_dirs(lib.path(), target_arch))
        .map(|dir| include_flag(&dir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_dirs(root: &Path, dirs: &[&str]) {
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
    }

    fn relative(root: &Path, dirs: Vec<PathBuf>) -> Vec<String> {
        dirs.into_iter()
            .map(|d| d.strip_prefix(root).unwrap().display().to_string())
            .collect()
    }

    #[test]
    fn test_plain_subdirs_are_recursive_and_exclusions_apply() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("Wire");
        make_dirs(
            &lib,
            &["utility", "utility/deep", "utility/deep/examples", "examples/Scan", "extras"],
        );

        let dirs = relative(temp.path(), include_dirs(&lib, "avr"));
        assert_eq!(dirs, vec!["Wire", "Wire/utility", "Wire/utility/deep"]);
    }

    #[test]
    fn test_arch_dir_prefers_target() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("Servo");
        make_dirs(&lib, &["arch/avr/util", "arch/sam/util", "arch/default"]);

        let dirs = relative(temp.path(), include_dirs(&lib, "sam"));
        assert_eq!(dirs, vec!["Servo", "Servo/arch/sam", "Servo/arch/sam/util"]);
    }

    #[test]
    fn test_arch_dir_falls_back_to_default() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("Servo");
        make_dirs(&lib, &["arch/avr", "arch/sam", "arch/default/inner"]);

        let dirs = relative(temp.path(), include_dirs(&lib, "esp8266"));
        assert_eq!(
            dirs,
            vec!["Servo", "Servo/arch/default", "Servo/arch/default/inner"]
        );
    }

    #[test]
    fn test_arch_dir_without_match_contributes_nothing() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("Servo");
        make_dirs(&lib, &["arch/avr", "src"]);

        let dirs = relative(temp.path(), include_dirs(&lib, "sam"));
        assert_eq!(dirs, vec!["Servo", "Servo/src"]);
    }

    #[test]
    fn test_include_flags_keep_library_order() {
        let temp = TempDir::new().unwrap();
        make_dirs(temp.path(), &["B/src", "A"]);
        let libs = vec![
            LibraryDirectory::new(temp.path().join("B")),
            LibraryDirectory::new(temp.path().join("A")),
        ];

        let flags = include_flags(&libs, "avr");
        let expected: Vec<String> = ["B", "B/src", "A"]
            .iter()
            .map(|d| format!("-I{}", temp.path().join(d).display()))
            .collect();
        assert_eq!(flags.as_slice(), expected.as_slice());
    }
}
