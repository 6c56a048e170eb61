use crate::library::LibraryDirectory;
use serde::Serialize;

/// Link order of the libraries a project uses. Never holds a library twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UsedLibraries(Vec<LibraryDirectory>);

impl UsedLibraries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `library` unless it is already present. Returns whether it
    /// was added.
    pub fn push(&mut self, library: LibraryDirectory) -> bool {
        if self.contains(&library) {
            return false;
        }
        self.0.push(library);
        true
    }

    pub fn contains(&self, library: &LibraryDirectory) -> bool {
        self.0.iter().any(|l| l.path() == library.path())
    }

    /// Move every entry that appears in `dependencies` to the tail, keeping
    /// the relative order of both the moved and the unmoved entries.
    /// Returns the moved entries.
    pub fn relocate_to_tail(&mut self, dependencies: &[LibraryDirectory]) -> Vec<LibraryDirectory> {
        let (moved, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.0)
            .into_iter()
            .partition(|lib| dependencies.iter().any(|d| d.path() == lib.path()));
        self.0 = kept;
        self.0.extend(moved.iter().cloned());
        moved
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LibraryDirectory> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[LibraryDirectory] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(LibraryDirectory::name).collect()
    }
}

impl<'a> IntoIterator for &'a UsedLibraries {
    type Item = &'a LibraryDirectory;
    type IntoIter = std::slice::Iter<'a, LibraryDirectory>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
