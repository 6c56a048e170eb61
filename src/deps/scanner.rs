use crate::build::BuildLayout;
use crate::driver::{BuildDriver, DependencyRequest};
use crate::error::{BuildError, Result};
use crate::flags::FlagSet;
use crate::library::{collect_sources, LibraryDirectory, SourceKind};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::debug;

/// Anything that can report which library roots a directory's sources use.
pub trait LibraryScan {
    fn scan(&mut self, directory: &Path) -> Result<Vec<LibraryDirectory>>;
}

/// Matches dependency-listing lines against each library root.
#[derive(Debug, Clone)]
pub struct ListingMatcher {
    roots: Vec<(LibraryDirectory, Regex)>,
}

impl ListingMatcher {
    pub fn new(roots: &[LibraryDirectory]) -> Result<Self> {
        let roots = roots
            .iter()
            .map(|root| {
                let pattern = format!(
                    r"(?:^|\s){}{}",
                    regex::escape(&root.path().display().to_string()),
                    regex::escape(&MAIN_SEPARATOR.to_string())
                );
                Ok((root.clone(), Regex::new(&pattern)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { roots })
    }

    /// Roots referenced by `listing`, in root order, never including `scanned`.
    pub fn used_libraries(&self, listing: &str, scanned: &Path) -> Vec<LibraryDirectory> {
        self.roots
            .iter()
            .filter(|(root, _)| root.path() != scanned)
            .filter(|(_, pattern)| listing.lines().any(|line| pattern.is_match(line)))
            .map(|(root, _)| root.clone())
            .collect()
    }
}

/// Runs the external compiler's dependency listing for a directory and
/// reads back which library roots it pulled headers from.
pub struct DependencyScanner<'a, D: BuildDriver + ?Sized> {
    driver: &'a D,
    layout: &'a BuildLayout,
    scan_flags: &'a FlagSet,
    target_arch: &'a str,
    matcher: ListingMatcher,
    project_dir: Option<(PathBuf, String)>,
}

impl<'a, D: BuildDriver + ?Sized> DependencyScanner<'a, D> {
    pub fn new(
        driver: &'a D,
        layout: &'a BuildLayout,
        library_roots: &[LibraryDirectory],
        scan_flags: &'a FlagSet,
        target_arch: &'a str,
    ) -> Result<Self> {
        Ok(Self {
            driver,
            layout,
            scan_flags,
            target_arch,
            matcher: ListingMatcher::new(library_roots)?,
            project_dir: None,
        })
    }

    /// Sketches under `dir` are scanned through the translation units
    /// generated for `unit` rather than the raw `.ino` files.
    pub fn with_project(mut self, dir: &Path, unit: &str) -> Self {
        self.project_dir = Some((dir.to_path_buf(), unit.to_string()));
        self
    }

    fn sources(&self, directory: &Path, unit: &str) -> Vec<PathBuf> {
        let sketch_unit = match &self.project_dir {
            Some((dir, project_unit)) if dir == directory => Some(project_unit.as_str()),
            _ => None,
        };

        collect_sources(directory, self.target_arch)
            .into_iter()
            .filter_map(|source| match source.kind {
                SourceKind::Sketch => sketch_unit
                    .map(|u| self.layout.translation_unit(u, &source.stem)),
                SourceKind::Asm => None,
                _ => Some(source.path),
            })
            .inspect(|path| debug!("{}: scanning {}", unit, path.display()))
            .collect()
    }
}

impl<D: BuildDriver + ?Sized> LibraryScan for DependencyScanner<'_, D> {
    fn scan(&mut self, directory: &Path) -> Result<Vec<LibraryDirectory>> {
        let unit = match &self.project_dir {
            Some((dir, project_unit)) if dir == directory => project_unit.clone(),
            _ => LibraryDirectory::new(directory).name().to_string(),
        };

        let sources = self.sources(directory, &unit);
        if sources.is_empty() {
            debug!("{} has no sources to scan", unit);
            return Ok(Vec::new());
        }

        let output = self.layout.dependency_listing(&unit);
        self.driver.list_dependencies(&DependencyRequest {
            unit: &unit,
            sources: &sources,
            flags: self.scan_flags,
            output: &output,
        })?;

        let listing = fs::read_to_string(&output).map_err(|e| BuildError::at_path(&output, e))?;
        let used = self.matcher.used_libraries(&listing, directory);
        debug!(
            "{} uses [{}]",
            unit,
            used.iter().map(|l| l.name()).collect::<Vec<_>>().join(", ")
        );
        Ok(used)
    }
}
