use super::scanner::LibraryScan;
use super::used::UsedLibraries;
use crate::error::Result;
use crate::library::LibraryDirectory;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Computes the closure of libraries a project uses, and their link order.
///
/// Starting from the project's direct dependencies, every library found is
/// scanned exactly once. When a scan reveals that a library depends on
/// entries already in the order, those entries move to the tail so they are
/// presented to the linker after their users; new discoveries are appended.
///
/// This is an ordering heuristic rather than a topological sort: cycles and
/// diamonds are not linearized in any guaranteed way.
pub struct DependencyGraphResolver<S> {
    scanner: S,
    passes: usize,
}

impl<S: LibraryScan> DependencyGraphResolver<S> {
    pub fn new(scanner: S) -> Self {
        Self { scanner, passes: 0 }
    }

    pub fn resolve(&mut self, project_dir: &Path) -> Result<UsedLibraries> {
        let mut used = UsedLibraries::new();
        for library in self.scanner.scan(project_dir)? {
            used.push(library);
        }
        info!("Project uses {} libraries directly", used.len());

        let mut scanned: HashSet<LibraryDirectory> = HashSet::new();
        self.passes = 0;

        loop {
            let frontier: Vec<LibraryDirectory> = used
                .iter()
                .filter(|library| !scanned.contains(*library))
                .cloned()
                .collect();
            if frontier.is_empty() {
                break;
            }
            self.passes += 1;
            debug!("Pass {}: scanning {} libraries", self.passes, frontier.len());

            for library in frontier {
                let dependencies = self.scanner.scan(library.path())?;

                let moved = used.relocate_to_tail(&dependencies);
                if !moved.is_empty() {
                    debug!(
                        "{} depends on [{}], moved to the tail",
                        library,
                        moved.iter().map(|l| l.name()).collect::<Vec<_>>().join(", ")
                    );
                }

                for dependency in dependencies {
                    if used.push(dependency.clone()) {
                        debug!("{} pulls in {}", library, dependency);
                    }
                }
                scanned.insert(library);
            }
        }

        info!(
            "Resolved {} libraries in {} passes: {}",
            used.len(),
            self.passes,
            used.names().join(" ")
        );
        Ok(used)
    }

    /// Outer passes taken by the last [`resolve`](Self::resolve).
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn into_scanner(self) -> S {
        self.scanner
    }
}
