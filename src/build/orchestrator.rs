use super::{unit_key, BuildLayout};
use crate::board::{BoardCatalog, BoardProfile};
use crate::config::BuildConfig;
use crate::deps::{DependencyGraphResolver, DependencyScanner, UsedLibraries};
use crate::driver::{BuildDriver, BuildUnit, FirmwarePlan, MakeDriver, SketchRequest};
use crate::error::{BuildError, Result};
use crate::flags::{AssembledFlags, FlagAssembler, FlagOverrides};
use crate::library::{candidate_libraries, collect_sources, include_flags, SourceFile, SourceKind};
use crate::toolchain::{self, Toolchain};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build unit holding the project's own sources.
pub const PROJECT_UNIT: &str = "src";

/// Outcome of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub board: String,
    pub elf: PathBuf,
    pub firmware: PathBuf,
    pub used_libraries: UsedLibraries,
    pub flags: AssembledFlags,
}

/// Resolved inputs of one build, available once discovery succeeded.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub board: BoardProfile,
    pub toolchain: Toolchain,
    pub layout: BuildLayout,
    pub flags: AssembledFlags,
}

/// Runs the build pipeline for one project and board. The first failing
/// step aborts the run.
pub struct BuildOrchestrator<'a> {
    config: &'a BuildConfig,
    catalog: &'a BoardCatalog,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(config: &'a BuildConfig, catalog: &'a BoardCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn run(&self) -> Result<BuildReport> {
        let context = self.prepare()?;
        let driver = MakeDriver::new(
            context.toolchain.paths.clone(),
            context.layout.clone(),
            &context.board.id,
            self.config.verbose,
        )?;
        self.build(context, &driver)
    }

    /// Validate the configuration, discover the toolchain and assemble the
    /// default flags. No external tool runs here.
    pub fn prepare(&self) -> Result<BuildContext> {
        let overrides = FlagOverrides::parse(&self.config.flags)?;
        let board = self.catalog.profile(&self.config.board)?;

        let layout = BuildLayout::new(self.config.build_dir());
        layout.ensure_dirs()?;

        let mut locator = self.config.locator();
        let toolchain = toolchain::discover(&board, &mut locator)?;

        let platform = self.catalog.platform(&board.arch);
        let flags = FlagAssembler::new(&toolchain, &platform, &layout).assemble(&board, &overrides);

        Ok(BuildContext {
            board,
            toolchain,
            layout,
            flags,
        })
    }

    /// Preprocess sketches, resolve libraries and hand the final compile
    /// and link to `driver`.
    pub fn build<D: BuildDriver + ?Sized>(
        &self,
        context: BuildContext,
        driver: &D,
    ) -> Result<BuildReport> {
        let BuildContext {
            board,
            toolchain,
            layout,
            mut flags,
        } = context;
        let arch = board.arch.as_str();

        let src_dir = self.config.src_dir();
        if !src_dir.is_dir() {
            return Err(BuildError::at_path(
                &src_dir,
                io::Error::new(io::ErrorKind::NotFound, "project has no source directory"),
            ));
        }

        let sources = collect_sources(&src_dir, arch);
        let (sketches, mut project_sources): (Vec<SourceFile>, Vec<SourceFile>) = sources
            .into_iter()
            .partition(|source| source.kind == SourceKind::Sketch);

        driver.preprocess_sketches(&SketchRequest {
            sketches: &sketches,
            prelude_header: prelude_header(&toolchain),
            output_dir: &layout.unit_dir(PROJECT_UNIT),
        })?;
        project_sources.extend(sketches.iter().map(|sketch| SourceFile {
            path: layout.translation_unit(PROJECT_UNIT, &sketch.stem),
            kind: SourceKind::Cpp,
            stem: sketch.stem.clone(),
        }));

        let candidates = candidate_libraries(&toolchain.layout, &self.config.lib_dir(), &board);
        debug!("{} candidate libraries", candidates.len());

        let mut scan_flags = flags.cppflags.clone();
        scan_flags.extend_from(&include_flags(&candidates, arch));

        let scanner = DependencyScanner::new(driver, &layout, &candidates, &scan_flags, arch)?
            .with_project(&src_dir, PROJECT_UNIT);
        let used = DependencyGraphResolver::new(scanner).resolve(&src_dir)?;
        ensure_distinct_units(&used)?;

        flags
            .cppflags
            .extend_from(&include_flags(used.as_slice(), arch));

        let project = BuildUnit {
            name: PROJECT_UNIT.to_string(),
            sources: project_sources,
        };
        let libraries: Vec<BuildUnit> = used
            .iter()
            .map(|library| BuildUnit {
                name: library.name().to_string(),
                sources: collect_sources(library.path(), arch),
            })
            .collect();

        let elf = layout.firmware_elf();
        let firmware = layout.firmware_hex();
        info!(
            "Building {} for {} with {}",
            self.config.project_dir.display(),
            board.id,
            driver.driver_name()
        );
        driver.build_firmware(&FirmwarePlan {
            flags: &flags,
            project: &project,
            libraries: &libraries,
            elf: &elf,
            image: &firmware,
        })?;

        info!("Firmware written to {}", firmware.display());
        Ok(BuildReport {
            board: board.id,
            elf,
            firmware,
            used_libraries: used,
            flags,
        })
    }
}

fn prelude_header(toolchain: &Toolchain) -> &'static str {
    if toolchain.layout.version.major() > 0 {
        "Arduino.h"
    } else {
        "WProgram.h"
    }
}

/// Every unit gets its own directory and make variables, so no resolved
/// library may map to the same key as another or as the project unit.
fn ensure_distinct_units(used: &UsedLibraries) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    seen.insert(unit_key(PROJECT_UNIT), PROJECT_UNIT);

    for library in used {
        let key = unit_key(library.name());
        if let Some(first) = seen.insert(key.clone(), library.name()) {
            return Err(BuildError::UnitConflict {
                first: first.to_string(),
                second: library.name().to_string(),
                key,
            });
        }
    }
    Ok(())
}

/// Remove a build tree. Missing trees are not an error.
pub fn clean(build_dir: &Path) -> Result<()> {
    if !build_dir.exists() {
        debug!("{} does not exist, nothing to clean", build_dir.display());
        return Ok(());
    }
    fs::remove_dir_all(build_dir).map_err(|e| BuildError::at_path(build_dir, e))?;
    info!("Removed {}", build_dir.display());
    Ok(())
}

/// One `id: name` line per known board, sorted by id.
pub fn list_boards(catalog: &BoardCatalog) -> Vec<String> {
    let boards = catalog.boards();
    let width = boards.iter().map(|(id, _)| id.len()).max().unwrap_or(0);
    boards
        .into_iter()
        .map(|(id, name)| format!("{id:>width$}: {name}"))
        .collect()
}
