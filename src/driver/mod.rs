//! The external build driver that performs the actual compile and link work.
//!
//! The core only decides *what* to build; a [`BuildDriver`] turns each
//! request into tool invocations and reports the first failure.

pub mod make;
pub mod process;

pub use make::MakeDriver;
pub use process::run_tool;

use crate::error::Result;
use crate::flags::{AssembledFlags, FlagSet};
use crate::library::SourceFile;
use std::path::{Path, PathBuf};

/// Turn `.ino`/`.pde` sketches into C++ translation units.
#[derive(Debug, Clone)]
pub struct SketchRequest<'a> {
    pub sketches: &'a [SourceFile],
    /// Core header every generated unit starts with.
    pub prelude_header: &'a str,
    /// Directory the generated `<stem>.cpp` files are written to.
    pub output_dir: &'a Path,
}

/// Ask the compiler which headers `sources` include, transitively.
#[derive(Debug, Clone)]
pub struct DependencyRequest<'a> {
    /// Identifier of the scanned unit, used to name generated files.
    pub unit: &'a str,
    pub sources: &'a [PathBuf],
    /// Preprocessor flags, including the include path of every candidate
    /// library.
    pub flags: &'a FlagSet,
    /// Listing file the compiler writes.
    pub output: &'a Path,
}

/// One unit of the final build: a library or the project sources.
///
/// Objects land in the unit's build directory; library units are
/// additionally archived.
#[derive(Debug, Clone)]
pub struct BuildUnit {
    pub name: String,
    pub sources: Vec<SourceFile>,
}

/// Everything the final compile and link needs.
#[derive(Debug, Clone)]
pub struct FirmwarePlan<'a> {
    pub flags: &'a AssembledFlags,
    /// Linked as plain objects, ahead of every archive.
    pub project: &'a BuildUnit,
    /// Library units in link order.
    pub libraries: &'a [BuildUnit],
    pub elf: &'a Path,
    pub image: &'a Path,
}

pub trait BuildDriver {
    fn preprocess_sketches(&self, request: &SketchRequest<'_>) -> Result<()>;

    fn list_dependencies(&self, request: &DependencyRequest<'_>) -> Result<()>;

    fn build_firmware(&self, plan: &FirmwarePlan<'_>) -> Result<()>;

    fn driver_name(&self) -> &'static str;
}
