//! Toolchain discovery: which SDK directories and native tools a board needs.

pub mod arch;
pub mod locator;
pub mod version;

pub use arch::{arch_spec, ArchSpec, LinkGroupSpec, ToolKey, ARCHITECTURES};
pub use locator::ToolchainLocator;
pub use version::SdkVersion;

use crate::board::BoardProfile;
use crate::error::{BuildError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolved executable for every [`ToolKey`].
///
/// All fields are required, so a value of this type is always complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainPaths {
    pub make: PathBuf,
    pub cc: PathBuf,
    pub cxx: PathBuf,
    pub ar: PathBuf,
    pub ld: PathBuf,
    pub objcopy: PathBuf,
}

impl ToolchainPaths {
    pub fn get(&self, key: ToolKey) -> &Path {
        match key {
            ToolKey::Make => &self.make,
            ToolKey::Cc => &self.cc,
            ToolKey::Cxx => &self.cxx,
            ToolKey::Ar => &self.ar,
            ToolKey::Ld => &self.ld,
            ToolKey::Objcopy => &self.objcopy,
        }
    }
}

/// SDK directories a build reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLayout {
    pub version: SdkVersion,
    pub core_dir: PathBuf,
    pub libraries_dir: PathBuf,
    pub variants_dir: Option<PathBuf>,
    pub system_dir: Option<PathBuf>,
}

impl SdkLayout {
    pub fn variant_dir(&self, board: &BoardProfile) -> Option<PathBuf> {
        self.variants_dir.as_ref().map(|dir| dir.join(&board.variant))
    }
}

#[derive(Debug, Clone)]
pub struct Toolchain {
    pub arch: &'static ArchSpec,
    pub paths: ToolchainPaths,
    pub layout: SdkLayout,
}

/// Resolve the architecture, SDK layout and every tool for `board`.
///
/// The architecture is checked against the static table before anything is
/// probed on disk.
pub fn discover(board: &BoardProfile, locator: &mut ToolchainLocator) -> Result<Toolchain> {
    let arch = arch_spec(&board.arch).ok_or_else(|| BuildError::UnknownArchitecture {
        arch: board.arch.clone(),
        board: board.id.clone(),
    })?;

    info!("Discovering {} toolchain for board {}", arch.id, board.id);
    let layout = discover_layout(arch, locator)?;

    let mut tool = |key: ToolKey| resolve_tool(arch, locator, key);
    let paths = ToolchainPaths {
        make: tool(ToolKey::Make)?,
        cc: tool(ToolKey::Cc)?,
        cxx: tool(ToolKey::Cxx)?,
        ar: tool(ToolKey::Ar)?,
        ld: tool(ToolKey::Ld)?,
        objcopy: tool(ToolKey::Objcopy)?,
    };

    Ok(Toolchain {
        arch,
        paths,
        layout,
    })
}

fn resolve_tool(arch: &ArchSpec, locator: &mut ToolchainLocator, key: ToolKey) -> Result<PathBuf> {
    let binary = arch.binary_name(key);
    let path = locator
        .locate(key.as_str(), &arch.tool_subpath(key), &[binary.clone()], true)?
        .ok_or(BuildError::ToolNotFound {
            tool: binary,
            attempted: Vec::new(),
        })?;
    debug!("{} -> {}", key, path.display());
    Ok(path)
}

fn required_dir(found: Option<PathBuf>, component: &str) -> Result<PathBuf> {
    found.ok_or_else(|| BuildError::SdkComponentNotFound {
        component: component.to_string(),
        attempted: Vec::new(),
    })
}

fn discover_layout(arch: &ArchSpec, locator: &mut ToolchainLocator) -> Result<SdkLayout> {
    let version = read_version(locator)?;

    let core_marker = if version.major() > 0 {
        "Arduino.h"
    } else {
        "WProgram.h"
    };
    let core_name = format!("Arduino core library ({})", arch.id);
    let core_dir = locator.locate_dir(
        "arduino_core_dir",
        &["hardware", "arduino", arch.id, "cores", "arduino"],
        &[core_marker],
        &core_name,
        true,
    )?;
    let core_dir = required_dir(core_dir, &core_name)?;

    let libraries_dir = locator.locate_dir(
        "arduino_libraries_dir",
        &["libraries"],
        &[],
        "Arduino standard libraries",
        true,
    )?;
    let libraries_dir = required_dir(libraries_dir, "Arduino standard libraries")?;

    let system_dir = if arch.requires_system_dir() {
        locator.locate_dir(
            "arduino_system_dir",
            &["hardware", "arduino", arch.id, "system"],
            &[],
            "Arduino system libraries",
            true,
        )?
    } else {
        None
    };

    let variants_dir = if version.major() > 0 {
        locator.locate_dir(
            "arduino_variants_dir",
            &["hardware", "arduino", arch.id, "variants"],
            &[],
            &format!("Arduino variants directory ({})", arch.id),
            true,
        )?
    } else {
        None
    };

    Ok(SdkLayout {
        version,
        core_dir,
        libraries_dir,
        variants_dir,
        system_dir,
    })
}

fn read_version(locator: &mut ToolchainLocator) -> Result<SdkVersion> {
    let Some(lib_dir) =
        locator.locate_dir("arduino_lib_dir", &["lib"], &["version.txt"], "SDK version file", false)?
    else {
        let fallback = SdkVersion::default();
        warn!("No lib/version.txt in any SDK root, assuming {}", fallback);
        return Ok(fallback);
    };

    let path = lib_dir.join("version.txt");
    let raw = fs::read_to_string(&path).map_err(|e| BuildError::at_path(&path, e))?;
    match SdkVersion::parse(&raw) {
        Some(version) => {
            debug!("SDK version {}", version);
            Ok(version)
        }
        None => {
            let fallback = SdkVersion::default();
            warn!("Unrecognized SDK version {:?}, assuming {}", raw.trim(), fallback);
            Ok(fallback)
        }
    }
}
